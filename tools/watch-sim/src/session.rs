//! Simulated watch session.

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::Serialize;

use watch_display::DisplayStatus;
use watch_kernel::message::Message;
use watch_kernel::{KernelConfig, MailboxStats, PoolStats, TaskId};
use watch_platform::mocks::{
    FakeHardware, HostFrame, MemoryNvStore, RecordingHostLink, RecordingRenderer, RenderOp,
};
use watch_platform::{Hardware, Image, RadioState, RadioStatus, RtcTime};
use watch_services::{Collaborators, WatchSystem};

use crate::script::Command;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailboxReport {
    pub task: TaskId,
    pub pending: usize,
    pub stats: MailboxStats,
}

/// What one command made visible.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    Tick {
        elapsed: u64,
        fired: usize,
    },
    /// A frame the phone would have received.
    Frame(HostFrame),
    Render {
        presents: usize,
        images: Vec<Image>,
        texts: Vec<String>,
    },
    Vibrate {
        count: usize,
    },
    State {
        elapsed: u64,
        rtc: RtcTime,
        display: DisplayStatus,
    },
    Stats {
        pool: PoolStats,
        timers_allocated: usize,
        timer_send_failures: u32,
        mailboxes: Vec<MailboxReport>,
    },
    /// The kernel refused a message the script injected.
    Dropped {
        reason: String,
    },
}

fn to_naive(time: &RtcTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(i32::from(time.year), u32::from(time.month), u32::from(time.day))?
        .and_hms_opt(
            u32::from(time.hour),
            u32::from(time.minute),
            u32::from(time.second),
        )
}

fn from_naive(time: NaiveDateTime) -> Option<RtcTime> {
    Some(
        RtcTime::new(
            u16::try_from(time.year()).ok()?,
            time.month() as u8,
            time.day() as u8,
            time.hour() as u8,
            time.minute() as u8,
            time.second() as u8,
        )
        .with_day_of_week(time.weekday().number_from_monday() as u8),
    )
}

/// The four tasks over in-memory collaborators, plus a wall clock that
/// advances one second per tick.
pub struct Simulator {
    system: WatchSystem,
    nv: MemoryNvStore,
    renderer: RecordingRenderer,
    hardware: FakeHardware,
    link: RecordingHostLink,
    elapsed: u64,
    vibrations_seen: usize,
}

impl Simulator {
    pub fn new() -> Result<Self> {
        Self::with_config(KernelConfig::builder().name("watch-sim").build())
    }

    /// Assembles and starts the system. The boot output is discarded.
    pub fn with_config(config: KernelConfig) -> Result<Self> {
        let nv = MemoryNvStore::new();
        let renderer = RecordingRenderer::new();
        let hardware = FakeHardware::new();
        let link = RecordingHostLink::new();

        let system = WatchSystem::assemble(
            config,
            Collaborators {
                nv: nv.clone(),
                renderer: renderer.clone(),
                hardware: hardware.clone(),
                link: link.clone(),
            },
        )
        .context("assembling the watch tasks")?;
        system.start().context("starting the watch tasks")?;

        renderer.take();
        link.take_frames();
        Ok(Self {
            system,
            nv,
            renderer,
            hardware,
            link,
            elapsed: 0,
            vibrations_seen: 0,
        })
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn display(&self) -> DisplayStatus {
        self.system.display()
    }

    pub fn system(&self) -> &WatchSystem {
        &self.system
    }

    pub fn nv(&self) -> &MemoryNvStore {
        &self.nv
    }

    pub fn hardware(&self) -> &FakeHardware {
        &self.hardware
    }

    /// Runs one command and collects everything it produced.
    pub fn execute(&mut self, command: Command) -> Result<Vec<Report>> {
        let mut reports = Vec::new();
        match command {
            Command::Tick(seconds) => {
                let mut fired = 0;
                for _ in 0..seconds {
                    self.advance_clock()?;
                    fired += self.system.tick();
                }
                reports.push(Report::Tick {
                    elapsed: self.elapsed,
                    fired,
                });
            }
            Command::Press { button, press } => {
                if let Err(err) = self.system.press(button, press) {
                    reports.push(Report::Dropped {
                        reason: err.to_string(),
                    });
                }
            }
            Command::Route {
                kind,
                options,
                payload,
            } => {
                let message = Message::from_parts(kind, options, &payload)
                    .with_context(|| format!("building message {kind:#04x}"))?;
                self.inject(message, &mut reports);
            }
            Command::Rtc(time) => self.inject(Message::SetRealTimeClock(time), &mut reports),
            Command::Connect => {
                self.hardware.set_radio(RadioStatus {
                    state: RadioState::Connected,
                    discoverable: false,
                });
                self.inject(Message::ConnectionStateChange, &mut reports);
            }
            Command::Disconnect => {
                self.hardware.set_radio(RadioStatus {
                    state: RadioState::On,
                    discoverable: true,
                });
                self.inject(Message::ConnectionStateChange, &mut reports);
            }
            Command::State => reports.push(Report::State {
                elapsed: self.elapsed,
                rtc: self.hardware.rtc(),
                display: self.system.display(),
            }),
            Command::Stats => reports.push(self.stats()),
        }
        self.collect(&mut reports);
        Ok(reports)
    }

    fn inject(&self, message: Message, reports: &mut Vec<Report>) {
        if let Err(err) = self.system.route(message) {
            reports.push(Report::Dropped {
                reason: err.to_string(),
            });
        }
    }

    fn advance_clock(&mut self) -> Result<()> {
        let now = self.hardware.rtc();
        let next = to_naive(&now)
            .and_then(|time| time.checked_add_signed(TimeDelta::seconds(1)))
            .and_then(from_naive)
            .ok_or_else(|| anyhow!("clock cannot advance past {now:?}"))?;
        self.hardware.set_time(next);
        self.elapsed += 1;
        Ok(())
    }

    fn stats(&self) -> Report {
        let kernel = self.system.kernel();
        let mailboxes = TaskId::ALL
            .into_iter()
            .filter_map(|task| {
                kernel.router().mailbox(task).map(|mailbox| MailboxReport {
                    task,
                    pending: mailbox.len(),
                    stats: mailbox.stats(),
                })
            })
            .collect();
        Report::Stats {
            pool: self.system.pool_stats(),
            timers_allocated: kernel.timers().allocated(),
            timer_send_failures: kernel.timers().send_failures(),
            mailboxes,
        }
    }

    fn collect(&mut self, reports: &mut Vec<Report>) {
        reports.extend(self.link.take_frames().into_iter().map(Report::Frame));

        let ops = self.renderer.take();
        let presents = ops
            .iter()
            .filter(|op| matches!(op, RenderOp::Present { .. }))
            .count();
        if presents > 0 {
            let images = ops
                .iter()
                .filter_map(|op| match op {
                    RenderOp::Blit { image, .. } => Some(*image),
                    _ => None,
                })
                .collect();
            let texts = ops
                .into_iter()
                .filter_map(|op| match op {
                    RenderOp::Text { text, .. } => Some(text),
                    _ => None,
                })
                .collect();
            reports.push(Report::Render {
                presents,
                images,
                texts,
            });
        }

        let vibrations = self.hardware.vibrations().len();
        if vibrations > self.vibrations_seen {
            reports.push(Report::Vibrate {
                count: vibrations - self.vibrations_seen,
            });
            self.vibrations_seen = vibrations;
        }
    }
}
