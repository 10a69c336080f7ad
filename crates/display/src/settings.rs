//! Display settings persisted in the NV store.

use watch_kernel::message::{IdleBufferConfig, Mode};
use watch_platform::{NvId, NvStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeFormat {
    TwelveHour,
    #[default]
    TwentyFourHour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateFormat {
    #[default]
    MonthFirst,
    DayFirst,
}

/// Mode timeouts in seconds; zero disables the timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeTimeouts {
    pub idle: u16,
    pub application: u16,
    pub notification: u16,
    pub scroll: u16,
}

impl Default for ModeTimeouts {
    fn default() -> Self {
        Self {
            idle: 0,
            application: 600,
            notification: 30,
            scroll: 600,
        }
    }
}

impl ModeTimeouts {
    pub fn for_mode(&self, mode: Mode) -> u32 {
        u32::from(match mode {
            Mode::Idle => self.idle,
            Mode::Application => self.application,
            Mode::Notification => self.notification,
            Mode::Scroll => self.scroll,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplaySettings {
    pub idle_buffer: IdleBufferConfig,
    pub invert: bool,
    pub seconds: bool,
    pub link_alarm: bool,
    /// Reset pin acts as RST rather than NMI.
    pub rst_pin: bool,
    pub time_format: TimeFormat,
    pub date_format: DateFormat,
    pub timeouts: ModeTimeouts,
    /// Clock correction in RTC steps, within ±[`MAX_CORRECTION`](Self::MAX_CORRECTION).
    pub correction: i8,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            idle_buffer: IdleBufferConfig::WatchControlsTop,
            invert: false,
            seconds: false,
            link_alarm: true,
            rst_pin: false,
            time_format: TimeFormat::default(),
            date_format: DateFormat::default(),
            timeouts: ModeTimeouts::default(),
            correction: 0,
        }
    }
}

fn save<N: NvStore>(nv: &mut N, id: NvId, value: u32) {
    if let Err(err) = nv.save(id, value) {
        log::error!("display settings: {err}");
    }
}

impl DisplaySettings {
    pub const MAX_CORRECTION: i8 = 99;

    /// Registers every default and loads the stored values.
    pub fn load<N: NvStore>(nv: &mut N) -> Self {
        let defaults = Self::default();
        let mut settings = defaults;
        for (id, size, default) in defaults.items() {
            nv.register_default(id, size, default);
            settings.apply(id, nv.load(id).unwrap_or(default));
        }
        settings
    }

    /// Re-reads one item after the host changed it; returns `false` for ids
    /// this module does not own.
    pub fn reload<N: NvStore>(&mut self, nv: &N, id: NvId) -> bool {
        match nv.load(id) {
            Some(value) => self.apply(id, value),
            None => false,
        }
    }

    /// `(id, size, value)` of every persisted field.
    fn items(&self) -> [(NvId, u8, u32); 12] {
        [
            (NvId::IDLE_BUFFER_CONFIG, 1, u8::from(self.idle_buffer).into()),
            (NvId::IDLE_BUFFER_INVERT, 1, self.invert.into()),
            (NvId::DISPLAY_SECONDS, 1, self.seconds.into()),
            (NvId::LINK_ALARM_ENABLE, 1, self.link_alarm.into()),
            (NvId::RST_NMI_CONFIG, 1, self.rst_pin.into()),
            (NvId::TIME_FORMAT, 1, (self.time_format == TimeFormat::TwentyFourHour).into()),
            (NvId::DATE_FORMAT, 1, (self.date_format == DateFormat::DayFirst).into()),
            (NvId::IDLE_MODE_TIMEOUT, 2, self.timeouts.idle.into()),
            (NvId::APPLICATION_MODE_TIMEOUT, 2, self.timeouts.application.into()),
            (NvId::NOTIFICATION_MODE_TIMEOUT, 2, self.timeouts.notification.into()),
            (NvId::SCROLL_MODE_TIMEOUT, 2, self.timeouts.scroll.into()),
            (NvId::RTC_CORRECTION, 1, u32::from(self.correction as u8)),
        ]
    }

    fn apply(&mut self, id: NvId, value: u32) -> bool {
        let flag = value & 0xff != 0;
        let half = (value & 0xffff) as u16;
        match id {
            NvId::IDLE_BUFFER_CONFIG => {
                self.idle_buffer = if value & 0x01 == 0 {
                    IdleBufferConfig::WatchControlsTop
                } else {
                    IdleBufferConfig::PhoneControlsAll
                }
            }
            NvId::IDLE_BUFFER_INVERT => self.invert = flag,
            NvId::DISPLAY_SECONDS => self.seconds = flag,
            NvId::LINK_ALARM_ENABLE => self.link_alarm = flag,
            NvId::RST_NMI_CONFIG => self.rst_pin = flag,
            NvId::TIME_FORMAT => {
                self.time_format = if flag {
                    TimeFormat::TwentyFourHour
                } else {
                    TimeFormat::TwelveHour
                }
            }
            NvId::DATE_FORMAT => {
                self.date_format = if flag {
                    DateFormat::DayFirst
                } else {
                    DateFormat::MonthFirst
                }
            }
            NvId::IDLE_MODE_TIMEOUT => self.timeouts.idle = half,
            NvId::APPLICATION_MODE_TIMEOUT => self.timeouts.application = half,
            NvId::NOTIFICATION_MODE_TIMEOUT => self.timeouts.notification = half,
            NvId::SCROLL_MODE_TIMEOUT => self.timeouts.scroll = half,
            NvId::RTC_CORRECTION => {
                let max = Self::MAX_CORRECTION;
                self.correction = (value as u8 as i8).clamp(-max, max)
            }
            _ => return false,
        }
        true
    }

    /// Persists the items the menus edit in memory: link alarm, reset pin,
    /// invert and seconds, one save each.
    pub fn save_menu_items<N: NvStore>(&self, nv: &mut N) {
        save(nv, NvId::LINK_ALARM_ENABLE, self.link_alarm.into());
        save(nv, NvId::RST_NMI_CONFIG, self.rst_pin.into());
        save(nv, NvId::IDLE_BUFFER_INVERT, self.invert.into());
        save(nv, NvId::DISPLAY_SECONDS, self.seconds.into());
    }

    pub fn save_correction<N: NvStore>(&self, nv: &mut N) {
        save(nv, NvId::RTC_CORRECTION, u32::from(self.correction as u8));
    }

    /// Steps the correction by `delta`, clamped to the allowed range.
    pub fn adjust_correction(&mut self, delta: i8) {
        self.correction = self
            .correction
            .saturating_add(delta)
            .clamp(-Self::MAX_CORRECTION, Self::MAX_CORRECTION);
    }

    /// Seconds before the RTC redraw: every second while seconds are shown.
    pub fn rtc_redraw_period(&self) -> u32 {
        if self.seconds {
            1
        } else {
            60
        }
    }
}
