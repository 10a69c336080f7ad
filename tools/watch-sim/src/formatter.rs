//! Report output as coloured text or JSON lines.

use colored::Colorize;
use serde_json::json;

use crate::session::Report;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

pub struct ReportFormatter {
    json_format: bool,
}

impl ReportFormatter {
    pub fn new(json_format: bool) -> Self {
        Self { json_format }
    }

    pub fn format(&self, line: usize, report: &Report) -> String {
        if self.json_format {
            self.format_json(line, report)
        } else {
            self.format_text(report)
        }
    }

    fn format_json(&self, line: usize, report: &Report) -> String {
        match serde_json::to_value(report) {
            Ok(value) => json!({ "line": line, "report": value }).to_string(),
            Err(err) => json!({ "line": line, "error": err.to_string() }).to_string(),
        }
    }

    fn format_text(&self, report: &Report) -> String {
        match report {
            Report::Tick { elapsed, fired } => format!(
                "{} t={}s fired={}",
                "tick ".bright_black(),
                elapsed,
                fired
            ),
            Report::Frame(frame) => format!(
                "{} kind={:#04x} options={:#04x} payload=[{}]",
                "host ".bright_blue(),
                frame.kind,
                frame.options,
                hex(&frame.payload)
            ),
            Report::Render {
                presents,
                images,
                texts,
            } => {
                let mut out = format!("{} presents={presents}", "lcd  ".bright_green());
                if !images.is_empty() {
                    out.push_str(&format!(" images={images:?}"));
                }
                if !texts.is_empty() {
                    out.push_str(&format!(" text={texts:?}"));
                }
                out
            }
            Report::Vibrate { count } => format!("{} patterns={count}", "buzz ".bright_magenta()),
            Report::State {
                elapsed,
                rtc,
                display,
            } => format!(
                "{} t={}s {:04}-{:02}-{:02} {:02}:{:02}:{:02} mode={:?} last={:?} page={:?} buttons={:?}",
                "state".bright_cyan(),
                elapsed,
                rtc.year,
                rtc.month,
                rtc.day,
                rtc.hour,
                rtc.minute,
                rtc.second,
                display.mode.current,
                display.mode.last,
                display.mode.page,
                display.mode.button_mode()
            ),
            Report::Stats {
                pool,
                timers_allocated,
                timer_send_failures,
                mailboxes,
            } => {
                let mut out = format!(
                    "{} pool used={} free={}/{} min_free={} failed={} timers={} timer_drops={}",
                    "stats".bright_yellow(),
                    pool.used,
                    pool.free,
                    pool.total,
                    pool.min_free,
                    pool.failed,
                    timers_allocated,
                    timer_send_failures
                );
                for mailbox in mailboxes {
                    out.push_str(&format!(
                        "\n      {:?}: pending={} enqueued={} dropped={} high_water={}",
                        mailbox.task,
                        mailbox.pending,
                        mailbox.stats.enqueued,
                        mailbox.stats.dropped,
                        mailbox.stats.high_water
                    ));
                }
                out
            }
            Report::Dropped { reason } => format!("{} {}", "drop ".red().bold(), reason),
        }
    }
}
