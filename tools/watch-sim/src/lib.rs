//! Host-side simulator for the watch core.
//!
//! Assembles the full task set over the in-memory platform mocks and drives
//! it from a line-oriented script: clock ticks, button presses, raw messages,
//! RTC and radio changes. Every command produces [`Report`]s that the
//! [`ReportFormatter`] prints as coloured text or JSON lines.

mod formatter;
mod logger;
mod script;
mod session;

pub use formatter::ReportFormatter;
pub use logger::ColorLogger;
pub use script::{parse_line, Command, ScriptError};
pub use session::{MailboxReport, Report, Simulator};
