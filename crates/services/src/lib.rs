//! # watch-services
//!
//! The tasks that surround the display: hardware housekeeping, the alarm
//! bank and the bridge to the phone, plus [`WatchSystem`], which wires all
//! four tasks onto one kernel.
//!
//! ## Module Overview
//! - [`background`] – Battery monitor, LED, host wake-up timer, NV and hardware queries.
//! - [`alarm`]      – The alarm bank and its periodic check.
//! - [`host`]       – Frames outbound messages onto the [`HostLink`](watch_platform::HostLink).
//! - [`system`]     – Task assembly.

pub mod alarm;
pub mod background;
pub mod host;
pub mod system;

pub use alarm::{AlarmBank, AlarmTask, ALARM_PATTERN};
pub use background::BackgroundTask;
pub use host::HostBridge;
pub use system::{Collaborators, WatchSystem};

#[cfg(test)]
mod tests;
