//! # watch-display
//!
//! The display task of the watch: it owns the per-mode button table, the
//! top-level mode and the idle page state machine, and it draws every
//! watch-controlled screen through the platform [`Renderer`](watch_platform::Renderer).
//!
//! ## Module Overview
//! - [`buttons`]    – The `(mode, button, press)` dispatch table.
//! - [`pages`]      – Button bindings of every idle page.
//! - [`mode`]       – Mode and idle page bookkeeping.
//! - [`settings`]   – Persisted display settings.
//! - [`calendar`]   – Calendar page state and date arithmetic.
//! - [`draw`]       – Screen composition.
//! - [`controller`] – The [`DisplayTask`] handler.

pub mod buttons;
pub mod calendar;
pub mod controller;
pub mod draw;
pub mod mode;
pub mod pages;
pub mod settings;

pub use buttons::{ButtonEntry, ButtonTable};
pub use calendar::{CalendarEdit, CalendarView};
pub use controller::{DisplayStatus, DisplayTask, StatusHandle};
pub use mode::{IdlePage, ModeState};
pub use settings::{DateFormat, DisplaySettings, ModeTimeouts, TimeFormat};

#[cfg(test)]
mod tests;
