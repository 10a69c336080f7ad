//! # watch-platform
//!
//! Interfaces to everything the watch core treats as a black box: the
//! non-volatile key/value store, the frame-buffer renderer, hardware status
//! queries and commands, and the radio link to the paired phone.
//!
//! ## Module Overview
//! - [`rtc`]      – Real-time clock value type and its host wire layout.
//! - [`nv`]       – Non-volatile item identifiers and the [`NvStore`] trait.
//! - [`render`]   – Named images, fonts and the [`Renderer`] trait.
//! - [`hardware`] – Battery/radio status, vibration patterns and the [`Hardware`] trait.
//! - [`host`]     – The [`HostLink`] transport to the phone.
//! - `mocks`      – In-memory implementations for tests and the simulator
//!   (`mocks` feature).

pub mod hardware;
pub mod host;
pub mod nv;
pub mod render;
pub mod rtc;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use hardware::{BatteryStatus, Hardware, RadioState, RadioStatus, VibratePattern};
pub use host::{HostLink, LinkError, PairingOp};
pub use nv::{NvError, NvId, NvStore};
pub use render::{Font, Image, Renderer, TextStyle};
pub use rtc::RtcTime;
