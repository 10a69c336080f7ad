//! # watch-kernel
//!
//! The message-passing core of the watch firmware: a closed set of messages,
//! one bounded mailbox per task, a shared pool of message buffers, a table of
//! one-second timers and a cooperative scheduler that runs each handler to
//! completion.
//!
//! ## Module Overview
//! - [`message`] – Message kinds, typed options and payload validation.
//! - [`input`]   – Buttons, press kinds and dispatch table addresses.
//! - [`pool`]    – Message buffer pool with RAII leases.
//! - [`mailbox`] – Per-task mailboxes and the [`Router`].
//! - [`time`]    – The one-second [`TimerPool`].
//! - [`task`]    – Task identities and the [`TaskHandler`] trait.
//! - [`kernel`]  – Priority dispatch loop.
//!
//! Everything reachable from interrupt context (routing, timer ticks) goes
//! through short `critical_section` sections and never blocks.

#[macro_use]
mod macros;

pub mod error;
pub mod input;
pub mod kernel;
pub mod mailbox;
pub mod message;
pub mod pool;
pub mod sync;
pub mod task;
pub mod time;

pub use error::{ConfigError, KernelError, MessageError, SendError};
pub use input::{Button, ButtonAction, ButtonEvent, ButtonKey, ButtonMode, PressKind};
pub use kernel::{Kernel, KernelBuilder, KernelConfig, KernelConfigBuilder};
pub use mailbox::{Envelope, Mailbox, MailboxStats, Router, RouterBuilder, MAILBOX_CAPACITY};
pub use message::{Message, MessageKind, MAX_PAYLOAD};
pub use pool::{BufferPool, Lease, PoolStats};
pub use task::{TaskContext, TaskHandler, TaskId};
pub use time::{Repeat, TimerId, TimerPool, TimerSetup, MAX_TIMERS};

#[cfg(test)]
mod tests;
