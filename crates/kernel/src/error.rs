//! Error taxonomy of the kernel.
//!
//! Configuration errors are fatal at boot. Send errors are recoverable and are
//! logged where they happen. Message errors reject raw input that does not map
//! onto the closed message set.

use thiserror::Error;

use crate::message::MessageKind;
use crate::task::TaskId;
use crate::time::TimerId;

/// Build misconfiguration detected while wiring tasks, mailboxes and timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A mailbox was created twice for the same task.
    #[error("mailbox for {0:?} created twice")]
    DuplicateMailbox(TaskId),
    /// Requested capacity exceeds the compiled-in queue storage.
    #[error("mailbox capacity {requested} exceeds {max}")]
    MailboxTooLarge { requested: usize, max: usize },
    /// A task handler was registered twice.
    #[error("task {0:?} registered twice")]
    DuplicateTask(TaskId),
    /// More timers were requested than the pool holds.
    #[error("timer pool exhausted ({capacity} timers)")]
    TimerPoolExhausted { capacity: usize },
    /// The id does not belong to an allocated timer.
    #[error("timer {0:?} was never allocated")]
    UnknownTimer(TimerId),
    /// The timer was started before `setup`.
    #[error("timer {0:?} started before setup")]
    UnconfiguredTimer(TimerId),
}

/// Delivery failure. The message is dropped; the sender never blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("mailbox of {0:?} is full")]
    QueueFull(TaskId),
    #[error("no free message buffer")]
    NoBuffer,
    #[error("{0:?} has no mailbox")]
    NoMailbox(TaskId),
}

/// Raw `(kind, options, payload)` input that is not a valid message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("unknown message kind {0:#04x}")]
    UnknownKind(u8),
    #[error("invalid option {value:#04x} for {kind:?}")]
    InvalidOption { kind: MessageKind, value: u8 },
    #[error("{kind:?} needs {expected} payload bytes, got {actual}")]
    PayloadTooShort {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },
    #[error("payload of {0} bytes exceeds the buffer")]
    PayloadTooLong(usize),
    #[error("payload of {0:?} holds out-of-range fields")]
    InvalidPayload(MessageKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Message(#[from] MessageError),
}
