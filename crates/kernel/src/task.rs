//! Task identities, the handler trait and the per-dispatch context.

use crate::error::{ConfigError, KernelError, SendError};
use crate::mailbox::Router;
use crate::message::Message;
use crate::time::{TimerId, TimerPool, TimerSetup};

/// The fixed set of tasks; one mailbox each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TaskId {
    Background = 0,
    Display = 1,
    Alarm = 2,
    /// Serial-port-profile bridge to the phone.
    Host = 3,
}

impl TaskId {
    pub const COUNT: usize = 4;
    pub const ALL: [TaskId; Self::COUNT] = [
        TaskId::Background,
        TaskId::Display,
        TaskId::Alarm,
        TaskId::Host,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Scheduling priority, higher runs first.
    pub const fn priority(self) -> u8 {
        match self {
            TaskId::Display => 4,
            TaskId::Alarm => 3,
            TaskId::Host => 2,
            TaskId::Background => 1,
        }
    }
}

/// Per-dispatch context passed to task handlers.
pub struct TaskContext<'a> {
    id: TaskId,
    router: &'a Router,
    timers: &'a TimerPool,
}

impl<'a> TaskContext<'a> {
    pub fn new(id: TaskId, router: &'a Router, timers: &'a TimerPool) -> Self {
        Self { id, router, timers }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Delivers `message` to the task that owns its kind.
    ///
    /// Failures are already logged and counted by the router; handlers carry on.
    pub fn route(&self, message: Message) {
        let _ = self.router.route(message);
    }

    pub fn send(&self, task: TaskId, message: Message) {
        let _ = self.router.send(task, message);
    }

    /// Like [`route`](Self::route) but reports the failure.
    pub fn try_route(&self, message: Message) -> Result<(), SendError> {
        self.router.route(message)
    }

    pub fn router(&self) -> &Router {
        self.router
    }

    pub fn timers(&self) -> &TimerPool {
        self.timers
    }

    pub fn allocate_timer(&self) -> Result<TimerId, ConfigError> {
        self.timers.allocate()
    }

    pub fn setup_timer(&self, id: TimerId, setup: TimerSetup) {
        if let Err(err) = self.timers.setup(id, setup) {
            log::error!("{:?}: {err}", self.id);
        }
    }

    pub fn start_timer(&self, id: TimerId) {
        if let Err(err) = self.timers.start(id) {
            log::error!("{:?}: {err}", self.id);
        }
    }

    pub fn stop_timer(&self, id: TimerId) {
        if let Err(err) = self.timers.stop(id) {
            log::error!("{:?}: {err}", self.id);
        }
    }
}

/// Trait implemented by every task.
///
/// A handler runs to completion; the only suspension point is between two
/// messages.
pub trait TaskHandler: Send + 'static {
    /// Runs once at boot, before any message is dispatched.
    fn on_start(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), KernelError> {
        Ok(())
    }

    fn on_message(&mut self, ctx: &mut TaskContext<'_>, message: Message);
}
