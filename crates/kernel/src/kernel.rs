//! Cooperative priority kernel.
//!
//! Each registered task owns one mailbox. [`Kernel::dispatch_once`] picks the
//! highest-priority task with a pending message and runs exactly one handler to
//! completion; the message buffer is released as soon as the handler returns.

use crate::error::{ConfigError, KernelError, SendError};
use crate::input::{Button, ButtonEvent, PressKind};
use crate::mailbox::{Router, MAILBOX_CAPACITY};
use crate::message::Message;
use crate::pool::{BufferPool, PoolStats};
use crate::sync::Mutex;
use crate::task::{TaskContext, TaskHandler, TaskId};
use crate::time::{TimerPool, MAX_TIMERS};

/// Kernel sizing and hooks.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    pub name: &'static str,
    /// Queue depth of every mailbox, at most [`MAILBOX_CAPACITY`].
    pub mailbox_capacity: usize,
    /// Messages that may be in flight across all mailboxes.
    pub message_buffers: usize,
    /// Timers available to `allocate`, at most [`MAX_TIMERS`].
    pub timer_count: usize,
    /// Called whenever `run_until_idle` drains every mailbox.
    pub idle_callback: Option<fn()>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: "watch",
            mailbox_capacity: MAILBOX_CAPACITY,
            message_buffers: 20,
            timer_count: MAX_TIMERS,
            idle_callback: None,
        }
    }
}

impl KernelConfig {
    /// Creates a new kernel configuration builder.
    pub fn builder() -> KernelConfigBuilder {
        KernelConfigBuilder::default()
    }
}

/// Builder for ergonomic kernel configuration construction.
#[derive(Debug, Clone, Default)]
pub struct KernelConfigBuilder {
    config: KernelConfig,
}

impl KernelConfigBuilder {
    /// Sets the kernel name.
    pub fn name(mut self, name: &'static str) -> Self {
        self.config.name = name;
        self
    }

    /// Sets the queue depth of every mailbox.
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.config.mailbox_capacity = capacity;
        self
    }

    /// Sets the number of shared message buffers.
    pub fn message_buffers(mut self, count: usize) -> Self {
        self.config.message_buffers = count;
        self
    }

    /// Sets the number of one-second timers.
    pub fn timer_count(mut self, count: usize) -> Self {
        self.config.timer_count = count;
        self
    }

    /// Sets the idle callback function.
    pub fn idle_callback(mut self, callback: fn()) -> Self {
        self.config.idle_callback = Some(callback);
        self
    }

    /// Builds the kernel configuration.
    pub fn build(self) -> KernelConfig {
        self.config
    }
}

struct TaskSlot {
    id: TaskId,
    handler: Mutex<Box<dyn TaskHandler>>,
}

pub struct KernelBuilder {
    config: KernelConfig,
    tasks: Vec<TaskSlot>,
    error: Option<ConfigError>,
}

impl KernelBuilder {
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            tasks: Vec::new(),
            error: None,
        }
    }

    pub fn register(mut self, id: TaskId, handler: impl TaskHandler) -> Self {
        if self.tasks.iter().any(|task| task.id == id) {
            self.error.get_or_insert(ConfigError::DuplicateTask(id));
        } else {
            self.tasks.push(TaskSlot {
                id,
                handler: Mutex::new(Box::new(handler)),
            });
        }
        self
    }

    /// Creates one mailbox per registered task.
    pub fn build(mut self) -> Result<Kernel, KernelError> {
        if let Some(err) = self.error {
            return Err(err.into());
        }
        self.tasks
            .sort_by_key(|task| core::cmp::Reverse(task.id.priority()));

        let pool = BufferPool::new(self.config.message_buffers);
        let mut router = Router::builder(pool);
        for task in &self.tasks {
            router.create_mailbox(task.id, self.config.mailbox_capacity)?;
        }

        Ok(Kernel {
            timers: TimerPool::new(self.config.timer_count),
            router: router.build(),
            tasks: self.tasks,
            config: self.config,
        })
    }
}

pub struct Kernel {
    config: KernelConfig,
    /// Sorted by descending priority.
    tasks: Vec<TaskSlot>,
    router: Router,
    timers: TimerPool,
}

impl Kernel {
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new(KernelConfig::default())
    }

    pub fn with_config(config: KernelConfig) -> KernelBuilder {
        KernelBuilder::new(config)
    }

    /// Runs every task's `on_start`, highest priority first.
    ///
    /// An error here is a configuration fault; the caller should halt.
    pub fn start(&self) -> Result<(), KernelError> {
        log::info!("{}: starting {} tasks", self.config.name, self.tasks.len());
        for task in &self.tasks {
            let mut ctx = TaskContext::new(task.id, &self.router, &self.timers);
            task.handler.lock().on_start(&mut ctx)?;
        }
        Ok(())
    }

    /// Dispatches one message; returns `false` when every mailbox is empty.
    pub fn dispatch_once(&self) -> bool {
        let Some(task) = self
            .tasks
            .iter()
            .find(|task| self.router.has_pending(task.id))
        else {
            return false;
        };
        let Ok(envelope) = self.router.receive(task.id) else {
            return false;
        };

        let (message, lease) = envelope.into_parts();
        let mut ctx = TaskContext::new(task.id, &self.router, &self.timers);
        task.handler.lock().on_message(&mut ctx, message);
        drop(lease);
        true
    }

    pub fn run_until_idle(&self) {
        while self.dispatch_once() {}
        if let Some(idle_cb) = self.config.idle_callback {
            idle_cb();
        }
    }

    /// 1 Hz clock entry point.
    pub fn tick(&self) -> usize {
        self.timers.tick(&self.router)
    }

    /// Routes `message` to its owner; safe from interrupt context.
    pub fn route(&self, message: Message) -> Result<(), SendError> {
        self.router.route(message)
    }

    pub fn send(&self, task: TaskId, message: Message) -> Result<(), SendError> {
        self.router.send(task, message)
    }

    /// Button interrupt entry point: hands the raw event to the display task.
    pub fn post_button(&self, button: Button, press: PressKind) -> Result<(), SendError> {
        self.router
            .route(Message::ButtonEvent(ButtonEvent::new(button, press)))
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn timers(&self) -> &TimerPool {
        &self.timers
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.router.pool().stats()
    }

    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().map(|task| task.id)
    }
}
