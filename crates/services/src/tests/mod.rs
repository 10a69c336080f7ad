mod host;

use watch_kernel::mailbox::Router;
use watch_kernel::message::Message;
use watch_kernel::pool::BufferPool;
use watch_kernel::task::{TaskContext, TaskHandler, TaskId};
use watch_kernel::time::TimerPool;

/// Drives one task by hand; messages for other tasks are collected.
pub(crate) struct TaskHarness<T> {
    id: TaskId,
    router: Router,
    timers: TimerPool,
    pub task: T,
    outbox: Vec<(TaskId, Message)>,
}

impl<T: TaskHandler> TaskHarness<T> {
    pub fn start(id: TaskId, task: T) -> Self {
        let mut router = Router::builder(BufferPool::new(32));
        for task in TaskId::ALL {
            router.create_mailbox(task, 8).unwrap();
        }
        let mut harness = Self {
            id,
            router: router.build(),
            timers: TimerPool::new(16),
            task,
            outbox: Vec::new(),
        };
        let mut ctx = TaskContext::new(id, &harness.router, &harness.timers);
        harness.task.on_start(&mut ctx).unwrap();
        harness.pump();
        harness
    }

    pub fn deliver(&mut self, message: Message) {
        let mut ctx = TaskContext::new(self.id, &self.router, &self.timers);
        self.task.on_message(&mut ctx, message);
        self.pump();
    }

    pub fn tick(&mut self, seconds: u32) {
        for _ in 0..seconds {
            self.timers.tick(&self.router);
            self.pump();
        }
    }

    fn pump(&mut self) {
        loop {
            for task in TaskId::ALL {
                if task == self.id {
                    continue;
                }
                while let Ok(envelope) = self.router.receive(task) {
                    self.outbox.push((task, envelope.into_message()));
                }
            }
            let Ok(envelope) = self.router.receive(self.id) else {
                break;
            };
            let mut ctx = TaskContext::new(self.id, &self.router, &self.timers);
            self.task.on_message(&mut ctx, envelope.into_message());
        }
    }

    pub fn take_sent(&mut self) -> Vec<(TaskId, Message)> {
        std::mem::take(&mut self.outbox)
    }

    pub fn take_messages(&mut self) -> Vec<Message> {
        self.take_sent().into_iter().map(|(_, message)| message).collect()
    }

    /// Messages queued for one task; order across tasks is not kept.
    pub fn sent_to(&self, task: TaskId) -> Vec<Message> {
        self.outbox
            .iter()
            .filter(|(to, _)| *to == task)
            .map(|(_, message)| message.clone())
            .collect()
    }
}
