mod buttons;
mod controller;
mod pages;

use watch_kernel::input::{Button, ButtonEvent, PressKind};
use watch_kernel::mailbox::Router;
use watch_kernel::message::Message;
use watch_kernel::pool::BufferPool;
use watch_kernel::task::{TaskContext, TaskHandler, TaskId};
use watch_kernel::time::TimerPool;
use watch_platform::mocks::{FakeHardware, MemoryNvStore, RecordingRenderer};

use crate::controller::DisplayTask;

pub(crate) type MockDisplay = DisplayTask<MemoryNvStore, RecordingRenderer, FakeHardware>;

/// Runs the display task against a real router and timer pool, looping its
/// own messages back and collecting everything routed elsewhere.
pub(crate) struct Harness {
    router: Router,
    timers: TimerPool,
    pub task: MockDisplay,
    pub nv: MemoryNvStore,
    pub renderer: RecordingRenderer,
    pub hardware: FakeHardware,
    outbox: Vec<(TaskId, Message)>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_nv(MemoryNvStore::new())
    }

    pub fn with_nv(nv: MemoryNvStore) -> Self {
        let hardware = FakeHardware::new();
        Self::with_parts(nv, hardware)
    }

    pub fn with_parts(nv: MemoryNvStore, hardware: FakeHardware) -> Self {
        let mut router = Router::builder(BufferPool::new(32));
        for task in TaskId::ALL {
            router.create_mailbox(task, 8).unwrap();
        }
        let renderer = RecordingRenderer::new();
        Self {
            router: router.build(),
            timers: TimerPool::new(16),
            task: DisplayTask::new(nv.clone(), renderer.clone(), hardware.clone()),
            nv,
            renderer,
            hardware,
            outbox: Vec::new(),
        }
    }

    /// Boots the task and lets the splash screen time out.
    pub fn booted() -> Self {
        let mut harness = Self::new();
        harness.start();
        harness.tick(3);
        harness.take_sent();
        harness
    }

    pub fn start(&mut self) {
        let mut ctx = TaskContext::new(TaskId::Display, &self.router, &self.timers);
        self.task.on_start(&mut ctx).unwrap();
        self.pump();
    }

    pub fn deliver(&mut self, message: Message) {
        let mut ctx = TaskContext::new(TaskId::Display, &self.router, &self.timers);
        self.task.on_message(&mut ctx, message);
        self.pump();
    }

    pub fn press(&mut self, button: Button, press: PressKind) {
        self.deliver(Message::ButtonEvent(ButtonEvent::new(button, press)));
    }

    pub fn tick(&mut self, seconds: u32) {
        for _ in 0..seconds {
            self.timers.tick(&self.router);
            self.pump();
        }
    }

    fn pump(&mut self) {
        loop {
            for task in [TaskId::Background, TaskId::Alarm, TaskId::Host] {
                while let Ok(envelope) = self.router.receive(task) {
                    self.outbox.push((task, envelope.into_message()));
                }
            }
            let Ok(envelope) = self.router.receive(TaskId::Display) else {
                break;
            };
            let mut ctx = TaskContext::new(TaskId::Display, &self.router, &self.timers);
            self.task.on_message(&mut ctx, envelope.into_message());
        }
    }

    /// Messages routed to the other tasks since the last call.
    pub fn take_sent(&mut self) -> Vec<Message> {
        self.outbox.drain(..).map(|(_, message)| message).collect()
    }

    pub fn sent_to(&self, task: TaskId) -> Vec<Message> {
        self.outbox
            .iter()
            .filter(|(to, _)| *to == task)
            .map(|(_, message)| message.clone())
            .collect()
    }
}
