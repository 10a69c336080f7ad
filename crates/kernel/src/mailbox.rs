//! Per-task mailboxes and the router that feeds them.
//!
//! Senders may run in interrupt context (timer tick, button and radio ISRs),
//! so every enqueue is a short critical section that never blocks: a full
//! mailbox or an empty buffer pool drops the message and counts the drop.

use core::cell::RefCell;
use core::convert::Infallible;

use critical_section::Mutex;
use heapless::Deque;

use crate::error::{ConfigError, SendError};
use crate::message::Message;
use crate::pool::{BufferPool, Lease};
use crate::task::TaskId;

/// Compiled-in queue storage per mailbox.
pub const MAILBOX_CAPACITY: usize = 8;

/// A message together with the buffer it occupies.
#[derive(Debug)]
pub struct Envelope {
    message: Message,
    lease: Lease,
}

impl Envelope {
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Splits the envelope. The buffer stays taken until the lease is dropped.
    pub fn into_parts(self) -> (Message, Lease) {
        (self.message, self.lease)
    }

    pub fn into_message(self) -> Message {
        self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MailboxStats {
    pub enqueued: u32,
    pub dropped: u32,
    pub high_water: usize,
}

struct MailboxState {
    queue: Deque<Envelope, MAILBOX_CAPACITY>,
    stats: MailboxStats,
}

/// Bounded FIFO inbox of one task.
pub struct Mailbox {
    id: TaskId,
    capacity: usize,
    state: Mutex<RefCell<MailboxState>>,
}

impl Mailbox {
    fn new(id: TaskId, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            state: Mutex::new(RefCell::new(MailboxState {
                queue: Deque::new(),
                stats: MailboxStats::default(),
            })),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn push(&self, envelope: Envelope) -> Result<(), Envelope> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.queue.len() >= self.capacity {
                state.stats.dropped += 1;
                return Err(envelope);
            }
            state.queue.push_back(envelope)?;
            state.stats.enqueued += 1;
            let len = state.queue.len();
            if len > state.stats.high_water {
                state.stats.high_water = len;
            }
            Ok(())
        })
    }

    /// Dequeues the oldest message without blocking.
    pub fn try_receive(&self) -> nb::Result<Envelope, Infallible> {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).queue.pop_front())
            .ok_or(nb::Error::WouldBlock)
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.state.borrow_ref(cs).queue.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> MailboxStats {
        critical_section::with(|cs| self.state.borrow_ref(cs).stats)
    }
}

/// Collects mailbox creation at startup.
pub struct RouterBuilder {
    pool: BufferPool,
    mailboxes: [Option<Mailbox>; TaskId::COUNT],
}

impl RouterBuilder {
    pub fn new(pool: BufferPool) -> Self {
        Self {
            pool,
            mailboxes: [None, None, None, None],
        }
    }

    /// Creates the mailbox of `task`. A second call for the same task is a
    /// configuration error.
    pub fn create_mailbox(&mut self, task: TaskId, capacity: usize) -> Result<(), ConfigError> {
        if capacity > MAILBOX_CAPACITY {
            return Err(ConfigError::MailboxTooLarge {
                requested: capacity,
                max: MAILBOX_CAPACITY,
            });
        }
        let slot = &mut self.mailboxes[task.index()];
        if slot.is_some() {
            return Err(ConfigError::DuplicateMailbox(task));
        }
        *slot = Some(Mailbox::new(task, capacity));
        Ok(())
    }

    pub fn build(self) -> Router {
        Router {
            pool: self.pool,
            mailboxes: self.mailboxes,
        }
    }
}

/// Delivers messages to task mailboxes.
pub struct Router {
    pool: BufferPool,
    mailboxes: [Option<Mailbox>; TaskId::COUNT],
}

impl Router {
    pub fn builder(pool: BufferPool) -> RouterBuilder {
        RouterBuilder::new(pool)
    }

    /// Enqueues `message` on the mailbox of `task`.
    ///
    /// Never blocks. On failure the message is dropped, the drop is counted and
    /// logged, and the error is returned for callers that care.
    pub fn send(&self, task: TaskId, message: Message) -> Result<(), SendError> {
        let Some(mailbox) = self.mailbox(task) else {
            log::warn!("dropping {:?}: {task:?} has no mailbox", message.kind());
            return Err(SendError::NoMailbox(task));
        };
        let Some(lease) = self.pool.acquire() else {
            log::warn!("dropping {:?}: message pool empty", message.kind());
            return Err(SendError::NoBuffer);
        };
        match mailbox.push(Envelope { message, lease }) {
            Ok(()) => Ok(()),
            Err(envelope) => {
                log::warn!(
                    "dropping {:?}: mailbox of {task:?} is full",
                    envelope.message.kind()
                );
                Err(SendError::QueueFull(task))
            }
        }
    }

    /// Sends `message` to the task owning its kind.
    pub fn route(&self, message: Message) -> Result<(), SendError> {
        let owner = message.kind().owner();
        self.send(owner, message)
    }

    /// Non-blocking receive; wrap in `nb::block!` to wait.
    pub fn receive(&self, task: TaskId) -> nb::Result<Envelope, Infallible> {
        match self.mailbox(task) {
            Some(mailbox) => mailbox.try_receive(),
            None => Err(nb::Error::WouldBlock),
        }
    }

    pub fn has_pending(&self, task: TaskId) -> bool {
        self.mailbox(task).is_some_and(|mailbox| !mailbox.is_empty())
    }

    pub fn mailbox(&self, task: TaskId) -> Option<&Mailbox> {
        self.mailboxes[task.index()].as_ref()
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }
}
