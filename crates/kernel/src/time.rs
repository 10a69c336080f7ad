//! One-second software timers.
//!
//! Timers are allocated once at task start and then re-armed for the rest of
//! the process lifetime. [`TimerPool::tick`] runs from the 1 Hz clock
//! interrupt: it scans the fixed table once, never allocates, and only touches
//! shared state through the mailboxes.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;

use crate::error::ConfigError;
use crate::mailbox::Router;
use crate::message::Message;
use crate::task::TaskId;

/// Compiled-in size of the timer table.
pub const MAX_TIMERS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId(u8);

impl TimerId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Repeat {
    Once,
    Forever,
}

/// What a timer delivers, to whom, and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSetup {
    /// Seconds between start (or reload) and expiry.
    pub period: u32,
    pub repeat: Repeat,
    pub target: TaskId,
    pub message: Message,
}

impl TimerSetup {
    pub fn once(period: u32, target: TaskId, message: Message) -> Self {
        Self {
            period,
            repeat: Repeat::Once,
            target,
            message,
        }
    }

    pub fn forever(period: u32, target: TaskId, message: Message) -> Self {
        Self {
            period,
            repeat: Repeat::Forever,
            target,
            message,
        }
    }
}

#[derive(Default)]
struct TimerSlot {
    allocated: bool,
    setup: Option<TimerSetup>,
    remaining: u32,
    armed: bool,
}

impl TimerSlot {
    fn poll(&mut self) -> Option<(TaskId, Message)> {
        if !self.armed {
            return None;
        }
        let setup = self.setup.as_ref()?;

        if self.remaining > 0 {
            self.remaining -= 1;
        }
        if self.remaining > 0 {
            return None;
        }

        match setup.repeat {
            Repeat::Forever => self.remaining = setup.period,
            Repeat::Once => self.armed = false,
        }
        Some((setup.target, setup.message.clone()))
    }
}

struct TimerTable {
    slots: [TimerSlot; MAX_TIMERS],
    allocated: usize,
    send_failures: u32,
}

/// Fixed-capacity pool of one-second timers.
pub struct TimerPool {
    capacity: usize,
    table: Mutex<RefCell<TimerTable>>,
}

impl TimerPool {
    /// Creates a pool of `capacity` timers (at most [`MAX_TIMERS`]).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.min(MAX_TIMERS),
            table: Mutex::new(RefCell::new(TimerTable {
                slots: core::array::from_fn(|_| TimerSlot::default()),
                allocated: 0,
                send_failures: 0,
            })),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reserves one timer. Running out is a build misconfiguration.
    pub fn allocate(&self) -> Result<TimerId, ConfigError> {
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            if table.allocated >= self.capacity {
                return Err(ConfigError::TimerPoolExhausted {
                    capacity: self.capacity,
                });
            }
            let index = table.allocated;
            table.allocated += 1;
            table.slots[index].allocated = true;
            Ok(TimerId(index as u8))
        })
    }

    /// Replaces the configuration without arming. An armed timer keeps its
    /// current countdown; the new period applies from the next reload or start.
    pub fn setup(&self, id: TimerId, setup: TimerSetup) -> Result<(), ConfigError> {
        self.with_slot(id, |slot| {
            slot.setup = Some(setup);
            Ok(())
        })
    }

    /// Arms the timer with a full period.
    pub fn start(&self, id: TimerId) -> Result<(), ConfigError> {
        self.with_slot(id, |slot| {
            let period = slot
                .setup
                .as_ref()
                .map(|setup| setup.period)
                .ok_or(ConfigError::UnconfiguredTimer(id))?;
            slot.remaining = period;
            slot.armed = true;
            Ok(())
        })
    }

    /// Disarms the timer, keeping its configuration.
    pub fn stop(&self, id: TimerId) -> Result<(), ConfigError> {
        self.with_slot(id, |slot| {
            slot.armed = false;
            Ok(())
        })
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.with_slot(id, |slot| Ok(slot.armed)).unwrap_or(false)
    }

    pub fn remaining(&self, id: TimerId) -> Option<u32> {
        self.with_slot(id, |slot| Ok(slot.armed.then_some(slot.remaining)))
            .ok()
            .flatten()
    }

    pub fn allocated(&self) -> usize {
        critical_section::with(|cs| self.table.borrow_ref(cs).allocated)
    }

    /// Messages lost because the target mailbox refused them.
    pub fn send_failures(&self) -> u32 {
        critical_section::with(|cs| self.table.borrow_ref(cs).send_failures)
    }

    /// Advances every armed timer by one second and delivers the expiries.
    ///
    /// Returns the number of timers that fired.
    pub fn tick(&self, router: &Router) -> usize {
        let mut expired: Vec<(TaskId, Message), MAX_TIMERS> = Vec::new();
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            for slot in table.slots.iter_mut().take(self.capacity) {
                if let Some(fired) = slot.poll() {
                    // One entry per slot, so this never overflows.
                    let _ = expired.push(fired);
                }
            }
        });

        let fired = expired.len();
        let mut failures = 0;
        for (target, message) in expired {
            log::trace!("timer expired: {:?} -> {target:?}", message.kind());
            if router.send(target, message).is_err() {
                failures += 1;
            }
        }
        if failures > 0 {
            critical_section::with(|cs| self.table.borrow_ref_mut(cs).send_failures += failures);
        }
        fired
    }

    fn with_slot<R>(
        &self,
        id: TimerId,
        f: impl FnOnce(&mut TimerSlot) -> Result<R, ConfigError>,
    ) -> Result<R, ConfigError> {
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            match table.slots.get_mut(id.index()) {
                Some(slot) if slot.allocated => f(slot),
                _ => Err(ConfigError::UnknownTimer(id)),
            }
        })
    }
}
