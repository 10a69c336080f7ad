//! Shared pool of message buffers.
//!
//! Every message in flight holds one [`Lease`]. The lease travels inside the
//! [`Envelope`](crate::mailbox::Envelope) and goes back to the pool when the
//! envelope is dropped, which the kernel does right after the handler returns.

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;

use crate::sync::Arc;

/// Pool usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PoolStats {
    pub total: usize,
    pub free: usize,
    pub used: usize,
    /// Lowest `free` ever observed.
    pub min_free: usize,
    /// Acquisitions refused because the pool was empty.
    pub failed: usize,
}

impl PoolStats {
    const fn new(total: usize) -> Self {
        Self {
            total,
            free: total,
            used: 0,
            min_free: total,
            failed: 0,
        }
    }

    fn on_acquire(&mut self) {
        self.free -= 1;
        self.used += 1;
        if self.free < self.min_free {
            self.min_free = self.free;
        }
    }

    fn on_release(&mut self) {
        self.free += 1;
        self.used -= 1;
    }
}

struct PoolInner {
    stats: Mutex<RefCell<PoolStats>>,
}

/// Fixed number of message buffers shared by all mailboxes.
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

impl BufferPool {
    pub fn new(total: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                stats: Mutex::new(RefCell::new(PoolStats::new(total))),
            }),
        }
    }

    /// Takes one buffer, or `None` if all are in flight. Never blocks.
    pub fn acquire(&self) -> Option<Lease> {
        critical_section::with(|cs| {
            let mut stats = self.inner.stats.borrow_ref_mut(cs);
            if stats.free == 0 {
                stats.failed += 1;
                None
            } else {
                stats.on_acquire();
                Some(Lease {
                    pool: Arc::clone(&self.inner),
                })
            }
        })
    }

    pub fn stats(&self) -> PoolStats {
        critical_section::with(|cs| *self.inner.stats.borrow_ref(cs))
    }
}

/// Ownership of one pool buffer; released on drop.
pub struct Lease {
    pool: Arc<PoolInner>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        critical_section::with(|cs| self.pool.stats.borrow_ref_mut(cs).on_release());
    }
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lease")
    }
}
