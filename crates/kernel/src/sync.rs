//! Platform abstraction for synchronization primitives.
//!
//! Task objects are locked only while one of their handlers runs. With the
//! default features the lock is `parking_lot::Mutex`; the `lock-free` feature
//! switches to `spin::Mutex` for targets without an OS.

pub use std::sync::Arc;

#[cfg(not(feature = "lock-free"))]
pub type MutexGuard<'a, T> = parking_lot::MutexGuard<'a, T>;
#[cfg(feature = "lock-free")]
pub type MutexGuard<'a, T> = spin::MutexGuard<'a, T>;

/// Platform-agnostic mutex wrapper.
pub struct Mutex<T: ?Sized> {
    #[cfg(not(feature = "lock-free"))]
    inner: parking_lot::Mutex<T>,
    #[cfg(feature = "lock-free")]
    inner: spin::Mutex<T>,
}

impl<T> Mutex<T> {
    /// Creates a new mutex protecting the given value.
    pub fn new(value: T) -> Self {
        Self {
            #[cfg(not(feature = "lock-free"))]
            inner: parking_lot::Mutex::new(value),
            #[cfg(feature = "lock-free")]
            inner: spin::Mutex::new(value),
        }
    }
}

impl<T: Default> Default for Mutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> Mutex<T> {
    /// Acquires the mutex, spinning or parking until it becomes available.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }
}
