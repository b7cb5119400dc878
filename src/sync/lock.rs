/*!
 * Mutual Exclusion Lock
 *
 * Thin data-carrying wrapper over `parking_lot::Mutex` with scoped
 * acquisition. The guard releases on every exit path (normal return,
 * early return, panic), so there is no manual `release` to forget.
 */

use parking_lot::Mutex;

/// RAII guard for a held [`Lock`]
pub type LockGuard<'a, T> = parking_lot::MutexGuard<'a, T>;

/// Exclusive lock protecting a value
///
/// Critical sections in this crate are short and non-nesting: the lock is
/// never held across a blocking wait. Construction cannot fail.
pub struct Lock<T> {
    inner: Mutex<T>,
}

impl<T> Lock<T> {
    /// Create a new lock owning `value`
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Block until exclusive ownership is obtained
    #[inline]
    pub fn lock(&self) -> LockGuard<'_, T> {
        self.inner.lock()
    }

    /// Acquire without blocking; `None` if the lock is contended
    #[inline]
    pub fn try_lock(&self) -> Option<LockGuard<'_, T>> {
        self.inner.try_lock()
    }

    /// Consume the lock and return the protected value
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: Default> Default for Lock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_scoped_release() {
        let lock = Lock::new(0u32);
        {
            let mut guard = lock.lock();
            *guard += 1;
        }
        // Guard dropped - lock must be free again
        assert_eq!(*lock.lock(), 1);
    }

    #[test]
    fn test_try_lock_contended() {
        let lock = Lock::new(());
        let held = lock.lock();
        assert!(lock.try_lock().is_none());
        drop(held);
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn test_mutual_exclusion() {
        let lock = Arc::new(Lock::new(0u64));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = lock.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        *lock.lock() += 1;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*lock.lock(), 8000);
    }
}
