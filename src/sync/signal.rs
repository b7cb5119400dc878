/*!
 * Waitable Signal
 *
 * A settable boolean condition that threads can block on, with an explicit
 * reset policy chosen at construction:
 * - **Auto**: a set releases exactly one pending or future waiter and the
 *   condition clears atomically with the release
 * - **Manual**: the condition stays set until `clear()`; every waiter
 *   observes it (used here for one-shot, write-once stop flags)
 *
 * # Multi-object waits
 *
 * A `set()` also marks every wait-set hub registered with this signal as
 * pending and broadcasts on it, so a [`WaitSet`](super::WaitSet) blocked on
 * several signals wakes without any per-platform multi-wait primitive (and
 * without its capacity ceiling).
 *
 * Signals are cheap to clone; clones share the same underlying condition.
 * The last clone dropped releases the condition, so callers must not let a
 * signal outlive all potential waiters' wait calls.
 */

use parking_lot::{Condvar, Mutex};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// Reset policy applied when a waiter observes the signal set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// One waiter is released per set; the condition clears on release
    Auto,
    /// The condition stays set until explicitly cleared
    Manual,
}

/// Rendezvous point shared between one wait-set waiter and the signals it
/// watches. `pending` absorbs sets that race ahead of the waiter's poll.
pub(super) struct WaitHub {
    pub(super) pending: Mutex<bool>,
    pub(super) condvar: Condvar,
}

impl WaitHub {
    pub(super) fn new() -> Self {
        Self {
            pending: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    fn notify(&self) {
        *self.pending.lock() = true;
        self.condvar.notify_all();
    }
}

struct SignalState {
    set: bool,
    /// Wait-set hubs to wake on set; dead entries are pruned on register
    hubs: Vec<Weak<WaitHub>>,
}

struct SignalInner {
    state: Mutex<SignalState>,
    condvar: Condvar,
    mode: ResetMode,
}

/// Waitable boolean condition (see module docs)
#[derive(Clone)]
pub struct Signal {
    inner: Arc<SignalInner>,
}

impl Signal {
    /// Create an unset signal with the given reset policy
    pub fn new(mode: ResetMode) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                state: Mutex::new(SignalState {
                    set: false,
                    hubs: Vec::new(),
                }),
                condvar: Condvar::new(),
                mode,
            }),
        }
    }

    /// Reset policy this signal was created with
    #[inline]
    pub fn mode(&self) -> ResetMode {
        self.inner.mode
    }

    /// Mark the condition true
    ///
    /// Idempotent: setting an already-set signal coalesces into one
    /// observable set. Never blocks.
    pub fn set(&self) {
        let hubs: Vec<Arc<WaitHub>> = {
            let mut state = self.inner.state.lock();
            state.set = true;
            state.hubs.iter().filter_map(Weak::upgrade).collect()
        };

        match self.inner.mode {
            // One direct waiter consumes the condition; waking more would
            // just put the losers back to sleep
            ResetMode::Auto => {
                self.inner.condvar.notify_one();
            }
            ResetMode::Manual => {
                self.inner.condvar.notify_all();
            }
        }

        for hub in hubs {
            hub.notify();
        }
    }

    /// Reset the condition to unset
    ///
    /// Only meaningful for manual-reset signals; an auto-reset signal
    /// clears itself when a waiter consumes it.
    pub fn clear(&self) {
        self.inner.state.lock().set = false;
    }

    /// Non-blocking, non-consuming observation of the condition
    ///
    /// Does not clear an auto-reset signal; use `wait(Some(Duration::ZERO))`
    /// for a consuming poll.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.inner.state.lock().set
    }

    /// Block until the condition is set or `timeout` elapses
    ///
    /// `None` blocks indefinitely; `Some(Duration::ZERO)` is a
    /// non-blocking poll. Returns `true` iff the condition was observed
    /// set (consuming it when auto-reset), `false` on timeout - the two
    /// outcomes are never conflated.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let start = Instant::now();
        let mut state = self.inner.state.lock();

        loop {
            if state.set {
                if self.inner.mode == ResetMode::Auto {
                    state.set = false;
                }
                return true;
            }

            match timeout {
                Some(limit) => {
                    let remaining = limit.saturating_sub(start.elapsed());
                    if remaining.is_zero() {
                        return false;
                    }
                    let _ = self.inner.condvar.wait_for(&mut state, remaining);
                    // Loop re-checks: a timed-out wake still observes a set
                    // that raced in, and a spurious wake goes back to sleep
                }
                None => self.inner.condvar.wait(&mut state),
            }
        }
    }

    /// Consume the condition if currently set (wait-set claim path)
    ///
    /// Returns `true` iff this caller observed the signal set. For
    /// auto-reset signals the claim clears the condition, so exactly one
    /// of several racing claimants wins.
    pub(super) fn try_claim(&self) -> bool {
        let mut state = self.inner.state.lock();
        if state.set {
            if self.inner.mode == ResetMode::Auto {
                state.set = false;
            }
            true
        } else {
            false
        }
    }

    /// Register a wait-set hub to be notified on set
    pub(super) fn register_hub(&self, hub: &Arc<WaitHub>) {
        let mut state = self.inner.state.lock();
        state.hubs.retain(|weak| weak.strong_count() > 0);
        state.hubs.push(Arc::downgrade(hub));
    }

    /// Remove a previously registered hub
    pub(super) fn unregister_hub(&self, hub: &Arc<WaitHub>) {
        self.inner.state.lock().hubs.retain(|weak| {
            weak.upgrade()
                .map_or(false, |candidate| !Arc::ptr_eq(&candidate, hub))
        });
    }

    /// Identity comparison: do two handles name the same condition?
    #[inline]
    pub fn same_signal(&self, other: &Signal) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("mode", &self.inner.mode)
            .field("set", &self.is_set())
            .finish()
    }
}
