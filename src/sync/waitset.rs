/*!
 * Multi-Object Wait
 *
 * Blocks the calling thread until the first of a set of signals fires, or
 * a timeout elapses, and reports which one fired by index.
 *
 * # Design: Condvar Broadcast Over a Native Multi-Wait
 *
 * Platform multi-wait primitives cap the number of simultaneously watched
 * objects. Instead, each waiter owns an ephemeral hub (mutex + condvar)
 * and registers it with every watched signal before polling; `set()` on
 * any of them marks the hub pending and broadcasts. The waiter re-polls
 * after every wake, so there is **no capacity ceiling** on the set size.
 *
 * # Tie-breaking
 *
 * When several signals are simultaneously ready, the lowest index wins -
 * the poll walks the set in order. This is deterministic and lets callers
 * give shutdown conditions priority by placing them first.
 */

use super::signal::{Signal, WaitHub};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Result type for multi-object wait operations
pub type WaitResult<T> = Result<T, WaitError>;

/// Multi-object wait outcomes distinct from success
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// The timeout elapsed before any watched signal fired
    #[error("wait timed out before any signal fired")]
    Timeout,

    /// An unbounded wait on an empty set would block forever
    #[error("cannot wait indefinitely on an empty signal set")]
    EmptySet,
}

/// Block until one of `signals` is set or `timeout` elapses
///
/// Returns the index of the fired signal. An auto-reset signal is consumed
/// by the claim, so exactly one of several racing waiters wins it; manual
/// signals are left set and release every waiter.
///
/// `timeout` of `None` blocks indefinitely. A finite timeout on an empty
/// set sleeps the full duration and reports [`WaitError::Timeout`]; an
/// unbounded wait on an empty set is rejected as [`WaitError::EmptySet`].
pub fn wait_any(signals: &[&Signal], timeout: Option<Duration>) -> WaitResult<usize> {
    let start = Instant::now();

    if signals.is_empty() {
        return match timeout {
            Some(limit) => {
                std::thread::sleep(limit);
                Err(WaitError::Timeout)
            }
            None => Err(WaitError::EmptySet),
        };
    }

    let hub = Arc::new(WaitHub::new());
    for signal in signals {
        signal.register_hub(&hub);
    }

    let result = wait_loop(signals, &hub, timeout, start);

    for signal in signals {
        signal.unregister_hub(&hub);
    }
    result
}

fn wait_loop(
    signals: &[&Signal],
    hub: &Arc<WaitHub>,
    timeout: Option<Duration>,
    start: Instant,
) -> WaitResult<usize> {
    loop {
        // Poll in index order: lowest ready index wins ties
        if let Some(index) = signals.iter().position(|signal| signal.try_claim()) {
            return Ok(index);
        }

        let mut pending = hub.pending.lock();
        if *pending {
            // A set raced ahead of the poll above; re-poll instead of
            // sleeping on a wake that already happened
            *pending = false;
            continue;
        }

        match timeout {
            Some(limit) => {
                let remaining = limit.saturating_sub(start.elapsed());
                if remaining.is_zero() {
                    return Err(WaitError::Timeout);
                }
                let _ = hub.condvar.wait_for(&mut pending, remaining);
            }
            None => hub.condvar.wait(&mut pending),
        }
        *pending = false;
    }
}

/// Ephemeral ordered wait set
///
/// Builder-style convenience over [`wait_any`] for call sites that
/// assemble the set incrementally. Holds non-owning references; construct
/// immediately before waiting and discard after.
pub struct WaitSet<'a> {
    signals: Vec<&'a Signal>,
}

impl<'a> WaitSet<'a> {
    pub fn new() -> Self {
        Self {
            signals: Vec::new(),
        }
    }

    /// Append a signal; its index is its position in insertion order
    pub fn watch(mut self, signal: &'a Signal) -> Self {
        self.signals.push(signal);
        self
    }

    /// Number of watched signals
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Block until the first watched signal fires; see [`wait_any`]
    pub fn wait(&self, timeout: Option<Duration>) -> WaitResult<usize> {
        wait_any(&self.signals, timeout)
    }
}

impl Default for WaitSet<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::ResetMode;
    use std::thread;

    #[test]
    fn test_returns_fired_index() {
        let a = Signal::new(ResetMode::Manual);
        let b = Signal::new(ResetMode::Manual);

        b.set();

        let fired = wait_any(&[&a, &b], Some(Duration::from_millis(100))).unwrap();
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_lowest_index_wins_ties() {
        let a = Signal::new(ResetMode::Manual);
        let b = Signal::new(ResetMode::Manual);
        a.set();
        b.set();

        // Both ready - deterministic pick
        let fired = wait_any(&[&a, &b], None).unwrap();
        assert_eq!(fired, 0);
    }

    #[test]
    fn test_timeout_is_not_an_error_value() {
        let a = Signal::new(ResetMode::Manual);
        let start = Instant::now();

        let result = wait_any(&[&a], Some(Duration::from_millis(50)));
        assert_eq!(result, Err(WaitError::Timeout));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_empty_set_finite_timeout() {
        let start = Instant::now();
        let result = wait_any(&[], Some(Duration::from_millis(50)));

        assert_eq!(result, Err(WaitError::Timeout));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_empty_set_unbounded_rejected() {
        assert_eq!(wait_any(&[], None), Err(WaitError::EmptySet));
    }

    #[test]
    fn test_wakes_on_set_from_other_thread() {
        let stop = Signal::new(ResetMode::Manual);
        let ready = Signal::new(ResetMode::Auto);

        let stop_waiter = stop.clone();
        let ready_waiter = ready.clone();
        let handle = thread::spawn(move || {
            wait_any(&[&stop_waiter, &ready_waiter], Some(Duration::from_secs(2)))
        });

        thread::sleep(Duration::from_millis(50));
        ready.set();

        assert_eq!(handle.join().unwrap(), Ok(1));
    }

    #[test]
    fn test_auto_signal_claimed_by_exactly_one_waiter() {
        let ready = Signal::new(ResetMode::Auto);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ready = ready.clone();
                thread::spawn(move || wait_any(&[&ready], Some(Duration::from_millis(300))))
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        ready.set();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_manual_signal_releases_every_waiter() {
        let stop = Signal::new(ResetMode::Manual);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stop = stop.clone();
                thread::spawn(move || wait_any(&[&stop], Some(Duration::from_secs(2))))
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        stop.set();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(0));
        }
    }

    #[test]
    fn test_set_before_registration_observed() {
        let ready = Signal::new(ResetMode::Auto);
        ready.set();

        // No blocking needed - the pre-existing set is claimed on entry
        let start = Instant::now();
        let fired = wait_any(&[&ready], None).unwrap();
        assert_eq!(fired, 0);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_large_set_no_ceiling() {
        // Well past the 64-object cap native multi-waits impose
        let signals: Vec<Signal> = (0..128).map(|_| Signal::new(ResetMode::Manual)).collect();
        let refs: Vec<&Signal> = signals.iter().collect();

        signals[127].set();

        let fired = wait_any(&refs, Some(Duration::from_millis(100))).unwrap();
        assert_eq!(fired, 127);
    }

    #[test]
    fn test_waitset_builder() {
        let a = Signal::new(ResetMode::Manual);
        let b = Signal::new(ResetMode::Auto);
        b.set();

        let set = WaitSet::new().watch(&a).watch(&b);
        assert_eq!(set.len(), 2);
        assert_eq!(set.wait(Some(Duration::from_millis(100))), Ok(1));
    }

    #[test]
    fn test_hub_unregistered_after_wait() {
        let a = Signal::new(ResetMode::Manual);

        for _ in 0..3 {
            let _ = wait_any(&[&a], Some(Duration::from_millis(1)));
        }

        // Stale hubs must not accumulate or keep waking nobody;
        // a fresh set() still completes without observers
        a.set();
        assert!(a.is_set());
    }
}
