/*!
 * Synchronization Primitives
 *
 * The building blocks the pipeline is composed from:
 * - `Lock`: exclusive mutual exclusion with scoped acquisition
 * - `Signal`: waitable boolean condition, auto- or manual-reset
 * - `wait_any` / `WaitSet`: first-of-many wait with timeout, no set-size
 *   ceiling (condvar broadcast pattern)
 *
 * All blocking operations distinguish "signaled" from "timed out"; no
 * lock is ever held across a blocking wait.
 */

mod lock;
mod signal;
mod waitset;

pub use lock::{Lock, LockGuard};
pub use signal::{ResetMode, Signal};
pub use waitset::{wait_any, WaitError, WaitResult, WaitSet};
