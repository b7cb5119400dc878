/*!
 * Cancellable Worker
 *
 * A background thread with a private manual-reset stop signal and a
 * join-on-drop lifecycle: a worker is never dropped while still running.
 *
 * Cancellation is purely cooperative. The body observes its stop signal
 * (and any externally supplied stop conditions) at bounded intervals and
 * returns; nothing is ever terminated mid-instruction. Body errors and
 * panics are caught at the thread boundary, logged, and leave the worker
 * terminal - they never crash the process.
 */

use crate::sync::{ResetMode, Signal};
use log::{debug, warn};
use std::io;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Result type for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Worker lifecycle errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// OS thread creation failed; surfaced synchronously at construction
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),

    /// The worker body reported a steady-state failure
    #[error("worker body failed: {0}")]
    Body(String),
}

/// Capability interface for a worker body
///
/// Implementations must poll `stop` at bounded intervals and return
/// promptly once it is set; composition over subclassing.
pub trait Runnable: Send + 'static {
    fn run(&mut self, stop: &Signal) -> WorkerResult<()>;
}

impl<F> Runnable for F
where
    F: FnMut(&Signal) -> WorkerResult<()> + Send + 'static,
{
    fn run(&mut self, stop: &Signal) -> WorkerResult<()> {
        self(stop)
    }
}

/// Cancellable background execution unit
///
/// Running from construction; `Drop` requests stop and joins
/// unconditionally.
pub struct Worker {
    name: String,
    stop: Signal,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a named worker executing `body` immediately
    ///
    /// Thread creation failure propagates to the caller with no
    /// partially-constructed running thread left behind.
    pub fn spawn(name: impl Into<String>, mut body: impl Runnable) -> WorkerResult<Self> {
        let name = name.into();
        let stop = Signal::new(ResetMode::Manual);

        let thread_stop = stop.clone();
        let thread_name = name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                debug!("worker '{}' started", thread_name);
                if let Err(e) = body.run(&thread_stop) {
                    warn!("worker '{}' exited with error: {}", thread_name, e);
                } else {
                    debug!("worker '{}' finished", thread_name);
                }
            })
            .map_err(WorkerError::Spawn)?;

        Ok(Self {
            name,
            stop,
            handle: Some(handle),
        })
    }

    /// Worker name (also the OS thread name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request cooperative stop without blocking
    ///
    /// Monotonic and idempotent: requesting stop twice is the same as once.
    pub fn request_stop(&self) {
        self.stop.set();
    }

    /// Has stop been requested?
    pub fn stop_requested(&self) -> bool {
        self.stop.is_set()
    }

    /// The private stop signal, for inclusion in the body's wait sets
    pub fn stop_signal(&self) -> &Signal {
        &self.stop
    }

    /// Block until the body has returned; idempotent if already joined
    ///
    /// A panicking body is reported here and leaves the worker terminal.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("worker '{}' panicked", self.name);
            }
        }
    }

    /// Whether the thread has been joined (terminal state)
    pub fn is_joined(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.request_stop();
        self.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn poll_until_stopped(stop: &Signal) -> WorkerResult<()> {
        while !stop.wait(Some(Duration::from_millis(5))) {}
        Ok(())
    }

    #[test]
    fn test_runs_at_construction() {
        let ran = Arc::new(AtomicU32::new(0));
        let ran_clone = ran.clone();

        let mut worker = Worker::spawn("test-run", move |_stop: &Signal| {
            ran_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        worker.join();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert!(worker.is_joined());
    }

    #[test]
    fn test_cooperative_stop() {
        let mut worker = Worker::spawn("test-stop", poll_until_stopped).unwrap();

        worker.request_stop();
        worker.join();
        assert!(worker.is_joined());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut worker = Worker::spawn("test-idem", poll_until_stopped).unwrap();

        worker.request_stop();
        worker.request_stop();
        assert!(worker.stop_requested());

        worker.join();
        worker.join(); // Join is idempotent too
    }

    #[test]
    fn test_drop_stops_and_joins() {
        let finished = Arc::new(AtomicU32::new(0));
        let finished_clone = finished.clone();

        let worker = Worker::spawn("test-drop", move |stop: &Signal| {
            while !stop.wait(Some(Duration::from_millis(5))) {}
            finished_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        drop(worker);
        // Drop blocked until the body returned
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_body_error_is_contained() {
        let mut worker = Worker::spawn("test-err", |_stop: &Signal| {
            Err(WorkerError::Body("simulated failure".into()))
        })
        .unwrap();

        // Error is logged at the boundary, worker reaches terminal state
        worker.join();
        assert!(worker.is_joined());
    }

    #[test]
    fn test_body_panic_is_contained() {
        let mut worker =
            Worker::spawn("test-panic", |_stop: &Signal| -> WorkerResult<()> {
                panic!("simulated panic");
            })
            .unwrap();

        worker.join();
        assert!(worker.is_joined());
    }
}
