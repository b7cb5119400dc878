/*!
 * Waitline
 *
 * Cross-thread synchronization toolkit and the producer/consumer pipeline
 * built on it: locks, waitable signals, multi-object waits, a blocking
 * work queue with a waitable readiness condition, cooperatively stoppable
 * workers, and a fan-in/fan-out pipeline with race-free graceful shutdown.
 */

pub mod pipeline;
pub mod queue;
pub mod sync;
pub mod worker;

// Re-exports
pub use pipeline::{
    ItemProcessor, ItemSource, Pipeline, PipelineConfig, PipelineError, PipelineResult,
};
pub use queue::BlockingQueue;
pub use sync::{wait_any, Lock, LockGuard, ResetMode, Signal, WaitError, WaitResult, WaitSet};
pub use worker::{Runnable, Worker, WorkerError, WorkerResult};
