/*!
 * Producer/Consumer Pipeline
 *
 * Fan-in/fan-out over one shared [`BlockingQueue`]: N generator workers
 * push items, M processor workers drain them, and one process-wide,
 * write-once stop signal coordinates graceful shutdown.
 *
 * All shared state lives in an explicitly constructed context passed to
 * every worker by shared ownership - no global singleton, lifetimes are
 * visible at the call site. Item production and processing are supplied by
 * the caller through the [`ItemSource`] and [`ItemProcessor`] capabilities
 * and must honor the cooperative abort probe they are handed.
 */

mod generator;
mod processor;

use crate::queue::BlockingQueue;
use crate::sync::{ResetMode, Signal};
use crate::worker::{Worker, WorkerError};
use generator::Generator;
use log::{info, warn};
use processor::Processor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline lifecycle errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Rejected configuration (zero worker counts)
    #[error("invalid pipeline configuration: {0}")]
    Config(String),

    /// Worker construction failed; already-spawned workers were torn down
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// Worker counts for a pipeline
///
/// No dynamic resizing: the counts are fixed for the pipeline's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub generators: usize,
    pub processors: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generators: 2,
            processors: 2,
        }
    }
}

impl PipelineConfig {
    pub fn new(generators: usize, processors: usize) -> Self {
        Self {
            generators,
            processors,
        }
    }

    fn validate(&self) -> PipelineResult<()> {
        if self.generators == 0 {
            return Err(PipelineError::Config("generator count must be > 0".into()));
        }
        if self.processors == 0 {
            return Err(PipelineError::Config("processor count must be > 0".into()));
        }
        Ok(())
    }
}

/// Supplies work items to generator workers
///
/// Returning `None` stops that generator. Implementations must return
/// promptly once `should_abort()` reports true.
pub trait ItemSource<T>: Send + Sync + 'static {
    fn generate(&self, should_abort: &dyn Fn() -> bool) -> Option<T>;
}

/// Consumes work items on processor workers
///
/// Long-running processing must poll `should_abort()` at bounded intervals
/// and return early once it reports true; there is no preemption.
pub trait ItemProcessor<T>: Send + Sync + 'static {
    fn process(&self, item: T, should_abort: &dyn Fn() -> bool);
}

/// Shared state every generator and processor holds a reference to
pub(crate) struct PipelineContext<T> {
    pub(crate) queue: BlockingQueue<T>,
    /// Write-once: set exactly once during shutdown, never cleared
    pub(crate) stop: Signal,
    pub(crate) generated: AtomicU64,
    pub(crate) processed: AtomicU64,
}

impl<T> PipelineContext<T> {
    fn new() -> Self {
        Self {
            queue: BlockingQueue::new(),
            stop: Signal::new(ResetMode::Manual),
            generated: AtomicU64::new(0),
            processed: AtomicU64::new(0),
        }
    }
}

/// Running pipeline facade
///
/// `Drop` requests shutdown and drains all workers, so a pipeline never
/// outlives its threads.
pub struct Pipeline<T> {
    ctx: Arc<PipelineContext<T>>,
    generators: Vec<Worker>,
    processors: Vec<Worker>,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Spawn all workers and return the running pipeline
    ///
    /// If any worker fails to spawn, the ones already running are stopped
    /// and joined before the error is returned - no orphan threads.
    pub fn start(
        config: PipelineConfig,
        source: Arc<dyn ItemSource<T>>,
        processor: Arc<dyn ItemProcessor<T>>,
    ) -> PipelineResult<Self> {
        config.validate()?;

        let ctx = Arc::new(PipelineContext::new());
        let mut generators = Vec::with_capacity(config.generators);
        let mut processors = Vec::with_capacity(config.processors);

        for i in 0..config.generators {
            let body = Generator::new(ctx.clone(), source.clone());
            match Worker::spawn(format!("gen-{i}"), body) {
                Ok(worker) => generators.push(worker),
                Err(e) => {
                    warn!("pipeline startup aborted while spawning generators: {e}");
                    ctx.stop.set();
                    return Err(e.into());
                }
            }
        }

        for i in 0..config.processors {
            let body = Processor::new(ctx.clone(), processor.clone());
            match Worker::spawn(format!("proc-{i}"), body) {
                Ok(worker) => processors.push(worker),
                Err(e) => {
                    warn!("pipeline startup aborted while spawning processors: {e}");
                    ctx.stop.set();
                    return Err(e.into());
                }
            }
        }

        info!(
            "pipeline started: {} generators, {} processors",
            config.generators, config.processors
        );

        Ok(Self {
            ctx,
            generators,
            processors,
        })
    }

    /// Set the global stop signal
    ///
    /// Write-once and monotonic; requesting shutdown on an already
    /// stopping pipeline is a no-op.
    pub fn request_shutdown(&self) {
        if !self.ctx.stop.is_set() {
            info!("pipeline shutdown requested");
        }
        self.ctx.stop.set();
    }

    /// Block until every generator and processor has joined; idempotent
    ///
    /// Call after [`request_shutdown`](Self::request_shutdown) (or once
    /// the source is exhausted) - processors only terminate on a stop
    /// signal.
    pub fn await_drain(&mut self) {
        for worker in &mut self.generators {
            worker.join();
        }
        for worker in &mut self.processors {
            worker.join();
        }
    }

    /// Current queue depth, for observability
    pub fn queue_depth(&self) -> usize {
        self.ctx.queue.len()
    }

    /// Clone of the global stop signal
    ///
    /// External processing code can poll this, and callers may include it
    /// in their own wait sets.
    pub fn stop_signal(&self) -> Signal {
        self.ctx.stop.clone()
    }

    /// Items pushed by all generators so far
    pub fn items_generated(&self) -> u64 {
        self.ctx.generated.load(Ordering::Relaxed)
    }

    /// Items fully processed by all processors so far
    pub fn items_processed(&self) -> u64 {
        self.ctx.processed.load(Ordering::Relaxed)
    }

    /// Pop and return whatever the processors left behind
    ///
    /// Shutdown stops processors immediately even with items queued;
    /// callers that care about leftovers collect them here after
    /// [`await_drain`](Self::await_drain).
    pub fn drain_remaining(&self) -> Vec<T> {
        let mut leftover = Vec::new();
        while let Some(item) = self.ctx.queue.try_pop() {
            leftover.push(item);
        }
        leftover
    }

    /// Graceful teardown: request shutdown and drain, consuming the handle
    pub fn shutdown(mut self) {
        self.request_shutdown();
        self.await_drain();
    }
}

impl<T> Drop for Pipeline<T> {
    fn drop(&mut self) {
        // Global stop first so processors blocked in a multi-wait wake
        // before their workers' join-on-drop runs
        self.ctx.stop.set();
        for worker in &mut self.generators {
            worker.join();
        }
        for worker in &mut self.processors {
            worker.join();
        }
    }
}
