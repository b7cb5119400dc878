/*!
 * Generator Worker Body
 *
 * Pulls items from the caller's [`ItemSource`] and pushes them into the
 * shared queue until the global stop fires, the worker's own stop fires,
 * or the source runs dry.
 */

use super::{ItemSource, PipelineContext};
use crate::sync::Signal;
use crate::worker::{Runnable, WorkerResult};
use log::debug;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(super) struct Generator<T> {
    ctx: Arc<PipelineContext<T>>,
    source: Arc<dyn ItemSource<T>>,
}

impl<T> Generator<T> {
    pub(super) fn new(ctx: Arc<PipelineContext<T>>, source: Arc<dyn ItemSource<T>>) -> Self {
        Self { ctx, source }
    }
}

impl<T: Send + 'static> Runnable for Generator<T> {
    fn run(&mut self, stop: &Signal) -> WorkerResult<()> {
        let global_stop = &self.ctx.stop;
        let should_abort = || global_stop.is_set();

        loop {
            // Non-blocking polls: generators never sleep on a wait set,
            // the source paces them
            if global_stop.is_set() || stop.is_set() {
                break;
            }

            match self.source.generate(&should_abort) {
                Some(item) => {
                    self.ctx.queue.push(item);
                    self.ctx.generated.fetch_add(1, Ordering::Relaxed);
                }
                // Source exhausted: this generator is done producing
                None => break,
            }
        }

        debug!("generator exiting");
        Ok(())
    }
}
