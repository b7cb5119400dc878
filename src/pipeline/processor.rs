/*!
 * Processor Worker Body
 *
 * State machine per iteration: block on a multi-object wait over
 * {global stop, queue readiness, own stop}; on readiness, `try_pop` and
 * process; on a lost pop race, go straight back to waiting. Strict
 * re-arbitration between items - no processor holds implicit priority,
 * and the queue's internal lock guarantees no item is double-consumed.
 *
 * The stop signals sit at the lowest indices, so when a stop and queue
 * readiness are simultaneously ready the stop wins deterministically.
 */

use super::{ItemProcessor, PipelineContext};
use crate::sync::{wait_any, Signal, WaitError};
use crate::worker::{Runnable, WorkerError, WorkerResult};
use log::debug;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const GLOBAL_STOP: usize = 0;
const QUEUE_READY: usize = 1;
const OWN_STOP: usize = 2;

pub(super) struct Processor<T> {
    ctx: Arc<PipelineContext<T>>,
    processor: Arc<dyn ItemProcessor<T>>,
}

impl<T> Processor<T> {
    pub(super) fn new(
        ctx: Arc<PipelineContext<T>>,
        processor: Arc<dyn ItemProcessor<T>>,
    ) -> Self {
        Self { ctx, processor }
    }
}

impl<T: Send + 'static> Runnable for Processor<T> {
    fn run(&mut self, stop: &Signal) -> WorkerResult<()> {
        let global_stop = &self.ctx.stop;
        let should_abort = || global_stop.is_set();

        loop {
            let fired = wait_any(
                &[global_stop, self.ctx.queue.ready(), stop],
                None,
            )
            .map_err(|e: WaitError| WorkerError::Body(e.to_string()))?;

            match fired {
                QUEUE_READY => {
                    // A wake means *maybe* non-empty: another processor may
                    // have won the race, in which case re-arbitrate
                    let Some(item) = self.ctx.queue.try_pop() else {
                        continue;
                    };

                    self.processor.process(item, &should_abort);
                    self.ctx.processed.fetch_add(1, Ordering::Relaxed);
                }
                GLOBAL_STOP | OWN_STOP => break,
                _ => unreachable!("wait set has exactly three members"),
            }
        }

        debug!("processor exiting");
        Ok(())
    }
}
