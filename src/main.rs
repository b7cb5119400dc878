/*!
 * Waitline Demo - Main Entry Point
 *
 * Reconstructs the classic harness: spawn a randomized number of
 * generators and processors over one shared queue, let them run for a
 * fixed window, signal the global stop, drain, and report.
 */

use anyhow::Result;
use log::info;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use waitline::{ItemProcessor, ItemSource, Pipeline, PipelineConfig};

/// Toy work item; real payloads are out of scope
#[derive(Debug)]
struct Request {
    id: u64,
}

/// Randomly paced item source
struct RequestSource {
    next_id: AtomicU64,
}

impl ItemSource<Request> for RequestSource {
    fn generate(&self, should_abort: &dyn Fn() -> bool) -> Option<Request> {
        if should_abort() {
            return None;
        }
        // Small randomized delay between items, as in the original harness
        let pause = rand::thread_rng().gen_range(1..=100);
        std::thread::sleep(Duration::from_micros(pause));

        Some(Request {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        })
    }
}

/// Bounded random busy loop standing in for request processing
///
/// The contract is what matters: bounded duration, abort check every
/// iteration so shutdown interrupts long-running work promptly.
struct RequestProcessor;

impl ItemProcessor<Request> for RequestProcessor {
    fn process(&self, request: Request, should_abort: &dyn Fn() -> bool) {
        let rounds = rand::thread_rng().gen_range(1..=5);
        for _ in 0..rounds {
            if should_abort() {
                log::trace!("processing of request {} aborted by stop", request.id);
                break;
            }
            let pause = rand::thread_rng().gen_range(1..=100);
            std::thread::sleep(Duration::from_micros(pause));
        }
    }
}

fn env_count(var: &str) -> Option<usize> {
    std::env::var(var).ok()?.parse().ok()
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = rand::thread_rng();
    let generators = env_count("WAITLINE_GENERATORS").unwrap_or_else(|| rng.gen_range(2..=10));
    let processors = env_count("WAITLINE_PROCESSORS").unwrap_or_else(|| rng.gen_range(2..=10));
    let run_millis = env_count("WAITLINE_RUN_MILLIS").unwrap_or(3000);

    info!("starting pipeline: {generators} generators, {processors} processors");

    let source = Arc::new(RequestSource {
        next_id: AtomicU64::new(0),
    });
    let mut pipeline = Pipeline::start(
        PipelineConfig::new(generators, processors),
        source,
        Arc::new(RequestProcessor),
    )?;

    std::thread::sleep(Duration::from_millis(run_millis as u64));

    pipeline.request_shutdown();
    pipeline.await_drain();

    let leftover = pipeline.drain_remaining();
    info!("generators: {generators}");
    info!("processors: {processors}");
    info!("items generated: {}", pipeline.items_generated());
    info!("items processed: {}", pipeline.items_processed());
    info!("left in queue at shutdown: {}", leftover.len());

    Ok(())
}
