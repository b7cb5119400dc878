/*!
 * Blocking Work Queue
 *
 * Thread-safe FIFO whose "has data" condition is a [`Signal`], so queue
 * readiness can join shutdown signals in a single multi-object wait
 * instead of a polling loop.
 *
 * # Readiness contract
 *
 * The readiness signal is auto-reset and re-signaled by the popper: every
 * `push` sets it, and a successful `try_pop` that leaves items behind sets
 * it again so chained wakes propagate one consumer at a time. Coalesced
 * sets make a wake mean *maybe non-empty*, never *definitely non-empty* -
 * consumers must re-check with `try_pop` and loop back to waiting when
 * another consumer drained the queue first.
 */

use crate::sync::{Lock, ResetMode, Signal};
use std::collections::VecDeque;

/// FIFO queue with a waitable readiness signal
///
/// Pushes and pops are linearized by one internal lock, giving global FIFO
/// order across all producers. The lock is never held across a signal call.
pub struct BlockingQueue<T> {
    items: Lock<VecDeque<T>>,
    ready: Signal,
}

impl<T> BlockingQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            items: Lock::new(VecDeque::new()),
            ready: Signal::new(ResetMode::Auto),
        }
    }

    /// Append to the tail and signal readiness
    ///
    /// The readiness set happens after the lock is released.
    pub fn push(&self, item: T) {
        {
            let mut items = self.items.lock();
            items.push_back(item);
        }
        self.ready.set();
    }

    /// Remove and return the head, or `None` if empty. Never blocks.
    ///
    /// Finding the queue empty after a readiness wake is a lost race, not
    /// an error - loop back to waiting.
    pub fn try_pop(&self) -> Option<T> {
        let (item, more) = {
            let mut items = self.items.lock();
            let item = items.pop_front();
            (item, !items.is_empty())
        };

        // Hand the wake chain on: one set may cover several pushes, so a
        // successful pop re-arms readiness while items remain
        if item.is_some() && more {
            self.ready.set();
        }
        item
    }

    /// Snapshot length
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// The shared readiness signal, for inclusion in a wait set
    #[inline]
    pub fn ready(&self) -> &Signal {
        &self.ready
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
