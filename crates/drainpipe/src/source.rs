//! The producing stage.
//!
//! Each iteration polls the cancellation signal without waiting. While the
//! signal is live the source pushes the next [`Item`], waiting if the queue
//! is full. Once it sees cancellation it closes the queue and returns.
//!
//! Closing is the hand-off the sink depends on: it is the only way a sink
//! can tell "empty for now" from "nothing will ever come", so a sink parked
//! in a pop always wakes up. A push that was already waiting when the
//! signal fired still completes; the source only notices the signal on its
//! next iteration.

use std::time::Duration;

use tracing::{debug, info};

use crate::queue::Sender;
use crate::report::{StageExit, StageKind, StageReport};
use crate::stage::{Item, Stage};
use crate::CancelSignal;

/// Produces `0, 1, 2, …` into the queue until cancelled.
#[derive(Debug)]
pub struct Source {
    queue: Sender<Item>,
    interval: Duration,
}

impl Source {
    /// A source that produces as fast as the queue drains.
    pub fn new(queue: Sender<Item>) -> Self {
        Self {
            queue,
            interval: Duration::ZERO,
        }
    }

    /// Spend `interval` producing each item.
    ///
    /// The delay runs before the cancellation check, so a signal that fires
    /// during it is seen before the next push.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Stage for Source {
    fn kind(&self) -> StageKind {
        StageKind::Source
    }

    async fn run(self, signal: CancelSignal) -> StageReport {
        let Self { queue, interval } = self;
        let mut next = Item(0);

        loop {
            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }

            if signal.is_cancelled() {
                queue.close();
                info!(produced = next.get(), "source exit");
                return StageReport::new(StageKind::Source, StageExit::Cancelled, next.get());
            }

            queue.push(next).await;
            debug!(item = %next, "produced");
            next = next.next();
        }
    }
}
