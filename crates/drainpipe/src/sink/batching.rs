use tracing::{debug, info};

use crate::queue::Receiver;
use crate::report::{StageExit, StageKind, StageReport};
use crate::stage::{Item, Stage, Work};
use crate::CancelSignal;

/// A sink that performs up to `batch_size` pops per cancellation check.
///
/// Inside a batch every pop waits for an item or for the queue to close;
/// the signal is not consulted. If cancellation fires while a pop is parked
/// on an empty queue, only the source's close can wake it. A source that
/// exits without closing leaves this sink hung.
///
/// Exits without draining once it sees cancellation. If the source is
/// parked pushing into a full queue at that moment, nothing frees it. With
/// a source that outruns the sink this happens whenever cancellation lands
/// during the work on the last item of a batch, or between batches: no
/// pop is left to release the push. Use
/// [`DrainingSink`](crate::DrainingSink) when the source can outrun the sink.
#[derive(Debug)]
pub struct BatchingSink<W> {
    queue: Receiver<Item>,
    work: W,
    batch_size: usize,
}

impl<W: Work> BatchingSink<W> {
    /// Create a sink.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    pub fn new(queue: Receiver<Item>, work: W, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be at least 1");
        Self {
            queue,
            work,
            batch_size,
        }
    }
}

impl<W: Work> Stage for BatchingSink<W> {
    fn kind(&self) -> StageKind {
        StageKind::Sink
    }

    async fn run(self, signal: CancelSignal) -> StageReport {
        let Self {
            mut queue,
            mut work,
            batch_size,
        } = self;
        let mut consumed = 0;
        let mut closed = false;

        loop {
            if signal.is_cancelled() {
                info!(consumed, "sink exit");
                return StageReport::new(StageKind::Sink, StageExit::Cancelled, consumed);
            }
            if closed {
                // Closed without cancellation: nothing more can arrive.
                info!(consumed, "sink exit on close");
                return StageReport::new(StageKind::Sink, StageExit::Closed, consumed);
            }

            for _ in 0..batch_size {
                match queue.pop().await {
                    Some(item) => {
                        debug!(item = %item, "consumed");
                        work.process(item).await;
                        consumed += 1;
                    }
                    None => {
                        info!("close seen");
                        closed = true;
                        break;
                    }
                }
            }
        }
    }
}
