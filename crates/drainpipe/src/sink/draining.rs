use tracing::{debug, info};

use crate::queue::Receiver;
use crate::report::{StageExit, StageKind, StageReport};
use crate::stage::{Item, Stage, Work};
use crate::CancelSignal;

/// A sink that waits on the signal and the queue at once, and drains after
/// cancellation.
///
/// When the queue is full the source may be parked in a push that started
/// before the signal fired. Walking away at that point would leave the
/// push, and with it the whole shutdown, waiting forever. Instead the sink
/// keeps popping and discarding until the source has seen the signal and
/// closed the queue.
///
/// Cancellation wins ties with an available item, so the sink stops taking
/// new work as soon as it can.
#[derive(Debug)]
pub struct DrainingSink<W> {
    queue: Receiver<Item>,
    work: W,
}

impl<W: Work> DrainingSink<W> {
    /// Create a sink.
    pub fn new(queue: Receiver<Item>, work: W) -> Self {
        Self { queue, work }
    }
}

impl<W: Work> Stage for DrainingSink<W> {
    fn kind(&self) -> StageKind {
        StageKind::Sink
    }

    async fn run(self, signal: CancelSignal) -> StageReport {
        let Self {
            mut queue,
            mut work,
        } = self;
        let mut consumed = 0;

        let cancelled = signal.cancelled();
        tokio::pin!(cancelled);

        loop {
            tokio::select! {
                biased;
                _ = &mut cancelled => {
                    let discarded = queue.drain().await;
                    info!(consumed, discarded, "sink exit");
                    return StageReport::new(
                        StageKind::Sink,
                        StageExit::Drained { discarded },
                        consumed,
                    );
                }
                popped = queue.pop() => match popped {
                    Some(item) => {
                        debug!(item = %item, "consumed");
                        work.process(item).await;
                        consumed += 1;
                    }
                    None => {
                        info!(consumed, "sink exit on close");
                        return StageReport::new(StageKind::Sink, StageExit::Closed, consumed);
                    }
                },
            }
        }
    }
}
