//! Items, per-item work, and the stage abstraction.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::report::{StageKind, StageReport};
use crate::CancelSignal;

/// A unit of work: a sequence number assigned by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item(pub u64);

impl Item {
    /// The sequence number.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    /// The item produced right after this one.
    #[inline]
    pub fn next(self) -> Item {
        Item(self.0 + 1)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Processing a sink performs for every item it consumes.
pub trait Work: Send + 'static {
    /// Handle one item.
    fn process(&mut self, item: Item) -> impl Future<Output = ()> + Send;
}

/// Work that just takes time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedWork(pub Duration);

impl Work for SimulatedWork {
    async fn process(&mut self, _item: Item) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}

/// A pipeline stage: runs until it decides to stop, then reports.
///
/// The coordinator hands every stage its own child of the root signal.
/// A stage either terminates on its own or hangs; there is no error path.
pub trait Stage: Send + 'static {
    /// Which side of the queue this stage sits on.
    fn kind(&self) -> StageKind;

    /// Run to completion.
    fn run(self, signal: CancelSignal) -> impl Future<Output = StageReport> + Send;
}
