//! Starts stages, triggers the shutdown, and waits for every stage to exit.
//!
//! The trigger is any future: the fixed delay of [`Coordinator::run`], a
//! Ctrl-C handler, an RPC. Whatever it is, the coordinator reacts the same
//! way: log, cancel the root signal once, join.
//!
//! ```rust
//! use drainpipe::queue;
//! use drainpipe::{Coordinator, DrainingSink, SimulatedWork, Source};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let (tx, rx) = queue::bounded(1);
//!
//! let mut coordinator = Coordinator::new();
//! coordinator.spawn(Source::new(tx));
//! coordinator.spawn(DrainingSink::new(rx, SimulatedWork(Duration::from_millis(10))));
//!
//! let report = coordinator
//!     .shutdown_on(tokio::time::sleep(Duration::from_millis(50)))
//!     .await
//!     .unwrap();
//! assert_eq!(report.stages.len(), 2);
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{info, info_span, warn, Instrument};

use crate::report::{ShutdownReport, StageReport};
use crate::stage::Stage;
use crate::CancelSignal;

/// The shutdown did not complete cleanly.
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    /// Stages were still running when the stall timeout ran out.
    ///
    /// This is the shutdown deadlock made visible: some stage broke its
    /// side of the protocol and is waiting on something that will never
    /// happen. The stuck stages are aborted.
    #[error("{running} stage(s) still running {after:?} after cancellation")]
    Stalled {
        /// How long the coordinator waited after cancelling.
        after: Duration,
        /// Stages that never exited.
        running: usize,
        /// Stages that did exit, in exit order.
        finished: Vec<StageReport>,
    },

    /// A stage panicked.
    #[error("stage panicked: {0}")]
    StagePanicked(#[from] JoinError),
}

/// Owns the root cancellation signal and the running stages.
#[derive(Debug)]
pub struct Coordinator {
    signal: CancelSignal,
    stages: JoinSet<StageReport>,
    stall_timeout: Option<Duration>,
}

impl Coordinator {
    /// A coordinator with no stages and no stall timeout.
    pub fn new() -> Self {
        Self {
            signal: CancelSignal::new(),
            stages: JoinSet::new(),
            stall_timeout: None,
        }
    }

    /// Stop waiting for stages `timeout` after cancellation.
    ///
    /// Without this, a broken stage makes the join wait forever.
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = Some(timeout);
        self
    }

    /// The root signal. Stages get children of it.
    pub fn signal(&self) -> &CancelSignal {
        &self.signal
    }

    /// Number of stages that have not been joined yet.
    pub fn running(&self) -> usize {
        self.stages.len()
    }

    /// Start a stage on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<S: Stage>(&mut self, stage: S) {
        let span = info_span!("stage", kind = stage.kind().as_str());
        let signal = self.signal.child();
        self.stages.spawn(stage.run(signal).instrument(span));
    }

    /// Wait `delay`, then shut down.
    pub async fn run(self, delay: Duration) -> Result<ShutdownReport, ShutdownError> {
        self.shutdown_on(tokio::time::sleep(delay)).await
    }

    /// Wait for `trigger`, cancel, then join every stage.
    pub async fn shutdown_on<F>(mut self, trigger: F) -> Result<ShutdownReport, ShutdownError>
    where
        F: Future<Output = ()>,
    {
        trigger.await;

        info!("initiate shutdown");
        self.signal.cancel();
        let cancelled_at = Instant::now();

        let mut finished = Vec::with_capacity(self.stages.len());
        let joined = match self.stall_timeout {
            Some(limit) => {
                tokio::time::timeout(limit, join_into(&mut self.stages, &mut finished)).await
            }
            None => Ok(join_into(&mut self.stages, &mut finished).await),
        };

        match joined {
            Ok(Ok(())) => Ok(ShutdownReport {
                stages: finished,
                elapsed: cancelled_at.elapsed(),
            }),
            Ok(Err(panicked)) => Err(panicked.into()),
            Err(_elapsed) => {
                let running = self.stages.len();
                warn!(running, "shutdown stalled");
                Err(ShutdownError::Stalled {
                    after: cancelled_at.elapsed(),
                    running,
                    finished,
                })
            }
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

async fn join_into(
    stages: &mut JoinSet<StageReport>,
    finished: &mut Vec<StageReport>,
) -> Result<(), JoinError> {
    while let Some(joined) = stages.join_next().await {
        let report = joined?;
        info!(stage = %report.kind, exit = %report.exit, handled = report.handled, "stage exited");
        finished.push(report);
    }
    Ok(())
}
