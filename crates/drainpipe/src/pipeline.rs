//! Ready-made source → queue → sink pipelines.

use std::fmt;
use std::future::Future;

use crate::coordinator::{Coordinator, ShutdownError};
use crate::queue;
use crate::report::ShutdownReport;
use crate::sink::{BatchingSink, DrainingSink};
use crate::source::Source;
use crate::stage::SimulatedWork;
use crate::PipelineConfig;

/// Which sink shutdown protocol to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// [`BatchingSink`]: check per batch, rely on the source's close.
    Batching,
    /// [`DrainingSink`]: race every pop against the signal, drain on cancel.
    Draining,
}

impl Variant {
    /// The demo configuration for this variant.
    pub fn config(&self) -> PipelineConfig {
        match self {
            Self::Batching => PipelineConfig::batching(),
            Self::Draining => PipelineConfig::draining(),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batching => write!(f, "batching"),
            Self::Draining => write!(f, "draining"),
        }
    }
}

/// Build the queue and both stages, and hand them to a coordinator.
///
/// The stages start running immediately.
///
/// # Panics
///
/// Panics if called outside a tokio runtime, if `config.capacity` is zero,
/// or if `config.batch_size` is zero for [`Variant::Batching`].
pub fn build(variant: Variant, config: &PipelineConfig) -> Coordinator {
    let (tx, rx) = queue::bounded(config.capacity);
    let work = SimulatedWork(config.work);

    let mut coordinator = Coordinator::new();
    if let Some(timeout) = config.stall_timeout {
        coordinator = coordinator.with_stall_timeout(timeout);
    }

    coordinator.spawn(Source::new(tx).with_interval(config.produce_interval));
    match variant {
        Variant::Batching => coordinator.spawn(BatchingSink::new(rx, work, config.batch_size)),
        Variant::Draining => coordinator.spawn(DrainingSink::new(rx, work)),
    }
    coordinator
}

/// Run a pipeline and cancel it after `config.shutdown_after`.
pub async fn run(variant: Variant, config: PipelineConfig) -> Result<ShutdownReport, ShutdownError> {
    build(variant, &config).run(config.shutdown_after).await
}

/// Run a pipeline and cancel it when `trigger` completes.
pub async fn run_until<F>(
    variant: Variant,
    config: PipelineConfig,
    trigger: F,
) -> Result<ShutdownReport, ShutdownError>
where
    F: Future<Output = ()>,
{
    build(variant, &config).shutdown_on(trigger).await
}
