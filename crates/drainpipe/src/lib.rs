//! # drainpipe
//!
//! Shutting down a bounded producer/consumer pipeline without deadlock.
//!
//! A [`Source`] pushes sequence numbers into a bounded [`queue`] and a sink
//! pops them. A [`Coordinator`] cancels both through a [`CancelSignal`] and
//! waits for them to exit. Cancellation reaches each stage independently
//! and at unsynchronized times, so each side carries its own part of the
//! shutdown contract:
//!
//! - The source **closes the queue** when it sees cancellation. Without the
//!   close, a sink parked in a pop on an empty queue never wakes.
//! - The sink either relies on that close ([`BatchingSink`], which checks
//!   the signal once per batch) or **drains after cancellation**
//!   ([`DrainingSink`]), which releases a source parked pushing into a full
//!   queue.
//!
//! Break either contract and the coordinator's join never completes.
//!
//! ## Quick Start
//!
//! ```rust
//! use drainpipe::{PipelineConfig, Variant};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let config = PipelineConfig::draining().with_work(Duration::from_millis(100));
//! let report = drainpipe::run(Variant::Draining, config).await.unwrap();
//!
//! let source = report.source().unwrap();
//! let sink = report.sink().unwrap();
//! // Every item the source pushed was either processed or drained.
//! assert_eq!(source.handled, sink.handled + sink.exit.discarded());
//! # }
//! ```
//!
//! ## Choosing a Sink
//!
//! | Sink | Signal checked | Needs source close | Protects parked push |
//! |------|----------------|--------------------|----------------------|
//! | [`BatchingSink`] | once per batch | yes | no |
//! | [`DrainingSink`] | on every pop | yes | yes |
//!
//! The batching sink trades cancellation latency (up to a batch of work)
//! for fewer checks. It never relies on the signal to release a blocked
//! pop; only the close does that.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod coordinator;
mod pipeline;
pub mod queue;
mod report;
mod signal;
mod sink;
mod source;
mod stage;

pub use config::PipelineConfig;
pub use coordinator::{Coordinator, ShutdownError};
pub use pipeline::{build, run, run_until, Variant};
pub use report::{ShutdownReport, StageExit, StageKind, StageReport};
pub use signal::CancelSignal;
pub use sink::{BatchingSink, DrainingSink};
pub use source::Source;
pub use stage::{Item, SimulatedWork, Stage, Work};
