//! The consuming stage, in two shutdown flavours.
//!
//! - [`BatchingSink`] checks cancellation once per batch and relies on the
//!   source closing the queue to release a pop that would otherwise wait
//!   forever.
//! - [`DrainingSink`] races cancellation against every pop and, once
//!   cancelled, drains the queue so a source parked on a full queue can
//!   finish its push, see the signal, and close.
//!
//! Both require the source to close the queue on exit. Only the draining
//! sink also protects a source that is blocked pushing.

mod batching;
mod draining;

pub use batching::BatchingSink;
pub use draining::DrainingSink;
