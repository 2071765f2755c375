//! A sink that pops in batches of five without re-checking cancellation.
//!
//! Cancellation fires two seconds in, while the sink is mid-batch. The
//! source closes the queue on its way out, which ends the batch and lets
//! the sink reach its next cancellation check.

use std::error::Error;

use drainpipe::Variant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    drainpipe_demo::init_tracing();
    drainpipe_demo::run(Variant::Batching).await
}
