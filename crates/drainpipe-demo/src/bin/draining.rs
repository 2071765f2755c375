//! An unthrottled source feeding a slow sink through a one-slot queue.
//!
//! Cancellation fires one second in. By then the source is parked pushing
//! into the full queue and has not seen the signal. The sink drains after
//! cancelling, the parked push completes, and the source closes the queue.

use std::error::Error;

use drainpipe::Variant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    drainpipe_demo::init_tracing();
    drainpipe_demo::run(Variant::Draining).await
}
