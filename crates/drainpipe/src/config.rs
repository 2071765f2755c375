//! Pipeline tuning knobs.

use std::time::Duration;

/// Settings shared by both pipeline variants.
///
/// ```rust
/// use drainpipe::PipelineConfig;
/// use std::time::Duration;
///
/// let config = PipelineConfig::batching()
///     .with_batch_size(3)
///     .with_stall_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.batch_size, 3);
/// assert_eq!(config.shutdown_after, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Queue capacity.
    pub capacity: usize,
    /// Delay the source spends producing each item. Zero means as fast as
    /// the queue allows.
    pub produce_interval: Duration,
    /// Simulated processing time per consumed item.
    pub work: Duration,
    /// Pops the batching sink performs between cancellation checks.
    ///
    /// Larger batches mean fewer checks and a slower reaction to
    /// cancellation: up to `batch_size * work` after the signal fires.
    pub batch_size: usize,
    /// How long the coordinator waits before cancelling.
    pub shutdown_after: Duration,
    /// Give up joining the stages this long after cancellation.
    ///
    /// `None` waits forever.
    pub stall_timeout: Option<Duration>,
}

impl PipelineConfig {
    /// Batching-sink demo: cancel after two seconds.
    pub fn batching() -> Self {
        Self::default()
    }

    /// Draining-sink demo: cancel after one second.
    pub fn draining() -> Self {
        Self::default().with_shutdown_after(Duration::from_secs(1))
    }

    /// Set the queue capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be at least 1");
        self.capacity = capacity;
        self
    }

    /// Set the source pacing delay.
    pub fn with_produce_interval(mut self, interval: Duration) -> Self {
        self.produce_interval = interval;
        self
    }

    /// Set the per-item sink work.
    pub fn with_work(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    /// Set the batching sink's batch size.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be at least 1");
        self.batch_size = batch_size;
        self
    }

    /// Set the delay before the coordinator cancels.
    pub fn with_shutdown_after(mut self, delay: Duration) -> Self {
        self.shutdown_after = delay;
        self
    }

    /// Fail the join instead of waiting forever.
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = Some(timeout);
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: 1,
            produce_interval: Duration::ZERO,
            work: Duration::from_secs(1),
            batch_size: 5,
            shutdown_after: Duration::from_secs(2),
            stall_timeout: None,
        }
    }
}
