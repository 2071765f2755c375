//! Shutdown tests for the batching sink.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use drainpipe::queue;
use drainpipe::{
    BatchingSink, Coordinator, Item, PipelineConfig, ShutdownReport, Source, StageExit, Variant,
    Work,
};

/// Work that remembers every item it was handed.
#[derive(Clone, Default)]
struct Recording {
    seen: Arc<Mutex<Vec<Item>>>,
    cost: Duration,
}

impl Recording {
    fn costing(cost: Duration) -> Self {
        Self {
            cost,
            ..Self::default()
        }
    }

    fn seen(&self) -> Vec<u64> {
        self.seen.lock().unwrap().iter().map(|i| i.get()).collect()
    }
}

impl Work for Recording {
    async fn process(&mut self, item: Item) {
        self.seen.lock().unwrap().push(item);
        if !self.cost.is_zero() {
            tokio::time::sleep(self.cost).await;
        }
    }
}

async fn run_batching(
    interval: Duration,
    work: &Recording,
    batch_size: usize,
    capacity: usize,
    cancel_at: Duration,
) -> ShutdownReport {
    let (tx, rx) = queue::bounded(capacity);
    let mut coordinator = Coordinator::new().with_stall_timeout(Duration::from_secs(60));
    coordinator.spawn(Source::new(tx).with_interval(interval));
    coordinator.spawn(BatchingSink::new(rx, work.clone(), batch_size));
    coordinator
        .run(cancel_at)
        .await
        .expect("batching pipeline must shut down")
}

fn assert_in_order(seen: &[u64]) {
    let expected: Vec<u64> = (0..seen.len() as u64).collect();
    assert_eq!(seen, expected.as_slice(), "items must arrive in order without gaps");
}

#[tokio::test(start_paused = true)]
async fn scenario_cancel_mid_batch() {
    // Cancel at 2s, batch of 5, 1s of work per item.
    let work = Recording::costing(Duration::from_secs(1));
    let report = run_batching(Duration::ZERO, &work, 5, 1, Duration::from_secs(2)).await;

    let source = report.source().unwrap();
    let sink = report.sink().unwrap();
    assert_eq!(source.exit, StageExit::Cancelled);
    assert_eq!(sink.exit, StageExit::Cancelled);

    // Items 2 and 3 finish the batch after cancellation; the next pop sees
    // the close at 4s.
    assert_eq!(report.elapsed, Duration::from_secs(2));
    assert_eq!(work.seen(), vec![0, 1, 2, 3]);
    assert_eq!(source.handled, 4);
    assert_eq!(sink.handled, 4);
}

#[tokio::test(start_paused = true)]
async fn close_releases_parked_pop() {
    // A slow source leaves the sink parked on an empty queue mid-batch.
    let work = Recording::default();
    let report = run_batching(
        Duration::from_secs(1),
        &work,
        5,
        1,
        Duration::from_millis(2500),
    )
    .await;

    // Source wakes at 3s, sees the signal, closes; the parked pop returns.
    assert!(report.elapsed <= Duration::from_secs(1), "took {:?}", report.elapsed);
    assert_eq!(work.seen(), vec![0, 1]);
    assert_eq!(report.source().unwrap().handled, 2);
    assert_eq!(report.sink().unwrap().exit, StageExit::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn batch_of_one_reacts_within_one_item() {
    // Source every 1s, 600ms of work: the sink keeps up, so the source
    // never parks on a full queue.
    let work = Recording::costing(Duration::from_millis(600));
    let report = run_batching(
        Duration::from_secs(1),
        &work,
        1,
        1,
        Duration::from_millis(2500),
    )
    .await;

    assert!(report.elapsed <= Duration::from_secs(1), "took {:?}", report.elapsed);
    assert_eq!(work.seen(), vec![0, 1]);
}

#[tokio::test(start_paused = true)]
async fn live_across_cancellation_timings() {
    // The sink outpaces the source, so whenever the sink leaves, the source
    // is not parked in a push and reaches its close.
    let timings = [0, 1, 250, 999, 1000, 1001, 2500, 4999, 5000];
    for capacity in [1, 3] {
        for batch_size in [1, 5] {
            for ms in timings {
                let work = Recording::costing(Duration::from_millis(500));
                let report = run_batching(
                    Duration::from_secs(1),
                    &work,
                    batch_size,
                    capacity,
                    Duration::from_millis(ms),
                )
                .await;

                let bound = Duration::from_secs(1) + Duration::from_millis(500) * batch_size as u32;
                assert!(
                    report.elapsed <= bound,
                    "cancel at {ms}ms, batch {batch_size}, capacity {capacity}: took {:?}",
                    report.elapsed
                );
                assert_in_order(&work.seen());
                let source = report.source().unwrap();
                let sink = report.sink().unwrap();
                assert!(source.handled - sink.handled <= capacity as u64);
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn demo_configuration_runs_clean() {
    let config = PipelineConfig::batching().with_stall_timeout(Duration::from_secs(30));
    let report = drainpipe::run(Variant::Batching, config).await.unwrap();

    assert_eq!(report.source().unwrap().exit, StageExit::Cancelled);
    assert!(report.sink().unwrap().exit.is_cancelled());
}
