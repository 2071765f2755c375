//! Shutdown tests for the draining sink.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use drainpipe::queue;
use drainpipe::{
    Coordinator, DrainingSink, Item, PipelineConfig, ShutdownReport, Source, StageExit, Variant,
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

async fn run_draining(
    work: &Recording,
    capacity: usize,
    cancel_at: Duration,
) -> ShutdownReport {
    let (tx, rx) = queue::bounded(capacity);
    let mut coordinator = Coordinator::new().with_stall_timeout(Duration::from_secs(60));
    coordinator.spawn(Source::new(tx));
    coordinator.spawn(DrainingSink::new(rx, work.clone()));
    coordinator
        .run(cancel_at)
        .await
        .expect("draining pipeline must shut down")
}

/// Every pushed item was either processed or drained, and the processed
/// ones came in order.
fn assert_accounted(report: &ShutdownReport, work: &Recording) {
    let source = report.source().unwrap();
    let sink = report.sink().unwrap();
    let seen = work.seen();

    let expected: Vec<u64> = (0..seen.len() as u64).collect();
    assert_eq!(seen, expected, "items must arrive in order without gaps");
    assert_eq!(sink.handled, seen.len() as u64);
    assert_eq!(
        source.handled,
        sink.handled + sink.exit.discarded(),
        "an item pushed before the close was neither processed nor drained"
    );
}

#[tokio::test(start_paused = true)]
async fn scenario_source_parked_on_full_queue() {
    // Cancel at 1s, one-slot queue, 1s of work per item.
    let work = Recording::costing(Duration::from_secs(1));
    let report = run_draining(&work, 1, Duration::from_secs(1)).await;

    assert_eq!(report.source().unwrap().exit, StageExit::Cancelled);
    assert!(report.sink().unwrap().exit.is_cancelled());
    // The sink finishes at most its current item, then drains.
    assert!(report.elapsed <= Duration::from_secs(1), "took {:?}", report.elapsed);
    assert_accounted(&report, &work);
}

#[tokio::test(start_paused = true)]
async fn drain_discards_what_the_source_pushed() {
    let work = Recording::costing(Duration::from_secs(1));
    let report = run_draining(&work, 1, Duration::from_millis(1500)).await;

    // At 1.5s the sink is working on item 1, item 2 fills the queue and
    // item 3 is parked. The drain takes both.
    assert_eq!(work.seen(), vec![0, 1]);
    assert_eq!(
        report.sink().unwrap().exit,
        StageExit::Drained { discarded: 2 }
    );
    assert_eq!(report.source().unwrap().handled, 4);
    assert_accounted(&report, &work);
}

#[tokio::test(start_paused = true)]
async fn live_across_cancellation_timings() {
    let timings = [0, 1, 250, 999, 1000, 1001, 1500, 2999, 3000];
    for capacity in [1, 2, 4] {
        for ms in timings {
            let work = Recording::costing(Duration::from_secs(1));
            let report = run_draining(&work, capacity, Duration::from_millis(ms)).await;

            assert!(
                report.elapsed <= Duration::from_secs(1),
                "cancel at {ms}ms, capacity {capacity}: took {:?}",
                report.elapsed
            );
            assert_accounted(&report, &work);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn fast_sink_still_drains_cleanly() {
    let work = Recording::costing(Duration::from_millis(1));
    let report = run_draining(&work, 1, Duration::from_millis(200)).await;

    assert!(report.source().unwrap().handled > 0);
    assert_accounted(&report, &work);
}

#[tokio::test(start_paused = true)]
async fn demo_configuration_runs_clean() {
    let config = PipelineConfig::draining().with_stall_timeout(Duration::from_secs(30));
    let report = drainpipe::run(Variant::Draining, config).await.unwrap();

    let source = report.source().unwrap();
    let sink = report.sink().unwrap();
    assert_eq!(source.exit, StageExit::Cancelled);
    assert_eq!(source.handled, sink.handled + sink.exit.discarded());
}
