use assemblywatch::{
    AssemblyMode, AssemblyPlan, BatchQueue, ConsensusEstimator, ConsensusWorker, Detection,
    JsonLineLogger, LabelPolicy, StepView,
};
use serde_json::Value;
use std::io::{self, Write};
use std::thread;

fn worker_with_logger(queue_capacity: usize, logger: JsonLineLogger) -> ConsensusWorker {
    let estimator = ConsensusEstimator::new(5, 5, LabelPolicy::default()).unwrap();
    ConsensusWorker::new(
        estimator,
        AssemblyPlan::default(),
        BatchQueue::new(queue_capacity),
        logger,
    )
}

fn worker(queue_capacity: usize) -> ConsensusWorker {
    worker_with_logger(queue_capacity, JsonLineLogger::new(64).unwrap())
}

struct ClosedStderr;

impl Write for ClosedStderr {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stderr closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn state_batch(id: u32) -> Vec<Detection> {
    vec![
        Detection::new(format!("state_{id}"), 0.9),
        Detection::new("engine", 0.8),
    ]
}

#[test]
fn queue_rejects_when_saturated_and_returns_batch() {
    let queue = BatchQueue::new(2);
    queue.enqueue(state_batch(1)).unwrap();
    queue.enqueue(state_batch(2)).unwrap();
    let err = queue.enqueue(state_batch(3)).expect_err("queue saturated");
    assert_eq!(err.capacity, 2);
    assert_eq!(err.batch, state_batch(3));
    assert_eq!(queue.depth(), 2);
    assert_eq!(queue.try_dequeue(), Some(state_batch(1)));
}

#[test]
fn submit_counts_rejections_and_logs_warning() {
    let mut worker = worker(1);
    worker.submit(state_batch(1)).unwrap();
    assert!(worker.submit(state_batch(2)).is_err());
    assert_eq!(worker.telemetry().feed_rejections_total, 1);
    let warn: Value = serde_json::from_str(worker.logger().lines().last().unwrap()).unwrap();
    assert_eq!(warn["level"], "WARN");
}

#[test]
fn drain_processes_batches_in_arrival_order() {
    let mut worker = worker(16);
    let queue = worker.queue();
    for id in [3, 3, 4, 4, 4] {
        queue.enqueue(state_batch(id)).unwrap();
    }
    assert_eq!(worker.drain(), 5);
    assert!(queue.is_empty());

    let snapshot = worker.snapshots().load();
    assert_eq!(snapshot.batch_seq, 5);
    assert_eq!(snapshot.active_state, 4);
    assert_eq!(snapshot.part_frames.len(), 5);
    assert_eq!(snapshot.step, StepView::Step(5));
    assert_eq!(worker.telemetry().batches_total, 5);
    assert_eq!(worker.telemetry().active_state_changes_total, 2);
}

#[test]
fn state_changes_are_logged_at_info() {
    let mut worker = worker(4);
    worker.process(&state_batch(2));
    worker.process(&state_batch(2));
    let lines: Vec<Value> = worker
        .logger()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "INFO");
    assert_eq!(lines[0]["batch_seq"], 1);
    assert!(lines[0]["message"].as_str().unwrap().contains("active state -> 2"));
}

#[test]
fn failed_log_writes_are_counted_without_stalling() {
    let logger = JsonLineLogger::new(8)
        .unwrap()
        .with_sink(Box::new(ClosedStderr));
    let mut worker = worker_with_logger(2, logger);
    worker.process(&state_batch(2));
    worker.process(&state_batch(3));
    worker.process(&state_batch(3));
    worker.submit(state_batch(4)).unwrap();
    worker.submit(state_batch(4)).unwrap();
    assert!(worker.submit(state_batch(4)).is_err());

    // Two state changes at INFO and one rejection at WARN, all failing downstream.
    assert_eq!(worker.telemetry().log_failures_total, 3);
    assert_eq!(worker.snapshots().load().active_state, 3);
    assert_eq!(worker.drain(), 2);
    assert_eq!(worker.batch_seq(), 5);
}

#[test]
fn mode_switch_republishes_step() {
    let mut worker = worker(4);
    worker.process(&state_batch(15));
    let snapshot = worker.snapshots().load();
    assert_eq!(snapshot.step, StepView::Final);
    assert!(snapshot.complete);

    worker.set_mode(AssemblyMode::Disassembly);
    let snapshot = worker.snapshots().load();
    assert_eq!(snapshot.mode, AssemblyMode::Disassembly);
    assert_eq!(snapshot.step, StepView::Unknown);
    assert!(!snapshot.complete);
}

#[test]
fn concurrent_producers_and_readers_see_consistent_pairs() {
    let mut worker = worker(1024);
    let snapshots = worker.snapshots();
    let producers: Vec<_> = (0..4u32)
        .map(|producer| {
            let queue = worker.queue();
            thread::spawn(move || {
                for _ in 0..50 {
                    let id = producer + 1;
                    let batch = vec![Detection::new(format!("state_{id}"), f64::from(id) / 10.0)];
                    queue.enqueue(batch).unwrap();
                }
            })
        })
        .collect();
    let reader = thread::spawn(move || {
        for _ in 0..200 {
            let snapshot = snapshots.load();
            if snapshot.active_state != 0 {
                // Every event for state N carries confidence N / 10, so any mean over them does too.
                let expected = f64::from(snapshot.active_state) / 10.0;
                assert!((snapshot.confidence - expected).abs() < 1e-9);
            }
        }
    });
    for producer in producers {
        producer.join().unwrap();
    }
    while worker.drain() > 0 {}
    reader.join().unwrap();
    assert_eq!(worker.batch_seq(), 200);
    assert_eq!(worker.telemetry().state_events_total, 200);
}
