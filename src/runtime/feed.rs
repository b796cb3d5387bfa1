use crate::engine::{
    AssemblyMode, AssemblyPlan, BatchSummary, ConsensusEstimator, ConsensusOutcome, StepView,
};
use crate::event_model::{Detection, PartFrame};
use crate::observability::{ConsensusTelemetry, JsonLineLogger, LogLevel};
use crossbeam_queue::ArrayQueue;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

const LOG_MODULE: &str = "assemblywatch::feed";

/// Error returned when the feed queue is saturated. The rejected batch is handed back.
#[derive(Debug, Error)]
#[error("feed queue saturated at {capacity} batches")]
pub struct FeedError {
    pub capacity: usize,
    pub batch: Vec<Detection>,
}

/// Lock-free bounded queue between the device feed and the consensus worker.
///
/// Producers never block: a full queue rejects the batch instead.
#[derive(Debug, Clone)]
pub struct BatchQueue {
    queue: Arc<ArrayQueue<Vec<Detection>>>,
    capacity: usize,
}

impl BatchQueue {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "feed queue capacity must be > 0");
        Self {
            queue: Arc::new(ArrayQueue::new(capacity)),
            capacity,
        }
    }

    pub fn enqueue(&self, batch: Vec<Detection>) -> Result<(), FeedError> {
        self.queue.push(batch).map_err(|batch| FeedError {
            capacity: self.capacity,
            batch,
        })
    }

    pub fn try_dequeue(&self) -> Option<Vec<Detection>> {
        self.queue.pop()
    }

    pub fn depth(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Everything a presentation layer reads, published as one unit after each batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusSnapshot {
    pub batch_seq: u64,
    pub active_state: u32,
    pub confidence: f64,
    pub mode: AssemblyMode,
    pub step: StepView,
    pub complete: bool,
    pub part_frames: Vec<PartFrame>,
}

impl ConsensusSnapshot {
    fn initial(plan: &AssemblyPlan, mode: AssemblyMode) -> Self {
        Self {
            batch_seq: 0,
            active_state: 0,
            confidence: 0.0,
            mode,
            step: plan.step_for(0, mode),
            complete: false,
            part_frames: Vec::new(),
        }
    }
}

/// Cloneable read handle onto the latest published snapshot.
#[derive(Debug, Clone)]
pub struct SharedSnapshot {
    inner: Arc<Mutex<Arc<ConsensusSnapshot>>>,
}

impl SharedSnapshot {
    fn new(initial: ConsensusSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Arc::new(initial))),
        }
    }

    /// Latest snapshot; state and confidence always come from the same batch.
    pub fn load(&self) -> Arc<ConsensusSnapshot> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, snapshot: ConsensusSnapshot) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }
}

/// Result of processing one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedBatch {
    pub batch_seq: u64,
    pub summary: BatchSummary,
    pub outcome: Option<ConsensusOutcome>,
}

/// Single consumer that owns the estimator and serialises batches in arrival order.
#[derive(Debug)]
pub struct ConsensusWorker {
    estimator: ConsensusEstimator,
    plan: AssemblyPlan,
    mode: AssemblyMode,
    queue: BatchQueue,
    shared: SharedSnapshot,
    telemetry: ConsensusTelemetry,
    logger: JsonLineLogger,
    batch_seq: u64,
}

impl ConsensusWorker {
    pub fn new(
        estimator: ConsensusEstimator,
        plan: AssemblyPlan,
        queue: BatchQueue,
        logger: JsonLineLogger,
    ) -> Self {
        let mode = AssemblyMode::default();
        Self {
            shared: SharedSnapshot::new(ConsensusSnapshot::initial(&plan, mode)),
            estimator,
            plan,
            mode,
            queue,
            telemetry: ConsensusTelemetry::default(),
            logger,
            batch_seq: 0,
        }
    }

    /// Producer handle for the device feed.
    pub fn queue(&self) -> BatchQueue {
        self.queue.clone()
    }

    /// Reader handle for the presentation layer.
    pub fn snapshots(&self) -> SharedSnapshot {
        self.shared.clone()
    }

    /// Submits a batch on behalf of a producer, counting rejections.
    pub fn submit(&mut self, batch: Vec<Detection>) -> Result<(), FeedError> {
        let Err(err) = self.queue.enqueue(batch) else {
            return Ok(());
        };
        self.telemetry.record_feed_rejection();
        let message = format!("dropped batch of {} detections: {err}", err.batch.len());
        self.log(LogLevel::Warn, &message);
        Err(err)
    }

    /// Ingests one batch and recomputes consensus before returning.
    pub fn process(&mut self, batch: &[Detection]) -> ProcessedBatch {
        self.batch_seq += 1;
        let (summary, outcome) = self.estimator.process_batch(batch);
        self.telemetry.record_batch(&summary, outcome.as_ref());
        if self.logger.enabled(LogLevel::Debug) {
            let message = format!(
                "batch: {} state events, {} part observations",
                summary.state_events, summary.part_observations
            );
            self.log(LogLevel::Debug, &message);
        }
        if let Some(outcome) = outcome.filter(|outcome| outcome.changed) {
            let message = format!(
                "active state -> {} (confidence {:.3}, {}/{} events)",
                outcome.state_id, outcome.confidence, outcome.occurrences, outcome.window_len
            );
            self.log(LogLevel::Info, &message);
        }
        self.publish();
        ProcessedBatch {
            batch_seq: self.batch_seq,
            summary,
            outcome,
        }
    }

    /// Processes queued batches in FIFO order until the queue is empty.
    pub fn drain(&mut self) -> usize {
        let mut processed = 0;
        while let Some(batch) = self.queue.try_dequeue() {
            self.process(&batch);
            processed += 1;
        }
        processed
    }

    /// Switches between assembly and disassembly and republishes the step view.
    pub fn set_mode(&mut self, mode: AssemblyMode) {
        self.mode = mode;
        self.publish();
    }

    pub fn mode(&self) -> AssemblyMode {
        self.mode
    }

    pub fn estimator(&self) -> &ConsensusEstimator {
        &self.estimator
    }

    pub fn plan(&self) -> &AssemblyPlan {
        &self.plan
    }

    pub fn telemetry(&self) -> &ConsensusTelemetry {
        &self.telemetry
    }

    pub fn logger(&self) -> &JsonLineLogger {
        &self.logger
    }

    pub fn batch_seq(&self) -> u64 {
        self.batch_seq
    }

    fn publish(&self) {
        let active = self.estimator.active();
        self.shared.publish(ConsensusSnapshot {
            batch_seq: self.batch_seq,
            active_state: active.state_id,
            confidence: active.confidence,
            mode: self.mode,
            step: self.plan.step_for(active.state_id, self.mode),
            complete: self.plan.is_complete(active.state_id, self.mode),
            part_frames: self.estimator.recent_part_frames(),
        });
    }

    fn log(&mut self, level: LogLevel, message: &str) {
        // Logging never stalls the feed; failed writes only show up in telemetry.
        if self
            .logger
            .log(now_ms(), level, LOG_MODULE, self.batch_seq, message)
            .is_err()
        {
            self.telemetry.record_log_failure();
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis().min(u128::from(u64::MAX)) as u64)
        .unwrap_or(0)
}
