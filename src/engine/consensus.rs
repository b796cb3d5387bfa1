use crate::engine::parts::PartAggregator;
use crate::event_model::detection::clamp_confidence;
use crate::event_model::{
    Detection, LabelClass, LabelPolicy, PartFrame, PartObservation, StateEvent,
};
use crate::ring::{RingBuffer, RingBufferError};
use serde::Serialize;
use std::collections::HashMap;

/// Sentinel reported before any state has won a consensus run.
pub const NO_STATE: u32 = 0;

/// Running occurrence count and mean confidence for one state id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateAggregate {
    pub occurrences: u32,
    pub confidence: f64,
}

impl StateAggregate {
    fn first(confidence: f64) -> Self {
        Self {
            occurrences: 1,
            confidence,
        }
    }

    fn absorb(&mut self, confidence: f64) {
        let count = f64::from(self.occurrences);
        self.confidence = (self.confidence * count + confidence) / (count + 1.0);
        self.occurrences += 1;
    }
}

/// Per-state aggregates in first-seen order over the state window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateTally {
    entries: Vec<(u32, StateAggregate)>,
}

impl StateTally {
    /// Folds events oldest to newest.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a StateEvent>) -> Self {
        let mut entries: Vec<(u32, StateAggregate)> = Vec::new();
        let mut slots: HashMap<u32, usize> = HashMap::new();
        for event in events {
            match slots.get(&event.state_id) {
                Some(&slot) => entries[slot].1.absorb(event.confidence),
                None => {
                    slots.insert(event.state_id, entries.len());
                    entries.push((event.state_id, StateAggregate::first(event.confidence)));
                }
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[(u32, StateAggregate)] {
        &self.entries
    }

    pub fn get(&self, state_id: u32) -> Option<&StateAggregate> {
        self.entries
            .iter()
            .find(|(id, _)| *id == state_id)
            .map(|(_, aggregate)| aggregate)
    }

    /// State with the strictly highest occurrence count; ties keep the first-seen state.
    pub fn leader(&self) -> Option<(u32, StateAggregate)> {
        let mut leader: Option<(u32, StateAggregate)> = None;
        for &(state_id, aggregate) in &self.entries {
            let replaces = match leader {
                None => true,
                Some((_, current)) => aggregate.occurrences > current.occurrences,
            };
            if replaces {
                leader = Some((state_id, aggregate));
            }
        }
        leader
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Current best estimate of the assembly state. State and confidence change together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveState {
    pub state_id: u32,
    pub confidence: f64,
}

impl Default for ActiveState {
    fn default() -> Self {
        Self {
            state_id: NO_STATE,
            confidence: 0.0,
        }
    }
}

impl ActiveState {
    /// Whether a consensus run has produced a state yet.
    pub fn is_established(&self) -> bool {
        self.state_id != NO_STATE
    }
}

/// What `ingest_batch` did with a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub state_events: usize,
    pub part_observations: usize,
    pub frame_recorded: bool,
    pub state_evictions: usize,
    pub frame_evicted: bool,
}

/// Winner of a consensus run over a non-empty state window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusOutcome {
    pub state_id: u32,
    pub confidence: f64,
    pub occurrences: u32,
    pub window_len: usize,
    pub changed: bool,
}

/// Streaming estimator over a window of state events and a window of part frames.
///
/// The estimator owns no timers. Callers hand it batches in arrival order and call
/// [`ConsensusEstimator::compute_active_state`] right after each
/// [`ConsensusEstimator::ingest_batch`], or use [`ConsensusEstimator::process_batch`].
#[derive(Debug, Clone)]
pub struct ConsensusEstimator {
    states: RingBuffer<StateEvent>,
    parts: PartAggregator,
    policy: LabelPolicy,
    active: ActiveState,
}

impl ConsensusEstimator {
    pub fn new(
        state_window: usize,
        part_window: usize,
        policy: LabelPolicy,
    ) -> Result<Self, RingBufferError> {
        Ok(Self {
            states: RingBuffer::new(state_window)?,
            parts: PartAggregator::new(part_window)?,
            policy,
            active: ActiveState::default(),
        })
    }

    /// Splits a batch into state events and a single part frame.
    ///
    /// When the batch holds state detections the recorded confidence tracks the last one
    /// until the next consensus run; otherwise it is left untouched.
    pub fn ingest_batch(&mut self, detections: &[Detection]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let mut observations = Vec::new();
        for detection in detections {
            let confidence = detection.clamped_confidence();
            match self.policy.classify(&detection.label) {
                LabelClass::State(state_id) => {
                    let event = StateEvent {
                        state_id,
                        confidence,
                    };
                    if self.states.push(event).is_some() {
                        summary.state_evictions += 1;
                    }
                    self.active.confidence = confidence;
                    summary.state_events += 1;
                }
                LabelClass::Part => observations.push(PartObservation {
                    class_name: detection.label.clone(),
                    confidence,
                }),
            }
        }
        summary.part_observations = observations.len();
        if !observations.is_empty() {
            summary.frame_evicted = self.parts.record(PartFrame::new(observations)).is_some();
            summary.frame_recorded = true;
        }
        summary
    }

    /// Recomputes the active state from the state window.
    ///
    /// Returns `None` and leaves the active state untouched when the window is empty.
    pub fn compute_active_state(&mut self) -> Option<ConsensusOutcome> {
        let (state_id, aggregate) = self.tally().leader()?;
        let changed = state_id != self.active.state_id;
        self.active = ActiveState {
            state_id,
            confidence: clamp_confidence(aggregate.confidence),
        };
        Some(ConsensusOutcome {
            state_id,
            confidence: self.active.confidence,
            occurrences: aggregate.occurrences,
            window_len: self.states.len(),
            changed,
        })
    }

    /// Ingests a batch and immediately recomputes consensus.
    pub fn process_batch(
        &mut self,
        detections: &[Detection],
    ) -> (BatchSummary, Option<ConsensusOutcome>) {
        let summary = self.ingest_batch(detections);
        let outcome = self.compute_active_state();
        (summary, outcome)
    }

    /// Aggregates over the current state window without touching the active state.
    pub fn tally(&self) -> StateTally {
        StateTally::from_events(self.states.iter())
    }

    pub fn active(&self) -> ActiveState {
        self.active
    }

    pub fn active_state(&self) -> u32 {
        self.active.state_id
    }

    pub fn state_confidence(&self) -> f64 {
        self.active.confidence
    }

    pub fn state_window(&self) -> &RingBuffer<StateEvent> {
        &self.states
    }

    pub fn parts(&self) -> &PartAggregator {
        &self.parts
    }

    /// Part frames oldest to newest, for the external set checker.
    pub fn recent_part_frames(&self) -> Vec<PartFrame> {
        self.parts.recent_frames()
    }

    pub fn policy(&self) -> &LabelPolicy {
        &self.policy
    }
}
