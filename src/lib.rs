//! Streaming assembly-state consensus over noisy object-detection batches.
//!
//! Detector messages are split into state events and part frames, each kept in a
//! fixed-capacity [`RingBuffer`]. The most frequent state in the state window becomes the
//! active state; the part window is exported as-is for external set checking.

pub mod app;
pub mod config;
pub mod engine;
pub mod event_model;
pub mod observability;
pub mod ring;
pub mod runtime;
pub mod wire;

pub use config::{
    ConfigError, ConsensusConfig, LogConfig, DEFAULT_FEED_QUEUE_CAPACITY, DEFAULT_WINDOW,
};
pub use engine::{
    ActiveState, AssemblyMode, AssemblyPlan, BatchSummary, ConsensusEstimator, ConsensusOutcome,
    FrameSelector, PartAggregator, StateAggregate, StateTally, StepView, DEFAULT_TOTAL_STATES,
    NO_STATE,
};
pub use event_model::{
    first_digit_run, BoundingBox, Detection, LabelClass, LabelPolicy, PartFrame, PartObservation,
    StateEvent, DEFAULT_STATE_MARKER,
};
pub use observability::{
    ConsensusTelemetry, JsonLineLogger, LogLevel, LoggingError, DEFAULT_RETAINED_LINES,
};
pub use ring::{RingBuffer, RingBufferError};
pub use runtime::{
    BatchQueue, ConsensusSnapshot, ConsensusWorker, FeedError, ProcessedBatch, SharedSnapshot,
};
pub use wire::{decode_batch, decode_batches, load_batches, WireError};
