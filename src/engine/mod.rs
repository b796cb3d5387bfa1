//! Consensus over the state window, the part-frame window, and build-sequence mapping.

pub mod consensus;
pub mod parts;
pub mod progress;

pub use consensus::{
    ActiveState, BatchSummary, ConsensusEstimator, ConsensusOutcome, StateAggregate, StateTally,
    NO_STATE,
};
pub use parts::{FrameSelector, PartAggregator};
pub use progress::{AssemblyMode, AssemblyPlan, StepView, DEFAULT_TOTAL_STATES};
