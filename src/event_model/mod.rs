//! Data shapes flowing from the detector feed into the consensus buffers.

pub mod detection;
pub mod label;

pub use detection::{BoundingBox, Detection, PartFrame, PartObservation, StateEvent};
pub use label::{first_digit_run, LabelClass, LabelPolicy, DEFAULT_STATE_MARKER};
