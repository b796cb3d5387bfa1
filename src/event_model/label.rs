use serde::{Deserialize, Serialize};

/// Default marker that prefixes state labels emitted by the detector (`state_7`).
pub const DEFAULT_STATE_MARKER: &str = "state";

/// Outcome of classifying a detection label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelClass {
    State(u32),
    Part,
}

/// Rule deciding which labels denote assembly states.
///
/// Both variants take the state id from the first run of ASCII digits in the label. Ids must
/// be >= 1 and fit in `u32`; anything else falls back to [`LabelClass::Part`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Any label carrying a digit run is a state label.
    FirstDigitRun,
    /// Only labels starting with `marker` are state labels.
    Prefixed { marker: String },
}

impl Default for LabelPolicy {
    fn default() -> Self {
        LabelPolicy::Prefixed {
            marker: DEFAULT_STATE_MARKER.to_string(),
        }
    }
}

impl LabelPolicy {
    pub fn classify(&self, label: &str) -> LabelClass {
        if let LabelPolicy::Prefixed { marker } = self {
            if !label.starts_with(marker.as_str()) {
                return LabelClass::Part;
            }
        }
        match first_digit_run(label) {
            Some(state_id) => LabelClass::State(state_id),
            None => LabelClass::Part,
        }
    }
}

/// Parses the first run of ASCII digits in `label` as a non-zero `u32`.
pub fn first_digit_run(label: &str) -> Option<u32> {
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let digits = &label[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<u32>().ok().filter(|id| *id > 0)
}
