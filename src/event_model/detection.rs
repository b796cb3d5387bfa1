use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pixel-space box reported alongside a detection. Carried through but not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One entry of a device message: class label plus detector confidence.
///
/// On input the label is taken from `name`, then `label`, then `class` when that is a string.
/// Detectors that send a numeric class id alongside `name` decode without error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDetection")]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox: None,
        }
    }

    /// Confidence clamped to `[0, 1]`; NaN maps to `0.0`.
    pub fn clamped_confidence(&self) -> f64 {
        clamp_confidence(self.confidence)
    }
}

#[derive(Deserialize)]
struct RawDetection {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    class: Option<Value>,
    confidence: f64,
    #[serde(default)]
    bbox: Option<BoundingBox>,
}

impl TryFrom<RawDetection> for Detection {
    type Error = String;

    fn try_from(raw: RawDetection) -> Result<Self, Self::Error> {
        let class_name = match raw.class {
            Some(Value::String(class)) => Some(class),
            _ => None,
        };
        let label = raw
            .name
            .or(raw.label)
            .or(class_name)
            .ok_or_else(|| "detection has no string `name`, `label` or `class`".to_string())?;
        Ok(Self {
            label,
            confidence: raw.confidence,
            bbox: raw.bbox,
        })
    }
}

/// A detection whose label identified an assembly state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateEvent {
    pub state_id: u32,
    pub confidence: f64,
}

/// A detection of a physical part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartObservation {
    pub class_name: String,
    pub confidence: f64,
}

/// All part observations from a single batch, in arrival order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PartFrame {
    observations: Vec<PartObservation>,
}

impl PartFrame {
    pub fn new(observations: Vec<PartObservation>) -> Self {
        Self { observations }
    }

    pub fn observations(&self) -> &[PartObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Mean confidence across the frame, `None` for an empty frame.
    pub fn mean_confidence(&self) -> Option<f64> {
        if self.observations.is_empty() {
            return None;
        }
        let total: f64 = self.observations.iter().map(|obs| obs.confidence).sum();
        Some(total / self.observations.len() as f64)
    }

    /// Number of observations carrying `class_name`.
    pub fn count_of(&self, class_name: &str) -> usize {
        self.observations
            .iter()
            .filter(|obs| obs.class_name == class_name)
            .count()
    }
}

impl FromIterator<PartObservation> for PartFrame {
    fn from_iter<I: IntoIterator<Item = PartObservation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

pub(crate) fn clamp_confidence(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}
