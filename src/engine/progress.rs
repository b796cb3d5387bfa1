use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of states in the reference build sequence.
pub const DEFAULT_TOTAL_STATES: u32 = 15;

/// Direction the operator is walking through the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyMode {
    #[default]
    Assembly,
    Disassembly,
}

impl AssemblyMode {
    pub fn toggle(self) -> Self {
        match self {
            AssemblyMode::Assembly => AssemblyMode::Disassembly,
            AssemblyMode::Disassembly => AssemblyMode::Assembly,
        }
    }

    /// Query value understood by the instruction backend.
    pub fn as_str(self) -> &'static str {
        match self {
            AssemblyMode::Assembly => "assembly",
            AssemblyMode::Disassembly => "disassembly",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "assembly" => Some(AssemblyMode::Assembly),
            "disassembly" => Some(AssemblyMode::Disassembly),
            _ => None,
        }
    }
}

impl fmt::Display for AssemblyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step the operator should look at next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "step", rename_all = "snake_case")]
pub enum StepView {
    Step(u32),
    Final,
    Unknown,
}

/// Maps an active state onto the build sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyPlan {
    total_states: u32,
}

impl Default for AssemblyPlan {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_STATES)
    }
}

impl AssemblyPlan {
    pub fn new(total_states: u32) -> Self {
        Self { total_states }
    }

    pub fn total_states(&self) -> u32 {
        self.total_states
    }

    pub fn contains(&self, state_id: u32) -> bool {
        (1..=self.total_states).contains(&state_id)
    }

    /// Assembly looks one step ahead; disassembly counts back from the finished model.
    pub fn step_for(&self, active_state: u32, mode: AssemblyMode) -> StepView {
        let step = match mode {
            AssemblyMode::Assembly => active_state.checked_add(1),
            AssemblyMode::Disassembly => self.total_states.checked_sub(active_state),
        };
        match step {
            Some(step) if (1..=self.total_states).contains(&step) => StepView::Step(step),
            Some(step) if step == self.total_states.saturating_add(1) => StepView::Final,
            _ => StepView::Unknown,
        }
    }

    pub fn is_complete(&self, active_state: u32, mode: AssemblyMode) -> bool {
        mode == AssemblyMode::Assembly && active_state == self.total_states
    }

    /// Backend key for a state (`state_<n>`).
    pub fn state_key(state_id: u32) -> String {
        format!("state_{state_id}")
    }
}
