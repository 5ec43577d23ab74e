//! Phase execution.

pub mod naming;
pub mod phase;

pub use naming::step_display_name;
pub use phase::{
    PhaseReport, PhaseSteps, ProgressDisplay, RunOptions, StepOutcome, StepRunner,
};

use std::fmt;

/// Direction of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// Checks, optional cleanup, then run steps.
    Forward,
    /// Revert steps only.
    Revert,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Forward => "forward",
            PhaseKind::Revert => "revert",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
