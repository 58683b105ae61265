//! Per-step execution status.

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Lifecycle of a single step within one workflow run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not started yet
    Pending,
    /// Operation in flight
    Running,
    /// Operation produced a context
    Completed,
    /// Operation returned an error
    Failed,
}

impl StepStatus {
    /// Returns true once the step can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }

    /// Returns true if this status can move to `target`.
    pub fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (StepStatus::Pending, StepStatus::Running)
                | (StepStatus::Running, StepStatus::Completed | StepStatus::Failed)
        )
    }

    /// Move to `target`, rejecting anything the lifecycle does not allow.
    pub fn transition(&mut self, target: StepStatus) -> Result<()> {
        if !self.can_transition_to(&target) {
            return Err(FlowError::invalid_transition(*self, target));
        }
        *self = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_status_transitions() {
        let mut status = StepStatus::Pending;
        status.transition(StepStatus::Running).unwrap();
        status.transition(StepStatus::Completed).unwrap();
        assert!(status.is_terminal());

        // Completed steps never run again
        assert!(status.transition(StepStatus::Running).is_err());

        // Pending cannot skip straight to a terminal state
        assert!(!StepStatus::Pending.can_transition_to(&StepStatus::Completed));
        assert!(StepStatus::Running.can_transition_to(&StepStatus::Failed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!StepStatus::Pending.is_terminal());
        assert!(!StepStatus::Running.is_terminal());
        assert!(StepStatus::Completed.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
    }
}
