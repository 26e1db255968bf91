// Stage execution status
// Written by the execution engine, read by graph queries

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    #[default]
    NotStarted,
    Running,
    Paused,
    Suspended,
    Succeeded,
    FailedContinue,
    Terminal,
    Canceled,
    Redirect,
    Stopped,
    Skipped,
    Buffered,
}

impl ExecutionStatus {
    /// The stage will not run again without outside intervention
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Succeeded
                | ExecutionStatus::FailedContinue
                | ExecutionStatus::Terminal
                | ExecutionStatus::Canceled
                | ExecutionStatus::Stopped
                | ExecutionStatus::Skipped
        )
    }

    /// The stage stopped the execution from progressing
    pub fn is_halt(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Terminal | ExecutionStatus::Canceled | ExecutionStatus::Stopped
        )
    }

    /// Downstream stages may proceed after this status
    pub fn is_successful(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Succeeded | ExecutionStatus::FailedContinue | ExecutionStatus::Skipped
        )
    }
}
