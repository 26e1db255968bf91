// Stage Graph Data Model
// Executions, their stages, and the status values the engine writes

pub mod execution;
pub mod stage;
pub mod status;

pub use execution::{Execution, ExecutionType, Trigger};
pub use stage::{
    LastModifiedDetails, Stage, StageContext, SyntheticStageOwner, Task,
    STAGE_TIMEOUT_OVERRIDE_KEY,
};
pub use status::ExecutionStatus;
