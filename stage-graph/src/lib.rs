// Stage Graph Library
// Stage model for pipeline executions: ordering, ancestry, and inherited settings

pub mod context;
pub mod error;
pub mod graph;
pub mod model;
pub mod parser;

// Re-export commonly used types
pub use error::{Error, Result};

// Re-export model types
pub use model::{
    Execution, ExecutionStatus, ExecutionType, LastModifiedDetails, Stage, StageContext,
    SyntheticStageOwner, Task, Trigger, STAGE_TIMEOUT_OVERRIDE_KEY,
};

// Re-export graph types
pub use graph::{
    AncestryResolver, DownstreamResolver, GraphError, GraphErrorKind, TimeoutResolver,
    TopologicalSorter,
};

// Re-export context view
pub use context::{decode_base64, map_context, map_context_at, ContextDecoder, ContextError};

// Re-export loader types
pub use parser::{ExecutionFormat, ExecutionParser, ParseError, ParseErrorKind};
