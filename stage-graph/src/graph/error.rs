// Graph error types
// Structural failures raised while ordering or walking a stage graph

use thiserror::Error;

/// Error type for graph operations
#[derive(Debug, Clone, Error)]
#[error("graph error: {message}")]
pub struct GraphError {
    pub message: String,
    pub kind: GraphErrorKind,
    /// `requisiteStageRefIds->refId` edges of the input, set for `InvalidRelationships`
    pub edges: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphErrorKind {
    /// Sort cannot make progress (cycle or reference to an unknown refId)
    InvalidRelationships,
    /// A parentStageId that does not resolve to any stage
    DanglingParent,
    /// A stage reached again while it is still being walked
    CyclicDependency,
    /// Two stages with the same id in one execution
    DuplicateStage,
}

impl GraphError {
    pub fn invalid_relationships(edges: Vec<String>) -> Self {
        Self {
            message: format!("invalid stage relationships found: {}", edges.join(", ")),
            kind: GraphErrorKind::InvalidRelationships,
            edges,
        }
    }

    pub fn dangling_parent(stage_id: &str, parent_stage_id: &str) -> Self {
        Self {
            message: format!(
                "could not find stage by parentStageId (stage: {}, parentStageId: {})",
                stage_id, parent_stage_id
            ),
            kind: GraphErrorKind::DanglingParent,
            edges: Vec::new(),
        }
    }

    pub fn cyclic(path: &[&str]) -> Self {
        Self {
            message: format!("circular dependency detected in stages: {}", path.join(" -> ")),
            kind: GraphErrorKind::CyclicDependency,
            edges: Vec::new(),
        }
    }

    pub fn duplicate_stage(stage_id: &str) -> Self {
        Self {
            message: format!("stage '{}' already exists in execution", stage_id),
            kind: GraphErrorKind::DuplicateStage,
            edges: Vec::new(),
        }
    }
}
