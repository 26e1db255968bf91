// Execution Data Model
// Arena owning every stage of one execution, indexed by stage id

use super::stage::Stage;
use crate::graph::GraphError;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionType {
    #[default]
    Pipeline,
    Orchestration,
}

/// What started the execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Trigger {
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// A workflow instance and the stages that belong to it.
///
/// Stages refer back to their execution by id only. Every graph query borrows
/// the execution for its whole duration, so it always sees one snapshot of the
/// stage set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ExecutionDefinition")]
pub struct Execution {
    id: String,
    #[serde(rename = "type")]
    execution_type: ExecutionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    application: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    trigger: Trigger,
    stages: Vec<Stage>,
    #[serde(skip)]
    stage_indices: HashMap<String, usize>,
}

/// Serialized form of an execution before its stage index is built
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecutionDefinition {
    #[serde(default = "generate_execution_id")]
    id: String,
    #[serde(rename = "type", default)]
    execution_type: ExecutionType,
    application: Option<String>,
    name: Option<String>,
    #[serde(default)]
    trigger: Trigger,
    #[serde(default)]
    stages: Vec<Stage>,
}

fn generate_execution_id() -> String {
    Uuid::new_v4().to_string()
}

impl TryFrom<ExecutionDefinition> for Execution {
    type Error = GraphError;

    fn try_from(definition: ExecutionDefinition) -> Result<Self, Self::Error> {
        let mut execution = Execution {
            id: definition.id,
            execution_type: definition.execution_type,
            application: definition.application,
            name: definition.name,
            trigger: definition.trigger,
            stages: Vec::with_capacity(definition.stages.len()),
            stage_indices: HashMap::new(),
        };

        for stage in definition.stages {
            execution.add_stage(stage)?;
        }

        Ok(execution)
    }
}

impl Execution {
    pub fn new(execution_type: ExecutionType, application: impl Into<String>) -> Self {
        Self {
            id: generate_execution_id(),
            execution_type,
            application: Some(application.into()),
            name: None,
            trigger: Trigger::default(),
            stages: Vec::new(),
            stage_indices: HashMap::new(),
        }
    }

    pub fn pipeline(application: impl Into<String>) -> Self {
        Self::new(ExecutionType::Pipeline, application)
    }

    pub fn orchestration(application: impl Into<String>) -> Self {
        Self::new(ExecutionType::Orchestration, application)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        for stage in &mut self.stages {
            stage.set_execution_id(&self.id);
        }
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn execution_type(&self) -> ExecutionType {
        self.execution_type
    }

    pub fn application(&self) -> Option<&str> {
        self.application.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// All stages in insertion order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_by_id(&self, id: &str) -> Option<&Stage> {
        self.stage_indices.get(id).map(|&idx| &self.stages[idx])
    }

    pub fn stage_by_id_mut(&mut self, id: &str) -> Option<&mut Stage> {
        let idx = *self.stage_indices.get(id)?;
        Some(&mut self.stages[idx])
    }

    /// First top-level stage carrying `ref_id`
    pub fn stage_by_ref_id(&self, ref_id: &str) -> Option<&Stage> {
        self.stages
            .iter()
            .find(|s| s.parent_stage_id().is_none() && s.ref_id() == Some(ref_id))
    }

    /// Append a stage, taking ownership of it.
    ///
    /// Stages may be added while the execution runs (e.g. injected synthetic
    /// stages). An id already present is rejected.
    pub fn add_stage(&mut self, mut stage: Stage) -> Result<&Stage, GraphError> {
        if self.stage_indices.contains_key(stage.id()) {
            return Err(GraphError::duplicate_stage(stage.id()));
        }

        stage.set_execution_id(&self.id);
        let idx = self.stages.len();
        self.stage_indices.insert(stage.id().to_string(), idx);
        self.stages.push(stage);

        Ok(&self.stages[idx])
    }
}
