// Stage Data Model
// A single node of an execution's stage graph plus its wire representation

use super::execution::{Execution, ExecutionType};
use super::status::ExecutionStatus;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use tracing::warn;
use uuid::Uuid;

/// Context key holding a stage's timeout override in milliseconds
pub const STAGE_TIMEOUT_OVERRIDE_KEY: &str = "stageTimeoutMs";

const REF_ID_KEY: &str = "refId";
const REQUISITE_STAGE_REF_IDS_KEY: &str = "requisiteStageRefIds";

/// Stage inputs, keyed by name
pub type StageContext = Map<String, Value>;

// =============================================================================
// SyntheticStageOwner
// =============================================================================

/// Position of an injected stage relative to its parent's own work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyntheticStageOwner {
    /// A regular stage
    #[default]
    NotSynthetic,
    /// Runs before the parent stage's tasks
    StageBefore,
    /// Runs after the parent stage's tasks
    StageAfter,
}

impl SyntheticStageOwner {
    pub fn is_synthetic(&self) -> bool {
        !self.is_not_synthetic()
    }

    pub fn is_not_synthetic(&self) -> bool {
        matches!(self, SyntheticStageOwner::NotSynthetic)
    }

    fn wire_name(&self) -> Option<&'static str> {
        match self {
            SyntheticStageOwner::NotSynthetic => None,
            SyntheticStageOwner::StageBefore => Some("STAGE_BEFORE"),
            SyntheticStageOwner::StageAfter => Some("STAGE_AFTER"),
        }
    }
}

impl Serialize for SyntheticStageOwner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.wire_name() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for SyntheticStageOwner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)?.as_deref() {
            None => Ok(SyntheticStageOwner::NotSynthetic),
            Some("STAGE_BEFORE") => Ok(SyntheticStageOwner::StageBefore),
            Some("STAGE_AFTER") => Ok(SyntheticStageOwner::StageAfter),
            Some(other) => Err(de::Error::unknown_variant(
                other,
                &["STAGE_BEFORE", "STAGE_AFTER"],
            )),
        }
    }
}

// =============================================================================
// Task / LastModifiedDetails
// =============================================================================

/// A task inside a stage. Only the id is interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Audit record of the last change made to a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastModifiedDetails {
    user: String,
    #[serde(default)]
    allowed_accounts: BTreeSet<String>,
    last_modified_time: i64,
}

impl LastModifiedDetails {
    pub fn new(
        user: impl Into<String>,
        allowed_accounts: impl IntoIterator<Item = impl Into<String>>,
        last_modified_time: i64,
    ) -> Self {
        Self {
            user: user.into(),
            allowed_accounts: allowed_accounts.into_iter().map(Into::into).collect(),
            last_modified_time,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Snapshot of the accounts; changing it does not touch the record
    pub fn allowed_accounts(&self) -> BTreeSet<String> {
        self.allowed_accounts.clone()
    }

    pub fn last_modified_time(&self) -> i64 {
        self.last_modified_time
    }
}

// =============================================================================
// Stage
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    #[serde(default = "generate_stage_id")]
    id: String,

    /// Owning execution, stamped when the stage joins an execution
    #[serde(skip)]
    execution_id: String,

    #[serde(
        default,
        deserialize_with = "deserialize_ref_id",
        skip_serializing_if = "Option::is_none"
    )]
    ref_id: Option<String>,

    #[serde(rename = "type")]
    stage_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default)]
    status: ExecutionStatus,

    start_time: Option<i64>,

    end_time: Option<i64>,

    /// The stage fails if it has not started by this instant
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    start_time_ttl: Option<DateTime<Utc>>,

    #[serde(default)]
    context: StageContext,

    /// Values produced by this stage for downstream stages
    #[serde(default)]
    outputs: Map<String, Value>,

    #[serde(default)]
    tasks: Vec<Task>,

    #[serde(default, skip_serializing_if = "SyntheticStageOwner::is_not_synthetic")]
    synthetic_stage_owner: SyntheticStageOwner,

    parent_stage_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_ref_ids")]
    requisite_stage_ref_ids: BTreeSet<String>,

    scheduled_time: Option<i64>,

    last_modified: Option<LastModifiedDetails>,
}

fn generate_stage_id() -> String {
    Uuid::new_v4().to_string()
}

/// Accepts a refId written as a string or a number
fn deserialize_ref_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(ref_id_from_value))
}

/// Accepts either a single refId or a list of them, strings or numbers
fn deserialize_ref_ids<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .map(ref_ids_from_value)
        .unwrap_or_default())
}

fn ref_id_from_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        other => {
            warn!(value = %other, "ignoring refId that is not a string");
            None
        }
    }
}

fn ref_ids_from_value(value: Value) -> BTreeSet<String> {
    let items = match value {
        Value::Null => return BTreeSet::new(),
        Value::Array(items) => items,
        single => vec![single],
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            other => {
                warn!(value = %other, "ignoring requisiteStageRefIds entry that is not a string");
                None
            }
        })
        .collect()
}

impl Stage {
    /// Create a stage for `execution` from a raw context.
    ///
    /// `refId` and `requisiteStageRefIds` are structural and are moved out of
    /// the context into their own fields.
    pub fn new(
        execution: &Execution,
        stage_type: impl Into<String>,
        name: Option<&str>,
        mut context: StageContext,
    ) -> Self {
        let ref_id = context.remove(REF_ID_KEY).and_then(ref_id_from_value);
        let requisite_stage_ref_ids = context
            .remove(REQUISITE_STAGE_REF_IDS_KEY)
            .map(ref_ids_from_value)
            .unwrap_or_default();

        Self {
            id: generate_stage_id(),
            execution_id: execution.id().to_string(),
            ref_id,
            stage_type: stage_type.into(),
            name: name.map(str::to_string),
            status: ExecutionStatus::NotStarted,
            start_time: None,
            end_time: None,
            start_time_ttl: None,
            context,
            outputs: Map::new(),
            tasks: Vec::new(),
            synthetic_stage_owner: SyntheticStageOwner::NotSynthetic,
            parent_stage_id: None,
            requisite_stage_ref_ids,
            scheduled_time: None,
            last_modified: None,
        }
    }

    /// Replace the generated id. Only meaningful before the stage joins an execution.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }

    pub fn with_requisite_stage_ref_ids(
        mut self,
        ref_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.requisite_stage_ref_ids = ref_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Attach this stage to `parent_stage_id` as an injected child
    pub fn with_parent(
        mut self,
        parent_stage_id: impl Into<String>,
        owner: SyntheticStageOwner,
    ) -> Self {
        self.parent_stage_id = Some(parent_stage_id.into());
        self.synthetic_stage_owner = owner;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub(crate) fn set_execution_id(&mut self, execution_id: &str) {
        self.execution_id = execution_id.to_string();
    }

    pub fn ref_id(&self) -> Option<&str> {
        self.ref_id.as_deref()
    }

    pub fn stage_type(&self) -> &str {
        &self.stage_type
    }

    /// The display name, which defaults to the stage type
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.stage_type)
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn set_status(&mut self, status: ExecutionStatus) {
        self.status = status;
    }

    pub fn start_time(&self) -> Option<i64> {
        self.start_time
    }

    pub fn set_start_time(&mut self, start_time: Option<i64>) {
        self.start_time = start_time;
    }

    pub fn end_time(&self) -> Option<i64> {
        self.end_time
    }

    pub fn set_end_time(&mut self, end_time: Option<i64>) {
        self.end_time = end_time;
    }

    pub fn start_time_ttl(&self) -> Option<DateTime<Utc>> {
        self.start_time_ttl
    }

    pub fn set_start_time_ttl(&mut self, start_time_ttl: Option<DateTime<Utc>>) {
        self.start_time_ttl = start_time_ttl;
    }

    pub fn scheduled_time(&self) -> Option<i64> {
        self.scheduled_time
    }

    pub fn set_scheduled_time(&mut self, scheduled_time: Option<i64>) {
        self.scheduled_time = scheduled_time;
    }

    pub fn context(&self) -> &StageContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut StageContext {
        &mut self.context
    }

    pub fn outputs(&self) -> &Map<String, Value> {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.outputs
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn task_by_id(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn synthetic_stage_owner(&self) -> SyntheticStageOwner {
        self.synthetic_stage_owner
    }

    pub fn parent_stage_id(&self) -> Option<&str> {
        self.parent_stage_id.as_deref()
    }

    /// Snapshot of the refIds this stage depends on
    pub fn requisite_stage_ref_ids(&self) -> BTreeSet<String> {
        self.requisite_stage_ref_ids.clone()
    }

    pub(crate) fn requires(&self, ref_id: &str) -> bool {
        self.requisite_stage_ref_ids.contains(ref_id)
    }

    pub(crate) fn has_requisites(&self) -> bool {
        !self.requisite_stage_ref_ids.is_empty()
    }

    pub(crate) fn requisites(&self) -> impl Iterator<Item = &str> {
        self.requisite_stage_ref_ids.iter().map(String::as_str)
    }

    pub fn last_modified(&self) -> Option<&LastModifiedDetails> {
        self.last_modified.as_ref()
    }

    pub fn set_last_modified(&mut self, last_modified: Option<LastModifiedDetails>) {
        self.last_modified = last_modified;
    }

    /// More than one stage converges into this one
    pub fn is_join(&self) -> bool {
        self.requisite_stage_ref_ids.len() > 1
    }

    /// Timeout override carried by this stage's own context, in milliseconds.
    ///
    /// Integer and floating point encodings are accepted; anything else is
    /// treated as no override.
    pub fn timeout(&self) -> Option<i64> {
        match self.context.get(STAGE_TIMEOUT_OVERRIDE_KEY)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.is_f64().then(|| n.as_f64()).flatten().map(|f| f as i64)),
            _ => None,
        }
    }

    /// Copy deployment strategy parameters from the pipeline trigger into the context
    pub fn resolve_strategy_params(&mut self, execution: &Execution) {
        if execution.execution_type() != ExecutionType::Pipeline {
            return;
        }

        let parameters = &execution.trigger().parameters;
        let strategy = matches!(parameters.get("strategy"), Some(Value::Bool(true)));
        if !strategy {
            return;
        }

        for key in ["cloudProvider", "cluster", "credentials"] {
            let value = parameters.get(key).cloned().unwrap_or(Value::Null);
            self.context.insert(key.to_string(), value);
        }

        if let Some(region) = parameters.get("region").filter(|v| !v.is_null()) {
            self.context
                .insert("regions".to_string(), Value::Array(vec![region.clone()]));
        } else if let Some(zone) = parameters.get("zone").filter(|v| !v.is_null()) {
            self.context
                .insert("zones".to_string(), Value::Array(vec![zone.clone()]));
        }
    }
}

impl PartialEq for Stage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Stage {}

impl Hash for Stage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
