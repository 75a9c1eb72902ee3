use serde::{Deserialize, Serialize};

use crate::{KeyValue, TerminalState};

/// Snapshot of a cluster task (driver or executor) as reported by the orchestrator.
///
/// Only the fields the harness inspects are modelled; everything else in the
/// cluster's JSON is ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework_id: Option<String>,
    #[serde(default)]
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerInfo>,
}

impl TaskInfo {
    /// First network attachment of the task's container, if any.
    pub fn first_network(&self) -> Option<&NetworkInfo> {
        self.container.as_ref()?.network_infos.first()
    }
}

/// Container description of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub network_infos: Vec<NetworkInfo>,
}

/// A network the container is attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
}

impl NetworkInfo {
    /// Labels in the order the cluster serialized them.
    pub fn label_list(&self) -> &[KeyValue] {
        self.labels.as_ref().map(|l| l.labels.as_slice()).unwrap_or(&[])
    }
}

/// Wrapper matching the cluster's `{"labels": {"labels": [...]}}` nesting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default)]
    pub labels: Vec<KeyValue>,
}

/// Mesos task state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    #[serde(rename = "TASK_STAGING")]
    Staging,
    #[serde(rename = "TASK_STARTING")]
    Starting,
    #[serde(rename = "TASK_RUNNING")]
    Running,
    #[serde(rename = "TASK_KILLING")]
    Killing,
    #[serde(rename = "TASK_FINISHED")]
    Finished,
    #[serde(rename = "TASK_FAILED")]
    Failed,
    #[serde(rename = "TASK_KILLED")]
    Killed,
    #[serde(rename = "TASK_ERROR")]
    Error,
    #[serde(rename = "TASK_LOST")]
    Lost,
    #[serde(rename = "TASK_DROPPED")]
    Dropped,
    #[serde(rename = "TASK_UNREACHABLE")]
    Unreachable,
    #[serde(rename = "TASK_GONE")]
    Gone,
    #[serde(rename = "TASK_GONE_BY_OPERATOR")]
    GoneByOperator,
    #[default]
    #[serde(rename = "TASK_UNKNOWN", other)]
    Unknown,
}

impl TaskState {
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, TaskState::Running)
    }

    /// Terminal outcome for this state, or `None` while the task may still change.
    pub fn terminal(&self) -> Option<TerminalState> {
        match self {
            TaskState::Finished => Some(TerminalState::Succeeded),
            TaskState::Failed
            | TaskState::Killed
            | TaskState::Error
            | TaskState::Lost
            | TaskState::Dropped
            | TaskState::Gone
            | TaskState::GoneByOperator => Some(TerminalState::Failed),
            TaskState::Staging
            | TaskState::Starting
            | TaskState::Running
            | TaskState::Killing
            | TaskState::Unreachable
            | TaskState::Unknown => None,
        }
    }
}
