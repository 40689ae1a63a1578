//! Task model: leaf level, optionally nested under a project or another task.

use super::{
    validate_optional_text, validate_required_text, Entity, EntityId, EntityKind, Timestamp,
    ValidationError, MAX_DESCRIPTION_CHARS, MAX_NAME_CHARS,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl TaskPriority {
    pub(crate) fn as_db_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub(crate) fn parse_db_str(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Actionable item. Projectless tasks and arbitrarily deep subtask chains
/// are both legal; `parent_task_id` is self-referential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub project_id: Option<EntityId>,
    pub parent_task_id: Option<EntityId>,
    pub name: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub archived_at: Option<Timestamp>,
}

impl Entity for Task {
    type CreatePayload = CreateTask;
    type UpdatePayload = UpdateTask;

    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> EntityId {
        self.id
    }

    fn archived_at(&self) -> Option<Timestamp> {
        self.archived_at
    }

    fn parent_id(&self) -> Option<EntityId> {
        self.project_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: Option<EntityId>,
    pub parent_task_id: Option<EntityId>,
    pub name: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<Timestamp>,
}

impl CreateTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required_text("name", &self.name, MAX_NAME_CHARS)?;
        validate_optional_text(
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION_CHARS,
        )
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<EntityId>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Timestamp>,
}

impl UpdateTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_none()
            && self.description.is_none()
            && self.project_id.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
        {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(name) = self.name.as_deref() {
            validate_required_text("name", name, MAX_NAME_CHARS)?;
        }
        validate_optional_text(
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION_CHARS,
        )
    }
}
