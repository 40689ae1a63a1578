//! Project model: third level, grouped under a goal.

use super::{
    validate_optional_text, validate_required_text, Entity, EntityId, EntityKind, Timestamp,
    ValidationError, MAX_DESCRIPTION_CHARS, MAX_NAME_CHARS,
};
use serde::{Deserialize, Serialize};

/// Project workflow state. Orthogonal to `archived_at`: archiving a project
/// never rewrites its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    NotStarted,
    Planning,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub(crate) fn as_db_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Planning => "planning",
            Self::InProgress => "in_progress",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub(crate) fn parse_db_str(value: &str) -> Option<Self> {
        match value {
            "not_started" => Some(Self::NotStarted),
            "planning" => Some(Self::Planning),
            "in_progress" => Some(Self::InProgress),
            "on_hold" => Some(Self::OnHold),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Concrete initiative that advances one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub goal_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub archived_at: Option<Timestamp>,
}

impl Entity for Project {
    type CreatePayload = CreateProject;
    type UpdatePayload = UpdateProject;

    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> EntityId {
        self.id
    }

    fn archived_at(&self) -> Option<Timestamp> {
        self.archived_at
    }

    fn parent_id(&self) -> Option<EntityId> {
        Some(self.goal_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProject {
    pub goal_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
}

impl CreateProject {
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
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub goal_id: Option<EntityId>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
}

impl UpdateProject {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_none()
            && self.description.is_none()
            && self.goal_id.is_none()
            && self.status.is_none()
            && self.start_date.is_none()
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
