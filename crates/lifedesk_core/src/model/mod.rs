//! Domain model shared by every layer.
//!
//! # Responsibility
//! - Define the five entity kinds and their create/update payloads.
//! - Provide payload validation before any gateway mutation.
//!
//! # Invariants
//! - `id` is stable and never reused for another entity.
//! - `archived_at` is the source of truth for tombstone state.
//! - Completion and status fields are orthogonal to `archived_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

mod goal;
mod life_area;
mod note;
mod project;
mod task;

pub use goal::{CreateGoal, Goal, UpdateGoal};
pub use life_area::{CreateLifeArea, LifeArea, UpdateLifeArea};
pub use note::{CreateNote, Note, NoteAttachment, UpdateNote};
pub use project::{CreateProject, Project, ProjectStatus, UpdateProject};
pub use task::{CreateTask, Task, TaskPriority, UpdateTask};

/// Stable identifier for every domain entity.
pub type EntityId = Uuid;

/// UTC timestamp used for created/updated/archived markers.
pub type Timestamp = DateTime<Utc>;

pub const MAX_NAME_CHARS: usize = 120;
pub const MAX_DESCRIPTION_CHARS: usize = 2_000;
pub const MAX_CONTENT_CHARS: usize = 20_000;

/// The five entity kinds managed by the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    LifeArea,
    Goal,
    Project,
    Task,
    Note,
}

impl EntityKind {
    /// Singular noun for error messages and logging.
    pub fn singular(self) -> &'static str {
        match self {
            Self::LifeArea => "life area",
            Self::Goal => "goal",
            Self::Project => "project",
            Self::Task => "task",
            Self::Note => "note",
        }
    }

    /// Plural noun for error messages and logging.
    pub fn plural(self) -> &'static str {
        match self {
            Self::LifeArea => "life areas",
            Self::Goal => "goals",
            Self::Project => "projects",
            Self::Task => "tasks",
            Self::Note => "notes",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.singular())
    }
}

/// Payload rejection reasons, raised before any persistence happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    BlankField { field: &'static str },
    /// Text field exceeds its length cap.
    TooLong {
        field: &'static str,
        max_chars: usize,
    },
    /// Update payload carries no field to change.
    EmptyUpdate,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { field } => write!(f, "{field} must not be blank"),
            Self::TooLong { field, max_chars } => {
                write!(f, "{field} must not exceed {max_chars} characters")
            }
            Self::EmptyUpdate => write!(f, "update must change at least one field"),
        }
    }
}

impl Error for ValidationError {}

/// Common shape every store/gateway-managed entity exposes.
///
/// `parent_id` is the grouping parent used by `fetch_by_parent` and the
/// grouped-by-parent derived view: the life area for a goal, the goal for a
/// project, the project for a task, the single attachment for a note.
pub trait Entity: Clone + Send + Sync + 'static {
    type CreatePayload: Send + Sync + 'static;
    type UpdatePayload: Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> EntityId;
    fn archived_at(&self) -> Option<Timestamp>;
    fn parent_id(&self) -> Option<EntityId>;

    /// Whether the entity is visible in active views.
    fn is_active(&self) -> bool {
        self.archived_at().is_none()
    }
}

pub(crate) fn validate_required_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { field });
    }
    validate_text_len(field, value, max_chars)
}

pub(crate) fn validate_optional_text(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => validate_text_len(field, value, max_chars),
        None => Ok(()),
    }
}

fn validate_text_len(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}
