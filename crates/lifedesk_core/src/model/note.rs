//! Note model: attachable to any level of the hierarchy, or free-floating.

use super::{
    validate_optional_text, validate_required_text, Entity, EntityId, EntityKind, Timestamp,
    ValidationError, MAX_CONTENT_CHARS, MAX_NAME_CHARS,
};
use serde::{Deserialize, Serialize};

/// The single parent a note may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteAttachment {
    Task(EntityId),
    Project(EntityId),
    Goal(EntityId),
    LifeArea(EntityId),
}

impl NoteAttachment {
    pub fn kind(self) -> EntityKind {
        match self {
            Self::Task(_) => EntityKind::Task,
            Self::Project(_) => EntityKind::Project,
            Self::Goal(_) => EntityKind::Goal,
            Self::LifeArea(_) => EntityKind::LifeArea,
        }
    }

    pub fn target_id(self) -> EntityId {
        match self {
            Self::Task(id) | Self::Project(id) | Self::Goal(id) | Self::LifeArea(id) => id,
        }
    }
}

/// Free-form text record. At most one of the four attachment columns is set;
/// a note with none is free-floating.
///
/// Notes are never part of an archive cascade: archiving any ancestor leaves
/// attached notes active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub task_id: Option<EntityId>,
    pub project_id: Option<EntityId>,
    pub goal_id: Option<EntityId>,
    pub life_area_id: Option<EntityId>,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub archived_at: Option<Timestamp>,
}

impl Note {
    /// The attachment target, when the note is not free-floating.
    pub fn attachment(&self) -> Option<NoteAttachment> {
        if let Some(id) = self.task_id {
            return Some(NoteAttachment::Task(id));
        }
        if let Some(id) = self.project_id {
            return Some(NoteAttachment::Project(id));
        }
        if let Some(id) = self.goal_id {
            return Some(NoteAttachment::Goal(id));
        }
        self.life_area_id.map(NoteAttachment::LifeArea)
    }
}

impl Entity for Note {
    type CreatePayload = CreateNote;
    type UpdatePayload = UpdateNote;

    const KIND: EntityKind = EntityKind::Note;

    fn id(&self) -> EntityId {
        self.id
    }

    fn archived_at(&self) -> Option<Timestamp> {
        self.archived_at
    }

    fn parent_id(&self) -> Option<EntityId> {
        self.attachment().map(NoteAttachment::target_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNote {
    pub attachment: Option<NoteAttachment>,
    pub title: String,
    pub content: String,
}

impl CreateNote {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required_text("title", &self.title, MAX_NAME_CHARS)?;
        validate_optional_text("content", Some(self.content.as_str()), MAX_CONTENT_CHARS)
    }
}

/// Partial update; `None` fields are left untouched. Reattachment replaces
/// the previous attachment wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub content: Option<String>,
    pub attachment: Option<Option<NoteAttachment>>,
}

impl UpdateNote {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_none() && self.content.is_none() && self.attachment.is_none() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(title) = self.title.as_deref() {
            validate_required_text("title", title, MAX_NAME_CHARS)?;
        }
        validate_optional_text("content", self.content.as_deref(), MAX_CONTENT_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn note_with(task: Option<EntityId>, goal: Option<EntityId>) -> Note {
        let now = Utc::now();
        Note {
            id: Uuid::new_v4(),
            task_id: task,
            project_id: None,
            goal_id: goal,
            life_area_id: None,
            title: "n".to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
            archived_at: None,
        }
    }

    #[test]
    fn attachment_resolves_single_set_column() {
        let task_id = Uuid::new_v4();
        let note = note_with(Some(task_id), None);
        assert_eq!(note.attachment(), Some(NoteAttachment::Task(task_id)));
        assert_eq!(note.parent_id(), Some(task_id));

        let floating = note_with(None, None);
        assert_eq!(floating.attachment(), None);
        assert_eq!(floating.parent_id(), None);
    }
}
