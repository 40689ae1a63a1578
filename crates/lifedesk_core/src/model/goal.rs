//! Goal model: second level, grouped under a life area.

use super::{
    validate_optional_text, validate_required_text, Entity, EntityId, EntityKind, Timestamp,
    ValidationError, MAX_DESCRIPTION_CHARS, MAX_NAME_CHARS,
};
use serde::{Deserialize, Serialize};

/// Outcome-level objective inside one life area.
///
/// `completed_at` is independent of `archived_at`: a goal can be completed
/// and active, completed and archived, or active and incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: EntityId,
    pub life_area_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub target_date: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub archived_at: Option<Timestamp>,
}

impl Entity for Goal {
    type CreatePayload = CreateGoal;
    type UpdatePayload = UpdateGoal;

    const KIND: EntityKind = EntityKind::Goal;

    fn id(&self) -> EntityId {
        self.id
    }

    fn archived_at(&self) -> Option<Timestamp> {
        self.archived_at
    }

    fn parent_id(&self) -> Option<EntityId> {
        Some(self.life_area_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGoal {
    pub life_area_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub target_date: Option<Timestamp>,
}

impl CreateGoal {
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
pub struct UpdateGoal {
    pub name: Option<String>,
    pub description: Option<String>,
    pub life_area_id: Option<EntityId>,
    pub target_date: Option<Timestamp>,
}

impl UpdateGoal {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_none()
            && self.description.is_none()
            && self.life_area_id.is_none()
            && self.target_date.is_none()
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
