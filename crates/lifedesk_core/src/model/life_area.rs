//! Life area model: the root kind of the hierarchy.

use super::{
    validate_optional_text, validate_required_text, Entity, EntityId, EntityKind, Timestamp,
    ValidationError, MAX_DESCRIPTION_CHARS, MAX_NAME_CHARS,
};
use serde::{Deserialize, Serialize};

/// Top-level grouping for goals. Life areas have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeArea {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    /// Stable manual ordering key across all life areas.
    pub sort_order: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub archived_at: Option<Timestamp>,
}

impl Entity for LifeArea {
    type CreatePayload = CreateLifeArea;
    type UpdatePayload = UpdateLifeArea;

    const KIND: EntityKind = EntityKind::LifeArea;

    fn id(&self) -> EntityId {
        self.id
    }

    fn archived_at(&self) -> Option<Timestamp> {
        self.archived_at
    }

    fn parent_id(&self) -> Option<EntityId> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLifeArea {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl CreateLifeArea {
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
pub struct UpdateLifeArea {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
}

impl UpdateLifeArea {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.icon.is_none()
            && self.sort_order.is_none()
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
