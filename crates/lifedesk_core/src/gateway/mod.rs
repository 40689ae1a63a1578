//! Remote mutation gateway contracts.
//!
//! # Responsibility
//! - Define the async boundary through which stores reach the authoritative
//!   backend.
//! - Define the cascade receipt contract mutations report back with.
//!
//! # Invariants
//! - The gateway is the only place cascades execute; callers receive the
//!   closure as a receipt and must not recompute it.
//! - `archive`/`restore` are atomic: on error no partial cascade persists.

use crate::model::{
    Entity, EntityId, EntityKind, Goal, Note, Project, ProjectStatus, Task, Timestamp,
    ValidationError,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::{SqliteGateway, Stats};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure taxonomy every gateway operation may surface.
#[derive(Debug)]
pub enum GatewayError {
    /// The id does not resolve to a live entity of the expected kind.
    NotFound { kind: EntityKind, id: EntityId },
    /// The payload was rejected before any persistence happened.
    Validation(ValidationError),
    /// The gateway call could not complete.
    Transport { message: String },
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Transport { message } => write!(f, "{message}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } | Self::Transport { .. } => None,
        }
    }
}

impl From<ValidationError> for GatewayError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}

impl From<crate::db::DbError> for GatewayError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}

/// One `archived_at` write performed by a cascading mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeChange {
    pub kind: EntityKind,
    pub id: EntityId,
    pub archived_at: Option<Timestamp>,
}

/// The full set of writes one `archive`/`restore` call performed, directly
/// targeted entity first. Reconciliation uses this to refresh exactly the
/// stores whose kinds appear here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReceipt {
    pub changes: Vec<CascadeChange>,
}

impl CascadeReceipt {
    /// Kinds touched by the mutation, deduplicated, first-seen order.
    pub fn affected_kinds(&self) -> Vec<EntityKind> {
        let mut kinds = Vec::new();
        for change in &self.changes {
            if !kinds.contains(&change.kind) {
                kinds.push(change.kind);
            }
        }
        kinds
    }

    /// Ids of one kind touched by the mutation.
    pub fn ids_of(&self, kind: EntityKind) -> Vec<EntityId> {
        self.changes
            .iter()
            .filter(|change| change.kind == kind)
            .map(|change| change.id)
            .collect()
    }

    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        self.changes
            .iter()
            .any(|change| change.kind == kind && change.id == id)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Uniform operation surface per entity kind.
///
/// `get_all` returns tombstones too; active/archived filtering is a client
/// view concern. `archive`/`restore` execute the cascade rules atomically
/// and report the closure as a receipt.
#[async_trait]
pub trait EntityGateway<E: Entity>: Send + Sync {
    async fn get_all(&self) -> GatewayResult<Vec<E>>;
    async fn get_by_parent(&self, parent_id: EntityId) -> GatewayResult<Vec<E>>;
    async fn create(&self, payload: E::CreatePayload) -> GatewayResult<E>;
    async fn update(&self, id: EntityId, payload: E::UpdatePayload) -> GatewayResult<E>;
    async fn archive(&self, id: EntityId) -> GatewayResult<CascadeReceipt>;
    async fn restore(&self, id: EntityId) -> GatewayResult<CascadeReceipt>;
}

/// Life-area extras: manual reordering of the root list.
#[async_trait]
pub trait LifeAreaGateway: EntityGateway<crate::model::LifeArea> {
    /// Rewrites `sort_order` to match the given id order.
    async fn reorder(&self, ids: &[EntityId]) -> GatewayResult<()>;
}

/// Goal extras: completion toggling, orthogonal to archival.
#[async_trait]
pub trait GoalGateway: EntityGateway<Goal> {
    async fn complete(&self, id: EntityId) -> GatewayResult<Goal>;
    async fn uncomplete(&self, id: EntityId) -> GatewayResult<Goal>;
}

/// Project extras: workflow status changes.
#[async_trait]
pub trait ProjectGateway: EntityGateway<Project> {
    async fn update_status(&self, id: EntityId, status: ProjectStatus) -> GatewayResult<Project>;
}

/// Task extras: completion toggling, orthogonal to archival.
#[async_trait]
pub trait TaskGateway: EntityGateway<Task> {
    async fn complete(&self, id: EntityId) -> GatewayResult<Task>;
    async fn uncomplete(&self, id: EntityId) -> GatewayResult<Task>;
}

/// Note extras: substring search over active notes.
#[async_trait]
pub trait NoteGateway: EntityGateway<Note> {
    async fn search(&self, query: &str) -> GatewayResult<Vec<Note>>;
}
