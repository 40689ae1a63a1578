//! Archive/restore cascade rule table.
//!
//! # Responsibility
//! - Declare, per entity kind and direction, which descendant kinds a
//!   mutation propagates to.
//! - Keep cascade depth decisions in one reviewable place.
//!
//! # Invariants
//! - Archiving cascades downward only, with kind-specific depth.
//! - Restoring cascades only from the root kind (life area); every other
//!   kind restores itself alone.
//! - Notes never appear in any cascade set.
//!
//! The gateway is the only executor of these rules; client-side stores
//! consult receipts, never this table.

use crate::model::EntityKind;

/// Mutation direction a cascade rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Archive,
    Restore,
}

/// Archiving a goal tombstones the tasks under its projects, not just the
/// projects themselves.
///
/// The original backend's rule code stopped at projects while its tests
/// expected tasks to be included; resolved here in favor of the deeper
/// cascade so no active task can dangle under an archived project.
pub const GOAL_ARCHIVE_REACHES_TASKS: bool = true;

/// Archiving a task tombstones direct subtasks only; grandchildren keep
/// their state.
pub const TASK_ARCHIVE_DIRECT_SUBTASKS_ONLY: bool = true;

/// Descendant kinds whose `archived_at` changes when `kind` is mutated in
/// `direction`. The mutated entity itself is always affected and is not
/// listed.
pub fn cascade_kinds(kind: EntityKind, direction: Direction) -> &'static [EntityKind] {
    match direction {
        Direction::Archive => match kind {
            EntityKind::LifeArea => &[EntityKind::Goal, EntityKind::Project, EntityKind::Task],
            EntityKind::Goal => {
                if GOAL_ARCHIVE_REACHES_TASKS {
                    &[EntityKind::Project, EntityKind::Task]
                } else {
                    &[EntityKind::Project]
                }
            }
            EntityKind::Project => &[EntityKind::Task],
            EntityKind::Task => &[EntityKind::Task],
            EntityKind::Note => &[],
        },
        Direction::Restore => match kind {
            EntityKind::LifeArea => &[EntityKind::Goal, EntityKind::Project, EntityKind::Task],
            EntityKind::Goal
            | EntityKind::Project
            | EntityKind::Task
            | EntityKind::Note => &[],
        },
    }
}

/// All kinds a mutation on `kind` may touch: the kind itself first, then its
/// cascade set in rule-table order.
pub fn affected_kinds(kind: EntityKind, direction: Direction) -> Vec<EntityKind> {
    let mut kinds = vec![kind];
    for cascaded in cascade_kinds(kind, direction) {
        if !kinds.contains(cascaded) {
            kinds.push(*cascaded);
        }
    }
    kinds
}
