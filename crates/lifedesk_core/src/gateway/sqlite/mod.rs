//! SQLite-backed reference gateway.
//!
//! # Responsibility
//! - Implement every per-kind gateway trait over one embedded database.
//! - Execute archive/restore cascades atomically per the rule table.
//!
//! # Invariants
//! - Cascade writes happen inside one immediate transaction; a failed
//!   mutation leaves no partial cascade behind.
//! - The connection mutex is never held across an await point.
//! - Receipts list the directly-targeted entity first, then descendants in
//!   rule-table order.

use crate::cascade::{self, Direction, GOAL_ARCHIVE_REACHES_TASKS, TASK_ARCHIVE_DIRECT_SUBTASKS_ONLY};
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::gateway::{CascadeChange, CascadeReceipt, GatewayError, GatewayResult};
use crate::model::{EntityId, EntityKind, Timestamp};
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection, TransactionBehavior};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use uuid::Uuid;

mod goals;
mod life_areas;
mod notes;
mod projects;
mod tasks;

/// Authoritative store the entity stores talk to. Plays the backend role:
/// the only component that executes cascade rules.
pub struct SqliteGateway {
    conn: Mutex<Connection>,
}

impl SqliteGateway {
    /// Wraps an already-migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens a database file, migrates it, and wraps it.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a fresh in-memory database, used by tests and previews.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Active row count per kind plus the total archived count across all
    /// kinds.
    pub async fn stats(&self) -> GatewayResult<Stats> {
        let conn = self.conn();
        let mut active = [0i64; 5];
        let mut archived_total = 0i64;
        for (slot, table_name) in TABLES.iter().enumerate() {
            active[slot] = conn.query_row(
                &format!("SELECT COUNT(*) FROM {table_name} WHERE archived_at IS NULL;"),
                [],
                |row| row.get(0),
            )?;
            let archived: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {table_name} WHERE archived_at IS NOT NULL;"),
                [],
                |row| row.get(0),
            )?;
            archived_total += archived;
        }
        Ok(Stats {
            active_life_areas: active[0],
            active_goals: active[1],
            active_projects: active[2],
            active_tasks: active[3],
            active_notes: active[4],
            archived_total,
        })
    }
}

/// Workspace counters computed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub active_life_areas: i64,
    pub active_goals: i64,
    pub active_projects: i64,
    pub active_tasks: i64,
    pub active_notes: i64,
    pub archived_total: i64,
}

const TABLES: [&str; 5] = ["life_areas", "goals", "projects", "tasks", "notes"];

fn table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::LifeArea => "life_areas",
        EntityKind::Goal => "goals",
        EntityKind::Project => "projects",
        EntityKind::Task => "tasks",
        EntityKind::Note => "notes",
    }
}

fn parse_entity_id(value: &str, column: &str) -> GatewayResult<EntityId> {
    Uuid::parse_str(value).map_err(|_| GatewayError::Transport {
        message: format!("invalid id value `{value}` in {column}"),
    })
}

fn row_exists(conn: &Connection, kind: EntityKind, id: EntityId) -> GatewayResult<bool> {
    let found: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
            table(kind)
        ),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(found == 1)
}

/// Fails `NotFound` unless a row (active or tombstoned) exists.
fn require_exists(conn: &Connection, kind: EntityKind, id: EntityId) -> GatewayResult<()> {
    if row_exists(conn, kind, id)? {
        Ok(())
    } else {
        Err(GatewayError::NotFound { kind, id })
    }
}

/// Fails `NotFound` unless an active (non-tombstoned) row exists. Used for
/// parent checks on create/update: new children cannot attach to archived
/// ancestors.
fn require_active(conn: &Connection, kind: EntityKind, id: EntityId) -> GatewayResult<()> {
    let found: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1 AND archived_at IS NULL);",
            table(kind)
        ),
        [id.to_string()],
        |row| row.get(0),
    )?;
    if found == 1 {
        Ok(())
    } else {
        Err(GatewayError::NotFound { kind, id })
    }
}

fn select_ids(conn: &Connection, sql: &str, id: EntityId, column: &str) -> GatewayResult<Vec<EntityId>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_entity_id(&value, column)?);
    }
    Ok(ids)
}

/// Descendants of `id` per the rule table, in rule-table order.
fn collect_cascade_targets(
    conn: &Connection,
    kind: EntityKind,
    id: EntityId,
    direction: Direction,
) -> GatewayResult<Vec<(EntityKind, EntityId)>> {
    let mut targets = Vec::new();
    let mut push_all = |kind: EntityKind, ids: Vec<EntityId>| {
        targets.extend(ids.into_iter().map(|id| (kind, id)));
    };

    match (direction, kind) {
        // Full downward closure, both directions.
        (_, EntityKind::LifeArea) => {
            push_all(
                EntityKind::Goal,
                select_ids(
                    conn,
                    "SELECT id FROM goals WHERE life_area_id = ?1;",
                    id,
                    "goals.id",
                )?,
            );
            push_all(
                EntityKind::Project,
                select_ids(
                    conn,
                    "SELECT id FROM projects WHERE goal_id IN
                        (SELECT id FROM goals WHERE life_area_id = ?1);",
                    id,
                    "projects.id",
                )?,
            );
            push_all(
                EntityKind::Task,
                select_ids(
                    conn,
                    "SELECT id FROM tasks WHERE project_id IN
                        (SELECT id FROM projects WHERE goal_id IN
                            (SELECT id FROM goals WHERE life_area_id = ?1));",
                    id,
                    "tasks.id",
                )?,
            );
        }
        (Direction::Archive, EntityKind::Goal) => {
            push_all(
                EntityKind::Project,
                select_ids(
                    conn,
                    "SELECT id FROM projects WHERE goal_id = ?1;",
                    id,
                    "projects.id",
                )?,
            );
            if GOAL_ARCHIVE_REACHES_TASKS {
                push_all(
                    EntityKind::Task,
                    select_ids(
                        conn,
                        "SELECT id FROM tasks WHERE project_id IN
                            (SELECT id FROM projects WHERE goal_id = ?1);",
                        id,
                        "tasks.id",
                    )?,
                );
            }
        }
        (Direction::Archive, EntityKind::Project) => {
            push_all(
                EntityKind::Task,
                select_ids(
                    conn,
                    "SELECT id FROM tasks WHERE project_id = ?1;",
                    id,
                    "tasks.id",
                )?,
            );
        }
        (Direction::Archive, EntityKind::Task) => {
            let sql = if TASK_ARCHIVE_DIRECT_SUBTASKS_ONLY {
                "SELECT id FROM tasks WHERE parent_task_id = ?1;"
            } else {
                "WITH RECURSIVE subtasks(id) AS (
                     SELECT id FROM tasks WHERE parent_task_id = ?1
                     UNION
                     SELECT t.id FROM tasks t JOIN subtasks s ON t.parent_task_id = s.id
                 ) SELECT id FROM subtasks;"
            };
            push_all(EntityKind::Task, select_ids(conn, sql, id, "tasks.id")?);
        }
        (Direction::Archive, EntityKind::Note)
        | (Direction::Restore, EntityKind::Goal)
        | (Direction::Restore, EntityKind::Project)
        | (Direction::Restore, EntityKind::Task)
        | (Direction::Restore, EntityKind::Note) => {}
    }

    debug_assert!(targets
        .iter()
        .all(|(target_kind, _)| cascade::cascade_kinds(kind, direction).contains(target_kind)));

    Ok(targets)
}

fn write_archived_at(
    conn: &Connection,
    kind: EntityKind,
    id: EntityId,
    archived_at: Option<Timestamp>,
    now: Timestamp,
) -> GatewayResult<()> {
    conn.execute(
        &format!(
            "UPDATE {} SET archived_at = ?2, updated_at = ?3 WHERE id = ?1;",
            table(kind)
        ),
        params![id.to_string(), archived_at, now],
    )?;
    Ok(())
}

/// Shared executor behind every kind's `archive`/`restore`.
///
/// Writes `archived_at` on the target and its rule-table closure in one
/// immediate transaction and reports every write in the receipt. Re-archiving
/// an archived entity (or restoring an active one) re-runs the same writes,
/// so the operation is idempotent at the state level.
fn execute_cascade(
    conn: &mut Connection,
    kind: EntityKind,
    id: EntityId,
    direction: Direction,
) -> GatewayResult<CascadeReceipt> {
    let started_at = Instant::now();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    require_exists(&tx, kind, id)?;

    let now = Utc::now();
    let archived_at = match direction {
        Direction::Archive => Some(now),
        Direction::Restore => None,
    };

    let mut changes = vec![CascadeChange {
        kind,
        id,
        archived_at,
    }];
    for (target_kind, target_id) in collect_cascade_targets(&tx, kind, id, direction)? {
        changes.push(CascadeChange {
            kind: target_kind,
            id: target_id,
            archived_at,
        });
    }

    for change in &changes {
        write_archived_at(&tx, change.kind, change.id, archived_at, now)?;
    }
    tx.commit()?;

    let event = match direction {
        Direction::Archive => "cascade_archive",
        Direction::Restore => "cascade_restore",
    };
    info!(
        "event={event} module=gateway status=ok kind={} id={id} affected={} duration_ms={}",
        table(kind),
        changes.len(),
        started_at.elapsed().as_millis()
    );

    Ok(CascadeReceipt { changes })
}
