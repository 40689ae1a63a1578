//! Task persistence for the SQLite gateway.

use super::{execute_cascade, parse_entity_id, require_active, SqliteGateway};
use crate::cascade::Direction;
use crate::gateway::{CascadeReceipt, EntityGateway, GatewayError, GatewayResult, TaskGateway};
use crate::model::{CreateTask, EntityId, EntityKind, Task, TaskPriority, Timestamp, UpdateTask};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    parent_task_id,
    name,
    description,
    priority,
    due_date,
    completed_at,
    created_at,
    updated_at,
    archived_at
FROM tasks";

fn parse_task_row(row: &Row<'_>) -> GatewayResult<Task> {
    let id_text: String = row.get("id")?;
    let project_text: Option<String> = row.get("project_id")?;
    let parent_text: Option<String> = row.get("parent_task_id")?;
    let priority_text: String = row.get("priority")?;
    let priority =
        TaskPriority::parse_db_str(&priority_text).ok_or_else(|| GatewayError::Transport {
            message: format!("invalid task priority `{priority_text}` in tasks.priority"),
        })?;

    let project_id = match project_text {
        Some(value) => Some(parse_entity_id(&value, "tasks.project_id")?),
        None => None,
    };
    let parent_task_id = match parent_text {
        Some(value) => Some(parse_entity_id(&value, "tasks.parent_task_id")?),
        None => None,
    };

    Ok(Task {
        id: parse_entity_id(&id_text, "tasks.id")?,
        project_id,
        parent_task_id,
        name: row.get("name")?,
        description: row.get("description")?,
        priority,
        due_date: row.get("due_date")?,
        completed_at: row.get("completed_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        archived_at: row.get("archived_at")?,
    })
}

fn get_task(conn: &Connection, id: EntityId) -> GatewayResult<Option<Task>> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_task_row(row)?));
    }
    Ok(None)
}

fn get_task_required(conn: &Connection, id: EntityId) -> GatewayResult<Task> {
    get_task(conn, id)?.ok_or(GatewayError::NotFound {
        kind: EntityKind::Task,
        id,
    })
}

fn list_tasks(conn: &Connection, sql: &str, bind: Option<EntityId>) -> GatewayResult<Vec<Task>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = match bind {
        Some(id) => stmt.query([id.to_string()])?,
        None => stmt.query([])?,
    };
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_task_row(row)?);
    }
    Ok(items)
}

fn set_completed_at(
    conn: &Connection,
    id: EntityId,
    completed_at: Option<Timestamp>,
) -> GatewayResult<Task> {
    let changed = conn.execute(
        "UPDATE tasks SET completed_at = ?2, updated_at = ?3 WHERE id = ?1;",
        params![id.to_string(), completed_at, Utc::now()],
    )?;
    if changed == 0 {
        return Err(GatewayError::NotFound {
            kind: EntityKind::Task,
            id,
        });
    }
    get_task_required(conn, id)
}

#[async_trait]
impl EntityGateway<Task> for SqliteGateway {
    async fn get_all(&self) -> GatewayResult<Vec<Task>> {
        list_tasks(
            &self.conn(),
            &format!("{TASK_SELECT_SQL} ORDER BY created_at ASC, id ASC;"),
            None,
        )
    }

    /// Narrows by owning project; subtask narrowing goes through
    /// `get_all` plus the store's subtask view.
    async fn get_by_parent(&self, parent_id: EntityId) -> GatewayResult<Vec<Task>> {
        list_tasks(
            &self.conn(),
            &format!("{TASK_SELECT_SQL} WHERE project_id = ?1 ORDER BY created_at ASC, id ASC;"),
            Some(parent_id),
        )
    }

    async fn create(&self, payload: CreateTask) -> GatewayResult<Task> {
        payload.validate()?;

        let conn = self.conn();
        if let Some(project_id) = payload.project_id {
            require_active(&conn, EntityKind::Project, project_id)?;
        }
        if let Some(parent_task_id) = payload.parent_task_id {
            require_active(&conn, EntityKind::Task, parent_task_id)?;
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO tasks (
                id, project_id, parent_task_id, name, description, priority,
                due_date, completed_at, created_at, updated_at, archived_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?8, NULL);",
            params![
                id.to_string(),
                payload.project_id.map(|value| value.to_string()),
                payload.parent_task_id.map(|value| value.to_string()),
                payload.name.trim(),
                payload.description,
                payload.priority.as_db_str(),
                payload.due_date,
                now,
            ],
        )?;

        Ok(Task {
            id,
            project_id: payload.project_id,
            parent_task_id: payload.parent_task_id,
            name: payload.name.trim().to_string(),
            description: payload.description,
            priority: payload.priority,
            due_date: payload.due_date,
            completed_at: None,
            created_at: now,
            updated_at: now,
            archived_at: None,
        })
    }

    async fn update(&self, id: EntityId, payload: UpdateTask) -> GatewayResult<Task> {
        payload.validate()?;

        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut task = get_task_required(&tx, id)?;

        if let Some(name) = payload.name {
            task.name = name.trim().to_string();
        }
        if let Some(description) = payload.description {
            task.description = Some(description);
        }
        if let Some(project_id) = payload.project_id {
            require_active(&tx, EntityKind::Project, project_id)?;
            task.project_id = Some(project_id);
        }
        if let Some(priority) = payload.priority {
            task.priority = priority;
        }
        if let Some(due_date) = payload.due_date {
            task.due_date = Some(due_date);
        }
        task.updated_at = Utc::now();

        tx.execute(
            "UPDATE tasks SET
                project_id = ?2, name = ?3, description = ?4, priority = ?5,
                due_date = ?6, updated_at = ?7
             WHERE id = ?1;",
            params![
                id.to_string(),
                task.project_id.map(|value| value.to_string()),
                task.name,
                task.description,
                task.priority.as_db_str(),
                task.due_date,
                task.updated_at,
            ],
        )?;
        tx.commit()?;

        Ok(task)
    }

    async fn archive(&self, id: EntityId) -> GatewayResult<CascadeReceipt> {
        execute_cascade(&mut self.conn(), EntityKind::Task, id, Direction::Archive)
    }

    async fn restore(&self, id: EntityId) -> GatewayResult<CascadeReceipt> {
        execute_cascade(&mut self.conn(), EntityKind::Task, id, Direction::Restore)
    }
}

#[async_trait]
impl TaskGateway for SqliteGateway {
    async fn complete(&self, id: EntityId) -> GatewayResult<Task> {
        set_completed_at(&self.conn(), id, Some(Utc::now()))
    }

    async fn uncomplete(&self, id: EntityId) -> GatewayResult<Task> {
        set_completed_at(&self.conn(), id, None)
    }
}
