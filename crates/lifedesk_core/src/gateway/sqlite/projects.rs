//! Project persistence for the SQLite gateway.

use super::{execute_cascade, parse_entity_id, require_active, SqliteGateway};
use crate::cascade::Direction;
use crate::gateway::{
    CascadeReceipt, EntityGateway, GatewayError, GatewayResult, ProjectGateway,
};
use crate::model::{CreateProject, EntityId, EntityKind, Project, ProjectStatus, UpdateProject};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    goal_id,
    name,
    description,
    status,
    start_date,
    due_date,
    completed_at,
    created_at,
    updated_at,
    archived_at
FROM projects";

fn parse_project_row(row: &Row<'_>) -> GatewayResult<Project> {
    let id_text: String = row.get("id")?;
    let goal_text: String = row.get("goal_id")?;
    let status_text: String = row.get("status")?;
    let status =
        ProjectStatus::parse_db_str(&status_text).ok_or_else(|| GatewayError::Transport {
            message: format!("invalid project status `{status_text}` in projects.status"),
        })?;
    Ok(Project {
        id: parse_entity_id(&id_text, "projects.id")?,
        goal_id: parse_entity_id(&goal_text, "projects.goal_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status,
        start_date: row.get("start_date")?,
        due_date: row.get("due_date")?,
        completed_at: row.get("completed_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        archived_at: row.get("archived_at")?,
    })
}

fn get_project(conn: &Connection, id: EntityId) -> GatewayResult<Option<Project>> {
    let mut stmt = conn.prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_project_row(row)?));
    }
    Ok(None)
}

fn get_project_required(conn: &Connection, id: EntityId) -> GatewayResult<Project> {
    get_project(conn, id)?.ok_or(GatewayError::NotFound {
        kind: EntityKind::Project,
        id,
    })
}

fn list_projects(
    conn: &Connection,
    sql: &str,
    bind: Option<EntityId>,
) -> GatewayResult<Vec<Project>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = match bind {
        Some(id) => stmt.query([id.to_string()])?,
        None => stmt.query([])?,
    };
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_project_row(row)?);
    }
    Ok(items)
}

#[async_trait]
impl EntityGateway<Project> for SqliteGateway {
    async fn get_all(&self) -> GatewayResult<Vec<Project>> {
        list_projects(
            &self.conn(),
            &format!("{PROJECT_SELECT_SQL} ORDER BY created_at ASC, id ASC;"),
            None,
        )
    }

    async fn get_by_parent(&self, parent_id: EntityId) -> GatewayResult<Vec<Project>> {
        list_projects(
            &self.conn(),
            &format!("{PROJECT_SELECT_SQL} WHERE goal_id = ?1 ORDER BY created_at ASC, id ASC;"),
            Some(parent_id),
        )
    }

    async fn create(&self, payload: CreateProject) -> GatewayResult<Project> {
        payload.validate()?;

        let conn = self.conn();
        require_active(&conn, EntityKind::Goal, payload.goal_id)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO projects (
                id, goal_id, name, description, status, start_date,
                due_date, completed_at, created_at, updated_at, archived_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?8, NULL);",
            params![
                id.to_string(),
                payload.goal_id.to_string(),
                payload.name.trim(),
                payload.description,
                payload.status.as_db_str(),
                payload.start_date,
                payload.due_date,
                now,
            ],
        )?;

        Ok(Project {
            id,
            goal_id: payload.goal_id,
            name: payload.name.trim().to_string(),
            description: payload.description,
            status: payload.status,
            start_date: payload.start_date,
            due_date: payload.due_date,
            completed_at: None,
            created_at: now,
            updated_at: now,
            archived_at: None,
        })
    }

    async fn update(&self, id: EntityId, payload: UpdateProject) -> GatewayResult<Project> {
        payload.validate()?;

        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut project = get_project_required(&tx, id)?;

        if let Some(name) = payload.name {
            project.name = name.trim().to_string();
        }
        if let Some(description) = payload.description {
            project.description = Some(description);
        }
        if let Some(goal_id) = payload.goal_id {
            require_active(&tx, EntityKind::Goal, goal_id)?;
            project.goal_id = goal_id;
        }
        if let Some(status) = payload.status {
            project.status = status;
        }
        if let Some(start_date) = payload.start_date {
            project.start_date = Some(start_date);
        }
        if let Some(due_date) = payload.due_date {
            project.due_date = Some(due_date);
        }
        project.updated_at = Utc::now();

        tx.execute(
            "UPDATE projects SET
                goal_id = ?2, name = ?3, description = ?4, status = ?5,
                start_date = ?6, due_date = ?7, updated_at = ?8
             WHERE id = ?1;",
            params![
                id.to_string(),
                project.goal_id.to_string(),
                project.name,
                project.description,
                project.status.as_db_str(),
                project.start_date,
                project.due_date,
                project.updated_at,
            ],
        )?;
        tx.commit()?;

        Ok(project)
    }

    async fn archive(&self, id: EntityId) -> GatewayResult<CascadeReceipt> {
        execute_cascade(&mut self.conn(), EntityKind::Project, id, Direction::Archive)
    }

    async fn restore(&self, id: EntityId) -> GatewayResult<CascadeReceipt> {
        execute_cascade(&mut self.conn(), EntityKind::Project, id, Direction::Restore)
    }
}

#[async_trait]
impl ProjectGateway for SqliteGateway {
    async fn update_status(&self, id: EntityId, status: ProjectStatus) -> GatewayResult<Project> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE projects SET status = ?2, updated_at = ?3 WHERE id = ?1;",
            params![id.to_string(), status.as_db_str(), Utc::now()],
        )?;
        if changed == 0 {
            return Err(GatewayError::NotFound {
                kind: EntityKind::Project,
                id,
            });
        }
        get_project_required(&conn, id)
    }
}
