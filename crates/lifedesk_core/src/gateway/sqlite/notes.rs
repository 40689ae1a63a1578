//! Note persistence for the SQLite gateway.

use super::{execute_cascade, parse_entity_id, require_active, SqliteGateway};
use crate::cascade::Direction;
use crate::gateway::{CascadeReceipt, EntityGateway, GatewayError, GatewayResult, NoteGateway};
use crate::model::{CreateNote, EntityId, EntityKind, Note, NoteAttachment, UpdateNote};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    task_id,
    project_id,
    goal_id,
    life_area_id,
    title,
    content,
    created_at,
    updated_at,
    archived_at
FROM notes";

fn parse_optional_id(
    row: &Row<'_>,
    column_name: &'static str,
    qualified: &'static str,
) -> GatewayResult<Option<EntityId>> {
    match row.get::<_, Option<String>>(column_name)? {
        Some(value) => Ok(Some(parse_entity_id(&value, qualified)?)),
        None => Ok(None),
    }
}

fn parse_note_row(row: &Row<'_>) -> GatewayResult<Note> {
    let id_text: String = row.get("id")?;
    Ok(Note {
        id: parse_entity_id(&id_text, "notes.id")?,
        task_id: parse_optional_id(row, "task_id", "notes.task_id")?,
        project_id: parse_optional_id(row, "project_id", "notes.project_id")?,
        goal_id: parse_optional_id(row, "goal_id", "notes.goal_id")?,
        life_area_id: parse_optional_id(row, "life_area_id", "notes.life_area_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        archived_at: row.get("archived_at")?,
    })
}

fn get_note(conn: &Connection, id: EntityId) -> GatewayResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_note_row(row)?));
    }
    Ok(None)
}

fn get_note_required(conn: &Connection, id: EntityId) -> GatewayResult<Note> {
    get_note(conn, id)?.ok_or(GatewayError::NotFound {
        kind: EntityKind::Note,
        id,
    })
}

fn require_attachment_target(
    conn: &Connection,
    attachment: NoteAttachment,
) -> GatewayResult<()> {
    require_active(conn, attachment.kind(), attachment.target_id())
}

fn attachment_columns(
    attachment: Option<NoteAttachment>,
) -> (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
) {
    match attachment {
        Some(NoteAttachment::Task(id)) => (Some(id.to_string()), None, None, None),
        Some(NoteAttachment::Project(id)) => (None, Some(id.to_string()), None, None),
        Some(NoteAttachment::Goal(id)) => (None, None, Some(id.to_string()), None),
        Some(NoteAttachment::LifeArea(id)) => (None, None, None, Some(id.to_string())),
        None => (None, None, None, None),
    }
}

fn list_notes(conn: &Connection, sql: &str, bind: Option<&str>) -> GatewayResult<Vec<Note>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = match bind {
        Some(value) => stmt.query([value])?,
        None => stmt.query([])?,
    };
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_note_row(row)?);
    }
    Ok(items)
}

#[async_trait]
impl EntityGateway<Note> for SqliteGateway {
    async fn get_all(&self) -> GatewayResult<Vec<Note>> {
        list_notes(
            &self.conn(),
            &format!("{NOTE_SELECT_SQL} ORDER BY created_at ASC, id ASC;"),
            None,
        )
    }

    /// Matches any of the four attachment columns, so one call covers
    /// "notes of this task/project/goal/life area".
    async fn get_by_parent(&self, parent_id: EntityId) -> GatewayResult<Vec<Note>> {
        list_notes(
            &self.conn(),
            &format!(
                "{NOTE_SELECT_SQL}
                 WHERE task_id = ?1 OR project_id = ?1 OR goal_id = ?1 OR life_area_id = ?1
                 ORDER BY created_at ASC, id ASC;"
            ),
            Some(&parent_id.to_string()),
        )
    }

    async fn create(&self, payload: CreateNote) -> GatewayResult<Note> {
        payload.validate()?;

        let conn = self.conn();
        if let Some(attachment) = payload.attachment {
            require_attachment_target(&conn, attachment)?;
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let (task_id, project_id, goal_id, life_area_id) =
            attachment_columns(payload.attachment);
        conn.execute(
            "INSERT INTO notes (
                id, task_id, project_id, goal_id, life_area_id,
                title, content, created_at, updated_at, archived_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, NULL);",
            params![
                id.to_string(),
                task_id,
                project_id,
                goal_id,
                life_area_id,
                payload.title.trim(),
                payload.content,
                now,
            ],
        )?;

        let mut note = Note {
            id,
            task_id: None,
            project_id: None,
            goal_id: None,
            life_area_id: None,
            title: payload.title.trim().to_string(),
            content: payload.content,
            created_at: now,
            updated_at: now,
            archived_at: None,
        };
        match payload.attachment {
            Some(NoteAttachment::Task(target)) => note.task_id = Some(target),
            Some(NoteAttachment::Project(target)) => note.project_id = Some(target),
            Some(NoteAttachment::Goal(target)) => note.goal_id = Some(target),
            Some(NoteAttachment::LifeArea(target)) => note.life_area_id = Some(target),
            None => {}
        }
        Ok(note)
    }

    async fn update(&self, id: EntityId, payload: UpdateNote) -> GatewayResult<Note> {
        payload.validate()?;

        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut note = get_note_required(&tx, id)?;

        if let Some(title) = payload.title {
            note.title = title.trim().to_string();
        }
        if let Some(content) = payload.content {
            note.content = content;
        }
        if let Some(attachment) = payload.attachment {
            if let Some(target) = attachment {
                require_attachment_target(&tx, target)?;
            }
            note.task_id = None;
            note.project_id = None;
            note.goal_id = None;
            note.life_area_id = None;
            match attachment {
                Some(NoteAttachment::Task(target)) => note.task_id = Some(target),
                Some(NoteAttachment::Project(target)) => note.project_id = Some(target),
                Some(NoteAttachment::Goal(target)) => note.goal_id = Some(target),
                Some(NoteAttachment::LifeArea(target)) => note.life_area_id = Some(target),
                None => {}
            }
        }
        note.updated_at = Utc::now();

        tx.execute(
            "UPDATE notes SET
                task_id = ?2, project_id = ?3, goal_id = ?4, life_area_id = ?5,
                title = ?6, content = ?7, updated_at = ?8
             WHERE id = ?1;",
            params![
                id.to_string(),
                note.task_id.map(|value| value.to_string()),
                note.project_id.map(|value| value.to_string()),
                note.goal_id.map(|value| value.to_string()),
                note.life_area_id.map(|value| value.to_string()),
                note.title,
                note.content,
                note.updated_at,
            ],
        )?;
        tx.commit()?;

        Ok(note)
    }

    async fn archive(&self, id: EntityId) -> GatewayResult<CascadeReceipt> {
        execute_cascade(&mut self.conn(), EntityKind::Note, id, Direction::Archive)
    }

    async fn restore(&self, id: EntityId) -> GatewayResult<CascadeReceipt> {
        execute_cascade(&mut self.conn(), EntityKind::Note, id, Direction::Restore)
    }
}

#[async_trait]
impl NoteGateway for SqliteGateway {
    /// Case-insensitive substring match over title and content of active
    /// notes.
    async fn search(&self, query: &str) -> GatewayResult<Vec<Note>> {
        let pattern = format!("%{}%", query.trim());
        list_notes(
            &self.conn(),
            &format!(
                "{NOTE_SELECT_SQL}
                 WHERE archived_at IS NULL AND (title LIKE ?1 OR content LIKE ?1)
                 ORDER BY created_at ASC, id ASC;"
            ),
            Some(&pattern),
        )
    }
}
