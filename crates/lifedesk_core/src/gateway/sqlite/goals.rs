//! Goal persistence for the SQLite gateway.

use super::{execute_cascade, parse_entity_id, require_active, SqliteGateway};
use crate::cascade::Direction;
use crate::gateway::{CascadeReceipt, EntityGateway, GatewayError, GatewayResult, GoalGateway};
use crate::model::{CreateGoal, EntityId, EntityKind, Goal, Timestamp, UpdateGoal};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use uuid::Uuid;

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    life_area_id,
    name,
    description,
    target_date,
    completed_at,
    created_at,
    updated_at,
    archived_at
FROM goals";

fn parse_goal_row(row: &Row<'_>) -> GatewayResult<Goal> {
    let id_text: String = row.get("id")?;
    let life_area_text: String = row.get("life_area_id")?;
    Ok(Goal {
        id: parse_entity_id(&id_text, "goals.id")?,
        life_area_id: parse_entity_id(&life_area_text, "goals.life_area_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        target_date: row.get("target_date")?,
        completed_at: row.get("completed_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        archived_at: row.get("archived_at")?,
    })
}

fn get_goal(conn: &Connection, id: EntityId) -> GatewayResult<Option<Goal>> {
    let mut stmt = conn.prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_goal_row(row)?));
    }
    Ok(None)
}

fn get_goal_required(conn: &Connection, id: EntityId) -> GatewayResult<Goal> {
    get_goal(conn, id)?.ok_or(GatewayError::NotFound {
        kind: EntityKind::Goal,
        id,
    })
}

fn list_goals(conn: &Connection, sql: &str, bind: Option<EntityId>) -> GatewayResult<Vec<Goal>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = match bind {
        Some(id) => stmt.query([id.to_string()])?,
        None => stmt.query([])?,
    };
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_goal_row(row)?);
    }
    Ok(items)
}

fn set_completed_at(
    conn: &Connection,
    id: EntityId,
    completed_at: Option<Timestamp>,
) -> GatewayResult<Goal> {
    let changed = conn.execute(
        "UPDATE goals SET completed_at = ?2, updated_at = ?3 WHERE id = ?1;",
        params![id.to_string(), completed_at, Utc::now()],
    )?;
    if changed == 0 {
        return Err(GatewayError::NotFound {
            kind: EntityKind::Goal,
            id,
        });
    }
    get_goal_required(conn, id)
}

#[async_trait]
impl EntityGateway<Goal> for SqliteGateway {
    async fn get_all(&self) -> GatewayResult<Vec<Goal>> {
        list_goals(
            &self.conn(),
            &format!("{GOAL_SELECT_SQL} ORDER BY created_at ASC, id ASC;"),
            None,
        )
    }

    async fn get_by_parent(&self, parent_id: EntityId) -> GatewayResult<Vec<Goal>> {
        list_goals(
            &self.conn(),
            &format!("{GOAL_SELECT_SQL} WHERE life_area_id = ?1 ORDER BY created_at ASC, id ASC;"),
            Some(parent_id),
        )
    }

    async fn create(&self, payload: CreateGoal) -> GatewayResult<Goal> {
        payload.validate()?;

        let conn = self.conn();
        require_active(&conn, EntityKind::LifeArea, payload.life_area_id)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO goals (
                id, life_area_id, name, description, target_date,
                completed_at, created_at, updated_at, archived_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6, NULL);",
            params![
                id.to_string(),
                payload.life_area_id.to_string(),
                payload.name.trim(),
                payload.description,
                payload.target_date,
                now,
            ],
        )?;

        Ok(Goal {
            id,
            life_area_id: payload.life_area_id,
            name: payload.name.trim().to_string(),
            description: payload.description,
            target_date: payload.target_date,
            completed_at: None,
            created_at: now,
            updated_at: now,
            archived_at: None,
        })
    }

    async fn update(&self, id: EntityId, payload: UpdateGoal) -> GatewayResult<Goal> {
        payload.validate()?;

        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut goal = get_goal_required(&tx, id)?;

        if let Some(name) = payload.name {
            goal.name = name.trim().to_string();
        }
        if let Some(description) = payload.description {
            goal.description = Some(description);
        }
        if let Some(life_area_id) = payload.life_area_id {
            require_active(&tx, EntityKind::LifeArea, life_area_id)?;
            goal.life_area_id = life_area_id;
        }
        if let Some(target_date) = payload.target_date {
            goal.target_date = Some(target_date);
        }
        goal.updated_at = Utc::now();

        tx.execute(
            "UPDATE goals SET
                life_area_id = ?2, name = ?3, description = ?4,
                target_date = ?5, updated_at = ?6
             WHERE id = ?1;",
            params![
                id.to_string(),
                goal.life_area_id.to_string(),
                goal.name,
                goal.description,
                goal.target_date,
                goal.updated_at,
            ],
        )?;
        tx.commit()?;

        Ok(goal)
    }

    async fn archive(&self, id: EntityId) -> GatewayResult<CascadeReceipt> {
        execute_cascade(&mut self.conn(), EntityKind::Goal, id, Direction::Archive)
    }

    async fn restore(&self, id: EntityId) -> GatewayResult<CascadeReceipt> {
        execute_cascade(&mut self.conn(), EntityKind::Goal, id, Direction::Restore)
    }
}

#[async_trait]
impl GoalGateway for SqliteGateway {
    async fn complete(&self, id: EntityId) -> GatewayResult<Goal> {
        set_completed_at(&self.conn(), id, Some(Utc::now()))
    }

    async fn uncomplete(&self, id: EntityId) -> GatewayResult<Goal> {
        set_completed_at(&self.conn(), id, None)
    }
}
