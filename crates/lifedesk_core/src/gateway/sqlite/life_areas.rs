//! Life-area persistence for the SQLite gateway.

use super::{execute_cascade, parse_entity_id, SqliteGateway};
use crate::cascade::Direction;
use crate::gateway::{
    CascadeReceipt, EntityGateway, GatewayError, GatewayResult, LifeAreaGateway,
};
use crate::model::{CreateLifeArea, EntityId, EntityKind, LifeArea, UpdateLifeArea};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use uuid::Uuid;

const LIFE_AREA_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    color,
    icon,
    sort_order,
    created_at,
    updated_at,
    archived_at
FROM life_areas";

fn parse_life_area_row(row: &Row<'_>) -> GatewayResult<LifeArea> {
    let id_text: String = row.get("id")?;
    Ok(LifeArea {
        id: parse_entity_id(&id_text, "life_areas.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        color: row.get("color")?,
        icon: row.get("icon")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        archived_at: row.get("archived_at")?,
    })
}

fn get_life_area(conn: &Connection, id: EntityId) -> GatewayResult<Option<LifeArea>> {
    let mut stmt = conn.prepare(&format!("{LIFE_AREA_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_life_area_row(row)?));
    }
    Ok(None)
}

fn get_life_area_required(conn: &Connection, id: EntityId) -> GatewayResult<LifeArea> {
    get_life_area(conn, id)?.ok_or(GatewayError::NotFound {
        kind: EntityKind::LifeArea,
        id,
    })
}

#[async_trait]
impl EntityGateway<LifeArea> for SqliteGateway {
    async fn get_all(&self) -> GatewayResult<Vec<LifeArea>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{LIFE_AREA_SELECT_SQL} ORDER BY sort_order ASC, name ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_life_area_row(row)?);
        }
        Ok(items)
    }

    /// Life areas are roots; there is no parent to narrow by.
    async fn get_by_parent(&self, _parent_id: EntityId) -> GatewayResult<Vec<LifeArea>> {
        Ok(Vec::new())
    }

    async fn create(&self, payload: CreateLifeArea) -> GatewayResult<LifeArea> {
        payload.validate()?;

        let conn = self.conn();
        let sort_order: i64 = conn.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM life_areas;",
            [],
            |row| row.get(0),
        )?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO life_areas (
                id, name, description, color, icon, sort_order,
                created_at, updated_at, archived_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, NULL);",
            params![
                id.to_string(),
                payload.name.trim(),
                payload.description,
                payload.color,
                payload.icon,
                sort_order,
                now,
            ],
        )?;

        Ok(LifeArea {
            id,
            name: payload.name.trim().to_string(),
            description: payload.description,
            color: payload.color,
            icon: payload.icon,
            sort_order,
            created_at: now,
            updated_at: now,
            archived_at: None,
        })
    }

    async fn update(&self, id: EntityId, payload: UpdateLifeArea) -> GatewayResult<LifeArea> {
        payload.validate()?;

        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut area = get_life_area_required(&tx, id)?;

        if let Some(name) = payload.name {
            area.name = name.trim().to_string();
        }
        if let Some(description) = payload.description {
            area.description = Some(description);
        }
        if let Some(color) = payload.color {
            area.color = Some(color);
        }
        if let Some(icon) = payload.icon {
            area.icon = Some(icon);
        }
        if let Some(sort_order) = payload.sort_order {
            area.sort_order = sort_order;
        }
        area.updated_at = Utc::now();

        tx.execute(
            "UPDATE life_areas SET
                name = ?2, description = ?3, color = ?4, icon = ?5,
                sort_order = ?6, updated_at = ?7
             WHERE id = ?1;",
            params![
                id.to_string(),
                area.name,
                area.description,
                area.color,
                area.icon,
                area.sort_order,
                area.updated_at,
            ],
        )?;
        tx.commit()?;

        Ok(area)
    }

    async fn archive(&self, id: EntityId) -> GatewayResult<CascadeReceipt> {
        execute_cascade(&mut self.conn(), EntityKind::LifeArea, id, Direction::Archive)
    }

    async fn restore(&self, id: EntityId) -> GatewayResult<CascadeReceipt> {
        execute_cascade(&mut self.conn(), EntityKind::LifeArea, id, Direction::Restore)
    }
}

#[async_trait]
impl LifeAreaGateway for SqliteGateway {
    async fn reorder(&self, ids: &[EntityId]) -> GatewayResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = Utc::now();
        for (index, id) in ids.iter().enumerate() {
            tx.execute(
                "UPDATE life_areas SET sort_order = ?2, updated_at = ?3 WHERE id = ?1;",
                params![id.to_string(), index as i64, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
