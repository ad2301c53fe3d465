use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{ClientGroup, ClientGroupMembership},
    error::{AppError, Result},
    repository::{ClientGroupRepository, MembershipApply},
};

#[derive(FromRow)]
struct GroupRow {
    id: String,
    name: String,
    description: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct MembershipRow {
    client_group_id: String,
    client_id: String,
    added_at: NaiveDateTime,
}

pub struct SqliteClientGroupRepository {
    pool: SqlitePool,
}

impl SqliteClientGroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_group(row: GroupRow) -> Result<ClientGroup> {
        Ok(ClientGroup {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            description: row.description,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_membership(row: MembershipRow) -> Result<ClientGroupMembership> {
        Ok(ClientGroupMembership {
            client_group_id: Uuid::parse_str(&row.client_group_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            client_id: Uuid::parse_str(&row.client_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            added_at: DateTime::from_naive_utc_and_offset(row.added_at, Utc),
        })
    }
}

#[async_trait]
impl ClientGroupRepository for SqliteClientGroupRepository {
    async fn create(&self, group: ClientGroup, member_ids: &[Uuid]) -> Result<ClientGroup> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let id_str = group.id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO client_groups (id, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&group.name)
        .bind(&group.description)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        for client_id in member_ids {
            let client_str = client_id.to_string();
            sqlx::query(
                r#"
                INSERT INTO client_group_memberships (client_group_id, client_id, added_at)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&id_str)
            .bind(&client_str)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(group.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created group".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClientGroup>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM client_groups
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_group(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ClientGroup>> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM client_groups
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_group(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<ClientGroup>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM client_groups
            ORDER BY name ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_group).collect()
    }

    async fn members(&self, group_id: Uuid) -> Result<Vec<ClientGroupMembership>> {
        let group_str = group_id.to_string();
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT client_group_id, client_id, added_at
            FROM client_group_memberships
            WHERE client_group_id = ?
            ORDER BY added_at ASC
            "#,
        )
        .bind(group_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_membership).collect()
    }

    async fn update_with_members(
        &self,
        group: ClientGroup,
        apply: MembershipApply,
    ) -> Result<ClientGroup> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let id_str = group.id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE client_groups
            SET name = ?, description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&group.name)
        .bind(&group.description)
        .bind(now)
        .bind(&id_str)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if !apply.remove.is_empty() {
            let placeholders = vec!["?"; apply.remove.len()].join(", ");
            let sql = format!(
                "DELETE FROM client_group_memberships WHERE client_group_id = ? AND client_id IN ({})",
                placeholders
            );

            let mut query = sqlx::query(&sql).bind(&id_str);
            for client_id in &apply.remove {
                query = query.bind(client_id.to_string());
            }
            query
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        for client_id in &apply.add {
            let client_str = client_id.to_string();
            sqlx::query(
                r#"
                INSERT INTO client_group_memberships (client_group_id, client_id, added_at)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&id_str)
            .bind(&client_str)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(group.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated group".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let id_str = id.to_string();

        sqlx::query("DELETE FROM client_group_memberships WHERE client_group_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM client_groups WHERE id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
