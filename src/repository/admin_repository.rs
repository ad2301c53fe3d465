use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Admin, AdminUpsert},
    error::{AppError, Result},
    repository::AdminRepository,
};

#[derive(FromRow)]
struct AdminRow {
    id: String,
    external_id: Option<String>,
    name: String,
    email: String,
    phone: Option<String>,
    is_active: i32,
    super_admin: i32,
    created_at: NaiveDateTime,
}

pub struct SqliteAdminRepository {
    pool: SqlitePool,
}

impl SqliteAdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_admin(row: AdminRow) -> Result<Admin> {
        Ok(Admin {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            external_id: row.external_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            is_active: row.is_active != 0,
            super_admin: row.super_admin != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl AdminRepository for SqliteAdminRepository {
    async fn create(&self, admin: Admin) -> Result<Admin> {
        let id_str = admin.id.to_string();
        let is_active_int = if admin.is_active { 1i32 } else { 0i32 };
        let super_admin_int = if admin.super_admin { 1i32 } else { 0i32 };
        let created_at_naive = admin.created_at.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO admins (
                id, external_id, name, email, phone, is_active, super_admin, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&admin.external_id)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(&admin.phone)
        .bind(is_active_int)
        .bind(super_admin_int)
        .bind(created_at_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(admin.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created admin".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, AdminRow>(
            r#"
            SELECT id, external_id, name, email, phone, is_active, super_admin, created_at
            FROM admins
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_admin(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Admin>> {
        let row = sqlx::query_as::<_, AdminRow>(
            r#"
            SELECT id, external_id, name, email, phone, is_active, super_admin, created_at
            FROM admins
            WHERE external_id = ?
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_admin(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Admin>> {
        let rows = sqlx::query_as::<_, AdminRow>(
            r#"
            SELECT id, external_id, name, email, phone, is_active, super_admin, created_at
            FROM admins
            ORDER BY created_at ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_admin).collect()
    }

    async fn upsert_external(&self, upsert: AdminUpsert) -> Result<Admin> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now_naive = Utc::now().naive_utc();

        // Re-synchronizing a previously deactivated admin reactivates it;
        // the provider is authoritative for lifecycle.
        sqlx::query(
            r#"
            INSERT INTO admins (
                id, external_id, name, email, phone, is_active, super_admin, created_at
            ) VALUES (?, ?, ?, ?, ?, 1, 0, ?)
            ON CONFLICT (external_id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                phone = excluded.phone,
                is_active = 1
            "#,
        )
        .bind(&id_str)
        .bind(&upsert.external_id)
        .bind(&upsert.name)
        .bind(&upsert.email)
        .bind(&upsert.phone)
        .bind(now_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_external_id(&upsert.external_id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve upserted admin".to_string()))
    }

    async fn deactivate_external(&self, external_id: &str) -> Result<()> {
        sqlx::query("UPDATE admins SET is_active = 0 WHERE external_id = ?")
            .bind(external_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn set_flags(
        &self,
        id: Uuid,
        is_active: Option<bool>,
        super_admin: Option<bool>,
    ) -> Result<Admin> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

        let id_str = id.to_string();
        let is_active_int = is_active.map(|b| if b { 1i32 } else { 0i32 });
        let super_admin_int = super_admin.map(|b| if b { 1i32 } else { 0i32 });

        sqlx::query(
            r#"
            UPDATE admins
            SET is_active = COALESCE(?, is_active),
                super_admin = COALESCE(?, super_admin)
            WHERE id = ?
            "#,
        )
        .bind(is_active_int)
        .bind(super_admin_int)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated admin".to_string()))
    }
}
