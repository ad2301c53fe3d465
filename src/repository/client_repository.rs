use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Client, CreateClientRequest, UpdateClientRequest},
    error::{AppError, Result},
    repository::ClientRepository,
};

// Database row struct that matches the SQLite schema
#[derive(FromRow)]
struct ClientRow {
    id: String,
    name: String,
    username: String,
    password_hash: String,
    phone: Option<String>,
    is_active: i32,
    created_at: NaiveDateTime,
}

pub struct SqliteClientRepository {
    pool: SqlitePool,
}

impl SqliteClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_client(row: ClientRow) -> Result<Client> {
        Ok(Client {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            username: row.username,
            password_hash: row.password_hash,
            phone: row.phone,
            is_active: row.is_active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn hash_password(password: &str) -> Result<String> {
        use argon2::password_hash::{rand_core::OsRng, SaltString};
        use argon2::{Argon2, PasswordHasher};

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .to_string())
    }
}

#[async_trait]
impl ClientRepository for SqliteClientRepository {
    async fn create(&self, request: CreateClientRequest) -> Result<Client> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let password_hash = Self::hash_password(&request.password)?;
        let id_str = id.to_string();
        let now_naive = now.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, name, username, password_hash, phone, is_active, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&request.name)
        .bind(&request.username)
        .bind(&password_hash)
        .bind(&request.phone)
        .bind(1i32)
        .bind(now_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created client".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, username, password_hash, phone, is_active, created_at
            FROM clients
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_client(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, username, password_hash, phone, is_active, created_at
            FROM clients
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_client(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, username, password_hash, phone, is_active, created_at
            FROM clients
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_client).collect()
    }

    async fn list_active(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, username, password_hash, phone, is_active, created_at
            FROM clients
            WHERE is_active = 1
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_client).collect()
    }

    async fn existing_ids(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT id FROM clients WHERE id IN ({})", placeholders);

        let mut query = sqlx::query_as::<_, (String,)>(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|(id,)| Uuid::parse_str(&id).map_err(|e| AppError::Database(e.to_string())))
            .collect()
    }

    async fn update(&self, id: Uuid, update: UpdateClientRequest) -> Result<Client> {
        // Ensure the row exists before patching
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

        let password_hash = update
            .password
            .as_deref()
            .map(Self::hash_password)
            .transpose()?;

        let id_str = id.to_string();
        let is_active_int = update.is_active.map(|b| if b { 1i32 } else { 0i32 });

        sqlx::query(
            r#"
            UPDATE clients
            SET name = COALESCE(?, name),
                username = COALESCE(?, username),
                password_hash = COALESCE(?, password_hash),
                phone = COALESCE(?, phone),
                is_active = COALESCE(?, is_active)
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.username)
        .bind(&password_hash)
        .bind(&update.phone)
        .bind(is_active_int)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated client".to_string()))
    }
}
