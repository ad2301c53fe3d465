use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{AttendanceLog, ClassSession},
    error::{AppError, Result},
    repository::{ClassSessionRepository, RosterApply},
};

#[derive(FromRow)]
struct ClassSessionRow {
    id: String,
    title: String,
    description: Option<String>,
    location: Option<String>,
    capacity: i32,
    date: String,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    is_cancelled: i32,
    instructor_id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct AttendanceRow {
    id: String,
    class_session_id: String,
    client_id: String,
    checked_in_at: NaiveDateTime,
    checked_in_by_id: String,
}

pub struct SqliteClassSessionRepository {
    pool: SqlitePool,
}

impl SqliteClassSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_session(row: ClassSessionRow) -> Result<ClassSession> {
        Ok(ClassSession {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            description: row.description,
            location: row.location,
            capacity: row.capacity,
            date: NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
                .map_err(|e| AppError::Database(e.to_string()))?,
            start_time: DateTime::from_naive_utc_and_offset(row.start_time, Utc),
            end_time: DateTime::from_naive_utc_and_offset(row.end_time, Utc),
            is_cancelled: row.is_cancelled != 0,
            instructor_id: Uuid::parse_str(&row.instructor_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_log(row: AttendanceRow) -> Result<AttendanceLog> {
        Ok(AttendanceLog {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            class_session_id: Uuid::parse_str(&row.class_session_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            client_id: Uuid::parse_str(&row.client_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            checked_in_at: DateTime::from_naive_utc_and_offset(row.checked_in_at, Utc),
            checked_in_by_id: Uuid::parse_str(&row.checked_in_by_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
        })
    }
}

#[async_trait]
impl ClassSessionRepository for SqliteClassSessionRepository {
    async fn create(&self, session: ClassSession) -> Result<ClassSession> {
        let id_str = session.id.to_string();
        let date_str = session.date.format("%Y-%m-%d").to_string();
        let start_naive = session.start_time.naive_utc();
        let end_naive = session.end_time.naive_utc();
        let is_cancelled_int = if session.is_cancelled { 1i32 } else { 0i32 };
        let instructor_str = session.instructor_id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO class_sessions (
                id, title, description, location, capacity, date,
                start_time, end_time, is_cancelled, instructor_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&session.title)
        .bind(&session.description)
        .bind(&session.location)
        .bind(session.capacity)
        .bind(&date_str)
        .bind(start_naive)
        .bind(end_naive)
        .bind(is_cancelled_int)
        .bind(&instructor_str)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(session.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created class".to_string()))
    }

    async fn create_many(&self, sessions: Vec<ClassSession>) -> Result<Vec<ClassSession>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let now = Utc::now().naive_utc();

        for session in &sessions {
            let id_str = session.id.to_string();
            let date_str = session.date.format("%Y-%m-%d").to_string();
            let start_naive = session.start_time.naive_utc();
            let end_naive = session.end_time.naive_utc();
            let is_cancelled_int = if session.is_cancelled { 1i32 } else { 0i32 };
            let instructor_str = session.instructor_id.to_string();

            sqlx::query(
                r#"
                INSERT INTO class_sessions (
                    id, title, description, location, capacity, date,
                    start_time, end_time, is_cancelled, instructor_id,
                    created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id_str)
            .bind(&session.title)
            .bind(&session.description)
            .bind(&session.location)
            .bind(session.capacity)
            .bind(&date_str)
            .bind(start_naive)
            .bind(end_naive)
            .bind(is_cancelled_int)
            .bind(&instructor_str)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(sessions)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClassSession>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, ClassSessionRow>(
            r#"
            SELECT id, title, description, location, capacity, date,
                   start_time, end_time, is_cancelled, instructor_id,
                   created_at, updated_at
            FROM class_sessions
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_session(r)?)),
            None => Ok(None),
        }
    }

    async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ClassSession>> {
        let start_naive = start.naive_utc();
        let end_naive = end.naive_utc();

        let rows = sqlx::query_as::<_, ClassSessionRow>(
            r#"
            SELECT id, title, description, location, capacity, date,
                   start_time, end_time, is_cancelled, instructor_id,
                   created_at, updated_at
            FROM class_sessions
            WHERE start_time >= ? AND start_time <= ?
            ORDER BY start_time ASC
            "#,
        )
        .bind(start_naive)
        .bind(end_naive)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_session).collect()
    }

    async fn roster(&self, class_session_id: Uuid) -> Result<Vec<AttendanceLog>> {
        let session_str = class_session_id.to_string();
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, class_session_id, client_id, checked_in_at, checked_in_by_id
            FROM attendance_logs
            WHERE class_session_id = ?
            ORDER BY checked_in_at ASC
            "#,
        )
        .bind(session_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_log).collect()
    }

    async fn update_with_roster(
        &self,
        session: ClassSession,
        roster: Option<RosterApply>,
    ) -> Result<ClassSession> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let id_str = session.id.to_string();
        let date_str = session.date.format("%Y-%m-%d").to_string();
        let start_naive = session.start_time.naive_utc();
        let end_naive = session.end_time.naive_utc();
        let is_cancelled_int = if session.is_cancelled { 1i32 } else { 0i32 };
        let instructor_str = session.instructor_id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE class_sessions
            SET title = ?, description = ?, location = ?, capacity = ?,
                date = ?, start_time = ?, end_time = ?, is_cancelled = ?,
                instructor_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&session.title)
        .bind(&session.description)
        .bind(&session.location)
        .bind(session.capacity)
        .bind(&date_str)
        .bind(start_naive)
        .bind(end_naive)
        .bind(is_cancelled_int)
        .bind(&instructor_str)
        .bind(now)
        .bind(&id_str)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(apply) = roster {
            if !apply.remove.is_empty() {
                let placeholders = vec!["?"; apply.remove.len()].join(", ");
                let sql = format!(
                    "DELETE FROM attendance_logs WHERE class_session_id = ? AND client_id IN ({})",
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

            let checked_in_by_str = apply.checked_in_by.to_string();
            for client_id in &apply.add {
                let log_id = Uuid::new_v4().to_string();
                let client_str = client_id.to_string();

                sqlx::query(
                    r#"
                    INSERT INTO attendance_logs (
                        id, class_session_id, client_id, checked_in_at, checked_in_by_id
                    ) VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&log_id)
                .bind(&id_str)
                .bind(&client_str)
                .bind(now)
                .bind(&checked_in_by_str)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(session.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated class".to_string()))
    }

    async fn add_attendance(
        &self,
        class_session_id: Uuid,
        client_id: Uuid,
        checked_in_by: Uuid,
    ) -> Result<AttendanceLog> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let session_str = class_session_id.to_string();
        let client_str = client_id.to_string();
        let admin_str = checked_in_by.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO attendance_logs (
                id, class_session_id, client_id, checked_in_at, checked_in_by_id
            ) VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&session_str)
        .bind(&client_str)
        .bind(now)
        .bind(&admin_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(AttendanceLog {
            id,
            class_session_id,
            client_id,
            checked_in_at: DateTime::from_naive_utc_and_offset(now, Utc),
            checked_in_by_id: checked_in_by,
        })
    }
}
