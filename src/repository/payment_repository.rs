use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Payment, PaymentFilter, PaymentStats, PaymentStatus},
    error::{AppError, Result},
    repository::PaymentRepository,
};

#[derive(FromRow)]
struct PaymentRow {
    id: String,
    client_id: String,
    amount_cents: i64,
    status: String,
    payment_date: NaiveDateTime,
    valid_until: NaiveDateTime,
    notes: Option<String>,
    created_by_id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const PAYMENT_COLUMNS: &str = "p.id, p.client_id, p.amount_cents, p.status, p.payment_date, \
     p.valid_until, p.notes, p.created_by_id, p.created_at, p.updated_at";

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PaymentRow) -> Result<Payment> {
        Ok(Payment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            client_id: Uuid::parse_str(&row.client_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            amount_cents: row.amount_cents,
            status: Self::parse_payment_status(&row.status)?,
            payment_date: DateTime::from_naive_utc_and_offset(row.payment_date, Utc),
            valid_until: DateTime::from_naive_utc_and_offset(row.valid_until, Utc),
            notes: row.notes,
            created_by_id: Uuid::parse_str(&row.created_by_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_payment_status(s: &str) -> Result<PaymentStatus> {
        match s {
            "paid" => Ok(PaymentStatus::Paid),
            "pending" => Ok(PaymentStatus::Pending),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(AppError::Database(format!("Invalid payment status: {}", s))),
        }
    }

    fn payment_status_to_str(status: &PaymentStatus) -> &'static str {
        match status {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Failed => "failed",
        }
    }

    // Shared filter fragment; bind order must match the clause order here.
    fn push_filter_sql(sql: &mut String, filter: &PaymentFilter) {
        if filter.client_id.is_some() {
            sql.push_str(" AND p.client_id = ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND p.status = ?");
        }
        if filter.start.is_some() {
            sql.push_str(" AND p.payment_date >= ?");
        }
        if filter.end.is_some() {
            sql.push_str(" AND p.payment_date <= ?");
        }
        if filter.active_only {
            sql.push_str(" AND c.is_active = 1");
        }
    }

    fn bind_filter<'q>(
        mut query: sqlx::query::QueryAs<'q, sqlx::Sqlite, PaymentRow, sqlx::sqlite::SqliteArguments<'q>>,
        filter: &PaymentFilter,
    ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, PaymentRow, sqlx::sqlite::SqliteArguments<'q>> {
        if let Some(client_id) = filter.client_id {
            query = query.bind(client_id.to_string());
        }
        if let Some(status) = &filter.status {
            query = query.bind(Self::payment_status_to_str(status));
        }
        if let Some(start) = filter.start {
            query = query.bind(start.naive_utc());
        }
        if let Some(end) = filter.end {
            query = query.bind(end.naive_utc());
        }
        query
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: Payment, reactivate_client: bool) -> Result<Payment> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let id_str = payment.id.to_string();
        let client_str = payment.client_id.to_string();
        let status_str = Self::payment_status_to_str(&payment.status);
        let payment_date_naive = payment.payment_date.naive_utc();
        let valid_until_naive = payment.valid_until.naive_utc();
        let created_by_str = payment.created_by_id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, client_id, amount_cents, status, payment_date,
                valid_until, notes, created_by_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&client_str)
        .bind(payment.amount_cents)
        .bind(status_str)
        .bind(payment_date_naive)
        .bind(valid_until_naive)
        .bind(&payment.notes)
        .bind(&created_by_str)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        // Recording a payment for a lapsed client brings the account back
        if reactivate_client {
            sqlx::query("UPDATE clients SET is_active = 1 WHERE id = ?")
                .bind(&client_str)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(payment.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created payment".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let id_str = id.to_string();
        let sql = format!(
            "SELECT {} FROM payments p WHERE p.id = ?",
            PAYMENT_COLUMNS
        );

        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id_str)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &PaymentFilter, limit: i64, offset: i64) -> Result<Vec<Payment>> {
        let mut sql = format!(
            "SELECT {} FROM payments p JOIN clients c ON c.id = p.client_id WHERE 1=1",
            PAYMENT_COLUMNS
        );
        Self::push_filter_sql(&mut sql, filter);
        sql.push_str(" ORDER BY p.payment_date DESC LIMIT ? OFFSET ?");

        let query = Self::bind_filter(sqlx::query_as::<_, PaymentRow>(&sql), filter)
            .bind(limit)
            .bind(offset);

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }

    async fn latest_per_client(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        // Windowed ranking: one row per client, the most recent qualifying
        // payment. Clients with no qualifying payment produce no row.
        let mut inner = format!(
            "SELECT {}, ROW_NUMBER() OVER (
                 PARTITION BY p.client_id
                 ORDER BY p.payment_date DESC, p.created_at DESC
             ) AS rn
             FROM payments p JOIN clients c ON c.id = p.client_id WHERE 1=1",
            PAYMENT_COLUMNS
        );
        Self::push_filter_sql(&mut inner, filter);

        let sql = format!(
            "SELECT id, client_id, amount_cents, status, payment_date, valid_until,
                    notes, created_by_id, created_at, updated_at
             FROM ({}) ranked
             WHERE rn = 1
             ORDER BY payment_date DESC",
            inner
        );

        let query = Self::bind_filter(sqlx::query_as::<_, PaymentRow>(&sql), filter);

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<PaymentStats> {
        let now_naive = now.naive_utc();

        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'paid' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'paid' THEN amount_cents ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN valid_until < ? THEN 1 ELSE 0 END), 0)
            FROM payments
            "#,
        )
        .bind(now_naive)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(PaymentStats {
            total_count: row.0,
            paid_count: row.1,
            pending_count: row.2,
            failed_count: row.3,
            total_paid_cents: row.4,
            expired_count: row.5,
        })
    }

    async fn update(&self, payment: Payment) -> Result<Payment> {
        let id_str = payment.id.to_string();
        let status_str = Self::payment_status_to_str(&payment.status);
        let payment_date_naive = payment.payment_date.naive_utc();
        let valid_until_naive = payment.valid_until.naive_utc();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE payments
            SET amount_cents = ?,
                status = ?,
                payment_date = ?,
                valid_until = ?,
                notes = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(payment.amount_cents)
        .bind(status_str)
        .bind(payment_date_naive)
        .bind(valid_until_naive)
        .bind(&payment.notes)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(payment.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated payment".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
