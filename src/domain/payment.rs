use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Billing record for a client. Amounts are integer cents; the upper
/// bound is 999,999.99.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub payment_date: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    pub client_id: Uuid,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub payment_date: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdatePaymentRequest {
    pub amount_cents: Option<i64>,
    pub status: Option<PaymentStatus>,
    pub payment_date: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Filters shared by the list and last-payment-per-client queries.
/// `start`/`end` bound payment_date; `active_only` restricts to clients
/// whose account is currently active.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub client_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub active_only: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PaymentStats {
    pub total_count: i64,
    pub paid_count: i64,
    pub pending_count: i64,
    pub failed_count: i64,
    pub total_paid_cents: i64,
    pub expired_count: i64,
}
