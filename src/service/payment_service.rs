use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{
        CreatePaymentRequest, Payment, PaymentFilter, PaymentStats, UpdatePaymentRequest,
    },
    error::{AppError, Result},
    repository::{ClientRepository, PaymentRepository},
    validation,
};

pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl PaymentService {
    pub fn new(payments: Arc<dyn PaymentRepository>, clients: Arc<dyn ClientRepository>) -> Self {
        Self { payments, clients }
    }

    /// Record a payment. Recording against an inactive client
    /// reactivates the account in the same transaction as the insert.
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
        acting_admin: Uuid,
    ) -> Result<Payment> {
        let errors = validation::validate_payment_fields(
            request.amount_cents,
            request.payment_date,
            request.valid_until,
            request.notes.as_deref(),
        );
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let client = self
            .clients
            .find_by_id(request.client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            client_id: request.client_id,
            amount_cents: request.amount_cents,
            status: request.status,
            payment_date: request.payment_date,
            valid_until: request.valid_until,
            notes: request.notes,
            created_by_id: acting_admin,
            created_at: now,
            updated_at: now,
        };

        self.payments.create(payment, !client.is_active).await
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<Payment> {
        self.payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
    }

    pub async fn list_payments(
        &self,
        filter: &PaymentFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Payment>> {
        self.payments.list(filter, limit, offset).await
    }

    /// Patch amount/status/dates/notes. The date invariant is checked
    /// against the merged row, so moving either bound cannot invert the
    /// validity window.
    pub async fn update_payment(&self, id: Uuid, update: UpdatePaymentRequest) -> Result<Payment> {
        let existing = self.get_payment(id).await?;

        let merged = Payment {
            amount_cents: update.amount_cents.unwrap_or(existing.amount_cents),
            status: update.status.unwrap_or(existing.status),
            payment_date: update.payment_date.unwrap_or(existing.payment_date),
            valid_until: update.valid_until.unwrap_or(existing.valid_until),
            notes: update.notes.or(existing.notes),
            ..existing
        };

        let errors = validation::validate_payment_fields(
            merged.amount_cents,
            merged.payment_date,
            merged.valid_until,
            merged.notes.as_deref(),
        );
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        self.payments.update(merged).await
    }

    pub async fn delete_payment(&self, id: Uuid) -> Result<()> {
        self.get_payment(id).await?;
        self.payments.delete(id).await
    }

    /// Most recent qualifying payment per client; clients without one
    /// are absent rather than zero-filled.
    pub async fn latest_per_client(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        self.payments.latest_per_client(filter).await
    }

    pub async fn stats(&self) -> Result<PaymentStats> {
        self.payments.stats(Utc::now()).await
    }
}
