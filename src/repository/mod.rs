use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod admin_repository;
pub mod class_repository;
pub mod client_repository;
pub mod group_repository;
pub mod payment_repository;

pub use admin_repository::SqliteAdminRepository;
pub use class_repository::SqliteClassSessionRepository;
pub use client_repository::SqliteClientRepository;
pub use group_repository::SqliteClientGroupRepository;
pub use payment_repository::SqlitePaymentRepository;

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, request: CreateClientRequest) -> Result<Client>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Client>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Client>>;
    async fn list_active(&self) -> Result<Vec<Client>>;
    /// Which of the given ids exist in the clients table.
    async fn existing_ids(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>>;
    async fn update(&self, id: Uuid, update: UpdateClientRequest) -> Result<Client>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(&self, admin: Admin) -> Result<Admin>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>>;
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Admin>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Admin>>;
    /// Insert-or-update keyed on external_id; at most one admin row per
    /// provider user.
    async fn upsert_external(&self, upsert: AdminUpsert) -> Result<Admin>;
    async fn deactivate_external(&self, external_id: &str) -> Result<()>;
    async fn set_flags(
        &self,
        id: Uuid,
        is_active: Option<bool>,
        super_admin: Option<bool>,
    ) -> Result<Admin>;
}

/// Attendance rows to remove and insert when a roster is reconciled.
/// Kept rows are untouched, preserving their original check-in
/// attribution; added rows are stamped with `checked_in_by`.
#[derive(Debug, Clone)]
pub struct RosterApply {
    pub remove: Vec<Uuid>,
    pub add: Vec<Uuid>,
    pub checked_in_by: Uuid,
}

#[async_trait]
pub trait ClassSessionRepository: Send + Sync {
    async fn create(&self, session: ClassSession) -> Result<ClassSession>;
    /// Insert a batch of expanded recurring sessions in one transaction.
    async fn create_many(&self, sessions: Vec<ClassSession>) -> Result<Vec<ClassSession>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClassSession>>;
    async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ClassSession>>;
    async fn roster(&self, class_session_id: Uuid) -> Result<Vec<AttendanceLog>>;
    /// Scalar field update and roster diff in a single transaction;
    /// either both commit or neither does.
    async fn update_with_roster(
        &self,
        session: ClassSession,
        roster: Option<RosterApply>,
    ) -> Result<ClassSession>;
    async fn add_attendance(
        &self,
        class_session_id: Uuid,
        client_id: Uuid,
        checked_in_by: Uuid,
    ) -> Result<AttendanceLog>;
}

/// Membership rows to remove and insert when a group's member list is
/// reconciled.
#[derive(Debug, Clone)]
pub struct MembershipApply {
    pub remove: Vec<Uuid>,
    pub add: Vec<Uuid>,
}

#[async_trait]
pub trait ClientGroupRepository: Send + Sync {
    async fn create(&self, group: ClientGroup, member_ids: &[Uuid]) -> Result<ClientGroup>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClientGroup>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<ClientGroup>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<ClientGroup>>;
    async fn members(&self, group_id: Uuid) -> Result<Vec<ClientGroupMembership>>;
    async fn update_with_members(
        &self,
        group: ClientGroup,
        apply: MembershipApply,
    ) -> Result<ClientGroup>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Inserting a payment for an inactive client reactivates the client
    /// in the same transaction when `reactivate_client` is set.
    async fn create(&self, payment: Payment, reactivate_client: bool) -> Result<Payment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn list(&self, filter: &PaymentFilter, limit: i64, offset: i64) -> Result<Vec<Payment>>;
    /// Most recent qualifying payment per client; clients with none are
    /// absent from the result.
    async fn latest_per_client(&self, filter: &PaymentFilter) -> Result<Vec<Payment>>;
    async fn stats(&self, now: DateTime<Utc>) -> Result<PaymentStats>;
    async fn update(&self, payment: Payment) -> Result<Payment>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}
