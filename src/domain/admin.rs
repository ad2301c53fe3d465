use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff identity, synchronized from the external identity provider.
/// At most one admin exists per external id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub super_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Upsert payload derived from a provider `user.created` / `user.updated`
/// webhook event.
#[derive(Debug, Clone)]
pub struct AdminUpsert {
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminFlagsRequest {
    pub admin_id: Uuid,
    pub is_active: Option<bool>,
    pub super_admin: Option<bool>,
}
