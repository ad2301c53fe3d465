use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{handlers::ApiResponse, middleware::auth::CurrentAdmin, state::AppState},
    domain::{Admin, AdminFlagsRequest},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct AdminDto {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    is_active: bool,
    super_admin: bool,
    created_at: String,
}

impl From<Admin> for AdminDto {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            phone: admin.phone,
            is_active: admin.is_active,
            super_admin: admin.super_admin,
            created_at: admin.created_at.to_rfc3339(),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<AdminDto>>>> {
    let admins = state
        .service_context
        .admin_service
        .list_admins(params.limit, params.offset)
        .await?;

    Ok(ApiResponse::ok(admins.into_iter().map(Into::into).collect()))
}

/// Superadmin-only flag toggles on another admin account.
pub async fn set_flags(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(request): Json<AdminFlagsRequest>,
) -> Result<Json<ApiResponse<AdminDto>>> {
    let updated = state
        .service_context
        .admin_service
        .set_flags(&admin.admin, request)
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}
