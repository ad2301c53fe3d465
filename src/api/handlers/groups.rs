use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{handlers::ApiResponse, middleware::auth::CurrentAdmin, state::AppState},
    domain::{
        ClientGroup, CreateGroupRequest, GroupWithMembers, MembershipDiff, UpdateGroupRequest,
    },
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

pub async fn list(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<ClientGroup>>>> {
    let groups = state
        .service_context
        .group_service
        .list_groups(params.limit, params.offset)
        .await?;

    Ok(ApiResponse::ok(groups))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GroupWithMembers>>> {
    let group = state.service_context.group_service.get_group(id).await?;

    Ok(ApiResponse::ok(group))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GroupWithMembers>>)> {
    let group = state
        .service_context
        .group_service
        .create_group(request)
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(group)))
}

#[derive(Debug, Serialize)]
pub struct UpdateGroupResponse {
    #[serde(flatten)]
    group: GroupWithMembers,
    diff: MembershipDiff,
}

pub async fn update(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGroupRequest>,
) -> Result<Json<ApiResponse<UpdateGroupResponse>>> {
    let (group, diff) = state
        .service_context
        .group_service
        .update_group(id, request)
        .await?;

    Ok(ApiResponse::ok(UpdateGroupResponse { group, diff }))
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    client_ids: Vec<Uuid>,
}

/// Dry run: reports the added/removed/kept outcome of an edit without
/// touching the group.
pub async fn preview(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<ApiResponse<MembershipDiff>>> {
    let diff = state
        .service_context
        .group_service
        .preview_changes(id, request.client_ids)
        .await?;

    Ok(ApiResponse::ok(diff))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.group_service.delete_group(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
