use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{handlers::ApiResponse, middleware::auth::CurrentAdmin, state::AppState},
    domain::{Client, CreateClientRequest, UpdateClientRequest},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
    #[serde(default)]
    active: bool,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct ClientDto {
    id: Uuid,
    name: String,
    username: String,
    phone: Option<String>,
    is_active: bool,
    created_at: String,
}

impl From<Client> for ClientDto {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
            username: client.username,
            phone: client.phone,
            is_active: client.is_active,
            created_at: client.created_at.to_rfc3339(),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<ClientDto>>>> {
    let clients = if params.active {
        state.service_context.client_service.list_active_clients().await?
    } else {
        state
            .service_context
            .client_service
            .list_clients(params.limit, params.offset)
            .await?
    };

    Ok(ApiResponse::ok(clients.into_iter().map(Into::into).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ClientDto>>> {
    let client = state.service_context.client_service.get_client(id).await?;

    Ok(ApiResponse::ok(client.into()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClientDto>>)> {
    let client = state
        .service_context
        .client_service
        .create_client(request)
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(client.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<ApiResponse<ClientDto>>> {
    let client = state
        .service_context
        .client_service
        .update_client(id, request)
        .await?;

    Ok(ApiResponse::ok(client.into()))
}
