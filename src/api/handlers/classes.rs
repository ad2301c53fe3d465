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
        ClassSession, ClassWithRoster, CreateClassRequest, CreateRecurringClassRequest,
        RosterChange, UpdateClassRequest,
    },
    error::{AppError, Result},
    schedule,
};

/// A recurring body carries `days` and a date range; a single body
/// carries one `date`. The variants have disjoint required fields, so
/// untagged deserialization picks the right one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateClassBody {
    Recurring(CreateRecurringClassRequest),
    Single(CreateClassRequest),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CreateClassResponse {
    Single(Box<ClassSession>),
    Recurring {
        created_count: usize,
        sessions: Vec<ClassSession>,
    },
}

pub async fn create(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Json(body): Json<CreateClassBody>,
) -> Result<(StatusCode, Json<ApiResponse<CreateClassResponse>>)> {
    let response = match body {
        CreateClassBody::Single(request) => {
            let session = state
                .service_context
                .class_service
                .create_class(request)
                .await?;
            CreateClassResponse::Single(Box::new(session))
        }
        CreateClassBody::Recurring(request) => {
            let sessions = state
                .service_context
                .class_service
                .create_recurring(request)
                .await?;
            CreateClassResponse::Recurring {
                created_count: sessions.len(),
                sessions,
            }
        }
    };

    Ok((StatusCode::CREATED, ApiResponse::ok(response)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    start_date: Option<String>,
    end_date: Option<String>,
    week_offset: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<ClassSession>>>> {
    let service = &state.service_context.class_service;

    let sessions = if let Some(offset) = params.week_offset {
        service.list_week(offset).await?
    } else {
        let (Some(start_raw), Some(end_raw)) = (params.start_date, params.end_date) else {
            return Err(AppError::BadRequest(
                "Either week_offset or both start_date and end_date are required".to_string(),
            ));
        };

        let start = schedule::parse_day(&start_raw).ok_or_else(|| {
            AppError::BadRequest("Invalid start_date, expected YYYY-MM-DD".to_string())
        })?;
        let end = schedule::parse_day(&end_raw).ok_or_else(|| {
            AppError::BadRequest("Invalid end_date, expected YYYY-MM-DD".to_string())
        })?;

        service.list_range(start, end).await?
    };

    Ok(ApiResponse::ok(sessions))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ClassWithRoster>>> {
    let class = state.service_context.class_service.get_class(id).await?;

    Ok(ApiResponse::ok(class))
}

#[derive(Debug, Serialize)]
pub struct UpdateClassResponse {
    #[serde(flatten)]
    class: ClassWithRoster,
    #[serde(skip_serializing_if = "Option::is_none")]
    roster_change: Option<RosterChange>,
}

pub async fn update(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClassRequest>,
) -> Result<Json<ApiResponse<UpdateClassResponse>>> {
    let (class, roster_change) = state
        .service_context
        .class_service
        .update_class(id, request, admin.admin.id)
        .await?;

    Ok(ApiResponse::ok(UpdateClassResponse {
        class,
        roster_change,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    client_id: Uuid,
}

pub async fn check_in(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<ApiResponse<ClassWithRoster>>> {
    let class = state
        .service_context
        .class_service
        .check_in(id, request.client_id, admin.admin.id)
        .await?;

    Ok(ApiResponse::ok(class))
}
