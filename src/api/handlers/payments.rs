use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{handlers::ApiResponse, middleware::auth::CurrentAdmin, state::AppState},
    domain::{
        CreatePaymentRequest, Payment, PaymentFilter, PaymentStats, PaymentStatus,
        UpdatePaymentRequest,
    },
    error::{AppError, Result},
    schedule,
};

#[derive(Debug, Deserialize)]
pub struct PaymentParams {
    client_id: Option<Uuid>,
    status: Option<PaymentStatus>,
    start_date: Option<String>,
    end_date: Option<String>,
    #[serde(default)]
    active_only: bool,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl PaymentParams {
    /// Date-only bounds expand to full-day instants so a filter covers
    /// both edge dates.
    fn to_filter(&self) -> Result<PaymentFilter> {
        let start = self
            .start_date
            .as_deref()
            .map(|raw| {
                schedule::parse_day(raw).ok_or_else(|| {
                    AppError::BadRequest("Invalid start_date, expected YYYY-MM-DD".to_string())
                })
            })
            .transpose()?
            .map(|date| schedule::day_bounds(date).0.and_utc());

        let end = self
            .end_date
            .as_deref()
            .map(|raw| {
                schedule::parse_day(raw).ok_or_else(|| {
                    AppError::BadRequest("Invalid end_date, expected YYYY-MM-DD".to_string())
                })
            })
            .transpose()?
            .map(|date| schedule::day_bounds(date).1.and_utc());

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(AppError::BadRequest(
                    "Start date must not be after end date".to_string(),
                ));
            }
        }

        Ok(PaymentFilter {
            client_id: self.client_id,
            status: self.status,
            start,
            end,
            active_only: self.active_only,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Query(params): Query<PaymentParams>,
) -> Result<Json<ApiResponse<Vec<Payment>>>> {
    let filter = params.to_filter()?;
    let payments = state
        .service_context
        .payment_service
        .list_payments(&filter, params.limit, params.offset)
        .await?;

    Ok(ApiResponse::ok(payments))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>)> {
    let payment = state
        .service_context
        .payment_service
        .create_payment(request, admin.admin.id)
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(payment)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Payment>>> {
    let payment = state.service_context.payment_service.get_payment(id).await?;

    Ok(ApiResponse::ok(payment))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<ApiResponse<Payment>>> {
    let payment = state
        .service_context
        .payment_service
        .update_payment(id, request)
        .await?;

    Ok(ApiResponse::ok(payment))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .payment_service
        .delete_payment(id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Most recent qualifying payment per client.
pub async fn latest(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
    Query(params): Query<PaymentParams>,
) -> Result<Json<ApiResponse<Vec<Payment>>>> {
    let filter = params.to_filter()?;
    let payments = state
        .service_context
        .payment_service
        .latest_per_client(&filter)
        .await?;

    Ok(ApiResponse::ok(payments))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(_admin): Extension<CurrentAdmin>,
) -> Result<Json<ApiResponse<PaymentStats>>> {
    let stats = state.service_context.payment_service.stats().await?;

    Ok(ApiResponse::ok(stats))
}
