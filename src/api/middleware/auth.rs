use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{api::state::AppState, domain::Admin, error::AppError};

/// The resolved caller, injected into request extensions so handlers
/// can attribute writes to a specific admin.
#[derive(Clone)]
pub struct CurrentAdmin {
    pub admin: Admin,
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

async fn resolve_admin(state: &AppState, token: &str) -> Result<Admin, AppError> {
    let external_id = state
        .identity_provider
        .resolve(token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let admin = state
        .service_context
        .admin_repo
        .find_by_external_id(&external_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !admin.is_active {
        return Err(AppError::Forbidden);
    }

    Ok(admin)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or(AppError::Unauthorized)?
        .to_owned();
    let admin = resolve_admin(&state, &token).await?;
    request.extensions_mut().insert(CurrentAdmin { admin });

    Ok(next.run(request).await)
}

pub async fn require_superadmin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or(AppError::Unauthorized)?
        .to_owned();
    let admin = resolve_admin(&state, &token).await?;

    if !admin.super_admin {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(CurrentAdmin { admin });

    Ok(next.run(request).await)
}
