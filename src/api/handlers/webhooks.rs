use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::{
    api::state::AppState,
    error::{AppError, Result},
    identity::{self, IdentityEvent},
};

const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Identity-provider user lifecycle feed. A bad signature is rejected
/// before any processing; failures after verification are logged and
/// the event is still acknowledged, so the provider does not enter a
/// retry storm over a row we cannot upsert.
pub async fn identity(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let secret = &state.settings.identity.webhook_secret;
    if !identity::verify_webhook_signature(secret, &body, signature) {
        return Err(AppError::Unauthorized);
    }

    let event: IdentityEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Ignoring unparseable identity webhook: {}", e);
            return Ok(StatusCode::OK);
        }
    };

    if let Err(e) = state
        .service_context
        .admin_service
        .apply_identity_event(event)
        .await
    {
        tracing::warn!("Identity webhook processing failed: {}", e);
    }

    Ok(StatusCode::OK)
}
