pub mod admins;
pub mod classes;
pub mod clients;
pub mod groups;
pub mod payments;
pub mod root;
pub mod webhooks;

use axum::Json;
use serde::Serialize;

/// Success envelope: every endpoint answers `{ "success": true, ... }`
/// on the happy path; failures come from `AppError`'s response mapping.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}
