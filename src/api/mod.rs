pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, identity::IdentityProvider, service::ServiceContext};
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    identity_provider: Arc<dyn IdentityProvider>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, identity_provider, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // Identity provider webhook (signature-checked, no bearer auth)
        .route("/webhooks/identity", post(handlers::webhooks::identity))
        // Authenticated API
        .nest("/api", api_routes(app_state.clone()))
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/classes", class_routes(state.clone()))
        .nest("/client", client_routes(state.clone()))
        .nest("/clients", clients_list_routes(state.clone()))
        .nest("/payments", payment_routes(state.clone()))
        .nest("/admins", admin_routes(state))
}

fn clients_list_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::clients::list))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}

fn class_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::classes::list))
        .route("/", post(handlers::classes::create))
        .route("/:id", get(handlers::classes::get))
        .route("/:id", put(handlers::classes::update))
        .route("/:id/check-in", post(handlers::classes::check_in))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}

fn client_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Group routes come first; the static "group" segment wins over ":id"
        .route("/group", get(handlers::groups::list))
        .route("/group", post(handlers::groups::create))
        .route("/group/:id", get(handlers::groups::get))
        .route("/group/:id", put(handlers::groups::update))
        .route("/group/:id", delete(handlers::groups::delete))
        .route("/group/:id/preview", post(handlers::groups::preview))
        .route("/", post(handlers::clients::create))
        .route("/:id", get(handlers::clients::get))
        .route("/:id", put(handlers::clients::update))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}

fn payment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::payments::list))
        .route("/", post(handlers::payments::create))
        .route("/latest", get(handlers::payments::latest))
        .route("/stats", get(handlers::payments::stats))
        .route("/:id", get(handlers::payments::get))
        .route("/:id", put(handlers::payments::update))
        .route("/:id", delete(handlers::payments::delete))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::admins::list))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin,
        ))
        // Flag toggles require the superadmin bit
        .merge(
            Router::new()
                .route("/", patch(handlers::admins::set_flags))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_superadmin,
                )),
        )
}
