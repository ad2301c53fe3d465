use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spotter::{
    api,
    config::Settings,
    identity::HttpIdentityProvider,
    repository,
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spotter=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting Spotter server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize repositories
    let client_repo = Arc::new(repository::SqliteClientRepository::new(db_pool.clone()));
    let admin_repo = Arc::new(repository::SqliteAdminRepository::new(db_pool.clone()));
    let class_repo = Arc::new(repository::SqliteClassSessionRepository::new(db_pool.clone()));
    let group_repo = Arc::new(repository::SqliteClientGroupRepository::new(db_pool.clone()));
    let payment_repo = Arc::new(repository::SqlitePaymentRepository::new(db_pool.clone()));

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        client_repo,
        admin_repo,
        class_repo,
        group_repo,
        payment_repo,
        db_pool.clone(),
    ));

    // Identity provider client for bearer-token resolution
    let identity_provider = Arc::new(HttpIdentityProvider::new(&settings.identity));

    if settings.identity.webhook_secret.is_empty() {
        tracing::warn!("Identity webhook secret is not configured; webhook deliveries will be rejected");
    }

    let app = api::create_app(
        service_context,
        identity_provider,
        Arc::new(settings.clone()),
    );

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
