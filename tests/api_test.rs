use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

use spotter::{
    api,
    config::Settings,
    domain::Admin,
    error::Result,
    identity::IdentityProvider,
    repository::{
        AdminRepository, SqliteAdminRepository, SqliteClassSessionRepository,
        SqliteClientGroupRepository, SqliteClientRepository, SqlitePaymentRepository,
    },
    service::ServiceContext,
};

const WEBHOOK_SECRET: &str = "whsec_test";

/// Token-to-external-id map standing in for the hosted provider.
struct StaticIdentityProvider {
    tokens: HashMap<String, String>,
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Option<String>> {
        Ok(self.tokens.get(token).cloned())
    }
}

async fn build_app() -> anyhow::Result<(Router, SqlitePool)> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let client_repo = Arc::new(SqliteClientRepository::new(pool.clone()));
    let admin_repo = Arc::new(SqliteAdminRepository::new(pool.clone()));
    let class_repo = Arc::new(SqliteClassSessionRepository::new(pool.clone()));
    let group_repo = Arc::new(SqliteClientGroupRepository::new(pool.clone()));
    let payment_repo = Arc::new(SqlitePaymentRepository::new(pool.clone()));

    admin_repo
        .create(Admin {
            id: Uuid::new_v4(),
            external_id: Some("usr_admin".to_string()),
            name: "Front Desk".to_string(),
            email: "desk@test.local".to_string(),
            phone: None,
            is_active: true,
            super_admin: false,
            created_at: Utc::now(),
        })
        .await?;

    let service_context = Arc::new(ServiceContext::new(
        client_repo,
        admin_repo,
        class_repo,
        group_repo,
        payment_repo,
        pool.clone(),
    ));

    let provider = StaticIdentityProvider {
        tokens: HashMap::from([("admintoken".to_string(), "usr_admin".to_string())]),
    };

    let mut settings = Settings::default();
    settings.identity.webhook_secret = WEBHOOK_SECRET.to_string();

    let app = api::create_app(service_context, Arc::new(provider), Arc::new(settings));

    Ok((app, pool))
}

fn sign(body: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).expect("hmac accepts any key");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[tokio::test]
async fn health_endpoint_is_open() -> anyhow::Result<()> {
    let (app, _pool) = build_app().await?;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn api_routes_require_a_valid_bearer_token() -> anyhow::Result<()> {
    let (app, _pool) = build_app().await?;

    let anonymous = app
        .clone()
        .oneshot(Request::builder().uri("/api/clients").body(Body::empty())?)
        .await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let bad_token = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/clients")
                .header("Authorization", "Bearer bogus")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(bad_token.status(), StatusCode::UNAUTHORIZED);

    let authed = app
        .oneshot(
            Request::builder()
                .uri("/api/clients")
                .header("Authorization", "Bearer admintoken")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(authed.status(), StatusCode::OK);

    let bytes = to_bytes(authed.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(json["success"], serde_json::Value::Bool(true));

    Ok(())
}

#[tokio::test]
async fn superadmin_routes_reject_regular_admins() -> anyhow::Result<()> {
    let (app, _pool) = build_app().await?;

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/admins")
                .header("Authorization", "Bearer admintoken")
                .header("Content-Type", "application/json")
                .body(Body::from(format!(
                    r#"{{"admin_id":"{}","is_active":false}}"#,
                    Uuid::new_v4()
                )))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn webhook_rejects_bad_signatures_and_applies_good_ones() -> anyhow::Result<()> {
    let (app, pool) = build_app().await?;

    let payload = r#"{
        "type": "user.created",
        "data": {
            "id": "usr_new",
            "first_name": "Noa",
            "last_name": "Lund",
            "primary_email": "noa@example.com",
            "primary_phone": null
        }
    }"#;

    let unsigned = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .header("Content-Type", "application/json")
                .body(Body::from(payload))?,
        )
        .await?;
    assert_eq!(unsigned.status(), StatusCode::UNAUTHORIZED);

    let tampered = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .header("Content-Type", "application/json")
                .header("x-webhook-signature", sign("something else"))
                .body(Body::from(payload))?,
        )
        .await?;
    assert_eq!(tampered.status(), StatusCode::UNAUTHORIZED);

    let signed = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .header("Content-Type", "application/json")
                .header("x-webhook-signature", sign(payload))
                .body(Body::from(payload))?,
        )
        .await?;
    assert_eq!(signed.status(), StatusCode::OK);

    let admin_repo = SqliteAdminRepository::new(pool);
    let created = admin_repo.find_by_external_id("usr_new").await?;
    assert!(created.is_some());
    assert_eq!(created.unwrap().email, "noa@example.com");

    Ok(())
}
