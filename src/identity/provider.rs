use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    config::IdentityConfig,
    error::{AppError, Result},
    identity::IdentityProvider,
};

/// HTTP client for the hosted identity provider's session-introspection
/// endpoint.
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct IntrospectResponse {
    user_id: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Option<String>> {
        let url = format!("{}/v1/sessions/introspect", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::External(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body: IntrospectResponse = response
                    .json()
                    .await
                    .map_err(|e| AppError::External(e.to_string()))?;
                Ok(Some(body.user_id))
            }
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(None),
            status => Err(AppError::External(format!(
                "Identity provider returned {}",
                status
            ))),
        }
    }
}
