use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::Result;

pub mod provider;

pub use provider::HttpIdentityProvider;

/// Resolves an opaque bearer token to the provider-side user id. The
/// provider owns sessions and credentials; this backend only maps the
/// returned id onto its own admin records.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the token is well-formed but not valid (expired,
    /// revoked, unknown); transport failures are errors.
    async fn resolve(&self, token: &str) -> Result<Option<String>>;
}

/// User lifecycle events delivered on the provider's webhook feed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub enum IdentityEventKind {
    #[serde(rename = "user.created")]
    UserCreated,
    #[serde(rename = "user.updated")]
    UserUpdated,
    #[serde(rename = "user.deleted")]
    UserDeleted,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityEvent {
    #[serde(rename = "type")]
    pub kind: IdentityEventKind,
    pub data: IdentityUserData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUserData {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub primary_email: Option<String>,
    pub primary_phone: Option<String>,
}

impl IdentityUserData {
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        let name = format!("{} {}", first, last);
        name.trim().to_string()
    }
}

type HmacSha256 = Hmac<Sha256>;

/// Verify the webhook signature header (hex HMAC-SHA256 over the raw
/// body) in constant time.
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    let Ok(provided) = hex::decode(signature_hex.trim()) else {
        return false;
    };

    expected.ct_eq(provided.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trip() {
        let secret = "whsec_test";
        let body = br#"{"type":"user.created"}"#;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let sig = hex::encode(mac.finalize().into_bytes());

        assert!(verify_webhook_signature(secret, body, &sig));
        assert!(!verify_webhook_signature(secret, b"tampered", &sig));
        assert!(!verify_webhook_signature("other_secret", body, &sig));
        assert!(!verify_webhook_signature(secret, body, "not-hex"));
    }

    #[test]
    fn event_payload_deserializes() {
        let raw = r#"{
            "type": "user.updated",
            "data": {
                "id": "usr_123",
                "first_name": "Dana",
                "last_name": "Kim",
                "primary_email": "dana@example.com",
                "primary_phone": null
            }
        }"#;

        let event: IdentityEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind, IdentityEventKind::UserUpdated);
        assert_eq!(event.data.display_name(), "Dana Kim");
    }
}
