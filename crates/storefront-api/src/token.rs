//! # Bearer Token Storage
//!
//! The client never owns the token directly. It reads it from a
//! [`TokenStore`] before each request so that `login` in one invocation is
//! seen by `cart show` in the next.
//!
//! ```text
//! ┌───────────────┐   load()    ┌──────────────────────────────┐
//! │  ApiClient    │ ──────────► │ TokenStore                   │
//! │               │             │  ├── MemoryTokenStore (tests)│
//! │  expired? ────┼── guest     │  └── SQLite session (CLI)    │
//! └───────────────┘             └──────────────────────────────┘
//! ```
//!
//! Claims are decoded without verifying the signature. Only `exp` matters
//! here; the backend is the one that checks signatures.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::ApiResult;

/// Where the bearer token lives between requests.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> ApiResult<Option<String>>;
    async fn save(&self, token: &str) -> ApiResult<()>;
    async fn clear(&self) -> ApiResult<()>;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        MemoryTokenStore {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> ApiResult<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn save(&self, token: &str) -> ApiResult<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> ApiResult<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

// =============================================================================
// Claims
// =============================================================================

/// The claims this client cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub role: Option<String>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }
}

/// Reads the claims of a JWT without checking its signature.
///
/// Returns `None` for tokens that are not JWTs (opaque tokens).
pub fn read_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

/// Whether a token has expired at `now`. Opaque tokens and tokens without
/// `exp` never expire client-side.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    read_claims(token)
        .and_then(|claims| claims.expires_at())
        .is_some_and(|exp| exp <= now)
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

#[cfg(test)]
pub(crate) fn make_jwt(sub: &str, exp: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = serde_json::json!({ "sub": sub, "exp": exp, "role": "USER" });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_reads_claims_without_the_secret() {
        let exp = Utc::now().timestamp() + 3600;
        let token = make_jwt("asha@example.in", exp);

        let claims = read_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("asha@example.in"));
        assert_eq!(claims.exp, Some(exp));
        assert_eq!(claims.role.as_deref(), Some("USER"));
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let live = make_jwt("a", (now + Duration::hours(1)).timestamp());
        let dead = make_jwt("a", (now - Duration::minutes(1)).timestamp());

        assert!(!is_expired_at(&live, now));
        assert!(is_expired_at(&dead, now));
    }

    #[test]
    fn test_opaque_token_never_expires() {
        assert!(read_claims("tok-user").is_none());
        assert!(!is_expired("tok-user"));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save("abc").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("abc"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
