//! Sign-in, registration and the current profile.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiClient;
use crate::error::ApiResult;
use storefront_core::validation::{validate_email, validate_name, validate_password, validate_phone};
use storefront_core::{User, ValidationError};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// New account details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        Ok(())
    }
}

/// Login/registration response. Some backends omit the user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    #[serde(alias = "accessToken", alias = "jwt")]
    token: String,
    #[serde(default)]
    user: Option<User>,
}

impl ApiClient {
    /// Signs in and stores the bearer token.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let response: AuthResponse = self
            .post("/api/auth/login", &LoginRequest { email: email.trim(), password })
            .await?;
        self.finish_auth(response).await
    }

    /// Creates an account and signs in with it.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<User> {
        let response: AuthResponse = self.post("/api/auth/register", request).await?;
        self.finish_auth(response).await
    }

    /// The signed-in user's profile.
    pub async fn me(&self) -> ApiResult<User> {
        self.get("/api/auth/me").await
    }

    /// Forgets the bearer token. The backend keeps no session to end.
    pub async fn logout(&self) -> ApiResult<()> {
        self.tokens().clear().await?;
        info!("Signed out");
        Ok(())
    }

    async fn finish_auth(&self, response: AuthResponse) -> ApiResult<User> {
        self.tokens().save(&response.token).await?;

        let user = match response.user {
            Some(user) => user,
            None => self.me().await?,
        };

        info!(user_id = %user.id, "Signed in");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBackend;
    use crate::ApiError;

    #[tokio::test]
    async fn test_login_stores_token() {
        let backend = MockBackend::start().await;
        let client = backend.client(None);

        let user = client.login("asha@example.in", "secret1").await.unwrap();
        assert!(user.card_holder);
        assert!(client.is_authenticated().await.unwrap());
        assert_eq!(client.me().await.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let backend = MockBackend::start().await;
        let client = backend.client(None);

        let err = client.login("asha@example.in", "wrong").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Bad credentials"));
        assert!(!client.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_register_fetches_profile_when_missing() {
        let backend = MockBackend::start().await;
        let client = backend.client(None);

        let request = RegisterRequest {
            name: "Meera".to_string(),
            email: "meera@example.in".to_string(),
            password: "secret9".to_string(),
            phone: None,
        };
        assert!(request.validate().is_ok());

        let user = client.register(&request).await.unwrap();
        assert_eq!(user.email, "meera@example.in");
        assert!(!user.card_holder);

        let err = client.register(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_logout() {
        let backend = MockBackend::start().await;
        let client = backend.client(Some("tok-user"));

        client.logout().await.unwrap();
        assert!(!client.is_authenticated().await.unwrap());
    }

    #[test]
    fn test_register_validation() {
        let request = RegisterRequest {
            name: "".to_string(),
            email: "x@y.in".to_string(),
            password: "secret1".to_string(),
            phone: Some("123".to_string()),
        };
        assert!(request.validate().is_err());
    }
}
