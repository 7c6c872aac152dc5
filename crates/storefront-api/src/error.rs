//! # API Error Types
//!
//! Errors raised while talking to the backend.
//!
//! ## Error Body Parsing
//! ```text
//! HTTP 4xx/5xx + JSON body
//!      │
//!      ├── code / errorCode == "CART_EMPTY"  → ApiError::CartEmpty
//!      ├── status 401                        → ApiError::Unauthorized
//!      ├── status 404                        → ApiError::NotFound
//!      └── otherwise                         → ApiError::Server { status, message }
//!
//! message = first of: message, error, detail, title
//!           else the HTTP status text ("Bad Request")
//! ```

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Backend code telling the client the cart has nothing to check out.
pub const CART_EMPTY_CODE: &str = "CART_EMPTY";

/// Fields searched, in order, for a human-readable message.
const MESSAGE_FIELDS: [&str; 4] = ["message", "error", "detail", "title"];

/// Errors from the REST client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never got a response (DNS, refused, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Missing, expired or rejected bearer token.
    #[error("Not signed in: {0}")]
    Unauthorized(String),

    /// Signed in, but the role does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The backend refused to place an order for an empty cart.
    #[error("Your cart is empty")]
    CartEmpty,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// A checkout is already waiting for payment confirmation.
    #[error("A checkout is already in progress")]
    CheckoutInProgress,

    /// The payment gateway reported a failure.
    #[error("Payment failed: {0}")]
    Payment(String),

    /// The token store could not be read or written.
    #[error("Token storage error: {0}")]
    TokenStore(String),
}

impl ApiError {
    /// Builds the error for a non-success response.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let json: Option<Value> = serde_json::from_str(body).ok();

        if let Some(json) = &json {
            if error_code(json).as_deref() == Some(CART_EMPTY_CODE) {
                return ApiError::CartEmpty;
            }
        }

        let message = json
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| status_text(status));

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the user should be sent back to sign in.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

fn error_code(json: &Value) -> Option<String> {
    ["code", "errorCode"]
        .iter()
        .find_map(|field| json.get(field).and_then(Value::as_str))
        .map(str::to_string)
}

/// First non-empty string among the known message fields.
fn error_message(json: &Value) -> Option<String> {
    MESSAGE_FIELDS.iter().find_map(|field| {
        json.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_empty_code() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"code":"CART_EMPTY","message":"Cart is empty"}"#,
        );
        assert!(matches!(err, ApiError::CartEmpty));

        let err = ApiError::from_response(StatusCode::CONFLICT, r#"{"errorCode":"CART_EMPTY"}"#);
        assert!(matches!(err, ApiError::CartEmpty));
    }

    #[test]
    fn test_message_field_precedence() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"title":"Bad","detail":"Quantity exceeds stock"}"#,
        );
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Quantity exceeds stock");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_falls_back_to_status_text() {
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.to_string(), "Server error (500): Internal Server Error");

        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, r#"{"message":"  "}"#);
        assert_eq!(err.to_string(), "Server error (502): Bad Gateway");
    }

    #[test]
    fn test_status_mapping() {
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, r#"{"error":"Bad credentials"}"#);
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "Not signed in: Bad credentials");

        let err = ApiError::from_response(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Not Found"));

        let err = ApiError::from_response(StatusCode::FORBIDDEN, "{}");
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
