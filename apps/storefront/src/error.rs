//! # Application Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront CLI                     │
//! │                                                                         │
//! │  storefront cart add p-1 --type full                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, AppError>                                             │  │
//! │  │         │                                                        │  │
//! │  │  Pricing rule? ──── CoreError::InsufficientPoints ──┐           │  │
//! │  │  Backend?      ──── ApiError::Unauthorized ─────────┤           │  │
//! │  │  Local store?  ──── DbError::QueryFailed ───────────┤           │  │
//! │  │                                                      ▼           │  │
//! │  │                                                  AppError ──────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: [InsufficientPoints] Insufficient e-points: 370 required, ...  │
//! │  exit code 1                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage failures are logged in full and shown with a generic message.

use serde::Serialize;
use storefront_api::{AddressError, ApiError};
use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;

use crate::config::ConfigError;

/// Error returned from CLI commands.
///
/// ## Serialization
/// With `--json` a failure is printed as:
/// ```json
/// {
///   "code": "INSUFFICIENT_POINTS",
///   "message": "Insufficient e-points: 370 required, 100 available"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Local database operation failed
    DatabaseError,

    /// Business rule refused the operation
    BusinessLogic,

    Internal,

    /// Cart operation failed
    CartError,

    /// Checkout attempted with nothing in the cart
    CartEmpty,

    /// Not enough e-points for the chosen redemption
    InsufficientPoints,

    /// Payment failed or could not be verified
    PaymentError,

    /// Sign-in required or session expired
    Unauthorized,

    /// Signed in without the required role
    Forbidden,

    /// Backend unreachable
    NetworkError,

    ConfigError,

    /// A checkout is already waiting on payment
    CheckoutInProgress,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::CartError, message)
    }

    pub fn business(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::BusinessLogic, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Forbidden, message)
    }

    /// Whether the stored session should be discarded.
    pub fn is_unauthorized(&self) -> bool {
        self.code == ErrorCode::Unauthorized
    }
}

/// Converts local storage errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Local database unavailable")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Local database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Local database operation failed")
            }
            DbError::Corrupt(e) => {
                tracing::error!("Corrupt stored data: {}", e);
                AppError::new(
                    ErrorCode::DatabaseError,
                    "Stored session is unreadable, run `storefront logout`",
                )
            }
            DbError::PoolExhausted => AppError::new(ErrorCode::DatabaseError, "Local database busy"),
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Local database operation failed")
            }
        }
    }
}

/// Converts pricing and cart rule errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientPoints { .. } => {
                AppError::new(ErrorCode::InsufficientPoints, err.to_string())
            }
            CoreError::CartTooLarge { .. } | CoreError::ItemNotInCart(_) => {
                AppError::cart(err.to_string())
            }
            CoreError::QuantityTooLarge { .. } => AppError::validation(err.to_string()),
            CoreError::OutOfStock(_) => AppError::business(err.to_string()),
            CoreError::Validation(e) => AppError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Converts backend errors.
impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        let code = match &err {
            ApiError::Network(_) => ErrorCode::NetworkError,
            ApiError::Unauthorized(_) => ErrorCode::Unauthorized,
            ApiError::Forbidden(_) => ErrorCode::Forbidden,
            ApiError::CartEmpty => ErrorCode::CartEmpty,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::Server { status, .. } if *status == 409 || *status == 422 => {
                ErrorCode::BusinessLogic
            }
            ApiError::Server { status, .. } if *status < 500 => ErrorCode::ValidationError,
            ApiError::Server { .. } | ApiError::Decode(_) => ErrorCode::Internal,
            ApiError::CheckoutInProgress => ErrorCode::CheckoutInProgress,
            ApiError::Payment(_) => ErrorCode::PaymentError,
            ApiError::TokenStore(_) => ErrorCode::DatabaseError,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<AddressError> for AppError {
    fn from(err: AddressError) -> Self {
        match err {
            AddressError::Invalid(e) => e.into(),
            AddressError::Api(e) => e.into(),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_points_keeps_amounts() {
        let err: AppError = CoreError::InsufficientPoints {
            required: 370,
            available: 100,
        }
        .into();

        assert_eq!(err.code, ErrorCode::InsufficientPoints);
        assert!(err.message.contains("370"));
        assert!(err.message.contains("100"));
    }

    #[test]
    fn test_api_errors_map_to_codes() {
        let unauthorized: AppError = ApiError::Unauthorized("expired".into()).into();
        assert!(unauthorized.is_unauthorized());

        let empty: AppError = ApiError::CartEmpty.into();
        assert_eq!(empty.code, ErrorCode::CartEmpty);

        let conflict: AppError = ApiError::Server {
            status: 409,
            message: "Order cannot be cancelled".into(),
        }
        .into();
        assert_eq!(conflict.code, ErrorCode::BusinessLogic);

        let bad_gateway: AppError = ApiError::Server {
            status: 502,
            message: "Bad Gateway".into(),
        }
        .into();
        assert_eq!(bad_gateway.code, ErrorCode::Internal);
    }

    #[test]
    fn test_storage_details_are_hidden() {
        let err: AppError = DbError::QueryFailed("no such table: session".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("no such table"));
    }

    #[test]
    fn test_display_and_json() {
        let err = AppError::not_found("Order", "ord-9");
        assert_eq!(err.to_string(), "[NotFound] Order not found: ord-9");

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
    }
}
