//! # API Error Type
//!
//! Every handler returns `ApiResult<T>`; failures reach the client as
//!
//! ```json
//! { "code": "NOT_FOUND", "message": "Product not found: 3f2a..." }
//! ```
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError ──► CoreError ──► DbError ──► ApiError ──► HTTP        │
//! │   (duka-core)        (duka-core)   (duka-db)   (this file)              │
//! │                                                                         │
//! │  NOT_FOUND          404            UNAUTHORIZED     401                 │
//! │  VALIDATION_ERROR   400            FORBIDDEN        403                 │
//! │  CONFLICT           409            BUSINESS_LOGIC   422                 │
//! │  DATABASE_ERROR     500            INTERNAL         500                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Database and internal details are logged, never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use duka_core::{CoreError, ValidationError};
use duka_db::DbError;
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    Unauthorized,
    Forbidden,
    Conflict,
    BusinessLogic,
    DatabaseError,
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::BusinessLogic => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::Validation(e) => e.into(),
            CoreError::QuantityTooLarge { .. } => ApiError::validation(err.to_string()),
            // Stock, pricing, tender and repayment rules
            other => ApiError::new(ErrorCode::BusinessLogic, other.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{field} '{value}' already exists"),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::new(
                    ErrorCode::Conflict,
                    "Record is referenced by other records or refers to a missing one",
                )
            }
            DbError::Conflict(message) => ApiError::new(ErrorCode::Conflict, message),
            DbError::Core(e) => e.into(),
            DbError::ConnectionFailed(e) | DbError::MigrationFailed(e) => {
                tracing::error!("Database unavailable: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database unavailable")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duka_core::Money;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ValidationError.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::BusinessLogic.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::DatabaseError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_code_wire_format() {
        let err = ApiError::validation("name is required");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "name is required");
    }

    #[test]
    fn test_core_errors_map_to_business_logic() {
        let err: ApiError = CoreError::PaymentExceedsBalance {
            balance: Money::from_units(100),
            requested: Money::from_units(150),
        }
        .into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let err: ApiError = CoreError::Validation(ValidationError::Required {
            field: "customerName".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_db_errors_hide_details() {
        let err: ApiError = DbError::QueryFailed("no such column: secret".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("secret"));

        let err: ApiError = DbError::duplicate("email", "a@b.co").into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = DbError::from(CoreError::EmptyCart).into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }
}
