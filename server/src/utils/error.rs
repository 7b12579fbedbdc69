use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The request is well formed but clashes with existing state.
    /// Carries a stable machine code such as `EVENT_FULL`.
    #[error("Conflict ({0}): {1}")]
    Conflict(&'static str, String),

    #[error("Database error")]
    DatabaseError(#[source] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(..) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(code, _) => *code,
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(_, msg) => {
                warn!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::InternalServerError(msg) => {
                error!(message = %msg, "Internal error");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(_, msg) => msg.clone(),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::InternalServerError(_) => "An internal error occurred".to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken => {
                AppError::Conflict("EMAIL_TAKEN", "Email is already registered".to_string())
            }
            StoreError::AlreadyRegistered => AppError::Conflict(
                "ALREADY_REGISTERED",
                "User is already registered for this event".to_string(),
            ),
            StoreError::EventFull => AppError::Conflict(
                "EVENT_FULL",
                "Event has reached its volunteer target".to_string(),
            ),
            StoreError::EventNotFound => AppError::NotFound("Event not found".to_string()),
            StoreError::UserNotFound => AppError::NotFound("User not found".to_string()),
            StoreError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        // Internal details stay in the logs.
        error_response(
            self.code(),
            self.public_message(),
            None,
            self.status_code(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_closed_set() {
        let cases = [
            (StoreError::EmailTaken, StatusCode::CONFLICT, "EMAIL_TAKEN"),
            (
                StoreError::AlreadyRegistered,
                StatusCode::CONFLICT,
                "ALREADY_REGISTERED",
            ),
            (StoreError::EventFull, StatusCode::CONFLICT, "EVENT_FULL"),
            (StoreError::EventNotFound, StatusCode::NOT_FOUND, "NOT_FOUND"),
            (StoreError::UserNotFound, StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                StoreError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
            ),
        ];

        for (store_err, status, code) in cases {
            let err = AppError::from(store_err);
            assert_eq!(err.status_code(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_database_error_text_is_not_exposed() {
        let err = AppError::from(StoreError::Database(sqlx::Error::Protocol(
            "relation \"events\" does not exist".to_string(),
        )));
        assert_eq!(err.public_message(), "A database error occurred");

        let err = AppError::InternalServerError("pool exhausted at 0x7f".to_string());
        assert_eq!(err.public_message(), "An internal error occurred");
    }
}
