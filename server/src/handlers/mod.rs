use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::state::AppState;
use crate::utils::error::AppError;

pub mod articles;
pub mod events;
pub mod participation;
pub mod users;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    database: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => {
            let payload = HealthPayload {
                status: "ok",
                service: "vsf-api",
                database: "up",
            };
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = ?e, "Health check could not reach the store");
            let payload = HealthPayload {
                status: "degraded",
                service: "vsf-api",
                database: "down",
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
    }
}

pub async fn not_found() -> Response {
    AppError::NotFound("Endpoint not found".to_string()).into_response()
}

/// Present and not blank, or a validation error naming the field.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::ValidationError(format!("{} is required", field))),
    }
}

/// Money columns are `NUMERIC(14, 2)`: whole sen and below 10^12 rupiah.
const MAX_RUPIAH: i64 = 1_000_000_000_000;

/// A non-negative amount that fits the money columns exactly, so nothing is
/// rounded or overflowed by the database.
pub(crate) fn rupiah(value: Decimal, field: &str) -> Result<Decimal, AppError> {
    if value < Decimal::ZERO {
        return Err(AppError::ValidationError(format!(
            "{} must not be negative",
            field
        )));
    }
    if value.normalize().scale() > 2 {
        return Err(AppError::ValidationError(format!(
            "{} must have at most 2 decimal places",
            field
        )));
    }
    if value >= Decimal::from(MAX_RUPIAH) {
        return Err(AppError::ValidationError(format!(
            "{} must be less than {}",
            field, MAX_RUPIAH
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_missing_and_blank() {
        assert_eq!(required(Some("a".into()), "email").unwrap(), "a");
        assert!(matches!(
            required(None, "email"),
            Err(AppError::ValidationError(msg)) if msg == "email is required"
        ));
        assert!(required(Some("   ".into()), "email").is_err());
    }

    #[test]
    fn test_rupiah_fits_money_columns() {
        assert_eq!(rupiah(Decimal::new(150_050, 2), "fee").unwrap(), Decimal::new(150_050, 2));
        assert!(rupiah(Decimal::new(5_000_000, 3), "fee").is_ok());
        assert!(rupiah(Decimal::new(99_999_999_999_999, 2), "fee").is_ok());

        for bad in [
            Decimal::new(-1, 0),
            Decimal::new(4, 3),
            Decimal::from(1_000_000_000_000i64),
            Decimal::from(10_000_000_000_000i64),
        ] {
            assert!(matches!(
                rupiah(bad, "fee"),
                Err(AppError::ValidationError(msg)) if msg.starts_with("fee must")
            ));
        }
    }
}
