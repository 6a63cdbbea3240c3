//! Shared API types
//!
//! Error responses and query-parameter parsing shared by all endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn from_sqlite(e: crate::data::sqlite::SqliteError) -> Self {
        tracing::error!(error = %e, "SQLite error");
        Self::Internal {
            message: "Database operation failed".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// Parse a required `YYYY-MM-DD` date parameter
pub fn parse_date_param(value: &Option<String>, name: &str) -> Result<NaiveDate, ApiError> {
    let raw = value.as_deref().ok_or_else(|| {
        ApiError::bad_request(
            "MISSING_DATE",
            format!("Missing required parameter: {}", name),
        )
    })?;
    crate::utils::time::parse_iso_date(raw).ok_or_else(|| {
        ApiError::bad_request(
            "INVALID_DATE",
            format!("Invalid {}: {}. Use YYYY-MM-DD format.", name, raw),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_param_valid() {
        let date = parse_date_param(&Some("2024-06-15".to_string()), "from").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    #[test]
    fn test_parse_date_param_missing() {
        let err = parse_date_param(&None, "from").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }

    #[test]
    fn test_parse_date_param_malformed() {
        let err = parse_date_param(&Some("15/06/2024".to_string()), "to").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }
}
