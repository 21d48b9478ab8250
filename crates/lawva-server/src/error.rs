//! HTTP error types for the Lawva server.
//!
//! Maps repository errors into HTTP responses. Every error variant produces
//! a JSON body with a machine-readable `error` field and a human-readable
//! `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::repository::RepositoryError;

/// Application-level error returned from API handlers.
#[derive(Debug)]
pub enum AppError {
    /// Requested resource not found.
    NotFound(String),
    /// Client sent invalid input.
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message) = match self {
            Self::NotFound(msg) => ("not_found", msg),
            Self::BadRequest(msg) => ("bad_request", msg),
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => Self::NotFound(err.to_string()),
        }
    }
}

/// Parse a path id, rejecting anything that is not an integer.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] for non-numeric ids.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid certification id '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
    }

    #[test]
    fn parse_id_rejects_text() {
        let err = parse_id("abc").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::from(RepositoryError::NotFound { id: 3 });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
