//! Newline-terminated JSON responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::check::evaluator::INTERNAL_ERROR_MESSAGE;

const APPLICATION_JSON: &str = "application/json";

/// A JSON body terminated by `\n`, served as `application/json`.
#[derive(Debug, Clone)]
pub struct JsonLine<T>(pub T);

/// Error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse<'a> {
    /// Human-readable message.
    pub error: &'a str,
}

impl<T: Serialize> IntoResponse for JsonLine<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(mut body) => {
                body.push(b'\n');
                ([(header::CONTENT_TYPE, APPLICATION_JSON)], body).into_response()
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize response body");
                internal_error()
            }
        }
    }
}

/// `{"error": message}` with the given status.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, JsonLine(ErrorResponse { error: message })).into_response()
}

/// The generic 500 body.
pub fn internal_error() -> Response {
    let body = format!("{{\"error\":\"{}\"}}\n", INTERNAL_ERROR_MESSAGE);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, APPLICATION_JSON)],
        body,
    )
        .into_response()
}
