//! HTTP API handlers.

use std::any::Any;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, error};

use crate::check::{CheckParams, Evaluator};

use super::response::{error_response, internal_error, JsonLine};

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Check evaluator.
    pub evaluator: Evaluator,
}

impl AppState {
    /// Create new app state.
    pub fn new(evaluator: Evaluator) -> Self {
        Self { evaluator }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok".
    pub health: &'static str,
}

/// Check handler - evaluates one metric against its bounds.
pub async fn check(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(pairs)) => CheckParams::from_pairs(pairs),
        Err(rejection) => {
            debug!(error = %rejection, "Unparseable query string");
            return error_response(StatusCode::BAD_REQUEST, "invalid query string");
        }
    };

    let result = state.evaluator.check(params).await;
    (result.status, JsonLine(result.body)).into_response()
}

/// Health check handler - always returns 200 without touching the backend.
pub async fn health() -> impl IntoResponse {
    JsonLine(HealthResponse { health: "ok" })
}

/// Fallback handler for unknown paths and methods.
pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found")
}

/// Turn a caught handler panic into the generic 500 body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "Handler panicked");
    internal_error()
}
