//! HTTP API route definitions.

use axum::{middleware, routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{check, handle_panic, health, not_found, AppState};
use super::https::enforce_https;

/// Create the API router.
pub fn create_router(state: AppState, force_https: bool) -> Router {
    let router = Router::new()
        .route("/check", get(check).fallback(not_found))
        .route("/health", get(health).fallback(not_found))
        .fallback(not_found)
        .with_state(state);

    with_middleware(router, force_https)
}

fn with_middleware(router: Router, force_https: bool) -> Router {
    let router = if force_https {
        router.layer(middleware::from_fn(enforce_https))
    } else {
        router
    };

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}
