//! Redirects plain-http requests to https when enforcement is enabled.

use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::debug;

use super::response::{error_response, JsonLine};

/// Redirect body.
#[derive(Debug, Serialize)]
struct RedirectResponse {
    redirect: String,
}

/// Middleware: pass https requests through, 301 everything else to https.
pub async fn enforce_https(request: Request, next: Next) -> Response {
    if is_https(&request) {
        return next.run(request).await;
    }

    let Some(host) = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
    else {
        return error_response(StatusCode::BAD_REQUEST, "bad request");
    };

    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let location = format!("https://{}{}", host, path);

    let Ok(location_header) = HeaderValue::from_str(&location) else {
        return error_response(StatusCode::BAD_REQUEST, "bad request");
    };

    debug!(%location, "Redirecting to https");
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, location_header)],
        JsonLine(RedirectResponse { redirect: location }),
    )
        .into_response()
}

fn is_https(request: &Request) -> bool {
    request.uri().scheme_str() == Some("https")
        || forwarded_proto(request.headers()).is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

/// First entry of `X-Forwarded-Proto`.
fn forwarded_proto(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-proto")?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
}
