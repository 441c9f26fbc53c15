//! Fake Graphite render backend served from an ephemeral port.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

/// How the fake backend answers `/render/`.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// 200 with this raw body.
    Body(String),
    /// Bare status code.
    Status(StatusCode),
    /// Sleep before answering `[]`.
    Slow(Duration),
}

#[derive(Clone)]
struct BackendState {
    behavior: Behavior,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// A running fake backend.
pub struct FakeGraphite {
    /// Base URL to point the client at.
    pub url: String,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl FakeGraphite {
    /// Start a backend with the given behavior.
    pub async fn start(behavior: Behavior) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = BackendState {
            behavior,
            requests: requests.clone(),
        };

        let app = Router::new().route("/render/", get(render)).with_state(state);
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            requests,
        }
    }

    /// Start a backend answering 200 with `body`.
    pub async fn with_body(body: &str) -> Self {
        Self::start(Behavior::Body(body.to_string())).await
    }

    /// Query parameters of every request served.
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().unwrap().clone()
    }
}

async fn render(
    State(state): State<BackendState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.requests.lock().unwrap().push(params);

    match state.behavior {
        Behavior::Body(body) => body.into_response(),
        Behavior::Status(status) => status.into_response(),
        Behavior::Slow(delay) => {
            tokio::time::sleep(delay).await;
            "[]".into_response()
        }
    }
}

/// An address nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
