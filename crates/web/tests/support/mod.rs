//! In-process backend that records what the proxy sends it

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// One request as the backend saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn header(&self, name: header::HeaderName) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }
}

#[derive(Clone, Default)]
pub struct Backend {
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl Backend {
    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("backend saw no request")
    }
}

pub const LEASES_CSV: &str = "ip,mac,hostname\n10.0.0.5,aa:bb:cc:dd:ee:ff,laptop\n";

async fn record(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    backend.log.lock().unwrap().push(Recorded {
        method,
        uri: uri.to_string(),
        headers,
        body,
    });

    match path.as_str() {
        "/session/dhcp/leases/export" => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"leases.csv\""),
            ],
            LEASES_CSV,
        )
            .into_response(),
        "/session/garbage" => (StatusCode::OK, "<html>".repeat(100)).into_response(),
        "/session/missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "instance not found"})),
        )
            .into_response(),
        "/session/onboarding-status" => {
            Json(json!({"completed": false, "instance_count": 0})).into_response()
        }
        _ => Json(json!({"ok": true})).into_response(),
    }
}

/// Auth provider session endpoint: `sid=good` is a session, anything else is `{}`
async fn auth_session(headers: HeaderMap) -> Json<serde_json::Value> {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if cookie.contains("sid=good") {
        Json(json!({"user": {"name": "admin"}, "expires": "2030-01-01T00:00:00Z"}))
    } else {
        Json(json!({}))
    }
}

pub async fn spawn_backend() -> (SocketAddr, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/auth/session", get(auth_session))
        .fallback(record)
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, backend)
}

pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
