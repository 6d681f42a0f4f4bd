//! Session proxy
//!
//! Forwards `/api/session/*` to the backend's `/session/*` namespace,
//! carrying the session cookie along, and relays the answer.

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::session_cookie;
use vyconsole_common::SESSION_NAMESPACE;

/// Inbound prefix handled by the proxy
pub const PROXY_PREFIX: &str = "/api/session";

/// Longest slice of an unparseable backend body echoed back
const BODY_EXCERPT_CHARS: usize = 200;

/// Largest integer a browser's JSON encoder prints exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Methods the proxy forwards
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";

/// Failures while forwarding; all become a 500 for the caller
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("backend request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("invalid multipart request: {0}")]
    MultipartRejected(#[from] axum::extract::multipart::MultipartRejection),

    #[error("invalid multipart field: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("failed to build response: {0}")]
    Response(#[from] axum::http::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Proxy request failed",
                "details": self.to_string(),
            })),
        )
            .into_response()
    }
}

/// Proxy configuration and the shared outbound client
pub struct SessionProxy {
    http: reqwest::Client,
    backend_origin: String,
    cookie_name: String,
    body_limit: usize,
}

impl SessionProxy {
    pub fn new(
        http: reqwest::Client,
        backend_origin: impl Into<String>,
        cookie_name: impl Into<String>,
        body_limit: usize,
    ) -> Self {
        Self {
            http,
            backend_origin: backend_origin.into().trim_end_matches('/').to_string(),
            cookie_name: cookie_name.into(),
            body_limit,
        }
    }

    /// Backend URL for an inbound path and raw query string.
    ///
    /// The suffix after `/api/session` is kept byte-for-byte, as is the query.
    pub fn target_url(&self, inbound_path: &str, query: Option<&str>) -> String {
        let suffix = inbound_path.strip_prefix(PROXY_PREFIX).unwrap_or(inbound_path);
        let mut url = format!("{}{}{}", self.backend_origin, SESSION_NAMESPACE, suffix);
        if let Some(q) = query {
            url.push('?');
            url.push_str(q);
        }
        url
    }

    async fn forward(&self, request: Request) -> Result<Response, ProxyError> {
        let method = request.method().clone();
        let target = self.target_url(request.uri().path(), request.uri().query());
        debug!("Proxy {} {} -> {}", method, request.uri().path(), target);

        let mut outbound = self.http.request(method.clone(), &target);

        if let Some(token) = session_cookie(request.headers(), &self.cookie_name) {
            outbound = outbound.header(header::COOKIE, format!("{}={}", self.cookie_name, token));
        }

        if method != Method::GET {
            let content_type = request
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_ascii_lowercase();

            if content_type.starts_with("multipart/form-data") {
                // reqwest writes the Content-Type with the new boundary.
                let multipart = Multipart::from_request(request, &()).await?;
                outbound = outbound.multipart(form_from_multipart(multipart).await?);
            } else {
                let bytes = axum::body::to_bytes(request.into_body(), self.body_limit).await?;
                // Missing or malformed JSON is forwarded without a body.
                if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
                    outbound = outbound
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(serde_json::to_vec(&integral_numbers(value))?);
                }
            }
        }

        let response = outbound.send().await?;
        relay(response).await
    }
}

/// Rebuild an inbound multipart form field-for-field
async fn form_from_multipart(mut multipart: Multipart) -> Result<reqwest::multipart::Form, ProxyError> {
    let mut form = reqwest::multipart::Form::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let data = field.bytes().await?;

        let mut part = reqwest::multipart::Part::bytes(data.to_vec());
        if let Some(file_name) = file_name {
            part = part.file_name(file_name);
        }
        if let Some(content_type) = content_type {
            part = part.mime_str(&content_type)?;
        }
        form = form.part(name, part);
    }

    Ok(form)
}

/// Turn the backend's answer into ours
async fn relay(response: reqwest::Response) -> Result<Response, ProxyError> {
    let status = response.status();
    let is_csv = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("text/csv"))
        .unwrap_or(false);

    if is_csv {
        let mut builder = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        if let Some(disposition) = response.headers().get(header::CONTENT_DISPOSITION) {
            builder = builder.header(header::CONTENT_DISPOSITION, disposition.clone());
        }
        return Ok(builder.body(Body::from_stream(response.bytes_stream()))?);
    }

    let text = response.text().await?;
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => Ok((status, Json(value)).into_response()),
        Err(e) => {
            error!("Backend answered {} with invalid JSON: {}", status, e);
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Invalid JSON response from backend",
                    "details": body_excerpt(&text),
                })),
            )
                .into_response())
        }
    }
}

/// Rewrite floats without a fractional part as integers.
///
/// Browsers serialize `443.0` and `1e2` as `443` and `100`; the backend
/// sees the same text whether a call came from the UI or through here.
pub fn integral_numbers(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => Value::from(f as i64),
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(integral_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, integral_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}

/// First `BODY_EXCERPT_CHARS` characters of a body
pub fn body_excerpt(text: &str) -> String {
    text.chars().take(BODY_EXCERPT_CHARS).collect()
}

async fn proxy_handler(State(proxy): State<Arc<SessionProxy>>, request: Request) -> Response {
    // The GET route also matches HEAD; only the four listed methods go upstream.
    if request.method() == Method::HEAD {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, ALLOWED_METHODS)],
        )
            .into_response();
    }

    let path = request.uri().path().to_string();
    match proxy.forward(request).await {
        Ok(response) => response,
        Err(e) => {
            error!("Proxy request for {} failed: {}", path, e);
            e.into_response()
        }
    }
}

/// Routes served by the proxy, ready to merge into any router
pub fn proxy_routes<S>(proxy: Arc<SessionProxy>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let body_limit = proxy.body_limit;
    Router::new()
        .route(
            "/api/session/*path",
            get(proxy_handler)
                .post(proxy_handler)
                .put(proxy_handler)
                .delete(proxy_handler),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(proxy)
}
