//! Authentication gate for Axum.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::provider::SessionProvider;
use crate::config::GateConfig;

/// Decides which requests need a session and where the rest are sent
pub struct AuthGate {
    config: GateConfig,
    provider: Arc<dyn SessionProvider>,
}

impl AuthGate {
    pub fn new(config: GateConfig, provider: Arc<dyn SessionProvider>) -> Self {
        Self { config, provider }
    }

    /// Allow-listed paths and static assets skip the session lookup
    pub fn is_exempt(&self, path: &str) -> bool {
        self.config.public_paths.iter().any(|p| p == path)
            || self.config.public_prefixes.iter().any(|p| path.starts_with(p.as_str()))
            || self.is_static_asset(path)
    }

    fn is_static_asset(&self, path: &str) -> bool {
        // Only the suffix counts, so `/.png` is an asset too.
        let file = path.rsplit('/').next().unwrap_or(path);
        match file.rsplit_once('.') {
            Some((_, ext)) => self
                .config
                .static_extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    /// `<login_path>?from=<path>` with the path form-encoded
    pub fn login_location(&self, from: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("from", from)
            .finish();
        format!("{}?{}", self.config.login_path, query)
    }
}

/// Middleware that requires a session on every non-exempt request.
///
/// The lookup is repeated for every request; nothing is cached.
pub async fn require_session(
    State(gate): State<Arc<AuthGate>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if gate.is_exempt(&path) {
        return next.run(request).await;
    }

    match gate.provider.session(request.headers()).await {
        Some(_) => next.run(request).await,
        None => {
            let location = gate.login_location(&path);
            debug!("No session for {}, redirecting to {}", path, location);
            Redirect::temporary(&location).into_response()
        }
    }
}
