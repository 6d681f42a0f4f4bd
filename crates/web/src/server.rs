//! Web server
//!
//! Wires the auth gate in front of the session proxy, the health check and
//! the console UI.

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{provider_from_config, require_session, AuthGate};
use crate::config::WebConfig;
use crate::proxy::{proxy_routes, SessionProxy};
use crate::static_files::UiStatic;

/// Web server
#[derive(Clone)]
pub struct WebServer {
    state: Arc<WebServerState>,
    gate: Arc<AuthGate>,
    proxy: Arc<SessionProxy>,
}

struct WebServerState {
    ui_static: UiStatic,
}

impl WebServer {
    /// Create a new web server from validated configuration
    pub fn new(config: &WebConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("vyconsole-web/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a server that reuses an existing outbound client
    pub fn with_http_client(config: &WebConfig, http: reqwest::Client) -> Self {
        let provider = provider_from_config(&config.session, http.clone());
        let gate = AuthGate::new(config.gate.clone(), provider);
        let proxy = SessionProxy::new(
            http,
            config.backend_origin(),
            config.session.cookie_name.clone(),
            config.body_limit_bytes,
        );

        Self {
            state: Arc::new(WebServerState {
                ui_static: UiStatic::new(config.static_dir.clone()),
            }),
            gate: Arc::new(gate),
            proxy: Arc::new(proxy),
        }
    }

    /// Create router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .merge(proxy_routes(self.proxy.clone()))
            .fallback(ui_handler)
            .layer(middleware::from_fn_with_state(self.gate.clone(), require_session))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the web server
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        info!("Web console starting on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

/// Build and run a server for the given configuration
pub async fn serve(config: WebConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config.listen.parse()?;
    WebServer::new(&config)?.serve(addr).await
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "vyconsole-web"
    }))
}

async fn ui_handler(State(state): State<Arc<WebServerState>>, request: Request) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    state.ui_static.serve(request.uri().path()).await
}
