//! Web server configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use vyconsole_common::DEFAULT_SESSION_COOKIE;

/// Backend the proxy forwards to when nothing is configured
pub const DEFAULT_BACKEND_URL: &str = "http://backend:8000";

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address
    pub listen: String,

    /// Backend origin targeted by the session proxy
    pub backend_url: String,

    /// Directory holding the built console UI
    pub static_dir: Option<PathBuf>,

    /// Largest inbound body the proxy will buffer
    pub body_limit_bytes: usize,

    /// Session lookup configuration
    pub session: SessionConfig,

    /// Auth gate configuration
    pub gate: GateConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:3000".to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            static_dir: None,
            body_limit_bytes: 16 * 1024 * 1024,
            session: SessionConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

/// How sessions are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionProviderKind {
    /// The session cookie being present is enough
    #[default]
    Cookie,
    /// Ask the auth provider's session endpoint
    Remote,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie carrying the session token; shared by the gate and the proxy
    pub cookie_name: String,

    pub provider: SessionProviderKind,

    /// Session endpoint of the auth provider (remote provider only)
    pub session_url: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            provider: SessionProviderKind::Cookie,
            session_url: None,
        }
    }
}

/// Paths that bypass the auth gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Where unauthenticated requests are sent
    pub login_path: String,

    /// Paths matched literally
    pub public_paths: Vec<String>,

    /// Paths matched by prefix
    pub public_prefixes: Vec<String>,

    /// Extensions treated as static assets
    pub static_extensions: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            public_paths: vec![
                "/login".to_string(),
                "/api/session/onboarding-status".to_string(),
                "/health".to_string(),
            ],
            public_prefixes: vec!["/api/auth/".to_string(), "/api/internal/".to_string()],
            static_extensions: [
                "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "woff", "woff2", "ttf", "eot",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl WebConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from `VYCONSOLE_WEB_CONFIG` (if set) and apply env overrides
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = match env_value("VYCONSOLE_WEB_CONFIG") {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_value("VYCONSOLE_WEB_ADDR") {
            self.listen = v;
        }
        if let Some(v) = env_value("VYCONSOLE_BACKEND_URL") {
            self.backend_url = v;
        }
        if let Some(v) = env_value("VYCONSOLE_SESSION_COOKIE") {
            self.session.cookie_name = v;
        }
        if let Some(v) = env_value("VYCONSOLE_SESSION_URL") {
            self.session.session_url = Some(v);
            self.session.provider = SessionProviderKind::Remote;
        }
        if let Some(v) = env_value("VYCONSOLE_WEB_STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(v));
        }
    }

    /// Reject values the server cannot start with
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.backend_url)
            .map_err(|e| anyhow::anyhow!("invalid backend_url {}: {}", self.backend_url, e))?;

        if !self.gate.login_path.starts_with('/') {
            anyhow::bail!("gate.login_path must start with '/': {}", self.gate.login_path);
        }

        if self.session.cookie_name.trim().is_empty() {
            anyhow::bail!("session.cookie_name must not be empty");
        }

        if self.session.provider == SessionProviderKind::Remote {
            let url = self
                .session
                .session_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("session.session_url is required for the remote provider"))?;
            url::Url::parse(url).map_err(|e| anyhow::anyhow!("invalid session_url {}: {}", url, e))?;
        }

        Ok(())
    }

    /// Backend URL without a trailing slash
    pub fn backend_origin(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .and_then(|v| if v.trim().is_empty() { None } else { Some(v) })
}
