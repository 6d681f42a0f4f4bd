//! Backend HTTP Client

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::{ApiError, ClientError};
use crate::types::Download;
use crate::{DEFAULT_API_URL, DEFAULT_SESSION_COOKIE};

/// Marker header sent with every call so the backend can tell console
/// traffic from plain browser navigation.
pub const REQUESTED_WITH: &str = "x-requested-with";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin that relative endpoints are resolved against
    pub base_url: String,

    /// Session token sent as a cookie when credentials are included
    pub session_token: Option<String>,

    /// Name of the session cookie
    pub cookie_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            session_token: None,
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read `VYCONSOLE_API_URL`, `VYCONSOLE_SESSION_TOKEN` and
    /// `VYCONSOLE_SESSION_COOKIE`, falling back to defaults.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| {
            std::env::var(key)
                .ok()
                .and_then(|v| if v.trim().is_empty() { None } else { Some(v) })
        };

        let defaults = Self::default();
        Self {
            base_url: non_empty("VYCONSOLE_API_URL").unwrap_or(defaults.base_url),
            session_token: non_empty("VYCONSOLE_SESSION_TOKEN"),
            cookie_name: non_empty("VYCONSOLE_SESSION_COOKIE").unwrap_or(defaults.cookie_name),
        }
    }
}

/// Per-call options, merged over the client's defaults
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub method: Method,
    /// Headers that override the defaults of the same name
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    /// Send the session cookie (on by default)
    pub include_credentials: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            include_credentials: true,
        }
    }
}

impl CallOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn put(body: serde_json::Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn without_credentials(mut self) -> Self {
        self.include_credentials = false;
        self
    }
}

/// Client for the router management backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a client that reuses an existing connection pool
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve an endpoint against the configured base URL.
    ///
    /// Absolute `http(s)://` endpoints are used as-is.
    pub fn resolve(&self, endpoint: &str) -> Result<url::Url, ClientError> {
        let raw = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            let base = self.config.base_url.trim_end_matches('/');
            if endpoint.starts_with('/') {
                format!("{base}{endpoint}")
            } else {
                format!("{base}/{endpoint}")
            }
        };

        url::Url::parse(&raw).map_err(|e| ClientError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    /// Call an endpoint and return its parsed JSON body.
    ///
    /// Every failure is logged before it is returned.
    pub async fn call(
        &self,
        endpoint: &str,
        options: CallOptions,
    ) -> Result<serde_json::Value, ClientError> {
        let result = self.call_inner(endpoint, options).await;
        if let Err(e) = &result {
            error!("Backend call to {} failed: {}", endpoint, e);
        }
        result
    }

    /// Call an endpoint and deserialize the body into `T`
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: CallOptions,
    ) -> Result<T, ClientError> {
        let value = self.call(endpoint, options).await?;
        serde_json::from_value(value).map_err(|source| {
            error!("Backend call to {} returned an unexpected shape: {}", endpoint, source);
            ClientError::Parse {
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }

    /// Fetch a file payload (CSV export and the like) without parsing it
    pub async fn download(&self, endpoint: &str) -> Result<Download, ClientError> {
        let result = self.download_inner(endpoint).await;
        if let Err(e) = &result {
            error!("Download from {} failed: {}", endpoint, e);
        }
        result
    }

    async fn call_inner(
        &self,
        endpoint: &str,
        options: CallOptions,
    ) -> Result<serde_json::Value, ClientError> {
        let response = self.send(endpoint, options).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(serde_json::Value::Null);
        }

        let text = response.text().await.map_err(|source| ClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ClientError::Parse {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn download_inner(&self, endpoint: &str) -> Result<Download, ClientError> {
        let response = self.send(endpoint, CallOptions::get()).await?;

        let header_str = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let filename = header_str(header::CONTENT_DISPOSITION)
            .as_deref()
            .and_then(content_disposition_filename);
        let content_type = header_str(header::CONTENT_TYPE);

        let bytes = response.bytes().await.map_err(|source| ClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        Ok(Download {
            filename,
            content_type,
            bytes,
        })
    }

    /// Build and send the request; non-success statuses become `ApiError`.
    async fn send(
        &self,
        endpoint: &str,
        options: CallOptions,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.resolve(endpoint)?;
        let headers = self.merged_headers(&options);
        debug!("{} {}", options.method, url);

        let mut request = self.http.request(options.method, url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body.to_string());
        }

        let response = request.send().await.map_err(|source| ClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Body is best-effort: a failed read still yields a status error.
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status(ApiError::from_response(status, &body)))
    }

    fn merged_headers(&self, options: &CallOptions) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            HeaderName::from_static(REQUESTED_WITH),
            HeaderValue::from_static(REQUESTED_WITH_VALUE),
        );

        if options.include_credentials {
            let cookie = self
                .config
                .session_token
                .as_ref()
                .and_then(|token| {
                    HeaderValue::from_str(&format!("{}={}", self.config.cookie_name, token)).ok()
                });
            if let Some(cookie) = cookie {
                headers.insert(header::COOKIE, cookie);
            }
        }

        headers.extend(options.headers.clone());
        headers
    }
}

/// Extract `filename` from a `Content-Disposition` header value.
pub fn content_disposition_filename(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
