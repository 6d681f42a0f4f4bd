//! Session lookup abstraction.
//!
//! The auth provider is opaque here: given the inbound request headers it
//! either yields a session or nothing.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{SessionConfig, SessionProviderKind};
use vyconsole_common::Session;

/// Trait for session providers
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve the session for a request, if there is one
    async fn session(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Value of the named cookie, if present and non-empty
pub fn session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Treats the presence of the session cookie as a session
pub struct CookieSessionProvider {
    cookie_name: String,
}

impl CookieSessionProvider {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for CookieSessionProvider {
    async fn session(&self, headers: &HeaderMap) -> Option<Session> {
        session_cookie(headers, &self.cookie_name).map(Session::from_token)
    }
}

/// Asks the auth provider's session endpoint, forwarding the inbound cookies.
///
/// A 2xx answer with a non-empty JSON object counts as a session; anything
/// else, including a failed lookup, does not.
pub struct RemoteSessionProvider {
    http: reqwest::Client,
    session_url: String,
    cookie_name: String,
}

impl RemoteSessionProvider {
    pub fn new(http: reqwest::Client, session_url: impl Into<String>, cookie_name: impl Into<String>) -> Self {
        Self {
            http,
            session_url: session_url.into(),
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for RemoteSessionProvider {
    async fn session(&self, headers: &HeaderMap) -> Option<Session> {
        let cookie = headers.get(header::COOKIE)?;

        let response = match self
            .http
            .get(&self.session_url)
            .header(header::COOKIE, cookie.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Session lookup at {} failed: {}", self.session_url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Session lookup returned {}", response.status());
            return None;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("Session lookup returned an unreadable body: {}", e);
                return None;
            }
        };

        let object = body.as_object().filter(|o| !o.is_empty())?;
        let token = session_cookie(headers, &self.cookie_name).unwrap_or_default();

        Some(Session {
            token,
            user: object.get("user").cloned(),
            expires: object
                .get("expires")
                .and_then(|v| v.as_str())
                .map(String::from),
        })
    }
}

/// Build the provider selected by the configuration
pub fn provider_from_config(config: &SessionConfig, http: reqwest::Client) -> Arc<dyn SessionProvider> {
    match (config.provider, config.session_url.as_deref()) {
        (SessionProviderKind::Remote, Some(url)) => {
            Arc::new(RemoteSessionProvider::new(http, url, config.cookie_name.clone()))
        }
        (SessionProviderKind::Remote, None) => {
            warn!("Remote session provider selected without session_url; using cookie presence");
            Arc::new(CookieSessionProvider::new(config.cookie_name.clone()))
        }
        (SessionProviderKind::Cookie, _) => Arc::new(CookieSessionProvider::new(config.cookie_name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_session_cookie_lookup() {
        let headers = headers_with_cookie("theme=dark; vyconsole.session-token=abc; other=1");
        assert_eq!(
            session_cookie(&headers, "vyconsole.session-token").as_deref(),
            Some("abc")
        );
        assert_eq!(session_cookie(&headers, "missing"), None);
        assert_eq!(session_cookie(&HeaderMap::new(), "vyconsole.session-token"), None);

        let empty = headers_with_cookie("vyconsole.session-token=");
        assert_eq!(session_cookie(&empty, "vyconsole.session-token"), None);
    }

    #[tokio::test]
    async fn test_cookie_provider() {
        let provider = CookieSessionProvider::new("sid");
        let session = provider.session(&headers_with_cookie("sid=xyz")).await.unwrap();
        assert_eq!(session.token, "xyz");
        assert!(provider.session(&headers_with_cookie("other=xyz")).await.is_none());
    }

    #[tokio::test]
    async fn test_remote_provider_without_cookie_skips_lookup() {
        // Unroutable URL: the lookup must not even be attempted.
        let provider = RemoteSessionProvider::new(reqwest::Client::new(), "http://127.0.0.1:1/session", "sid");
        assert!(provider.session(&HeaderMap::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_remote_provider_transport_failure_is_no_session() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = RemoteSessionProvider::new(
            reqwest::Client::new(),
            format!("http://{addr}/api/auth/session"),
            "sid",
        );
        assert!(provider.session(&headers_with_cookie("sid=1")).await.is_none());
    }
}
