//! vyconsole web server
//!
//! Puts an auth gate in front of the console UI and proxies session API
//! calls to the management backend.

pub mod auth;
pub mod config;
pub mod proxy;
pub mod server;
pub mod static_files;

pub use auth::{AuthGate, SessionProvider};
pub use config::{GateConfig, SessionConfig, SessionProviderKind, WebConfig};
pub use proxy::{proxy_routes, ProxyError, SessionProxy};
pub use server::WebServer;
