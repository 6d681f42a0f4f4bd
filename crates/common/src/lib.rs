//! vyconsole Common Library
//!
//! Shared types, the backend client, client-side state stores and the
//! resource workflows used by both the web server and the CLI.

pub mod client;
pub mod console;
pub mod error;
pub mod store;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use client::{BackendClient, CallOptions, ClientConfig};
pub use console::Console;
pub use error::{ApiError, ClientError, Error, Result};
pub use store::{ActiveSessionStore, ToastStore, TOAST_TTL};
pub use types::*;

/// vyconsole version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Session cookie shared by the auth gate, the proxy and the client.
pub const DEFAULT_SESSION_COOKIE: &str = "vyconsole.session-token";

/// Backend origin used by the client when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Namespace every session-scoped backend path lives under.
pub const SESSION_NAMESPACE: &str = "/session";
