//! Session resolution and the auth gate.
//!
//! The gate runs ahead of every route. Exempt paths pass straight through;
//! everything else needs a session from the configured provider or is
//! redirected to the login page.

pub mod middleware;
pub mod provider;

pub use middleware::{require_session, AuthGate};
pub use provider::{
    provider_from_config, session_cookie, CookieSessionProvider, RemoteSessionProvider,
    SessionProvider,
};
