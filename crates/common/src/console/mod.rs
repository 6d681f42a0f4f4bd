//! Resource workflows behind the console screens.
//!
//! Every mutating operation follows the same shape: validate locally, make a
//! single backend call, then push a success toast or a destructive toast
//! carrying the backend's message. Validation failures are returned without
//! a toast so the caller can show them next to the offending field.
//! Nothing is retried.

mod dhcp;
mod firewall;
mod instances;
mod power;
mod routing;

use std::future::Future;

use crate::client::{BackendClient, CallOptions};
use crate::error::{ClientError, Error, Result};
use crate::store::{ActiveSessionStore, ToastStore};
use crate::types::OnboardingStatus;
use crate::SESSION_NAMESPACE;

/// Backend client plus the state containers the screens share
#[derive(Clone)]
pub struct Console {
    client: BackendClient,
    toasts: ToastStore,
    active: ActiveSessionStore,
}

impl Console {
    pub fn new(client: BackendClient) -> Self {
        Self::with_stores(client, ToastStore::new(), ActiveSessionStore::new())
    }

    pub fn with_stores(client: BackendClient, toasts: ToastStore, active: ActiveSessionStore) -> Self {
        Self {
            client,
            toasts,
            active,
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub fn toasts(&self) -> &ToastStore {
        &self.toasts
    }

    pub fn active(&self) -> &ActiveSessionStore {
        &self.active
    }

    /// Probe whether first-run setup has been completed
    pub async fn onboarding_status(&self) -> Result<OnboardingStatus> {
        Ok(self
            .client
            .call_json(&session_path(&["onboarding-status"]), CallOptions::get())
            .await?)
    }

    /// Await a backend call and report its outcome as a toast
    async fn report<T, F>(&self, success: &str, failure: &str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, ClientError>>,
    {
        match call.await {
            Ok(value) => {
                self.toasts.success(success, None);
                Ok(value)
            }
            Err(e) => {
                self.toasts.destructive(failure, Some(e.user_message()));
                Err(Error::Client(e))
            }
        }
    }
}

/// Build `/session/<seg>/<seg>...` with each segment percent-encoded
pub(crate) fn session_path(segments: &[&str]) -> String {
    let mut path = String::from(SESSION_NAMESPACE);
    for segment in segments {
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
    }
    path
}
