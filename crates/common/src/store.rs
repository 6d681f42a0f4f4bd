//! Client-side state containers
//!
//! Both stores are cheap-to-clone handles; clones share the same state.
//! Locks are never held across an `.await`.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::types::{ActiveInstance, Toast, ToastVariant};

/// How long a toast stays visible
pub const TOAST_TTL: Duration = Duration::from_secs(5);

struct ToastEntry {
    toast: Toast,
    expires_at: Instant,
}

/// Notification queue with a fixed time-to-live
#[derive(Clone, Default)]
pub struct ToastStore {
    entries: Arc<Mutex<Vec<ToastEntry>>>,
}

impl ToastStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast and return its id.
    ///
    /// When called inside a tokio runtime the toast is also removed by a
    /// timer after `TOAST_TTL`.
    pub fn show(
        &self,
        title: impl Into<String>,
        description: Option<String>,
        variant: ToastVariant,
    ) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            variant,
        };
        let id = toast.id;

        self.entries.lock().push(ToastEntry {
            toast,
            expires_at: Instant::now() + TOAST_TTL,
        });

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let store = self.clone();
            handle.spawn(async move {
                tokio::time::sleep(TOAST_TTL).await;
                store.dismiss(id);
            });
        }

        id
    }

    pub fn success(&self, title: impl Into<String>, description: Option<String>) -> Uuid {
        self.show(title, description, ToastVariant::Success)
    }

    pub fn destructive(&self, title: impl Into<String>, description: Option<String>) -> Uuid {
        self.show(title, description, ToastVariant::Destructive)
    }

    /// Remove a toast; returns whether it was still present
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| e.toast.id != id);
        entries.len() != before
    }

    /// Unexpired toasts in insertion order
    pub fn visible(&self) -> Vec<Toast> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|e| e.expires_at > now);
        entries.iter().map(|e| e.toast.clone()).collect()
    }

    /// Drain every visible toast, e.g. to print them once
    pub fn take(&self) -> Vec<Toast> {
        let visible = self.visible();
        self.clear();
        visible
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Holds at most one connected instance
#[derive(Clone, Default)]
pub struct ActiveSessionStore {
    current: Arc<RwLock<Option<ActiveInstance>>>,
}

impl ActiveSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was connected before
    pub fn connect(&self, active: ActiveInstance) {
        *self.current.write() = Some(active);
    }

    /// Clear the record; returns the previous value
    pub fn disconnect(&self) -> Option<ActiveInstance> {
        self.current.write().take()
    }

    pub fn current(&self) -> Option<ActiveInstance> {
        self.current.read().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.current.read().is_some()
    }
}
