//! System power actions

use serde_json::json;

use super::{session_path, Console};
use crate::client::CallOptions;
use crate::error::{Error, Result};
use crate::types::PowerAction;

impl Console {
    /// Reboot or power off the connected instance
    pub async fn power(&self, action: PowerAction) -> Result<serde_json::Value> {
        let active = self.active.current().ok_or(Error::NoActiveInstance)?;

        let path = session_path(&["power", action.as_str()]);
        let body = json!({ "instance_id": active.instance.id });
        self.report(
            &format!("{} requested for {}", capitalize(action.as_str()), active.instance.name),
            &format!("Failed to {}", action),
            self.client.call(&path, CallOptions::post(body)),
        )
        .await
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
