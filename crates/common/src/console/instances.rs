//! Managed instance screens

use serde_json::json;

use super::{session_path, Console};
use crate::client::CallOptions;
use crate::error::{Error, Result};
use crate::types::{ActiveInstance, Instance, NewInstance};
use crate::validate;

impl Console {
    pub async fn list_instances(&self) -> Result<Vec<Instance>> {
        Ok(self
            .client
            .call_json(&session_path(&["instances"]), CallOptions::get())
            .await?)
    }

    /// Register a new instance; `existing` are the names already listed
    pub async fn create_instance(&self, instance: NewInstance, existing: &[String]) -> Result<Instance> {
        validate::validate_instance(&instance, existing)?;

        let body = serde_json::to_value(&instance)?;
        let path = session_path(&["instances"]);
        self.report(
            &format!("Instance {} added", instance.name.trim()),
            "Failed to add instance",
            self.client.call_json(&path, CallOptions::post(body)),
        )
        .await
    }

    /// Delete an instance, dropping the active record if it pointed at it
    pub async fn delete_instance(&self, id: &str) -> Result<()> {
        let path = session_path(&["instances", id]);
        self.report(
            "Instance removed",
            "Failed to remove instance",
            self.client.call(&path, CallOptions::delete()),
        )
        .await?;

        if self.active.current().is_some_and(|a| a.instance.id == id) {
            self.active.disconnect();
        }
        Ok(())
    }

    /// Connect to an instance; replaces any previous connection
    pub async fn connect(&self, id: &str) -> Result<ActiveInstance> {
        let path = session_path(&["instances", id, "connect"]);
        let instance: Instance = self
            .report(
                "Connected",
                "Failed to connect",
                self.client.call_json(&path, CallOptions::post(json!({}))),
            )
            .await?;

        let active = ActiveInstance::new(instance);
        self.active.connect(active.clone());
        Ok(active)
    }

    /// Disconnect from the active instance
    pub async fn disconnect(&self) -> Result<()> {
        let active = self.active.current().ok_or(Error::NoActiveInstance)?;
        let path = session_path(&["instances", active.instance.id.as_str(), "disconnect"]);
        self.report(
            "Disconnected",
            "Failed to disconnect",
            self.client.call(&path, CallOptions::post(json!({}))),
        )
        .await?;

        self.active.disconnect();
        Ok(())
    }
}
