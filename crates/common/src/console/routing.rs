//! Policy routing screens

use super::{session_path, Console};
use crate::client::CallOptions;
use crate::error::Result;
use crate::types::RoutingPolicy;
use crate::validate;

impl Console {
    pub async fn list_policies(&self) -> Result<Vec<RoutingPolicy>> {
        Ok(self
            .client
            .call_json(&session_path(&["routing", "policies"]), CallOptions::get())
            .await?)
    }

    pub async fn create_policy(&self, mut policy: RoutingPolicy, existing: &[String]) -> Result<RoutingPolicy> {
        policy.name = validate::validate_policy(&policy, existing)?;

        let body = serde_json::to_value(&policy)?;
        let path = session_path(&["routing", "policies"]);
        self.report(
            &format!("Policy {} created", policy.name),
            "Failed to create policy",
            self.client.call_json(&path, CallOptions::post(body)),
        )
        .await
    }

    pub async fn delete_policy(&self, name: &str) -> Result<()> {
        let path = session_path(&["routing", "policies", name]);
        self.report(
            &format!("Policy {} deleted", name),
            "Failed to delete policy",
            self.client.call(&path, CallOptions::delete()),
        )
        .await
        .map(|_| ())
    }
}
