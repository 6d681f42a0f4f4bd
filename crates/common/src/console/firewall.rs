//! Firewall chain and rule screens

use super::{session_path, Console};
use crate::client::CallOptions;
use crate::error::Result;
use crate::types::{FirewallChain, FirewallRule};
use crate::validate;

impl Console {
    pub async fn list_chains(&self) -> Result<Vec<FirewallChain>> {
        Ok(self
            .client
            .call_json(&session_path(&["firewall", "chains"]), CallOptions::get())
            .await?)
    }

    /// Create a chain; `existing` are the chain names already present
    pub async fn create_chain(&self, mut chain: FirewallChain, existing: &[String]) -> Result<FirewallChain> {
        chain.name = validate::validate_name("chain name", &chain.name, existing)?;

        let body = serde_json::to_value(&chain)?;
        let path = session_path(&["firewall", "chains"]);
        self.report(
            &format!("Chain {} created", chain.name),
            "Failed to create chain",
            self.client.call_json(&path, CallOptions::post(body)),
        )
        .await
    }

    pub async fn delete_chain(&self, name: &str) -> Result<()> {
        let path = session_path(&["firewall", "chains", name]);
        self.report(
            &format!("Chain {} deleted", name),
            "Failed to delete chain",
            self.client.call(&path, CallOptions::delete()),
        )
        .await
        .map(|_| ())
    }

    pub async fn list_rules(&self, chain: &str) -> Result<Vec<FirewallRule>> {
        Ok(self
            .client
            .call_json(&session_path(&["firewall", "chains", chain, "rules"]), CallOptions::get())
            .await?)
    }

    /// Add a rule to `chain`.
    ///
    /// `used_numbers` are the rule numbers already in the chain and `chains`
    /// every chain name, used to check jump targets.
    pub async fn add_rule(
        &self,
        chain: &str,
        rule: FirewallRule,
        used_numbers: &[u32],
        chains: &[String],
    ) -> Result<FirewallRule> {
        validate::validate_rule(&rule, used_numbers, chains)?;

        let body = serde_json::to_value(&rule)?;
        let path = session_path(&["firewall", "chains", chain, "rules"]);
        self.report(
            &format!("Rule {} added to {}", rule.number, chain),
            "Failed to add rule",
            self.client.call_json(&path, CallOptions::post(body)),
        )
        .await
    }

    pub async fn delete_rule(&self, chain: &str, number: u32) -> Result<()> {
        let number = number.to_string();
        let path = session_path(&["firewall", "chains", chain, "rules", number.as_str()]);
        self.report(
            &format!("Rule {} deleted from {}", number, chain),
            "Failed to delete rule",
            self.client.call(&path, CallOptions::delete()),
        )
        .await
        .map(|_| ())
    }
}
