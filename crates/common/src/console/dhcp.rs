use super::{session_path, Console};
use crate::client::CallOptions;
use crate::error::Result;
use crate::types::{DhcpLease, Download};

impl Console {
    pub async fn list_leases(&self) -> Result<Vec<DhcpLease>> {
        Ok(self
            .client
            .call_json(&session_path(&["dhcp", "leases"]), CallOptions::get())
            .await?)
    }

    /// Download the lease table as CSV
    pub async fn export_leases(&self) -> Result<Download> {
        let path = session_path(&["dhcp", "leases", "export"]);
        self.report(
            "Leases exported",
            "Failed to export leases",
            self.client.download(&path),
        )
        .await
    }
}
