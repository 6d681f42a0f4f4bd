//! DHCP Commands

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use std::path::PathBuf;

use crate::output::{cell, print_info, print_list, OutputFormat, TableDisplay};
use vyconsole_common::{Console, DhcpLease};

/// File name used when the backend does not suggest one
const DEFAULT_EXPORT_NAME: &str = "dhcp-leases.csv";

#[derive(Subcommand)]
pub enum DhcpCommands {
    /// List DHCP server leases
    Leases,

    /// Export the lease table as CSV
    Export {
        /// Destination file; defaults to the name the backend suggests
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
pub struct LeaseDisplay {
    pub ip: String,
    pub mac: String,
    pub hostname: Option<String>,
    pub state: Option<String>,
    pub pool: Option<String>,
    pub expiry: Option<String>,
}

impl From<DhcpLease> for LeaseDisplay {
    fn from(lease: DhcpLease) -> Self {
        Self {
            ip: lease.ip,
            mac: lease.mac,
            hostname: lease.hostname,
            state: lease.state,
            pool: lease.pool,
            expiry: lease.expiry,
        }
    }
}

impl TableDisplay for LeaseDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["IP", "MAC", "Hostname", "State", "Pool", "Expiry"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.ip.clone(),
            self.mac.clone(),
            cell(&self.hostname),
            cell(&self.state),
            cell(&self.pool),
            cell(&self.expiry),
        ]
    }
}

/// Where an export is written: the explicit path, else the suggested name
/// reduced to its final component.
pub fn export_path(output: Option<PathBuf>, suggested: Option<&str>) -> PathBuf {
    output.unwrap_or_else(|| {
        suggested
            .and_then(|name| std::path::Path::new(name).file_name())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME))
    })
}

pub async fn execute(cmd: DhcpCommands, console: &Console, format: OutputFormat) -> Result<()> {
    match cmd {
        DhcpCommands::Leases => {
            let leases = console.list_leases().await?;
            let displays: Vec<LeaseDisplay> = leases.into_iter().map(LeaseDisplay::from).collect();
            print_list(&displays, format);
        }

        DhcpCommands::Export { output } => {
            let download = console.export_leases().await?;
            let path = export_path(output, download.filename.as_deref());
            tokio::fs::write(&path, &download.bytes)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            print_info(&format!("Wrote {} bytes to {}", download.bytes.len(), path.display()));
        }
    }

    Ok(())
}
