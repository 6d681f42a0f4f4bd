//! Instance Commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use crate::output::{cell, print_item, print_list, OutputFormat, TableDisplay};
use vyconsole_common::{Console, Instance, NewInstance};

#[derive(Subcommand)]
pub enum InstanceCommands {
    /// List managed instances
    List,

    /// Register a new instance
    Create {
        /// Instance name
        #[arg(short, long)]
        name: String,

        /// Router address
        #[arg(long)]
        host: String,

        /// HTTPS API port
        #[arg(long, default_value = "443")]
        port: u16,

        /// API key for the router's HTTP API
        #[arg(long, env = "VYCONSOLE_INSTANCE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,
    },

    /// Remove an instance
    Delete {
        /// Instance ID
        id: String,
    },

    /// Connect to an instance
    Connect {
        /// Instance ID
        id: String,
    },
}

#[derive(Serialize)]
pub struct InstanceDisplay {
    pub id: String,
    pub name: String,
    pub address: String,
    pub status: Option<String>,
    pub description: Option<String>,
}

impl From<Instance> for InstanceDisplay {
    fn from(instance: Instance) -> Self {
        Self {
            address: format!("{}:{}", instance.host, instance.port),
            id: instance.id,
            name: instance.name,
            status: instance.status,
            description: instance.description,
        }
    }
}

impl TableDisplay for InstanceDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Address", "Status", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.address.clone(),
            cell(&self.status),
            cell(&self.description),
        ]
    }
}

pub async fn execute(cmd: InstanceCommands, console: &Console, format: OutputFormat) -> Result<()> {
    match cmd {
        InstanceCommands::List => {
            let instances = console.list_instances().await?;
            let displays: Vec<InstanceDisplay> = instances.into_iter().map(InstanceDisplay::from).collect();
            print_list(&displays, format);
        }

        InstanceCommands::Create {
            name,
            host,
            port,
            api_key,
            description,
        } => {
            let existing: Vec<String> = console
                .list_instances()
                .await?
                .into_iter()
                .map(|i| i.name)
                .collect();

            let new = NewInstance {
                name,
                host,
                port,
                api_key,
                description,
            };
            let instance = console.create_instance(new, &existing).await?;
            print_item(&InstanceDisplay::from(instance), format);
        }

        InstanceCommands::Delete { id } => {
            console.delete_instance(&id).await?;
        }

        InstanceCommands::Connect { id } => {
            let active = console.connect(&id).await?;
            print_item(&InstanceDisplay::from(active.instance), format);
        }
    }

    Ok(())
}
