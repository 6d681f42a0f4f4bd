//! Firewall Commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use crate::output::{cell, print_item, print_list, OutputFormat, TableDisplay};
use vyconsole_common::{Console, FirewallChain, FirewallRule, Protocol, RuleAction};

#[derive(Subcommand)]
pub enum FirewallCommands {
    /// Manage chains
    #[command(subcommand)]
    Chains(ChainCommands),

    /// Manage rules inside a chain
    #[command(subcommand)]
    Rules(RuleCommands),
}

#[derive(Subcommand)]
pub enum ChainCommands {
    /// List chains
    List,

    /// Create a chain
    Create {
        /// Chain name
        name: String,

        /// Action for packets no rule matched
        #[arg(long, default_value = "drop")]
        default_action: RuleAction,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a chain
    Delete {
        /// Chain name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum RuleCommands {
    /// List the rules of a chain
    List {
        /// Chain name
        chain: String,
    },

    /// Add a rule to a chain
    Add {
        /// Chain name
        chain: String,

        /// Rule number (1-999999)
        #[arg(short, long)]
        number: u32,

        /// accept, drop, reject, jump, return or continue
        #[arg(short, long)]
        action: RuleAction,

        /// all, tcp, udp, tcp_udp or icmp
        #[arg(short, long, default_value = "all")]
        protocol: Protocol,

        /// Source address or network
        #[arg(long)]
        source: Option<String>,

        /// Destination address or network
        #[arg(long)]
        destination: Option<String>,

        /// Destination port or range (e.g. 443 or 8000-8080)
        #[arg(long)]
        port: Option<String>,

        /// Chain to jump to (jump action only)
        #[arg(long)]
        jump_target: Option<String>,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a rule
    Delete {
        /// Chain name
        chain: String,

        /// Rule number
        number: u32,
    },
}

#[derive(Serialize)]
pub struct ChainDisplay {
    pub name: String,
    pub default_action: String,
    pub rules: u32,
    pub description: Option<String>,
}

impl From<FirewallChain> for ChainDisplay {
    fn from(chain: FirewallChain) -> Self {
        Self {
            name: chain.name,
            default_action: chain.default_action.to_string(),
            rules: chain.rule_count,
            description: chain.description,
        }
    }
}

impl TableDisplay for ChainDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Default", "Rules", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.default_action.clone(),
            self.rules.to_string(),
            cell(&self.description),
        ]
    }
}

#[derive(Serialize)]
pub struct RuleDisplay {
    pub number: u32,
    pub action: String,
    pub protocol: String,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub port: Option<String>,
    pub description: Option<String>,
}

impl From<FirewallRule> for RuleDisplay {
    fn from(rule: FirewallRule) -> Self {
        let action = match (&rule.action, &rule.jump_target) {
            (RuleAction::Jump, Some(target)) => format!("jump {}", target),
            (action, _) => action.to_string(),
        };
        Self {
            number: rule.number,
            action,
            protocol: rule.protocol.to_string(),
            source: rule.source,
            destination: rule.destination,
            port: rule.destination_port,
            description: rule.description,
        }
    }
}

impl TableDisplay for RuleDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Action", "Protocol", "Source", "Destination", "Port", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.number.to_string(),
            self.action.clone(),
            self.protocol.clone(),
            cell(&self.source),
            cell(&self.destination),
            cell(&self.port),
            cell(&self.description),
        ]
    }
}

async fn chain_names(console: &Console) -> Result<Vec<String>> {
    Ok(console
        .list_chains()
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect())
}

pub async fn execute(cmd: FirewallCommands, console: &Console, format: OutputFormat) -> Result<()> {
    match cmd {
        FirewallCommands::Chains(cmd) => execute_chains(cmd, console, format).await,
        FirewallCommands::Rules(cmd) => execute_rules(cmd, console, format).await,
    }
}

async fn execute_chains(cmd: ChainCommands, console: &Console, format: OutputFormat) -> Result<()> {
    match cmd {
        ChainCommands::List => {
            let chains = console.list_chains().await?;
            let displays: Vec<ChainDisplay> = chains.into_iter().map(ChainDisplay::from).collect();
            print_list(&displays, format);
        }

        ChainCommands::Create {
            name,
            default_action,
            description,
        } => {
            let existing = chain_names(console).await?;
            let chain = FirewallChain {
                name,
                default_action,
                description,
                rule_count: 0,
            };
            let chain = console.create_chain(chain, &existing).await?;
            print_item(&ChainDisplay::from(chain), format);
        }

        ChainCommands::Delete { name } => {
            console.delete_chain(&name).await?;
        }
    }

    Ok(())
}

async fn execute_rules(cmd: RuleCommands, console: &Console, format: OutputFormat) -> Result<()> {
    match cmd {
        RuleCommands::List { chain } => {
            let rules = console.list_rules(&chain).await?;
            let displays: Vec<RuleDisplay> = rules.into_iter().map(RuleDisplay::from).collect();
            print_list(&displays, format);
        }

        RuleCommands::Add {
            chain,
            number,
            action,
            protocol,
            source,
            destination,
            port,
            jump_target,
            description,
        } => {
            let used: Vec<u32> = console
                .list_rules(&chain)
                .await?
                .into_iter()
                .map(|r| r.number)
                .collect();
            let chains = chain_names(console).await?;

            let rule = FirewallRule {
                number,
                action,
                protocol,
                source,
                destination,
                destination_port: port,
                jump_target,
                description,
            };
            let rule = console.add_rule(&chain, rule, &used, &chains).await?;
            print_item(&RuleDisplay::from(rule), format);
        }

        RuleCommands::Delete { chain, number } => {
            console.delete_rule(&chain, number).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_rule_display() {
        let rule = FirewallRule {
            number: 20,
            action: RuleAction::Jump,
            protocol: Protocol::Tcp,
            source: None,
            destination: Some("10.0.0.0/24".into()),
            destination_port: Some("22".into()),
            jump_target: Some("SSH_GUARD".into()),
            description: None,
        };
        let display = RuleDisplay::from(rule);
        assert_eq!(display.action, "jump SSH_GUARD");
        assert_eq!(
            display.row(),
            vec!["20", "jump SSH_GUARD", "tcp", "-", "10.0.0.0/24", "22", "-"]
        );
    }
}
