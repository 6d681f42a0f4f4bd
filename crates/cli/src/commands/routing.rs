//! Policy Routing Commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use crate::output::{cell, print_item, print_list, OutputFormat, TableDisplay};
use vyconsole_common::{Console, RoutingPolicy, RoutingPolicyRule};

#[derive(Subcommand)]
pub enum RoutingCommands {
    /// List routing policies
    List,

    /// Create a routing policy
    Create {
        /// Policy name
        name: String,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,

        /// Rule as `number=N,table=T[,source=NET][,destination=NET]` (repeatable)
        #[arg(long = "rule", value_parser = parse_policy_rule)]
        rules: Vec<RoutingPolicyRule>,
    },

    /// Delete a routing policy
    Delete {
        /// Policy name
        name: String,
    },
}

/// Parse `number=10,table=100,source=10.0.0.0/24`
pub fn parse_policy_rule(s: &str) -> std::result::Result<RoutingPolicyRule, String> {
    let mut number = None;
    let mut table = None;
    let mut source = None;
    let mut destination = None;

    for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{}'", pair))?;
        let value = value.trim();
        match key.trim() {
            "number" => {
                number = Some(value.parse::<u32>().map_err(|e| format!("number: {}", e))?);
            }
            "table" => {
                table = Some(value.parse::<u32>().map_err(|e| format!("table: {}", e))?);
            }
            "source" => source = Some(value.to_string()),
            "destination" => destination = Some(value.to_string()),
            other => return Err(format!("unknown key '{}'", other)),
        }
    }

    Ok(RoutingPolicyRule {
        number: number.ok_or("number is required")?,
        table: table.ok_or("table is required")?,
        source,
        destination,
    })
}

#[derive(Serialize)]
pub struct PolicyDisplay {
    pub name: String,
    pub rules: usize,
    pub tables: String,
    pub description: Option<String>,
}

impl From<RoutingPolicy> for PolicyDisplay {
    fn from(policy: RoutingPolicy) -> Self {
        let mut tables: Vec<u32> = policy.rules.iter().map(|r| r.table).collect();
        tables.sort_unstable();
        tables.dedup();
        Self {
            name: policy.name,
            rules: policy.rules.len(),
            tables: tables
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            description: policy.description,
        }
    }
}

impl TableDisplay for PolicyDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Rules", "Tables", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.rules.to_string(),
            self.tables.clone(),
            cell(&self.description),
        ]
    }
}

pub async fn execute(cmd: RoutingCommands, console: &Console, format: OutputFormat) -> Result<()> {
    match cmd {
        RoutingCommands::List => {
            let policies = console.list_policies().await?;
            let displays: Vec<PolicyDisplay> = policies.into_iter().map(PolicyDisplay::from).collect();
            print_list(&displays, format);
        }

        RoutingCommands::Create {
            name,
            description,
            rules,
        } => {
            let existing: Vec<String> = console
                .list_policies()
                .await?
                .into_iter()
                .map(|p| p.name)
                .collect();

            let policy = RoutingPolicy {
                name,
                description,
                rules,
            };
            let policy = console.create_policy(policy, &existing).await?;
            print_item(&PolicyDisplay::from(policy), format);
        }

        RoutingCommands::Delete { name } => {
            console.delete_policy(&name).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy_rule() {
        let rule = parse_policy_rule("number=10, table=100, source=10.0.0.0/24").unwrap();
        assert_eq!(rule.number, 10);
        assert_eq!(rule.table, 100);
        assert_eq!(rule.source.as_deref(), Some("10.0.0.0/24"));
        assert_eq!(rule.destination, None);

        assert!(parse_policy_rule("table=100").is_err());
        assert!(parse_policy_rule("number=10").is_err());
        assert!(parse_policy_rule("number=ten,table=1").is_err());
        assert!(parse_policy_rule("number=1,table=1,via=x").is_err());
        assert!(parse_policy_rule("number").is_err());
    }

    #[test]
    fn test_policy_display_tables() {
        let policy = RoutingPolicy {
            name: "VPN_SPLIT".into(),
            description: None,
            rules: vec![
                parse_policy_rule("number=20,table=101").unwrap(),
                parse_policy_rule("number=10,table=100").unwrap(),
                parse_policy_rule("number=30,table=100").unwrap(),
            ],
        };
        let display = PolicyDisplay::from(policy);
        assert_eq!(display.rules, 3);
        assert_eq!(display.tables, "100, 101");
    }
}
