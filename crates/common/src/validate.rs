//! Local validation run before any backend call
//!
//! Chain and policy names must be:
//! - 1-28 characters
//! - a letter followed by letters, digits, `_` or `-`
//! - not a base chain name
//! - unique (case-insensitive) among the names that already exist

use std::collections::HashSet;
use std::net::IpAddr;

use ipnetwork::IpNetwork;
use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::error::{Error, Result};
use crate::types::{FirewallRule, NewInstance, RuleAction, RoutingPolicy};

pub const MAX_NAME_LEN: usize = 28;
pub const MAX_RULE_NUMBER: u32 = 999_999;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("name pattern compiles")
});

/// Base chain names owned by the router itself
static RESERVED_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["input", "output", "forward", "prerouting", "postrouting"]
        .into_iter()
        .collect()
});

/// Validate a chain or policy name against the names that already exist.
///
/// Returns the trimmed name.
pub fn validate_name(field: &str, name: &str, existing: &[String]) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::validation(
            field,
            format!("must be at most {} characters (got {})", MAX_NAME_LEN, name.len()),
        ));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(Error::validation(
            field,
            "must start with a letter and contain only letters, numbers, '_' or '-'",
        ));
    }
    if RESERVED_NAMES.contains(name.to_ascii_lowercase().as_str()) {
        return Err(Error::validation(field, format!("'{}' is reserved", name)));
    }
    if existing.iter().any(|e| e.eq_ignore_ascii_case(name)) {
        return Err(Error::validation(field, format!("'{}' already exists", name)));
    }

    Ok(name.to_string())
}

/// Validate a rule number against the numbers already used in the chain
pub fn validate_rule_number(number: u32, existing: &[u32]) -> Result<()> {
    if !(1..=MAX_RULE_NUMBER).contains(&number) {
        return Err(Error::validation(
            "rule number",
            format!("must be between 1 and {}", MAX_RULE_NUMBER),
        ));
    }
    if existing.contains(&number) {
        return Err(Error::validation(
            "rule number",
            format!("{} is already in use", number),
        ));
    }
    Ok(())
}

/// Accepts a bare address or CIDR network
pub fn validate_address(field: &str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.parse::<IpAddr>().is_ok() || value.parse::<IpNetwork>().is_ok() {
        return Ok(());
    }
    Err(Error::validation(
        field,
        format!("'{}' is not an IP address or CIDR network", value),
    ))
}

/// Accepts `N` or `A-B` with every port in 1..=65535 and A <= B
pub fn validate_port(field: &str, value: &str) -> Result<()> {
    let parse = |s: &str| -> Option<u16> { s.trim().parse::<u16>().ok().filter(|p| *p > 0) };
    let invalid = || Error::validation(field, format!("'{}' is not a port or port range", value));

    match value.split_once('-') {
        Some((start, end)) => {
            let (start, end) = (parse(start).ok_or_else(invalid)?, parse(end).ok_or_else(invalid)?);
            if start > end {
                return Err(invalid());
            }
            Ok(())
        }
        None => parse(value).map(|_| ()).ok_or_else(invalid),
    }
}

/// Validate a rule before it is added to `chain_rules`.
///
/// `chains` lists every chain on the router; jump targets must be one of them.
pub fn validate_rule(rule: &FirewallRule, chain_rules: &[u32], chains: &[String]) -> Result<()> {
    validate_rule_number(rule.number, chain_rules)?;

    match (rule.action, rule.jump_target.as_deref()) {
        (RuleAction::Jump, None) => {
            return Err(Error::validation("jump target", "is required for jump rules"));
        }
        (RuleAction::Jump, Some(target)) => {
            if !chains.iter().any(|c| c == target) {
                return Err(Error::validation(
                    "jump target",
                    format!("chain '{}' does not exist", target),
                ));
            }
        }
        (_, Some(_)) => {
            return Err(Error::validation("jump target", "only allowed for jump rules"));
        }
        (_, None) => {}
    }

    if let Some(source) = &rule.source {
        validate_address("source", source)?;
    }
    if let Some(destination) = &rule.destination {
        validate_address("destination", destination)?;
    }
    if let Some(port) = &rule.destination_port {
        if !rule.protocol.has_ports() {
            return Err(Error::validation(
                "destination port",
                format!("not allowed with protocol {}", rule.protocol),
            ));
        }
        validate_port("destination port", port)?;
    }

    Ok(())
}

/// Validate a new routing policy and its rules
pub fn validate_policy(policy: &RoutingPolicy, existing: &[String]) -> Result<String> {
    let name = validate_name("policy name", &policy.name, existing)?;

    let mut seen = Vec::with_capacity(policy.rules.len());
    for rule in &policy.rules {
        validate_rule_number(rule.number, &seen)?;
        seen.push(rule.number);

        if let Some(source) = &rule.source {
            validate_address("source", source)?;
        }
        if let Some(destination) = &rule.destination {
            validate_address("destination", destination)?;
        }
        if !(1..=200).contains(&rule.table) {
            return Err(Error::validation("table", "must be between 1 and 200"));
        }
    }

    Ok(name)
}

/// Validate an instance registration form
pub fn validate_instance(instance: &NewInstance, existing: &[String]) -> Result<()> {
    let name = instance.name.trim();
    if name.is_empty() {
        return Err(Error::validation("instance name", "is required"));
    }
    if existing.iter().any(|e| e.eq_ignore_ascii_case(name)) {
        return Err(Error::validation(
            "instance name",
            format!("'{}' already exists", name),
        ));
    }
    if instance.host.trim().is_empty() {
        return Err(Error::validation("host", "is required"));
    }
    if instance.port == 0 {
        return Err(Error::validation("port", "must be between 1 and 65535"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Protocol, RoutingPolicyRule};

    fn rule(number: u32, action: RuleAction) -> FirewallRule {
        FirewallRule {
            number,
            action,
            protocol: Protocol::All,
            source: None,
            destination: None,
            destination_port: None,
            jump_target: None,
            description: None,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_names() {
        assert_eq!(validate_name("chain name", "WAN_IN", &[]).unwrap(), "WAN_IN");
        assert_eq!(validate_name("chain name", "  lan-local ", &[]).unwrap(), "lan-local");
        assert!(validate_name("chain name", &"a".repeat(MAX_NAME_LEN), &[]).is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(validate_name("chain name", "", &[]).is_err());
        assert!(validate_name("chain name", "1wan", &[]).is_err());
        assert!(validate_name("chain name", "wan in", &[]).is_err());
        assert!(validate_name("chain name", "wan.in", &[]).is_err());
        assert!(validate_name("chain name", &"a".repeat(MAX_NAME_LEN + 1), &[]).is_err());
    }

    #[test]
    fn test_reserved_names() {
        for name in ["input", "OUTPUT", "Forward", "prerouting", "postrouting"] {
            let err = validate_name("chain name", name, &[]).unwrap_err();
            assert!(err.to_string().contains("reserved"), "{name}");
        }
    }

    #[test]
    fn test_duplicate_names() {
        let existing = names(&["WAN_IN", "LAN_LOCAL"]);
        let err = validate_name("chain name", "wan_in", &existing).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(validate_name("chain name", "WAN_OUT", &existing).is_ok());
    }

    #[test]
    fn test_rule_numbers() {
        assert!(validate_rule_number(0, &[]).is_err());
        assert!(validate_rule_number(MAX_RULE_NUMBER + 1, &[]).is_err());
        assert!(validate_rule_number(10, &[10, 20]).is_err());
        assert!(validate_rule_number(30, &[10, 20]).is_ok());
    }

    #[test]
    fn test_jump_rules() {
        let chains = names(&["WAN_IN", "BLOCKLIST"]);
        assert!(validate_rule(&rule(10, RuleAction::Jump), &[], &chains).is_err());

        let mut jump = rule(10, RuleAction::Jump);
        jump.jump_target = Some("MISSING".into());
        assert!(validate_rule(&jump, &[], &chains).is_err());

        jump.jump_target = Some("BLOCKLIST".into());
        assert!(validate_rule(&jump, &[], &chains).is_ok());

        let mut accept = rule(20, RuleAction::Accept);
        accept.jump_target = Some("BLOCKLIST".into());
        assert!(validate_rule(&accept, &[], &chains).is_err());
    }

    #[test]
    fn test_rule_matches() {
        let mut r = rule(10, RuleAction::Accept);
        r.source = Some("10.0.0.0/8".into());
        r.destination = Some("2001:db8::1".into());
        assert!(validate_rule(&r, &[], &[]).is_ok());

        r.source = Some("10.0.0.0/33".into());
        assert!(validate_rule(&r, &[], &[]).is_err());

        let mut ports = rule(10, RuleAction::Accept);
        ports.destination_port = Some("22".into());
        assert!(validate_rule(&ports, &[], &[]).is_err()); // protocol all

        ports.protocol = Protocol::Tcp;
        assert!(validate_rule(&ports, &[], &[]).is_ok());
        ports.destination_port = Some("1000-2000".into());
        assert!(validate_rule(&ports, &[], &[]).is_ok());
        ports.destination_port = Some("2000-1000".into());
        assert!(validate_rule(&ports, &[], &[]).is_err());
        ports.destination_port = Some("0".into());
        assert!(validate_rule(&ports, &[], &[]).is_err());
    }

    #[test]
    fn test_policy() {
        let mut policy = RoutingPolicy {
            name: "VIA_WAN2".into(),
            description: None,
            rules: vec![
                RoutingPolicyRule { number: 10, source: Some("192.168.10.0/24".into()), destination: None, table: 10 },
                RoutingPolicyRule { number: 20, source: None, destination: Some("0.0.0.0/0".into()), table: 20 },
            ],
        };
        assert_eq!(validate_policy(&policy, &[]).unwrap(), "VIA_WAN2");

        policy.rules[1].number = 10;
        assert!(validate_policy(&policy, &[]).is_err());

        policy.rules[1].number = 20;
        policy.rules[1].table = 0;
        assert!(validate_policy(&policy, &[]).is_err());
    }

    #[test]
    fn test_instance() {
        let mut inst = NewInstance {
            name: "edge-1".into(),
            host: "192.0.2.10".into(),
            port: 443,
            api_key: None,
            description: None,
        };
        assert!(validate_instance(&inst, &names(&["core-1"])).is_ok());
        assert!(validate_instance(&inst, &names(&["EDGE-1"])).is_err());

        inst.port = 0;
        assert!(validate_instance(&inst, &[]).is_err());

        inst.port = 443;
        inst.host = " ".into();
        assert!(validate_instance(&inst, &[]).is_err());
    }
}
