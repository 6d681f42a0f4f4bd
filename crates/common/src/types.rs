//! Core types for vyconsole

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session resolved by the auth provider.
///
/// Only presence matters to the gate; the proxy forwards the raw token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub expires: Option<String>,
}

impl Session {
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: None,
            expires: None,
        }
    }
}

/// Toast variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastVariant {
    #[default]
    Default,
    Success,
    Destructive,
}

/// Ephemeral notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
}

/// Managed router instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

fn default_api_port() -> u16 {
    443
}

/// Request body for registering an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInstance {
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The instance the console is currently connected to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveInstance {
    pub instance: Instance,
    pub connected_at: DateTime<Utc>,
}

impl ActiveInstance {
    pub fn new(instance: Instance) -> Self {
        Self {
            instance,
            connected_at: Utc::now(),
        }
    }
}

/// Answer of the onboarding probe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingStatus {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub instance_count: u32,
}

/// Firewall rule action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    #[default]
    Accept,
    Drop,
    Reject,
    Jump,
    Return,
    Continue,
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleAction::Accept => write!(f, "accept"),
            RuleAction::Drop => write!(f, "drop"),
            RuleAction::Reject => write!(f, "reject"),
            RuleAction::Jump => write!(f, "jump"),
            RuleAction::Return => write!(f, "return"),
            RuleAction::Continue => write!(f, "continue"),
        }
    }
}

impl std::str::FromStr for RuleAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accept" => Ok(RuleAction::Accept),
            "drop" => Ok(RuleAction::Drop),
            "reject" => Ok(RuleAction::Reject),
            "jump" => Ok(RuleAction::Jump),
            "return" => Ok(RuleAction::Return),
            "continue" => Ok(RuleAction::Continue),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// Layer 4 protocol matched by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    #[default]
    All,
    Tcp,
    Udp,
    TcpUdp,
    Icmp,
}

impl Protocol {
    /// Whether port matches make sense for this protocol.
    pub fn has_ports(&self) -> bool {
        matches!(self, Protocol::Tcp | Protocol::Udp | Protocol::TcpUdp)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::All => write!(f, "all"),
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::TcpUdp => write!(f, "tcp_udp"),
            Protocol::Icmp => write!(f, "icmp"),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Protocol::All),
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            "tcp_udp" => Ok(Protocol::TcpUdp),
            "icmp" => Ok(Protocol::Icmp),
            other => Err(format!("unknown protocol: {other}")),
        }
    }
}

/// Named firewall chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallChain {
    pub name: String,
    #[serde(default)]
    pub default_action: RuleAction,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rule_count: u32,
}

/// Numbered rule inside a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallRule {
    pub number: u32,
    pub action: RuleAction,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Policy-based routing policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<RoutingPolicyRule>,
}

/// One match/set entry of a routing policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingPolicyRule {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Routing table the match is sent to
    pub table: u32,
}

/// DHCP server lease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhcpLease {
    pub ip: String,
    pub mac: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pool: Option<String>,
    #[serde(default)]
    pub expiry: Option<String>,
}

/// System power action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerAction {
    Reboot,
    Poweroff,
}

impl PowerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Reboot => "reboot",
            PowerAction::Poweroff => "poweroff",
        }
    }
}

impl std::fmt::Display for PowerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary payload fetched from the backend, e.g. a CSV export
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: bytes::Bytes,
}
