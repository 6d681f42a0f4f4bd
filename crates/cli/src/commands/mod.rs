//! CLI Commands

pub mod dhcp;
pub mod firewall;
pub mod instances;
pub mod power;
pub mod routing;
