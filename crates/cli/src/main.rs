//! vyconsole CLI - Main Entry Point
//!
//! Drives the console workflows (instances, firewall, routing, DHCP and
//! power) against a vyconsole backend from the command line.

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{dhcp, firewall, instances, power, routing};
use vyconsole_common::{
    BackendClient, ClientConfig, Console, DEFAULT_API_URL, DEFAULT_SESSION_COOKIE,
};

/// vyconsole CLI - manage VyOS routers through a vyconsole backend
#[derive(Parser)]
#[command(name = "vyconsole")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Backend address
    #[arg(long, env = "VYCONSOLE_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Session token sent as the session cookie
    #[arg(long, env = "VYCONSOLE_SESSION_TOKEN", hide_env_values = true, global = true)]
    session_token: Option<String>,

    /// Name of the session cookie
    #[arg(long, env = "VYCONSOLE_SESSION_COOKIE", default_value = DEFAULT_SESSION_COOKIE, global = true)]
    cookie_name: String,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check onboarding status
    Status,

    /// Manage instances
    #[command(subcommand)]
    Instances(instances::InstanceCommands),

    /// Manage firewall chains and rules
    #[command(subcommand)]
    Firewall(firewall::FirewallCommands),

    /// Manage routing policies
    #[command(subcommand)]
    Routing(routing::RoutingCommands),

    /// Inspect and export DHCP leases
    #[command(subcommand)]
    Dhcp(dhcp::DhcpCommands),

    /// Reboot or power off an instance
    #[command(subcommand)]
    Power(power::PowerCommands),
}

async fn run(command: Commands, console: &Console, format: output::OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Status => {
            let status = console.onboarding_status().await?;
            let api_url = &console.client().config().base_url;
            if status.completed {
                println!(
                    "Onboarding complete at {} ({} instance(s))",
                    api_url, status.instance_count
                );
            } else {
                println!("Onboarding not completed at {}", api_url);
            }
        }
        Commands::Instances(cmd) => instances::execute(cmd, console, format).await?,
        Commands::Firewall(cmd) => firewall::execute(cmd, console, format).await?,
        Commands::Routing(cmd) => routing::execute(cmd, console, format).await?,
        Commands::Dhcp(cmd) => dhcp::execute(cmd, console, format).await?,
        Commands::Power(cmd) => power::execute(cmd, console).await?,
    }

    Ok(())
}

/// Message for a failed command, preferring the backend's wording
fn error_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<vyconsole_common::Error>() {
        Some(err) => err.user_message(),
        None => format!("{:#}", e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let console = Console::new(BackendClient::new(ClientConfig {
        base_url: cli.api_url,
        session_token: cli.session_token,
        cookie_name: cli.cookie_name,
    }));

    let result = run(cli.command, &console, cli.format).await;
    output::print_toasts(&console.toasts().take());

    if let Err(e) = result {
        output::print_error(&error_message(&e));
        std::process::exit(1);
    }

    Ok(())
}
