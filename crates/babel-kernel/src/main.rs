//! babel-kernel command line tool.
//!
//! Shows what the kernel route layer would submit for a route operation and
//! derives interface identifiers from hardware addresses.

use anyhow::{Context, Result};
use babel_kernel::{
    derive_interface_identifier, DryRunRibClient, KernelConfig, KernelRoutes, NextHopUpdate,
    Operation, RouteChange, RouteKey,
};
use babel_types::{canonical_prefix, CanonicalAddress, HardwareAddress, IpPrefix};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Babel kernel route layer
#[derive(Parser, Debug)]
#[command(name = "babel-kernel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short = 'c', long, default_value = babel_kernel::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Route operations against a dry-run RIB client
    Route {
        #[command(subcommand)]
        op: RouteCommand,
    },

    /// Derive the EUI-64 interface identifier of a hardware address
    Eui64 {
        /// Colon- or hyphen-separated hex bytes, e.g. 52:54:00:12:34:56
        hwaddr: HardwareAddress,
    },
}

#[derive(Subcommand, Debug)]
enum RouteCommand {
    Add(RouteArgs),
    Flush(RouteArgs),
    Modify {
        #[command(flatten)]
        route: RouteArgs,

        #[arg(long)]
        new_gateway: CanonicalAddress,

        #[arg(long)]
        new_ifindex: u32,

        #[arg(long)]
        new_metric: u32,
    },
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Destination prefix, e.g. 10.0.0.0/24 or 2001:db8::/32
    #[arg(long)]
    prefix: IpPrefix,

    #[arg(long)]
    gateway: CanonicalAddress,

    #[arg(long)]
    ifindex: u32,

    #[arg(long, default_value = "0")]
    metric: u32,
}

impl RouteArgs {
    fn key(&self) -> RouteKey {
        let (prefix, prefix_len) = canonical_prefix(&self.prefix);
        RouteKey {
            prefix,
            prefix_len,
            gateway: self.gateway,
            ifindex: self.ifindex,
            metric: self.metric,
        }
    }
}

fn init_logging(config: &KernelConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(config.logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = KernelConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    init_logging(&config, cli.log_level.as_deref());

    match cli.command {
        Command::Route { op } => {
            let (operation, change) = match op {
                RouteCommand::Add(route) => (Operation::Add, RouteChange::new(route.key())),
                RouteCommand::Flush(route) => (Operation::Flush, RouteChange::new(route.key())),
                RouteCommand::Modify {
                    route,
                    new_gateway,
                    new_ifindex,
                    new_metric,
                } => (
                    Operation::Modify,
                    RouteChange::with_update(
                        route.key(),
                        NextHopUpdate {
                            gateway: new_gateway,
                            ifindex: new_ifindex,
                            metric: new_metric,
                        },
                    ),
                ),
            };

            let client = DryRunRibClient;
            let routes = KernelRoutes::with_source(&client, config.route_source());
            info!(%operation, route = %change.key, "applying route operation");
            let outcome = routes
                .install_or_update_route(operation, &change)
                .with_context(|| format!("{} {}", operation, change.key))?;
            println!("{:?} ({})", outcome, outcome.code());
        }
        Command::Eui64 { hwaddr } => {
            let id = derive_interface_identifier(&hwaddr)
                .with_context(|| format!("deriving identifier for '{}'", hwaddr))?;
            println!("{}", id);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("babel-kernel: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
