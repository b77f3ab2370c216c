// CLI - Command Line Interface for the Sui connector
// Drives the coordinator and worker phases by hand, outside a harness

pub mod runner;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use caliper_sui::types::Argument;

/// caliper-sui - Sui connector for load tests
#[derive(Parser, Debug)]
#[command(name = "caliper-sui")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deploy benchmark contracts, split gas coins and send move calls to a Sui network")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the network configuration file
    #[arg(short, long, global = true, default_value = "sui-network.toml", env = "CALIPER_SUI_CONFIG")]
    pub config: PathBuf,

    /// Override the node URL from the configuration
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Override the workspace root used for contract paths
    #[arg(long, global = true)]
    pub workspace_root: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", env = "CALIPER_SUI_LOG")]
    pub log_level: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the deployer and funding addresses
    Address,

    /// Allocate gas coins, deploy contracts and write worker arguments
    Setup(SetupCmd),

    /// Send move calls as one worker
    Invoke(InvokeCmd),
}

#[derive(Args, Debug)]
pub struct SetupCmd {
    /// Number of workers to partition the gas pool for
    #[arg(short, long, default_value = "1")]
    pub workers: usize,

    /// Where to write the worker arguments (JSON)
    #[arg(short, long, default_value = "workers.json")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct InvokeCmd {
    /// Worker arguments written by `setup`
    #[arg(long, default_value = "workers.json")]
    pub workers_file: PathBuf,

    /// Worker index to act as
    #[arg(short, long, default_value = "0")]
    pub worker: usize,

    /// Logical contract name
    #[arg(long)]
    pub contract: String,

    /// Module name
    #[arg(long)]
    pub module: String,

    /// Function name
    #[arg(long)]
    pub function: String,

    /// Call argument; `@N` refers to the contract's N-th initialized object,
    /// anything else is parsed as JSON and falls back to a string
    #[arg(long = "arg", value_parser = parse_argument)]
    pub args: Vec<Argument>,

    /// Query without signing or spending gas
    #[arg(long)]
    pub read_only: bool,

    /// Number of requests to send
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,
}

/// Parse a command-line call argument
pub fn parse_argument(raw: &str) -> Result<Argument, String> {
    if let Some(index) = raw.strip_prefix('@') {
        return index
            .parse()
            .map(Argument::ObjectRef)
            .map_err(|e| format!("invalid object index {:?}: {}", index, e));
    }

    Ok(Argument::Literal(
        serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string())),
    ))
}
