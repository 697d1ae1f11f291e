//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Telemeter - telemetry event dispatch client
#[derive(Parser, Debug)]
#[command(
    name = "telemeter",
    author,
    version,
    about = "Telemetry event dispatch client",
    long_about = "Posts named telemetry events to a remote collector.\n\n\
                  Failed deliveries are parked in a durable retry cache and \n\
                  re-delivered on demand with the drain command."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TELEMETER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TELEMETER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Post one or more events to the collector
    Send(SendArgs),

    /// Re-deliver events parked in the retry cache
    Drain(DrainArgs),

    /// Show retry cache and collector status
    Status(StatusArgs),
}

/// Collector and cache settings shared by all commands
#[derive(Parser, Debug, Clone)]
pub struct ConnectArgs {
    /// Project identifier at the collector
    #[arg(long, env = "TELEMETER_PROJECT_ID", default_value = "")]
    pub project_id: String,

    /// Write key authorizing event posts
    #[arg(long, env = "TELEMETER_WRITE_KEY", default_value = "")]
    pub write_key: String,

    /// Collector hostname
    #[arg(long, env = "TELEMETER_COLLECTOR_HOST")]
    pub collector_host: Option<String>,

    /// Collector API version segment
    #[arg(long, env = "TELEMETER_API_VERSION")]
    pub api_version: Option<String>,

    /// Retry cache file location
    #[arg(
        long,
        default_value = "telemeter-cache.jsonl",
        env = "TELEMETER_CACHE_PATH"
    )]
    pub cache_path: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10", env = "TELEMETER_TIMEOUT")]
    pub timeout: u64,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "TELEMETER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `send` command
#[derive(Parser, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Event name
    #[arg(short, long)]
    pub name: String,

    /// JSON payload
    #[arg(short, long, default_value = "{}")]
    pub data: String,

    /// Post the event this many times
    #[arg(long, default_value = "1")]
    pub repeat: u32,
}

/// Arguments for the `drain` command
#[derive(Parser, Debug)]
pub struct DrainArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Maximum number of cached events to re-deliver
    #[arg(short, long, default_value = "10")]
    pub count: usize,

    /// Seconds to wait for retries to settle
    #[arg(long, default_value = "10")]
    pub wait: u64,
}

/// Arguments for the `status` command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
