//! CLI argument parsing using clap derive API
//!
//! 선언만 있고 I/O는 없습니다.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// hostattr -- 호스트 속성 테이블 관리 도구
///
/// Use `hostattr <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "hostattr", version, about, long_about = None)]
pub struct Cli {
    /// Path to the hostattr.toml configuration file.
    #[arg(short, long, global = true, default_value = "hostattr.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration.
    Config(ConfigArgs),

    /// Inspect host attribute files.
    Hosts(HostsArgs),
}

// ---- config ----

/// Manage hostattr configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, host_attributes).
        #[arg(long)]
        section: Option<String>,
    },
}

// ---- hosts ----

/// Load and inspect host attribute files.
#[derive(Args, Debug)]
pub struct HostsArgs {
    #[command(subcommand)]
    pub action: HostsAction,
}

#[derive(Subcommand, Debug)]
pub enum HostsAction {
    /// Load a hosts file into a fresh table and report the result.
    Check {
        /// Hosts file (default: `host_attributes.hosts_file` from config).
        file: Option<PathBuf>,

        /// Also print the statistics in Prometheus exposition format.
        #[arg(long)]
        metrics: bool,
    },
    /// Look up a single host in the loaded table.
    Lookup {
        /// Hosts file (default: `host_attributes.hosts_file` from config).
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Host address (IPv4 or IPv6).
        ip: IpAddr,
    },
    /// Print every host in the loaded table, most recently used first.
    Dump {
        /// Hosts file (default: `host_attributes.hosts_file` from config).
        file: Option<PathBuf>,
    },
}
