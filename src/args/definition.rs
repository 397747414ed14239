//! Command-line argument definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// aptpulse - pending APT upgrades as JSON for monitoring agents
#[derive(Parser, Debug)]
#[command(name = "aptpulse")]
#[command(version)]
#[command(about = "Report pending APT upgrades, phased rollouts and security updates as JSON", long_about = None)]
pub struct Args {
    /// What to report
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (default: $XDG_CONFIG_HOME/aptpulse/settings.conf)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Deadline for the whole check in seconds (minimum 10)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Report surfaces.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Every category with counts, names and details
    All,
    /// Number of pending upgrades for the selected category
    Count {
        /// Category (`all`, `security`, `recommended`, `optional`) and optional `include-phased`
        params: Vec<String>,
    },
    /// JSON array of package names for the selected category
    List {
        /// Category (`all`, `security`, `recommended`, `optional`) and optional `include-phased`
        params: Vec<String>,
    },
    /// Full single-category result
    Details {
        /// Category (`all`, `security`, `recommended`, `optional`) and optional `include-phased`
        params: Vec<String>,
    },
}
