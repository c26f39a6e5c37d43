use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "statuswatch.log";

#[derive(Debug, Parser)]
#[command(name = "statuswatch", version, about = "Homework review status watcher")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the poll loop (default if no subcommand given).
    Run {
        /// Append-mode log file written alongside console output.
        #[arg(long, env = "STATUSWATCH_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
        log_file: PathBuf,

        /// Seconds between poll cycles (overrides STATUSWATCH_RETRY_PERIOD_SECS).
        #[arg(long)]
        retry_period: Option<u64>,
    },

    /// Print current configuration (redacted secrets).
    Config,

    /// Check that required credentials are present.
    Check,
}
