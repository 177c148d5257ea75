//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "rack", version, about = "Modular rack stepper CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/rack.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enumerate stepper modules present on the rack
    List,
    /// Home the configured module, then move it to the target position
    Run {
        /// Serial to drive; a prefix match against enumerated devices (overrides config)
        #[arg(long, value_name = "SERIAL")]
        serial: Option<String>,

        /// Target position in device units (overrides config)
        #[arg(long, value_name = "POS", allow_hyphen_values = true)]
        position: Option<i32>,

        /// Maximum velocity for the move; 0 keeps the device default (overrides config)
        #[arg(long, value_name = "VEL")]
        velocity: Option<i32>,

        /// Give up waiting for a completion message after this many ms; 0 waits forever
        #[arg(long = "wait-timeout-ms", value_name = "MS")]
        wait_timeout_ms: Option<u64>,
    },
}
