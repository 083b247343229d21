//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config file picked up when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG: &str = "etc/walk_config.toml";

#[derive(Parser, Debug)]
#[command(name = "walkmeter", version, about = "Walked-distance meter over recorded GPS traces")]
pub struct Cli {
    /// Path to config TOML (defaults to etc/walk_config.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit events, summary and errors as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded trace through a walk session
    Replay {
        /// Trace CSV with headers t_s,lat,lon,accuracy_m,speed_mps
        #[arg(long, value_name = "FILE")]
        trace: PathBuf,
        /// Pace fixes in real time through the session actor instead of a simulated clock
        #[arg(long, action = ArgAction::SetTrue)]
        live: bool,
    },
    /// Load and validate the configuration, then print the effective settings
    Check,
}

pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}
