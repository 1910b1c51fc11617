//! Command-line interface for inspecting and maintaining a lazymemo store.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lazymemo - persistent memoization store maintenance.
#[derive(Parser, Debug)]
#[command(name = "lazymemo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "lazymemo.toml")]
    pub config: PathBuf,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Errors only.
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Writes a default configuration in the target directory.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Shows entry counts per computation.
    Stats,

    /// Lists stored entries, newest first.
    List {
        /// Only entries of this computation (e.g. `app::square`).
        #[arg(long)]
        computation: Option<String>,

        /// Maximum number of entries.
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Removes every entry of one computation.
    Purge {
        /// Computation identity, as shown by `stats`.
        computation: String,
    },

    /// Removes every entry.
    Clear,

    /// Shows version.
    Version,
}
