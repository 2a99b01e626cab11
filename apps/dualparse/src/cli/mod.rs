//! # dualparse CLI Module
//!
//! ## Available Commands
//!
//! - `run` - Replay a JSON step script against the configured backend pair
//! - `config` - Print the effective configuration

mod commands;

use clap::{Parser, Subcommand};
use dualparse::config::{BackendKind, CONFIG_FILE, Config, parse_match_policy};
use dualparse::error::HarnessError;
use dualparse_core::MatchPolicy;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// dualparse - differential harness for configuration node trees
///
/// Every step runs on a primary and a secondary backend; the run stops at the
/// first step where they disagree.
#[derive(Parser, Debug)]
#[command(name = "dualparse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Primary backend (overrides the config file)
    #[arg(long, global = true, value_enum)]
    pub primary: Option<BackendKind>,

    /// Secondary backend (overrides the config file)
    #[arg(long, global = true, value_enum)]
    pub secondary: Option<BackendKind>,

    /// Search result pairing: permissive or exclusive
    #[arg(long, global = true, value_parser = parse_match_policy)]
    pub match_policy: Option<MatchPolicy>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a step script against both backends
    Run {
        /// Path to the JSON script
        #[arg(short, long)]
        script: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and the loaded config file.
pub fn execute(cli: Cli, config: Config) -> Result<(), HarnessError> {
    let config = config.with_overrides(cli.primary, cli.secondary, cli.match_policy);

    match cli.command {
        Commands::Run { script, json } => cmd_run(&config, &script, json),
        Commands::Config { json } => cmd_config(&config, json),
    }
}
