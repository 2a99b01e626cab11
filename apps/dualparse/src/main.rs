//! # dualparse
//!
//! Replays configuration edit scripts against two backends and reports the
//! first step where they disagree.
//!
//! ## Usage
//!
//! ```bash
//! # Run a script with the backends from dualparse.toml
//! dualparse run --script steps.json
//!
//! # Override the pair and emit a machine-readable report
//! dualparse --primary keyed --secondary pass run --script steps.json --json
//!
//! # Show the effective configuration
//! dualparse config
//! ```

mod cli;

use clap::Parser;
use dualparse::config::{Config, LOG_FORMAT_ENV, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();
    let config = Config::load_or_default(&cli.config);

    // DUALPARSE_LOG_FORMAT=json overrides the [log] section.
    let file_format = config
        .as_ref()
        .map(|config| config.log.format)
        .unwrap_or_default();
    let env_format = std::env::var(LOG_FORMAT_ENV).ok();
    let log_format = LogFormat::resolve(env_format.as_deref(), file_format);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dualparse=info,dualparse_core=warn".into());

    match log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    if let Err(e) = config.and_then(|config| cli::execute(cli, config)) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
