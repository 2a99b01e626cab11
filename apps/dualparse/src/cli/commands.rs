//! # CLI Command Implementations

use dualparse::config::Config;
use dualparse::error::HarnessError;
use dualparse::script::{self, Script};
use std::path::Path;

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Replay a script and print the report.
///
/// A run that stops early is an error, so the process exits non-zero.
pub fn cmd_run(config: &Config, script_path: &Path, json: bool) -> Result<(), HarnessError> {
    let script = Script::load(script_path)?;
    if let Some(description) = &script.description {
        tracing::info!(script = %script_path.display(), "{}", description);
    }

    let report = script::run(&script, &config.harness)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    match report.failure() {
        Some(step) => Err(HarnessError::RunFailed {
            index: step.index,
            op: step.op.clone(),
            detail: step.detail.clone().unwrap_or_default(),
        }),
        None => Ok(()),
    }
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective configuration.
pub fn cmd_config(config: &Config, json: bool) -> Result<(), HarnessError> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        print!("{}", config.to_toml()?);
    }
    Ok(())
}
