//! # Harness Errors
//!
//! Failures of the command line harness itself. Divergences found while a
//! script runs are not errors here: they end the run and land in the report.

use dualparse_core::DualError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),

    /// A step refers to a name no earlier step bound.
    #[error("step {index}: unknown binding '{name}'")]
    UnknownBinding { index: usize, name: String },

    /// A step uses a binding of the wrong node variant.
    #[error("step {index}: binding '{name}' is not a {expected}")]
    BindingKind {
        index: usize,
        name: String,
        expected: &'static str,
    },

    /// A step binds a reserved name or deletes a block from itself.
    #[error("step {index}: binding '{name}' {reason}")]
    InvalidBinding {
        index: usize,
        name: String,
        reason: &'static str,
    },

    /// The root block could not be created in both backends.
    #[error("cannot create root block: {0}")]
    Root(#[source] DualError),

    /// The run stopped before its last step.
    #[error("run stopped at step {index} ({op}): {detail}")]
    RunFailed {
        index: usize,
        op: String,
        detail: String,
    },
}
