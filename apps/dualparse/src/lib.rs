//! # dualparse
//!
//! Command line runner for the dualparse differential harness.
//!
//! - `config`: `dualparse.toml` loading and command line overrides
//! - `script`: JSON step scripts and the runner that replays them
//! - `error`: harness errors

pub mod config;
pub mod error;
pub mod script;

pub use config::{BackendKind, Config, HarnessSettings, LogFormat};
pub use error::HarnessError;
pub use script::{RunReport, Script, Step, StepReport, StepStatus, run};
