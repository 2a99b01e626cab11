//! # Harness Primitives
//!
//! Fixed constants of the dualparse harness.

/// Text used wherever the pass sentinel has to be rendered (diagnostics, reports).
pub const PASS_MARKER: &str = "DUALPARSE_PASS";

/// Default for the `exclude` flag of `find_blocks` / `find_directives`.
///
/// Nodes that are not enabled in the current configuration state are skipped.
pub const DEFAULT_EXCLUDE: bool = true;

/// Default for the `exact` flag of `find_comments`.
///
/// Comment searches match by substring unless asked otherwise.
pub const DEFAULT_EXACT: bool = false;
