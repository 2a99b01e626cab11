//! # Core Type Definitions
//!
//! This module contains the shared types of the dualparse harness:
//! - The pass sentinel (`Found`, `Observed`)
//! - Backend side and match policy selectors (`Side`, `MatchPolicy`)
//! - Node construction arguments (`CommentParams`, `DirectiveParams`)
//! - Field snapshots compared by the oracle (`FileFields`, `CommentFields`, `DirectiveFields`)
//! - Error types (`DualError`, `BackendError`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// PASS SENTINEL
// =============================================================================

/// One element of a search result, or one side of a dual node.
///
/// `Pass` is returned by a backend that does not implement targeted search.
/// It matches anything it is compared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found<T> {
    /// A real node produced by the backend.
    Node(T),
    /// The "not implemented, treat as matching" sentinel.
    Pass,
}

impl<T> Found<T> {
    /// Check if this is the pass sentinel.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Borrow the node, if any.
    #[must_use]
    pub const fn as_node(&self) -> Option<&T> {
        match self {
            Self::Node(node) => Some(node),
            Self::Pass => None,
        }
    }
}

impl<T> From<T> for Found<T> {
    fn from(node: T) -> Self {
        Self::Node(node)
    }
}

/// A field value read from a backend.
///
/// Partially implemented backends answer unknown fields with `Pass`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observed<T> {
    /// The backend's answer.
    Value(T),
    /// The backend does not know this field.
    Pass,
}

impl<T> Observed<T> {
    /// Check if this is the pass marker.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Convert into `Option`, dropping the pass marker.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Pass => None,
        }
    }

    /// Keep `self` unless it is `Pass`, in which case take `other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Value(_) => self,
            Self::Pass => other,
        }
    }
}

impl<T> From<T> for Observed<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

// =============================================================================
// SELECTORS
// =============================================================================

/// Which of the two backends an operation or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Primary,
    Secondary,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

/// How the reconciliation engine treats secondary results that were already matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Matched secondary results stay in the candidate pool.
    /// One secondary result may pair with several primary results.
    #[default]
    Permissive,
    /// Matched secondary results leave the pool; pairing is one-to-one.
    Exclusive,
}

// =============================================================================
// CONSTRUCTION ARGUMENTS
// =============================================================================

/// Arguments for creating a fresh comment node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentParams {
    /// Comment text without the leading marker.
    pub comment: String,
    /// File the node belongs to.
    pub filepath: Option<PathBuf>,
}

impl CommentParams {
    #[must_use]
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            filepath: None,
        }
    }

    #[must_use]
    pub fn with_filepath(mut self, filepath: impl Into<PathBuf>) -> Self {
        self.filepath = Some(filepath.into());
        self
    }
}

/// Arguments for creating a fresh directive or block node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveParams {
    /// Directive name, e.g. `ServerName` or `VirtualHost`.
    pub name: String,
    /// Ordered parameter list.
    pub parameters: Vec<String>,
    /// Whether the node is active in the current configuration state.
    pub enabled: bool,
    /// File the node belongs to.
    pub filepath: Option<PathBuf>,
}

impl DirectiveParams {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            enabled: true,
            filepath: None,
        }
    }

    #[must_use]
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_filepath(mut self, filepath: impl Into<PathBuf>) -> Self {
        self.filepath = Some(filepath.into());
        self
    }
}

// =============================================================================
// FIELD SNAPSHOTS
// =============================================================================

/// Fields every node carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFields {
    pub filepath: Observed<Option<PathBuf>>,
    pub dirty: Observed<bool>,
}

/// Observable fields of a comment node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentFields {
    pub comment: Observed<String>,
    pub file: FileFields,
}

/// Observable fields of a directive or block node.
///
/// `enabled` is recorded but not part of node equivalence: legacy backends
/// cannot always determine it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveFields {
    pub name: Observed<String>,
    pub parameters: Observed<Vec<String>>,
    pub enabled: Observed<bool>,
    pub file: FileFields,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by a backend while executing a node operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The node handle no longer refers to a live node.
    #[error("node not found")]
    NodeNotFound,

    /// An insertion position is past the end of the child list.
    #[error("invalid position {position} (block has {len} children)")]
    InvalidPosition { position: usize, len: usize },

    /// The node passed to `delete_child` is not a direct child.
    #[error("node is not a child of this block")]
    NotAChild,

    /// The handle belongs to a different document.
    #[error("node belongs to another document")]
    ForeignNode,

    /// The handle points at a node of another variant.
    #[error("node is not a {expected}")]
    KindMismatch { expected: &'static str },
}

/// Errors raised by the dual harness.
///
/// Every variant is fatal for the operation that raised it. The harness never
/// retries and never rolls back mutations already applied to one backend.
#[derive(Debug, Error)]
pub enum DualError {
    /// Two backend outputs differ.
    #[error("{context}: backends diverged (primary: {primary}, secondary: {secondary})")]
    Equivalence {
        context: String,
        primary: String,
        secondary: String,
    },

    /// Search result lists differ in size and neither side passed.
    #[error("{operation}: primary returned {primary} results, secondary returned {secondary}")]
    LengthMismatch {
        operation: &'static str,
        primary: usize,
        secondary: usize,
    },

    /// A primary search result has no equivalent secondary counterpart.
    #[error("{operation}: could not find a matching node for {node}")]
    NoMatch {
        operation: &'static str,
        node: String,
    },

    /// One backend failed to execute the operation.
    #[error("{side} backend failed: {source}")]
    Backend {
        side: Side,
        #[source]
        source: BackendError,
    },
}

impl DualError {
    /// Wrap a backend error raised by the primary.
    #[must_use]
    pub fn primary(source: BackendError) -> Self {
        Self::Backend {
            side: Side::Primary,
            source,
        }
    }

    /// Wrap a backend error raised by the secondary.
    #[must_use]
    pub fn secondary(source: BackendError) -> Self {
        Self::Backend {
            side: Side::Secondary,
            source,
        }
    }

    /// Check if this error signals behavioral divergence (as opposed to a backend failure).
    #[must_use]
    pub const fn is_divergence(&self) -> bool {
        !matches!(self, Self::Backend { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
