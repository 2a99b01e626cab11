//! # Equivalence Oracle
//!
//! Decides whether two backend outputs are observably equal.
//!
//! - The pass sentinel (`Found::Pass`, `Observed::Pass`) matches anything
//! - Comments compare by text, directives and blocks by name and parameters
//! - File-level fields compare only when both backends report a filepath value
//! - `require_*` and `assert_simple` turn a mismatch into `DualError::Equivalence`

use crate::node::ParserNode;
use crate::primitives::PASS_MARKER;
use crate::types::{CommentFields, DirectiveFields, DualError, FileFields, Found, Observed};
use std::fmt;

// =============================================================================
// EQUIVALENT TRAIT
// =============================================================================

/// Observable equality between two outputs of the same shape.
pub trait Equivalent {
    fn equivalent(&self, other: &Self) -> bool;
}

impl<T: PartialEq> Equivalent for Observed<T> {
    fn equivalent(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            _ => true,
        }
    }
}

/// Plain values have no sentinel: they are equivalent when equal.
macro_rules! plain_equivalent {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Equivalent for $ty {
                fn equivalent(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

plain_equivalent!(bool, usize, str, String, std::path::Path, std::path::PathBuf);

impl<T: PartialEq> Equivalent for [T] {
    fn equivalent(&self, other: &Self) -> bool {
        self == other
    }
}

impl<T: PartialEq> Equivalent for Vec<T> {
    fn equivalent(&self, other: &Self) -> bool {
        self == other
    }
}

impl<T: PartialEq> Equivalent for Option<T> {
    fn equivalent(&self, other: &Self) -> bool {
        self == other
    }
}

impl Equivalent for FileFields {
    fn equivalent(&self, other: &Self) -> bool {
        // Dirty state means nothing until both sides know which file they belong to.
        if self.filepath.is_pass() || other.filepath.is_pass() {
            return true;
        }
        self.filepath.equivalent(&other.filepath) && self.dirty.equivalent(&other.dirty)
    }
}

impl Equivalent for CommentFields {
    fn equivalent(&self, other: &Self) -> bool {
        self.comment.equivalent(&other.comment) && self.file.equivalent(&other.file)
    }
}

impl Equivalent for DirectiveFields {
    fn equivalent(&self, other: &Self) -> bool {
        self.name.equivalent(&other.name)
            && self.parameters.equivalent(&other.parameters)
            && self.file.equivalent(&other.file)
    }
}

// =============================================================================
// ORACLE OPERATIONS
// =============================================================================

/// Check two values of the same shape for equivalence.
///
/// Observed values and field snapshots honor the pass marker. Plain scalars
/// and sequences compare by equality.
pub fn values_equivalent<T: Equivalent + ?Sized>(a: &T, b: &T) -> bool {
    a.equivalent(b)
}

/// Check two nodes, possibly from different backends, for equivalence.
///
/// A pass sentinel on either side is equivalent to anything.
pub fn nodes_equivalent<P, S>(a: &Found<P>, b: &Found<S>) -> bool
where
    P: ParserNode,
    S: ParserNode<Fields = P::Fields>,
{
    match (a, b) {
        (Found::Node(a), Found::Node(b)) => a.fields().equivalent(&b.fields()),
        _ => true,
    }
}

/// Check if `x` is the pass sentinel.
pub fn is_sentinel<T>(x: &Found<T>) -> bool {
    x.is_pass()
}

/// Check if a search result list means "not implemented": exactly one element, the sentinel.
pub fn is_sentinel_list<T>(xs: &[Found<T>]) -> bool {
    matches!(xs, [only] if is_sentinel(only))
}

/// Fail with `DualError::Equivalence` unless `a` and `b` are equivalent.
pub fn require_equivalent<T>(context: &str, a: &T, b: &T) -> Result<(), DualError>
where
    T: Equivalent + fmt::Debug + ?Sized,
{
    if values_equivalent(a, b) {
        return Ok(());
    }
    Err(divergence(context, format!("{a:?}"), format!("{b:?}")))
}

/// Fail with `DualError::Equivalence` unless the two nodes are equivalent.
pub fn require_nodes_equivalent<P, S>(
    context: &str,
    a: &Found<P>,
    b: &Found<S>,
) -> Result<(), DualError>
where
    P: ParserNode,
    S: ParserNode<Fields = P::Fields>,
{
    if nodes_equivalent(a, b) {
        return Ok(());
    }
    Err(divergence(context, describe(a), describe(b)))
}

/// Plain equality check for scalars and collections. No sentinel handling.
pub fn assert_simple<T>(context: &str, a: &T, b: &T) -> Result<(), DualError>
where
    T: PartialEq + fmt::Debug + ?Sized,
{
    if a == b {
        return Ok(());
    }
    Err(divergence(context, format!("{a:?}"), format!("{b:?}")))
}

/// Render a node for diagnostics using its field snapshot.
pub fn describe<P: ParserNode>(node: &Found<P>) -> String {
    match node {
        Found::Node(node) => format!("{:?}", node.fields()),
        Found::Pass => PASS_MARKER.to_string(),
    }
}

fn divergence(context: &str, primary: String, secondary: String) -> DualError {
    tracing::warn!(
        context,
        primary = %primary,
        secondary = %secondary,
        "backends diverged"
    );
    DualError::Equivalence {
        context: context.to_string(),
        primary,
        secondary,
    }
}

// =============================================================================
// TESTS
// =============================================================================
