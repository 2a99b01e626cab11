//! # dualparse-core
//!
//! Differential harness for configuration node trees.
//!
//! Every node operation runs against two interchangeable backends (a primary
//! and a secondary) and their observable results are checked for equivalence.
//! Any divergence fails the operation. The harness exists to validate that a
//! replacement backend behaves identically to the one it replaces.
//!
//! ## Layers
//!
//! - `node`: the capability traits a backend implements
//! - `oracle`: equivalence rules, including the pass sentinel
//! - `proxy` + `dual`: paired nodes with checked field reads and forwarded mutations
//! - `reconcile`: pairing of unordered search results
//! - `backend`: reference in-memory backends and the pass backend
//!
//! ## Architectural Constraints
//!
//! - Synchronous and single-threaded: primary is always called before secondary
//! - No rollback: a failure after the primary mutated leaves the primary mutated
//! - Backends are opaque: the harness only knows the node traits

// =============================================================================
// MODULES
// =============================================================================

pub mod backend;
pub mod dual;
pub mod node;
pub mod oracle;
pub mod primitives;
pub mod proxy;
pub mod reconcile;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    BackendError, CommentFields, CommentParams, DirectiveFields, DirectiveParams, DualError,
    FileFields, Found, MatchPolicy, Observed, Side,
};

// =============================================================================
// RE-EXPORTS: Harness
// =============================================================================

pub use dual::{DualBlock, DualChild, DualComment, DualDirective, DualNode, Pair};
pub use node::{BlockNode, ChildRef, CommentNode, DirectiveNode, ParserNode};
pub use oracle::{
    Equivalent, assert_simple, is_sentinel, is_sentinel_list, nodes_equivalent,
    require_equivalent, values_equivalent,
};
pub use reconcile::{Matched, Resolution, reconcile};

// =============================================================================
// RE-EXPORTS: Backends
// =============================================================================

pub use backend::{
    ArenaBlock, ArenaComment, ArenaDirective, DocumentStore, KeyedBlock, KeyedComment,
    KeyedDirective, PassBlock, PassComment, PassDirective,
};
pub use primitives::{DEFAULT_EXACT, DEFAULT_EXCLUDE, PASS_MARKER};
