//! # Reference Backends
//!
//! In-memory implementations of the node interface.
//!
//! - `arena`: `Vec`-backed store, searches yield document order
//! - `keyed`: `BTreeMap`-backed store, searches yield node-key (creation) order
//! - `pass`: a backend that implements nothing and answers with the pass sentinel
//!
//! `arena` and `keyed` share the handle types in `memory` and differ only in
//! their `DocumentStore`, so the same document produces search results in
//! different orders.

mod arena;
mod keyed;
mod memory;
mod pass;

pub use arena::{ArenaBlock, ArenaComment, ArenaDirective, ArenaStore};
pub use keyed::{KeyedBlock, KeyedComment, KeyedDirective, KeyedStore};
pub use memory::{Document, MemBlock, MemComment, MemDirective};
pub use pass::{PassBlock, PassComment, PassDirective};

use crate::types::BackendError;
use std::fmt;
use std::path::PathBuf;

// =============================================================================
// NODE STORAGE TYPES
// =============================================================================

/// Identifier of a node inside one document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

/// Payload of a stored node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Comment {
        text: String,
    },
    Directive {
        name: String,
        parameters: Vec<String>,
        enabled: bool,
    },
    Block {
        name: String,
        parameters: Vec<String>,
        enabled: bool,
    },
}

impl NodeData {
    /// Directive or block name. Comments have none.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Directive { name, .. } | Self::Block { name, .. } => Some(name),
            Self::Comment { .. } => None,
        }
    }

    #[must_use]
    pub fn parameters(&self) -> Option<&[String]> {
        match self {
            Self::Directive { parameters, .. } | Self::Block { parameters, .. } => {
                Some(parameters)
            }
            Self::Comment { .. } => None,
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Comment { text } => Some(text),
            _ => None,
        }
    }

    /// Comments are always enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        match self {
            Self::Directive { enabled, .. } | Self::Block { enabled, .. } => *enabled,
            Self::Comment { .. } => true,
        }
    }
}

/// A stored node: payload plus the file it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub data: NodeData,
    pub filepath: Option<PathBuf>,
}

// =============================================================================
// DOCUMENTSTORE TRAIT
// =============================================================================

/// Tree storage behind the in-memory backends.
///
/// Child positions are indices into the parent's ordered child list.
pub trait DocumentStore: Default + fmt::Debug {
    /// Insert a parentless node.
    fn insert_root(&mut self, entry: Entry) -> NodeId;

    /// Insert `entry` under `parent` at `position` (`None` appends).
    fn insert_child(
        &mut self,
        parent: NodeId,
        position: Option<usize>,
        entry: Entry,
    ) -> Result<NodeId, BackendError>;

    fn entry(&self, id: NodeId) -> Option<&Entry>;

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry>;

    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Ordered direct children of `id`.
    fn children(&self, id: NodeId) -> Result<Vec<NodeId>, BackendError>;

    /// Detach `child` from `parent` and drop its whole subtree.
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), BackendError>;

    /// All nodes below `id`, in an order chosen by the store.
    fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, BackendError>;

    /// Number of live nodes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve an insertion position against a child list of length `len`.
pub(crate) fn insertion_index(position: Option<usize>, len: usize) -> Result<usize, BackendError> {
    match position {
        None => Ok(len),
        Some(position) if position <= len => Ok(position),
        Some(position) => Err(BackendError::InvalidPosition { position, len }),
    }
}
