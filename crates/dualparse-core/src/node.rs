//! # Node Interface
//!
//! The node capability set every backend implements.
//!
//! A parsed configuration file is a tree of typed nodes:
//! - `CommentNode`: free text
//! - `DirectiveNode`: a name and an ordered parameter list
//! - `BlockNode`: a directive that also owns child nodes
//!
//! Backend node types are handles: cloning one yields another reference to
//! the same underlying node. Mutating methods take `&mut self` so that the
//! dual layer is the only writer while it holds the handles.

use crate::oracle::Equivalent;
use crate::types::{
    BackendError, CommentFields, CommentParams, DirectiveFields, DirectiveParams, FileFields,
    Found, Observed,
};
use std::fmt;
use std::path::PathBuf;

// =============================================================================
// PARSERNODE TRAIT
// =============================================================================

/// Operations shared by every node variant.
pub trait ParserNode: Clone + fmt::Debug {
    /// Snapshot type compared by the equivalence oracle.
    type Fields: Equivalent + fmt::Debug;

    /// Take a snapshot of the observable fields.
    fn fields(&self) -> Self::Fields;

    /// File this node was read from or will be written to.
    fn filepath(&self) -> Observed<Option<PathBuf>>;

    /// Whether the node's file has unsaved changes.
    fn dirty(&self) -> Observed<bool>;

    /// Commit pending changes of the whole document.
    fn save(&mut self, msg: &str) -> Result<(), BackendError>;

    /// Paths of files with unsaved changes.
    fn unsaved_files(&self) -> Result<Observed<Vec<PathBuf>>, BackendError>;
}

/// A comment node.
pub trait CommentNode: ParserNode<Fields = CommentFields> {
    /// Create a detached comment node.
    fn create(params: &CommentParams) -> Result<Self, BackendError>;

    /// Comment text.
    fn comment(&self) -> Observed<String>;
}

/// A directive node.
pub trait DirectiveNode: ParserNode<Fields = DirectiveFields> {
    /// Create a detached directive. For block types this creates a root block.
    fn create(params: &DirectiveParams) -> Result<Self, BackendError>;

    fn name(&self) -> Observed<String>;

    fn parameters(&self) -> Observed<Vec<String>>;

    /// Whether the node is active in the current configuration state.
    fn enabled(&self) -> Observed<bool>;

    /// Replace the parameter list.
    fn set_parameters(&mut self, parameters: &[String]) -> Result<(), BackendError>;
}

/// A block node: a directive owning an ordered list of children.
///
/// `position` arguments are child indices, interpreted by the backend.
/// `None` appends.
pub trait BlockNode: DirectiveNode {
    type Comment: CommentNode;
    type Directive: DirectiveNode;

    fn add_child_block(
        &mut self,
        name: &str,
        parameters: &[String],
        position: Option<usize>,
    ) -> Result<Self, BackendError>;

    fn add_child_directive(
        &mut self,
        name: &str,
        parameters: &[String],
        position: Option<usize>,
    ) -> Result<Self::Directive, BackendError>;

    fn add_child_comment(
        &mut self,
        comment: &str,
        position: Option<usize>,
    ) -> Result<Self::Comment, BackendError>;

    /// Find descendant blocks by name.
    ///
    /// With `exclude`, nodes that are not enabled (and their subtrees) are skipped.
    /// A backend without targeted search returns `vec![Found::Pass]`.
    fn find_blocks(&self, name: &str, exclude: bool) -> Result<Vec<Found<Self>>, BackendError>;

    /// Find descendant directives by name. Same conventions as `find_blocks`.
    fn find_directives(
        &self,
        name: &str,
        exclude: bool,
    ) -> Result<Vec<Found<Self::Directive>>, BackendError>;

    /// Find descendant comments; `exact` requires full text equality instead of a substring match.
    fn find_comments(
        &self,
        comment: &str,
        exact: bool,
    ) -> Result<Vec<Found<Self::Comment>>, BackendError>;

    /// Remove a direct child, identified by the backend's own handle.
    fn delete_child(&mut self, child: ChildRef<'_, Self>) -> Result<(), BackendError>;
}

/// A borrowed child handle of any variant, as accepted by `BlockNode::delete_child`.
pub enum ChildRef<'a, B: BlockNode> {
    Block(&'a B),
    Directive(&'a B::Directive),
    Comment(&'a B::Comment),
}

impl<B: BlockNode> fmt::Debug for ChildRef<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block(node) => f.debug_tuple("Block").field(node).finish(),
            Self::Directive(node) => f.debug_tuple("Directive").field(node).finish(),
            Self::Comment(node) => f.debug_tuple("Comment").field(node).finish(),
        }
    }
}

// =============================================================================
// SNAPSHOT HELPERS
// =============================================================================

/// Build the file-level snapshot of any node.
pub fn file_fields<N: ParserNode>(node: &N) -> FileFields {
    FileFields {
        filepath: node.filepath(),
        dirty: node.dirty(),
    }
}

/// Build the snapshot of a comment node from its getters.
pub fn comment_fields<C: CommentNode>(node: &C) -> CommentFields {
    CommentFields {
        comment: node.comment(),
        file: file_fields(node),
    }
}

/// Build the snapshot of a directive or block node from its getters.
pub fn directive_fields<D: DirectiveNode>(node: &D) -> DirectiveFields {
    DirectiveFields {
        name: node.name(),
        parameters: node.parameters(),
        enabled: node.enabled(),
        file: file_fields(node),
    }
}
