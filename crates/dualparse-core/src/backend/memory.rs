//! In-memory node handles over a `DocumentStore`.
//!
//! A handle is a shared reference to the document plus the id of one node.
//! Handles of a deleted node stay valid values; every field then reads as
//! `Observed::Pass` and mutations fail with `BackendError::NodeNotFound`.

use super::{DocumentStore, Entry, NodeData, NodeId};
use crate::node::{
    BlockNode, ChildRef, CommentNode, DirectiveNode, ParserNode, comment_fields,
    directive_fields,
};
use crate::types::{
    BackendError, CommentFields, CommentParams, DirectiveFields, DirectiveParams, Found, Observed,
};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

// =============================================================================
// DOCUMENT
// =============================================================================

/// One parsed configuration: the node tree plus its save state.
#[derive(Debug, Default)]
pub struct Document<D> {
    store: D,
    dirty: BTreeSet<PathBuf>,
    saves: Vec<String>,
}

impl<D: DocumentStore> Document<D> {
    fn mark(&mut self, filepath: Option<PathBuf>) {
        if let Some(path) = filepath {
            self.dirty.insert(path);
        }
    }

    /// Messages of every save so far, oldest first.
    #[must_use]
    pub fn save_log(&self) -> &[String] {
        &self.saves
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.store.len()
    }
}

struct Handle<D> {
    doc: Rc<RefCell<Document<D>>>,
    id: NodeId,
}

impl<D> Clone for Handle<D> {
    fn clone(&self) -> Self {
        Self {
            doc: Rc::clone(&self.doc),
            id: self.id,
        }
    }
}

impl<D: DocumentStore> Handle<D> {
    fn root(entry: Entry) -> Self {
        let mut doc = Document::<D>::default();
        let id = doc.store.insert_root(entry);
        Self {
            doc: Rc::new(RefCell::new(doc)),
            id,
        }
    }

    fn at(&self, id: NodeId) -> Self {
        Self {
            doc: Rc::clone(&self.doc),
            id,
        }
    }

    fn read<R>(&self, f: impl FnOnce(&Entry) -> R) -> Observed<R> {
        self.doc
            .borrow()
            .store
            .entry(self.id)
            .map_or(Observed::Pass, |entry| Observed::Value(f(entry)))
    }

    /// Like `read`, but a payload of the wrong variant also reads as `Pass`.
    fn read_data<R>(&self, f: impl FnOnce(&NodeData) -> Option<R>) -> Observed<R> {
        match self.read(|entry| f(&entry.data)) {
            Observed::Value(Some(value)) => Observed::Value(value),
            Observed::Value(None) | Observed::Pass => Observed::Pass,
        }
    }

    fn dirty(&self) -> Observed<bool> {
        let doc = self.doc.borrow();
        doc.store
            .entry(self.id)
            .map_or(Observed::Pass, |entry| {
                Observed::Value(
                    entry
                        .filepath
                        .as_ref()
                        .is_some_and(|path| doc.dirty.contains(path)),
                )
            })
    }

    fn save(&self, msg: &str) -> Result<(), BackendError> {
        let mut doc = self.doc.borrow_mut();
        tracing::debug!(msg, files = doc.dirty.len(), "saving document");
        doc.dirty.clear();
        doc.saves.push(msg.to_string());
        Ok(())
    }

    fn unsaved_files(&self) -> Observed<Vec<PathBuf>> {
        Observed::Value(self.doc.borrow().dirty.iter().cloned().collect())
    }

    fn add_child(&self, data: NodeData, position: Option<usize>) -> Result<Self, BackendError> {
        let mut guard = self.doc.borrow_mut();
        let doc = &mut *guard;
        let filepath = doc
            .store
            .entry(self.id)
            .ok_or(BackendError::NodeNotFound)?
            .filepath
            .clone();
        let id = doc.store.insert_child(
            self.id,
            position,
            Entry {
                data,
                filepath: filepath.clone(),
            },
        )?;
        doc.mark(filepath);
        Ok(self.at(id))
    }

    fn set_parameters(&self, parameters: &[String]) -> Result<(), BackendError> {
        let mut guard = self.doc.borrow_mut();
        let doc = &mut *guard;
        let entry = doc
            .store
            .entry_mut(self.id)
            .ok_or(BackendError::NodeNotFound)?;
        match &mut entry.data {
            NodeData::Directive {
                parameters: current,
                ..
            }
            | NodeData::Block {
                parameters: current,
                ..
            } => *current = parameters.to_vec(),
            NodeData::Comment { .. } => {
                return Err(BackendError::KindMismatch {
                    expected: "directive",
                });
            }
        }
        let filepath = entry.filepath.clone();
        doc.mark(filepath);
        Ok(())
    }

    fn remove(&self, child: &Self) -> Result<(), BackendError> {
        if !Rc::ptr_eq(&self.doc, &child.doc) {
            return Err(BackendError::ForeignNode);
        }
        let mut guard = self.doc.borrow_mut();
        let doc = &mut *guard;
        let filepath = doc
            .store
            .entry(self.id)
            .ok_or(BackendError::NodeNotFound)?
            .filepath
            .clone();
        doc.store.remove_child(self.id, child.id)?;
        doc.mark(filepath);
        Ok(())
    }

    /// Ids of descendants whose payload satisfies `matches`.
    ///
    /// With `exclude`, a node is skipped when it or any ancestor below this
    /// handle is disabled.
    fn find(
        &self,
        exclude: bool,
        matches: impl Fn(&NodeData) -> bool,
    ) -> Result<Vec<NodeId>, BackendError> {
        let doc = self.doc.borrow();
        let store = &doc.store;
        Ok(store
            .descendants(self.id)?
            .into_iter()
            .filter(|id| store.entry(*id).is_some_and(|entry| matches(&entry.data)))
            .filter(|id| !exclude || !hidden(store, self.id, *id))
            .collect())
    }
}

fn hidden<D: DocumentStore>(store: &D, root: NodeId, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
        if node == root {
            return false;
        }
        if store.entry(node).is_some_and(|entry| !entry.data.enabled()) {
            return true;
        }
        current = store.parent(node);
    }
    false
}

// =============================================================================
// HANDLE TYPES
// =============================================================================

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<D>(Handle<D>);

        impl<D> Clone for $name<D> {
            fn clone(&self) -> Self {
                Self(self.0.clone())
            }
        }

        impl<D> fmt::Debug for $name<D> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0.id).finish()
            }
        }

        impl<D: DocumentStore> $name<D> {
            /// Inspect the document this node belongs to.
            pub fn with_document<R>(&self, f: impl FnOnce(&Document<D>) -> R) -> R {
                f(&self.0.doc.borrow())
            }
        }
    };
}

handle_type!(
    /// Comment handle.
    MemComment
);
handle_type!(
    /// Directive handle.
    MemDirective
);
handle_type!(
    /// Block handle.
    MemBlock
);

macro_rules! parser_node {
    ($name:ident, $fields:ty, $snapshot:ident) => {
        impl<D: DocumentStore> ParserNode for $name<D> {
            type Fields = $fields;

            fn fields(&self) -> $fields {
                $snapshot(self)
            }

            fn filepath(&self) -> Observed<Option<PathBuf>> {
                self.0.read(|entry| entry.filepath.clone())
            }

            fn dirty(&self) -> Observed<bool> {
                self.0.dirty()
            }

            fn save(&mut self, msg: &str) -> Result<(), BackendError> {
                self.0.save(msg)
            }

            fn unsaved_files(&self) -> Result<Observed<Vec<PathBuf>>, BackendError> {
                Ok(self.0.unsaved_files())
            }
        }
    };
}

parser_node!(MemComment, CommentFields, comment_fields);
parser_node!(MemDirective, DirectiveFields, directive_fields);
parser_node!(MemBlock, DirectiveFields, directive_fields);

impl<D: DocumentStore> CommentNode for MemComment<D> {
    fn create(params: &CommentParams) -> Result<Self, BackendError> {
        Ok(Self(Handle::root(Entry {
            data: NodeData::Comment {
                text: params.comment.clone(),
            },
            filepath: params.filepath.clone(),
        })))
    }

    fn comment(&self) -> Observed<String> {
        self.0.read_data(|data| data.text().map(str::to_string))
    }
}

macro_rules! directive_node {
    ($name:ident, $variant:ident) => {
        impl<D: DocumentStore> DirectiveNode for $name<D> {
            fn create(params: &DirectiveParams) -> Result<Self, BackendError> {
                Ok(Self(Handle::root(Entry {
                    data: NodeData::$variant {
                        name: params.name.clone(),
                        parameters: params.parameters.clone(),
                        enabled: params.enabled,
                    },
                    filepath: params.filepath.clone(),
                })))
            }

            fn name(&self) -> Observed<String> {
                self.0.read_data(|data| data.name().map(str::to_string))
            }

            fn parameters(&self) -> Observed<Vec<String>> {
                self.0.read_data(|data| data.parameters().map(<[String]>::to_vec))
            }

            fn enabled(&self) -> Observed<bool> {
                self.0.read(|entry| entry.data.enabled())
            }

            fn set_parameters(&mut self, parameters: &[String]) -> Result<(), BackendError> {
                self.0.set_parameters(parameters)
            }
        }
    };
}

directive_node!(MemDirective, Directive);
directive_node!(MemBlock, Block);

impl<D: DocumentStore> BlockNode for MemBlock<D> {
    type Comment = MemComment<D>;
    type Directive = MemDirective<D>;

    fn add_child_block(
        &mut self,
        name: &str,
        parameters: &[String],
        position: Option<usize>,
    ) -> Result<Self, BackendError> {
        let data = NodeData::Block {
            name: name.to_string(),
            parameters: parameters.to_vec(),
            enabled: true,
        };
        self.0.add_child(data, position).map(Self)
    }

    fn add_child_directive(
        &mut self,
        name: &str,
        parameters: &[String],
        position: Option<usize>,
    ) -> Result<MemDirective<D>, BackendError> {
        let data = NodeData::Directive {
            name: name.to_string(),
            parameters: parameters.to_vec(),
            enabled: true,
        };
        self.0.add_child(data, position).map(MemDirective)
    }

    fn add_child_comment(
        &mut self,
        comment: &str,
        position: Option<usize>,
    ) -> Result<MemComment<D>, BackendError> {
        let data = NodeData::Comment {
            text: comment.to_string(),
        };
        self.0.add_child(data, position).map(MemComment)
    }

    fn find_blocks(&self, name: &str, exclude: bool) -> Result<Vec<Found<Self>>, BackendError> {
        let ids = self.0.find(exclude, |data| {
            matches!(data, NodeData::Block { name: found, .. } if found.eq_ignore_ascii_case(name))
        })?;
        Ok(ids
            .into_iter()
            .map(|id| Found::Node(Self(self.0.at(id))))
            .collect())
    }

    fn find_directives(
        &self,
        name: &str,
        exclude: bool,
    ) -> Result<Vec<Found<MemDirective<D>>>, BackendError> {
        let ids = self.0.find(exclude, |data| {
            matches!(data, NodeData::Directive { name: found, .. } if found.eq_ignore_ascii_case(name))
        })?;
        Ok(ids
            .into_iter()
            .map(|id| Found::Node(MemDirective(self.0.at(id))))
            .collect())
    }

    fn find_comments(
        &self,
        comment: &str,
        exact: bool,
    ) -> Result<Vec<Found<MemComment<D>>>, BackendError> {
        let ids = self.0.find(false, |data| match data {
            NodeData::Comment { text } if exact => text == comment,
            NodeData::Comment { text } => text.contains(comment),
            _ => false,
        })?;
        Ok(ids
            .into_iter()
            .map(|id| Found::Node(MemComment(self.0.at(id))))
            .collect())
    }

    fn delete_child(&mut self, child: ChildRef<'_, Self>) -> Result<(), BackendError> {
        let handle = match child {
            ChildRef::Block(node) => &node.0,
            ChildRef::Directive(node) => &node.0,
            ChildRef::Comment(node) => &node.0,
        };
        self.0.remove(handle)
    }
}

// =============================================================================
// TESTS
// =============================================================================
