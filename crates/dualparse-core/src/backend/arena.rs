//! Vec-backed document store.
//!
//! Node ids are slot indices. Removed nodes leave tombstones so that ids are
//! never reused. Searches walk the tree depth-first, i.e. in document order.

use super::memory::{MemBlock, MemComment, MemDirective};
use super::{DocumentStore, Entry, NodeId, insertion_index};
use crate::types::BackendError;

pub type ArenaBlock = MemBlock<ArenaStore>;
pub type ArenaDirective = MemDirective<ArenaStore>;
pub type ArenaComment = MemComment<ArenaStore>;

#[derive(Debug, Clone)]
struct Slot {
    entry: Entry,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena storage: `Vec<Option<Slot>>` indexed by `NodeId`.
#[derive(Debug, Default)]
pub struct ArenaStore {
    slots: Vec<Option<Slot>>,
    live: usize,
}

impl ArenaStore {
    fn index(id: NodeId) -> Option<usize> {
        usize::try_from(id.0).ok()
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(Self::index(id)?)?.as_ref()
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.slots.get_mut(Self::index(id)?)?.as_mut()
    }

    fn push(&mut self, slot: Slot) -> NodeId {
        let id = NodeId(self.slots.len() as u64);
        self.slots.push(Some(slot));
        self.live += 1;
        id
    }
}

impl DocumentStore for ArenaStore {
    fn insert_root(&mut self, entry: Entry) -> NodeId {
        self.push(Slot {
            entry,
            parent: None,
            children: Vec::new(),
        })
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        position: Option<usize>,
        entry: Entry,
    ) -> Result<NodeId, BackendError> {
        let len = self
            .slot(parent)
            .ok_or(BackendError::NodeNotFound)?
            .children
            .len();
        let index = insertion_index(position, len)?;

        let id = self.push(Slot {
            entry,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.slot_mut(parent)
            .ok_or(BackendError::NodeNotFound)?
            .children
            .insert(index, id);
        Ok(id)
    }

    fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.slot(id).map(|slot| &slot.entry)
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry> {
        self.slot_mut(id).map(|slot| &mut slot.entry)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?.parent
    }

    fn children(&self, id: NodeId) -> Result<Vec<NodeId>, BackendError> {
        self.slot(id)
            .map(|slot| slot.children.clone())
            .ok_or(BackendError::NodeNotFound)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), BackendError> {
        let siblings = &mut self
            .slot_mut(parent)
            .ok_or(BackendError::NodeNotFound)?
            .children;
        let position = siblings
            .iter()
            .position(|id| *id == child)
            .ok_or(BackendError::NotAChild)?;
        siblings.remove(position);

        let mut stack = vec![child];
        while let Some(id) = stack.pop() {
            let Some(index) = Self::index(id) else {
                continue;
            };
            if let Some(slot) = self.slots.get_mut(index).and_then(Option::take) {
                self.live -= 1;
                stack.extend(slot.children);
            }
        }
        Ok(())
    }

    fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, BackendError> {
        let root = self.slot(id).ok_or(BackendError::NodeNotFound)?;

        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = root.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(slot) = self.slot(current) {
                stack.extend(slot.children.iter().rev().copied());
            }
        }
        Ok(out)
    }

    fn len(&self) -> usize {
        self.live
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NodeData;

    fn directive(name: &str) -> Entry {
        Entry {
            data: NodeData::Directive {
                name: name.to_string(),
                parameters: Vec::new(),
                enabled: true,
            },
            filepath: None,
        }
    }

    #[test]
    fn descendants_follow_document_order() {
        let mut store = ArenaStore::default();
        let root = store.insert_root(directive("root"));
        let a = store.insert_child(root, None, directive("a")).expect("insert");
        let b = store.insert_child(root, Some(0), directive("b")).expect("insert");
        let a1 = store.insert_child(a, None, directive("a1")).expect("insert");

        assert_eq!(store.descendants(root).expect("walk"), vec![b, a, a1]);
        assert_eq!(store.children(root).expect("children"), vec![b, a]);
        assert_eq!(store.parent(a1), Some(a));
    }

    #[test]
    fn remove_child_drops_subtree() {
        let mut store = ArenaStore::default();
        let root = store.insert_root(directive("root"));
        let a = store.insert_child(root, None, directive("a")).expect("insert");
        let a1 = store.insert_child(a, None, directive("a1")).expect("insert");
        assert_eq!(store.len(), 3);

        store.remove_child(root, a).expect("remove");

        assert_eq!(store.len(), 1);
        assert!(store.entry(a).is_none());
        assert!(store.entry(a1).is_none());
        assert!(store.descendants(root).expect("walk").is_empty());
    }

    #[test]
    fn remove_non_child_fails() {
        let mut store = ArenaStore::default();
        let root = store.insert_root(directive("root"));
        let a = store.insert_child(root, None, directive("a")).expect("insert");
        let a1 = store.insert_child(a, None, directive("a1")).expect("insert");

        assert_eq!(store.remove_child(root, a1), Err(BackendError::NotAChild));
    }

    #[test]
    fn insert_past_end_fails() {
        let mut store = ArenaStore::default();
        let root = store.insert_root(directive("root"));
        let result = store.insert_child(root, Some(1), directive("a"));
        assert_eq!(
            result,
            Err(BackendError::InvalidPosition {
                position: 1,
                len: 0
            })
        );
    }
}
