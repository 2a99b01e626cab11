//! BTreeMap-backed document store.
//!
//! Nodes live in a map keyed by a monotonically increasing `NodeId`. Searches
//! iterate the map, so results come back in creation order rather than
//! document order.

use super::memory::{MemBlock, MemComment, MemDirective};
use super::{DocumentStore, Entry, NodeId, insertion_index};
use crate::types::BackendError;
use std::collections::BTreeMap;

pub type KeyedBlock = MemBlock<KeyedStore>;
pub type KeyedDirective = MemDirective<KeyedStore>;
pub type KeyedComment = MemComment<KeyedStore>;

#[derive(Debug, Clone)]
struct Record {
    entry: Entry,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Keyed storage: `BTreeMap<NodeId, Record>`.
#[derive(Debug, Default)]
pub struct KeyedStore {
    records: BTreeMap<NodeId, Record>,
    next_id: u64,
}

impl KeyedStore {
    fn allocate(&mut self, record: Record) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.records.insert(id, record);
        id
    }

    /// Check whether `ancestor` lies strictly above `id`.
    fn is_below(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.records.get(&id).and_then(|r| r.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.records.get(&parent).and_then(|r| r.parent);
        }
        false
    }
}

impl DocumentStore for KeyedStore {
    fn insert_root(&mut self, entry: Entry) -> NodeId {
        self.allocate(Record {
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
            .records
            .get(&parent)
            .ok_or(BackendError::NodeNotFound)?
            .children
            .len();
        let index = insertion_index(position, len)?;

        let id = self.allocate(Record {
            entry,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(record) = self.records.get_mut(&parent) {
            record.children.insert(index, id);
        }
        Ok(id)
    }

    fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.records.get(&id).map(|r| &r.entry)
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry> {
        self.records.get_mut(&id).map(|r| &mut r.entry)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.records.get(&id)?.parent
    }

    fn children(&self, id: NodeId) -> Result<Vec<NodeId>, BackendError> {
        self.records
            .get(&id)
            .map(|r| r.children.clone())
            .ok_or(BackendError::NodeNotFound)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), BackendError> {
        let record = self
            .records
            .get_mut(&parent)
            .ok_or(BackendError::NodeNotFound)?;
        let before = record.children.len();
        record.children.retain(|id| *id != child);
        if record.children.len() == before {
            return Err(BackendError::NotAChild);
        }

        let doomed: Vec<NodeId> = self
            .records
            .keys()
            .copied()
            .filter(|id| *id == child || self.is_below(*id, child))
            .collect();
        for id in doomed {
            self.records.remove(&id);
        }
        Ok(())
    }

    fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, BackendError> {
        if !self.records.contains_key(&id) {
            return Err(BackendError::NodeNotFound);
        }
        Ok(self
            .records
            .keys()
            .copied()
            .filter(|candidate| self.is_below(*candidate, id))
            .collect())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
