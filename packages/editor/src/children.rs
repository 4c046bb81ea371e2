//! Ordered child list of one node.
//!
//! Holds ids, not nodes: the document owns every node and keeps each child's
//! parent pointer in sync with the list it sits in.

use crate::node::NodeId;

#[derive(Debug, Clone)]
pub struct NodeChildren {
    owner: NodeId,
    ids: Vec<NodeId>,
}

impl NodeChildren {
    pub fn new(owner: NodeId) -> Self {
        Self {
            owner,
            ids: Vec::new(),
        }
    }

    pub fn owner(&self) -> &NodeId {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NodeId> {
        self.ids.get(index)
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.ids.iter()
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.ids.iter().position(|child| child == id)
    }

    pub fn has(&self, id: &NodeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Insert at `at` (`None` appends; out of range clamps to the end). A
    /// child already in the list is moved, never duplicated. Returns the
    /// final index.
    pub(crate) fn insert(&mut self, id: NodeId, at: Option<usize>) -> usize {
        if let Some(existing) = self.index_of(&id) {
            self.ids.remove(existing);
        }
        let index = at.map_or(self.ids.len(), |at| at.min(self.ids.len()));
        self.ids.insert(index, id);
        index
    }

    /// Remove by id without touching the node itself
    pub(crate) fn internal_delete(&mut self, id: &NodeId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn replace(&mut self, ids: Vec<NodeId>) -> Vec<NodeId> {
        std::mem::replace(&mut self.ids, ids)
    }
}
