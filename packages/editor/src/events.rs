//! Per-document change notifications.
//!
//! Each [`Document`](crate::Document) owns one bus. Listeners run
//! synchronously, after the mutation has been applied and before the
//! mutating call returns.

use std::fmt;

use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    /// A single prop path was written or unset
    PropChanged { node: NodeId, path: String },

    /// Props were merged, imported or edited in bulk
    PropsChanged { node: NodeId },

    /// A child list gained, lost or reordered entries
    ChildrenChanged { parent: NodeId },

    /// A detached node was created
    NodeCreated { node: NodeId },

    /// A node was detached from its parent without being destroyed
    NodeUnlinked { node: NodeId, parent: NodeId },

    /// A node and its subtree were purged
    NodeRemoved { node: NodeId },

    /// The whole tree was replaced from a snapshot
    Imported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&DocumentEvent)>;

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &DocumentEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
