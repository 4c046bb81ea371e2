//! # Document
//!
//! Owns every node of one page schema, each with its own [`Props`] and
//! [`NodeChildren`], plus the document's event bus and (optionally) its
//! history log.
//!
//! ## Change flow
//!
//! ```text
//! mutation ─→ node arena ─→ EventBus listeners
//!                        └→ History::observe(export)   (skipped while replaying)
//! ```
//!
//! Every mutating method notifies before it returns. Undo/redo hands a
//! recorded snapshot back to [`Document::import`], whose own change
//! notification reaches the history while it is asleep and is dropped.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::clock::Clock;
use crate::config::{DocumentConfig, HistoryConfig};
use crate::errors::{CodecError, DocumentError};
use crate::events::{DocumentEvent, EventBus, SubscriptionId};
use crate::history::History;
use crate::node::{ExportStage, IdGenerator, Node, NodeId, NodeSchema};
use crate::props::Props;

#[derive(Debug)]
pub struct Document {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
    ids: IdGenerator,
    events: EventBus,
    history: Option<Rc<History<NodeSchema>>>,
    version: u64,
}

impl Document {
    /// Empty document with a root of the given component
    pub fn new(root_component: &str) -> Self {
        Self::from_schema(&NodeSchema::new(root_component), &DocumentConfig::default())
    }

    /// Build the node tree from a schema. No history is attached.
    pub fn from_schema(schema: &NodeSchema, config: &DocumentConfig) -> Self {
        let mut doc = Self {
            root: NodeId::from(""),
            nodes: HashMap::new(),
            ids: IdGenerator::new(config.id_prefix.clone()),
            events: EventBus::new(),
            history: None,
            version: 0,
        };
        let mut claimed = HashSet::new();
        doc.root = doc.build_node(schema, &mut claimed);
        doc
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in the arena, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Incremented on every notified change
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn props(&self, id: &NodeId) -> Option<&Props> {
        self.nodes.get(id).map(Node::props)
    }

    pub fn get_prop(&self, id: &NodeId, path: &str) -> Option<Value> {
        self.props(id)?.get(path)?.export()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // --- props -----------------------------------------------------------

    /// Write a value at a prop path, creating intermediate cells.
    /// Returns whether the value changed.
    pub fn set_prop(&mut self, id: &NodeId, path: &str, value: Value) -> Result<bool, DocumentError> {
        let node = self.node_mut(id)?;
        let prop = node
            .props
            .get_mut(path, true)
            .ok_or_else(|| DocumentError::PathNotWritable(path.to_string()))?;
        let changed = prop.set_value(value);
        if changed {
            self.changed(DocumentEvent::PropChanged {
                node: id.clone(),
                path: path.to_string(),
            });
        }
        Ok(changed)
    }

    /// Like [`Document::set_prop`], in the extra namespace
    pub fn set_extra(&mut self, id: &NodeId, path: &str, value: Value) -> Result<bool, DocumentError> {
        let node = self.node_mut(id)?;
        let prop = node
            .props
            .get_extra_mut(path, true)
            .ok_or_else(|| DocumentError::PathNotWritable(path.to_string()))?;
        let changed = prop.set_value(value);
        if changed {
            self.changed(DocumentEvent::PropChanged {
                node: id.clone(),
                path: path.to_string(),
            });
        }
        Ok(changed)
    }

    /// Mark a prop unset; a missing path is not an error
    pub fn unset_prop(&mut self, id: &NodeId, path: &str) -> Result<bool, DocumentError> {
        let node = self.node_mut(id)?;
        let changed = node
            .props
            .get_mut(path, false)
            .is_some_and(|prop| prop.unset_value());
        if changed {
            self.changed(DocumentEvent::PropChanged {
                node: id.clone(),
                path: path.to_string(),
            });
        }
        Ok(changed)
    }

    /// Update props in place, keeping the identity of existing cells
    pub fn merge_props(
        &mut self,
        id: &NodeId,
        props: Option<&Map<String, Value>>,
        extras: Option<&Map<String, Value>>,
    ) -> Result<bool, DocumentError> {
        let changed = self.node_mut(id)?.props.merge(props, extras);
        if changed {
            self.changed(DocumentEvent::PropsChanged { node: id.clone() });
        }
        Ok(changed)
    }

    /// Replace a node's whole property set
    pub fn import_props(
        &mut self,
        id: &NodeId,
        props: Option<&Map<String, Value>>,
        extras: Option<&Map<String, Value>>,
    ) -> Result<(), DocumentError> {
        self.node_mut(id)?.props.import(props, extras);
        self.changed(DocumentEvent::PropsChanged { node: id.clone() });
        Ok(())
    }

    /// Run several prop edits as one change. Notifies only when the node's
    /// exported props differ afterwards.
    pub fn edit_props<R>(&mut self, id: &NodeId, edit: impl FnOnce(&mut Props) -> R) -> Result<R, DocumentError> {
        let props = &mut self.node_mut(id)?.props;
        let before = props.export(ExportStage::Serialize);
        let result = edit(props);
        if props.export(ExportStage::Serialize) != before {
            self.changed(DocumentEvent::PropsChanged { node: id.clone() });
        }
        Ok(result)
    }

    // --- tree ------------------------------------------------------------

    /// Create a detached subtree. Ids already in use are replaced.
    pub fn create_node(&mut self, schema: &NodeSchema) -> NodeId {
        let mut claimed = HashSet::new();
        let id = self.build_node(schema, &mut claimed);
        self.changed(DocumentEvent::NodeCreated { node: id.clone() });
        id
    }

    /// Insert `child` under `parent` at `at` (`None` appends). A child of
    /// another parent is detached from it first; a child already under
    /// `parent` is moved. Returns the final index.
    pub fn insert_child(&mut self, parent: &NodeId, child: &NodeId, at: Option<usize>) -> Result<usize, DocumentError> {
        if !self.nodes.contains_key(parent) {
            return Err(DocumentError::ParentNotFound(parent.clone()));
        }
        if !self.nodes.contains_key(child) {
            return Err(DocumentError::NodeNotFound(child.clone()));
        }
        if *child == self.root {
            return Err(DocumentError::RootDetached);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DocumentError::CycleDetected);
        }

        let previous = self.node_mut(child)?.parent.take();
        if let Some(previous) = previous.as_ref().filter(|p| *p != parent) {
            if let Some(old_parent) = self.nodes.get_mut(previous) {
                old_parent.children.internal_delete(child);
            }
        }

        let index = self.node_mut(parent)?.children.insert(child.clone(), at);
        self.node_mut(child)?.parent = Some(parent.clone());

        if let Some(previous) = previous.filter(|p| p != parent) {
            self.events.emit(&DocumentEvent::ChildrenChanged { parent: previous });
        }
        self.changed(DocumentEvent::ChildrenChanged {
            parent: parent.clone(),
        });
        Ok(index)
    }

    /// Detach a node from its parent, keeping it (and its subtree) alive for
    /// reinsertion. Returns whether it was attached.
    pub fn unlink_child(&mut self, id: &NodeId) -> Result<bool, DocumentError> {
        if *id == self.root {
            return Err(DocumentError::RootDetached);
        }
        let Some(parent) = self.node_mut(id)?.parent.take() else {
            return Ok(false);
        };
        let removed = self
            .nodes
            .get_mut(&parent)
            .is_some_and(|node| node.children.internal_delete(id));
        if removed {
            self.changed(DocumentEvent::NodeUnlinked {
                node: id.clone(),
                parent,
            });
        }
        Ok(removed)
    }

    /// Detach a node and purge it with its whole subtree
    pub fn remove_node(&mut self, id: &NodeId) -> Result<(), DocumentError> {
        if *id == self.root {
            return Err(DocumentError::RootDetached);
        }
        let parent = self.node_mut(id)?.parent.take();
        if let Some(parent) = &parent {
            if let Some(node) = self.nodes.get_mut(parent) {
                node.children.internal_delete(id);
            }
        }
        self.purge_node(id);
        self.changed(DocumentEvent::NodeRemoved { node: id.clone() });
        Ok(())
    }

    /// Index of a node within its parent
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        let parent = self.nodes.get(id)?.parent.as_ref()?;
        self.nodes.get(parent)?.children.index_of(id)
    }

    // --- snapshots -------------------------------------------------------

    /// Serialized tree under the root
    pub fn export(&self, stage: ExportStage) -> NodeSchema {
        self.export_node(&self.root, stage).unwrap_or_default()
    }

    pub fn export_node(&self, id: &NodeId, stage: ExportStage) -> Option<NodeSchema> {
        let node = self.nodes.get(id)?;
        let props = node.props.export(stage);
        Some(NodeSchema {
            id: (stage != ExportStage::Clone).then(|| node.id.clone()),
            component_name: node.component_name.clone(),
            props: props.props,
            children: node
                .children
                .iter()
                .filter_map(|child| self.export_node(child, stage))
                .collect(),
            extras: props.extras,
        })
    }

    pub fn to_json(&self, stage: ExportStage) -> Result<String, DocumentError> {
        let schema = self.export(stage);
        serde_json::to_string(&schema).map_err(|e| DocumentError::Codec(CodecError::Serialize(e)))
    }

    /// Replace the tree under the root with `schema`.
    ///
    /// Existing nodes are reused by id, or by position when the item has no
    /// id and the component matches. Nodes that were in the tree and are not
    /// in `schema` are purged. The root keeps its id.
    pub fn import(&mut self, schema: &NodeSchema) -> Result<(), DocumentError> {
        let before = self.descendants(&self.root);
        let root = self.root.clone();
        let mut claimed = HashSet::from([root.clone()]);

        self.import_node(&root, schema, &mut claimed)?;

        let after = self.descendants(&root);
        for id in before.difference(&after) {
            // Subtrees are purged from their top; skip already-purged nodes
            if self.nodes.contains_key(id) {
                self.purge_node(id);
            }
        }

        self.changed(DocumentEvent::Imported);
        Ok(())
    }

    // --- history ---------------------------------------------------------

    /// Attach a history log and record the current tree as its first state
    pub fn attach_history(&mut self, config: &HistoryConfig, clock: Rc<dyn Clock>) -> Rc<History<NodeSchema>> {
        let history = Rc::new(History::new(config, clock));
        history.observe(Some(self.export(ExportStage::Serialize)));
        self.history = Some(Rc::clone(&history));
        history
    }

    pub fn history(&self) -> Option<&Rc<History<NodeSchema>>> {
        self.history.as_ref()
    }

    pub fn undo(&mut self) -> bool {
        let Some(history) = self.history.clone() else {
            return false;
        };
        history.back(|schema| self.import(&schema))
    }

    pub fn redo(&mut self) -> bool {
        let Some(history) = self.history.clone() else {
            return false;
        };
        history.forward(|schema| self.import(&schema))
    }

    pub fn go(&mut self, cursor: usize) -> bool {
        let Some(history) = self.history.clone() else {
            return false;
        };
        history.go(cursor, |schema| self.import(&schema))
    }

    pub fn save_point(&mut self) {
        if let Some(history) = &self.history {
            history.save_point();
        }
    }

    // --- internals -------------------------------------------------------

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node, DocumentError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| DocumentError::NodeNotFound(id.clone()))
    }

    fn changed(&mut self, event: DocumentEvent) {
        self.version += 1;
        debug!(version = self.version, ?event, "document changed");
        self.events.emit(&event);

        if let Some(history) = &self.history {
            if !history.is_asleep() {
                history.observe(Some(self.export(ExportStage::Serialize)));
            }
        }
    }

    fn fresh_id(&mut self, wanted: Option<&NodeId>, claimed: &HashSet<NodeId>) -> NodeId {
        if let Some(id) = wanted {
            if !self.nodes.contains_key(id) && !claimed.contains(id) {
                return id.clone();
            }
        }
        loop {
            let id = self.ids.new_id();
            if !self.nodes.contains_key(&id) && !claimed.contains(&id) {
                return id;
            }
        }
    }

    fn build_node(&mut self, schema: &NodeSchema, claimed: &mut HashSet<NodeId>) -> NodeId {
        let id = self.fresh_id(schema.id.as_ref(), claimed);
        claimed.insert(id.clone());
        self.nodes.insert(id.clone(), Node::new(id.clone(), schema));

        let children: Vec<NodeId> = schema
            .children
            .iter()
            .map(|child| self.build_node(child, claimed))
            .collect();
        self.adopt_children(&id, children);
        id
    }

    fn import_node(&mut self, id: &NodeId, schema: &NodeSchema, claimed: &mut HashSet<NodeId>) -> Result<(), DocumentError> {
        let node = self.node_mut(id)?;
        node.component_name = schema.component_name.clone();
        node.props.import(Some(&schema.props), Some(&schema.extras));
        let previous = node.children.ids().to_vec();

        let mut next = Vec::with_capacity(schema.children.len());
        for (position, item) in schema.children.iter().enumerate() {
            let reuse = match &item.id {
                Some(child) => Some(child).filter(|c| self.nodes.contains_key(*c) && !claimed.contains(*c)).cloned(),
                None => previous
                    .get(position)
                    .filter(|c| {
                        !claimed.contains(*c)
                            && self
                                .nodes
                                .get(*c)
                                .is_some_and(|n| n.component_name == item.component_name)
                    })
                    .cloned(),
            };

            let child = match reuse {
                Some(child) => {
                    claimed.insert(child.clone());
                    self.detach_from_other_parent(&child, id);
                    self.import_node(&child, item, claimed)?;
                    child
                }
                None => self.build_node(item, claimed),
            };
            next.push(child);
        }

        self.adopt_children(id, next);
        Ok(())
    }

    /// Install `children` as the child list of `parent` and point each child
    /// back at it
    fn adopt_children(&mut self, parent: &NodeId, children: Vec<NodeId>) {
        for child in &children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(parent.clone());
            }
        }
        let Some(node) = self.nodes.get_mut(parent) else {
            return;
        };
        let replaced = node.children.replace(children);
        let dropped: Vec<NodeId> = replaced
            .into_iter()
            .filter(|old| !node.children.has(old))
            .collect();

        for old in dropped {
            if let Some(orphan) = self.nodes.get_mut(&old) {
                if orphan.parent.as_ref() == Some(parent) {
                    orphan.parent = None;
                }
            }
        }
    }

    fn detach_from_other_parent(&mut self, child: &NodeId, new_parent: &NodeId) {
        let Some(old_parent) = self.nodes.get(child).and_then(|n| n.parent.clone()) else {
            return;
        };
        if old_parent != *new_parent {
            if let Some(node) = self.nodes.get_mut(&old_parent) {
                node.children.internal_delete(child);
            }
        }
    }

    fn is_ancestor_or_self(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        let mut current = Some(id.clone());
        while let Some(node_id) = current {
            if node_id == *ancestor {
                return true;
            }
            current = self.nodes.get(&node_id).and_then(|n| n.parent.clone());
        }
        false
    }

    fn descendants(&self, id: &NodeId) -> HashSet<NodeId> {
        let mut out = HashSet::new();
        let mut stack = vec![id.clone()];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(&next) {
                stack.extend(node.children.iter().cloned());
            }
            out.insert(next);
        }
        out
    }

    /// Remove a node and its subtree from the arena, purging their props
    fn purge_node(&mut self, id: &NodeId) {
        let Some(mut node) = self.nodes.remove(id) else {
            return;
        };
        node.props.purge();
        for child in node.children.replace(Vec::new()) {
            let owned = self
                .nodes
                .get(&child)
                .is_some_and(|c| c.parent.as_ref() == Some(id));
            if owned {
                self.purge_node(&child);
            }
        }
    }
}
