//! Document nodes and their serialized schema.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::children::NodeChildren;
use crate::props::Props;

/// Stable node identifier, carried through serialized snapshots
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Purpose of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportStage {
    /// Full state, ids included (history snapshots, saving)
    #[default]
    Serialize,
    /// Copy/paste: node ids are dropped so the copy gets fresh ones
    Clone,
}

/// Serialized node, as a renderer consumes it.
///
/// Keys other than `id`, `componentName`, `props` and `children` are the
/// node's extra props (`hidden`, `condition`, `loop`, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,

    pub component_name: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSchema>,

    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl NodeSchema {
    pub fn new(component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub fn with_child(mut self, child: NodeSchema) -> Self {
        self.children.push(child);
        self
    }
}

/// One node of the document tree
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) component_name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) props: Props,
    pub(crate) children: NodeChildren,
}

impl Node {
    pub(crate) fn new(id: NodeId, schema: &NodeSchema) -> Self {
        Self {
            props: Props::from_maps(Some(&schema.props), Some(&schema.extras)),
            children: NodeChildren::new(id.clone()),
            component_name: schema.component_name.clone(),
            parent: None,
            id,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &NodeChildren {
        &self.children
    }
}

/// Sequential id generator for nodes within a document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            count: 0,
        }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> NodeId {
        self.count += 1;
        NodeId(format!("{}-{}", self.prefix, self.count))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
