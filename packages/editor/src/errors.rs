//! Error types for the editor

use thiserror::Error;

use crate::node::NodeId;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Parent not found: {0}")]
    ParentNotFound(NodeId),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Root node cannot be detached or removed")]
    RootDetached,

    #[error("Path is not writable: {0}")]
    PathNotWritable(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to deserialize snapshot: {0}")]
    Deserialize(#[source] serde_json::Error),
}
