//! Snapshot serialization for the history log.

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::CodecError;

/// Converts snapshots to and from their stored wire form
pub trait SnapshotCodec<S> {
    fn serialize(&self, snapshot: &S) -> Result<String, CodecError>;

    fn deserialize(&self, data: &str) -> Result<S, CodecError>;
}

/// Compact JSON text
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl<S> SnapshotCodec<S> for JsonCodec
where
    S: Serialize + DeserializeOwned,
{
    fn serialize(&self, snapshot: &S) -> Result<String, CodecError> {
        serde_json::to_string(snapshot).map_err(CodecError::Serialize)
    }

    fn deserialize(&self, data: &str) -> Result<S, CodecError> {
        serde_json::from_str(data).map_err(CodecError::Deserialize)
    }
}
