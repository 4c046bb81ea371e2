pub mod export;
pub mod replay;

pub use export::{export, ExportArgs};
pub use replay::{replay, ReplayArgs};

use anyhow::{Context, Result};
use pagecraft_editor::NodeSchema;
use std::path::Path;

/// Read a node schema from a JSON file
pub fn load_schema(path: &Path) -> Result<NodeSchema> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let schema = serde_json::from_str(&content)
        .with_context(|| format!("Invalid node schema in {}", path.display()))?;
    Ok(schema)
}
