//! # Pagecraft Editor
//!
//! Document model for a visual page builder: a tree of component nodes,
//! each with a property set and an ordered child list, plus a
//! time-coalesced undo/redo log.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Document: node arena, events, history hook  │
//! │  - create / insert / unlink / remove nodes  │
//! │  - set / merge / import props               │
//! │  - export and import NodeSchema snapshots   │
//! └─────────────────────────────────────────────┘
//!          ↓                        ↓
//! ┌──────────────────────┐  ┌───────────────────┐
//! │ Props → Prop cells   │  │ NodeChildren      │
//! │  lazy map/list items │  │  ordered node ids │
//! └──────────────────────┘  └───────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────────┐
//! │ History: sessions, save point, state mask   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Cells keep identity**: editing a nested value updates the existing
//!    cell; readers holding a [`PropId`] see the same cell afterwards
//! 2. **Snapshots are the history currency**: the log stores serialized
//!    exports, never diffs
//! 3. **Replay is silent**: while the log is applying a snapshot it ignores
//!    the change notifications that snapshot causes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{Document, DocumentConfig, ExportStage, HistoryConfig, NodeSchema, SystemClock};
//! use serde_json::json;
//! use std::rc::Rc;
//!
//! let schema: NodeSchema = serde_json::from_str(input)?;
//! let mut doc = Document::from_schema(&schema, &DocumentConfig::default());
//! doc.attach_history(&HistoryConfig::default(), Rc::new(SystemClock::new()));
//!
//! let root = doc.root().clone();
//! doc.set_prop(&root, "style.color", json!("red"))?;
//! doc.undo();
//!
//! println!("{}", doc.to_json(ExportStage::Serialize)?);
//! ```

mod children;
mod clock;
mod codec;
mod config;
mod document;
mod errors;
mod events;
mod history;
mod node;
pub mod path;
mod prop;
mod props;
mod session;

pub use children::NodeChildren;
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{JsonCodec, SnapshotCodec};
pub use config::{DocumentConfig, HistoryConfig, DEFAULT_ID_PREFIX, DEFAULT_TIME_GAP_MS};
pub use document::Document;
pub use errors::{CodecError, DocumentError};
pub use events::{DocumentEvent, EventBus, SubscriptionId};
pub use history::{History, HistoryState};
pub use node::{ExportStage, IdGenerator, Node, NodeId, NodeSchema};
pub use prop::{Prop, PropId, PropInput, PropKind};
pub use props::{from_extra_key, is_extra_key, to_extra_key, Props, PropsExport, EXTRA_KEY_DELIMITER};
pub use session::Session;
