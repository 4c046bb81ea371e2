//! # Value Cells
//!
//! A [`Prop`] is one addressable slot in a node's property tree. It holds an
//! unset marker, a literal, an opaque expression or slot payload, or a
//! keyed/indexed container of child cells.
//!
//! ## Lazy children
//!
//! Assigning a container does not build child cells. They are materialized
//! from the raw value on the next structural access (`get`, `set`, `export`,
//! iteration).
//!
//! ## Identity preservation
//!
//! When a map cell is reassigned, its current children are kept as the
//! "previous generation". The next materialization reuses the previous cell
//! for every key that is still present (updating its value in place), so
//! anything keyed by that cell's [`PropId`] survives whole-object
//! replacement. Keys that disappeared are purged. Lists are rebuilt
//! positionally every time.

use std::cell::{OnceCell, RefCell};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::warn;

use crate::node::ExportStage;
use crate::path::{child_path, parse_index, split_path};

/// `type` markers of raw objects that are stored verbatim instead of being
/// decomposed into a map.
const EXPRESSION_TYPES: [&str; 2] = ["JSExpression", "JSFunction"];
const SLOT_TYPE: &str = "JSSlot";

/// Stable identity of a value cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropId(u64);

impl PropId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        PropId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Structural type of a cell, derived from its last assigned raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Unset,
    Literal,
    Expression,
    Slot,
    Map,
    List,
}

/// What to place into a child slot with [`Prop::set`]
#[derive(Debug)]
pub enum PropInput {
    Unset,
    Raw(Value),
    Cell(Prop),
}

impl From<Value> for PropInput {
    fn from(value: Value) -> Self {
        PropInput::Raw(value)
    }
}

impl From<Prop> for PropInput {
    fn from(prop: Prop) -> Self {
        PropInput::Cell(prop)
    }
}

#[derive(Debug)]
enum PropValue {
    Unset,
    Literal(Value),
    Expression(Value),
    Slot(Value),
    Map(MapCell),
    List(ListCell),
}

#[derive(Debug)]
struct MapCell {
    raw: Map<String, Value>,
    items: OnceCell<IndexMap<String, Prop>>,
}

#[derive(Debug)]
struct ListCell {
    raw: Vec<Value>,
    items: OnceCell<Vec<Prop>>,
}

impl PropValue {
    fn classify(raw: Value) -> Self {
        match raw {
            Value::Array(items) => PropValue::List(ListCell {
                raw: items,
                items: OnceCell::new(),
            }),
            Value::Object(map) => {
                let marker = map.get("type").and_then(Value::as_str);
                match marker {
                    Some(t) if EXPRESSION_TYPES.contains(&t) => {
                        PropValue::Expression(Value::Object(map))
                    }
                    Some(SLOT_TYPE) => PropValue::Slot(Value::Object(map)),
                    _ => PropValue::Map(MapCell {
                        raw: map,
                        items: OnceCell::new(),
                    }),
                }
            }
            other => PropValue::Literal(other),
        }
    }

    fn kind(&self) -> PropKind {
        match self {
            PropValue::Unset => PropKind::Unset,
            PropValue::Literal(_) => PropKind::Literal,
            PropValue::Expression(_) => PropKind::Expression,
            PropValue::Slot(_) => PropKind::Slot,
            PropValue::Map(_) => PropKind::Map,
            PropValue::List(_) => PropKind::List,
        }
    }
}

/// A single typed, path-addressable slot in the property tree
#[derive(Debug)]
pub struct Prop {
    id: PropId,
    key: String,
    path: String,
    value: PropValue,
    /// Children of the last materialized map generation, consulted by the
    /// next materialization
    previous: RefCell<IndexMap<String, Prop>>,
    purged: bool,
}

impl Prop {
    /// Top-level cell holding `raw`
    pub fn new(key: impl Into<String>, raw: Value) -> Self {
        let key = key.into();
        Self {
            id: PropId::next(),
            path: key.clone(),
            key,
            value: PropValue::classify(raw),
            previous: RefCell::new(IndexMap::new()),
            purged: false,
        }
    }

    /// Top-level cell with no value
    pub fn unset(key: impl Into<String>) -> Self {
        let mut prop = Self::new(key, Value::Null);
        prop.value = PropValue::Unset;
        prop
    }

    fn child(parent: &str, key: &str, indexed: bool, raw: Value) -> Self {
        let mut prop = Self::new(key, raw);
        prop.path = child_path(parent, key, indexed);
        prop
    }

    pub fn id(&self) -> PropId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Full path from the owning property set, e.g. `a.b[0].c`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> PropKind {
        self.value.kind()
    }

    pub fn is_unset(&self) -> bool {
        self.kind() == PropKind::Unset
    }

    pub fn is_purged(&self) -> bool {
        self.purged
    }

    /// Stored raw value of a literal, expression or slot cell
    pub fn literal(&self) -> Option<&Value> {
        match &self.value {
            PropValue::Literal(v) | PropValue::Expression(v) | PropValue::Slot(v) => Some(v),
            _ => None,
        }
    }

    /// Assign a raw value, re-deriving the kind.
    ///
    /// Returns `false` (and leaves the cell untouched) when `raw` equals what
    /// the cell currently exports.
    pub fn set_value(&mut self, raw: Value) -> bool {
        if self.export().as_ref() == Some(&raw) {
            return false;
        }
        let old = std::mem::replace(&mut self.value, PropValue::classify(raw));
        self.dispose(old);
        true
    }

    /// Mark the cell unset without detaching it from its owner
    pub fn unset_value(&mut self) -> bool {
        if self.is_unset() {
            return false;
        }
        let old = std::mem::replace(&mut self.value, PropValue::Unset);
        self.dispose(old);
        true
    }

    /// Tear the cell down. Idempotent; purges every descendant.
    pub fn purge(&mut self) {
        if self.purged {
            return;
        }
        self.purged = true;
        let old = std::mem::replace(&mut self.value, PropValue::Unset);
        self.dispose(old);
    }

    /// Release a replaced value. Map children move to the previous
    /// generation when the cell is still a map; everything else is purged.
    fn dispose(&mut self, old: PropValue) {
        let keep_previous = !self.purged && matches!(self.value, PropValue::Map(_));
        let previous = self.previous.get_mut();

        match old {
            PropValue::Map(map) => {
                if let Some(items) = map.items.into_inner() {
                    for (key, mut prop) in items {
                        if keep_previous {
                            if let Some(mut stale) = previous.insert(key, prop) {
                                stale.purge();
                            }
                        } else {
                            prop.purge();
                        }
                    }
                }
            }
            PropValue::List(list) => {
                if let Some(items) = list.items.into_inner() {
                    for mut prop in items {
                        prop.purge();
                    }
                }
            }
            // Dropping the payload severs the slot
            PropValue::Slot(_) | PropValue::Literal(_) | PropValue::Expression(_) => {}
            PropValue::Unset => {}
        }

        if !keep_previous {
            for (_, mut stale) in previous.drain(..) {
                stale.purge();
            }
        }
    }

    fn map_items(&self) -> Option<&IndexMap<String, Prop>> {
        match &self.value {
            PropValue::Map(map) => Some(
                map.items
                    .get_or_init(|| build_map(&map.raw, &self.path, &self.previous)),
            ),
            _ => None,
        }
    }

    fn map_items_mut(&mut self) -> Option<&mut IndexMap<String, Prop>> {
        let Prop {
            value,
            path,
            previous,
            ..
        } = self;
        match value {
            PropValue::Map(map) => {
                map.items
                    .get_or_init(|| build_map(&map.raw, path.as_str(), &*previous));
                map.items.get_mut()
            }
            _ => None,
        }
    }

    fn list_items(&self) -> Option<&Vec<Prop>> {
        match &self.value {
            PropValue::List(list) => Some(list.items.get_or_init(|| build_list(&list.raw, &self.path))),
            _ => None,
        }
    }

    fn list_items_mut(&mut self) -> Option<&mut Vec<Prop>> {
        let Prop { value, path, .. } = self;
        match value {
            PropValue::List(list) => {
                list.items.get_or_init(|| build_list(&list.raw, path.as_str()));
                list.items.get_mut()
            }
            _ => None,
        }
    }

    /// Direct child by key (map) or index (list)
    pub fn child_at(&self, key: &str) -> Option<&Prop> {
        match self.kind() {
            PropKind::Map => self.map_items()?.get(key),
            PropKind::List => self.list_items()?.get(parse_index(key)?),
            _ => None,
        }
    }

    fn child_at_mut(&mut self, key: &str) -> Option<&mut Prop> {
        match self.kind() {
            PropKind::Map => self.map_items_mut()?.get_mut(key),
            PropKind::List => {
                let index = parse_index(key)?;
                self.list_items_mut()?.get_mut(index)
            }
            _ => None,
        }
    }

    /// Resolve a nested path without creating anything
    pub fn get(&self, path: &str) -> Option<&Prop> {
        let (entry, rest) = split_path(path)?;
        let child = self.child_at(entry)?;
        match rest {
            Some(rest) => child.get(rest),
            None => Some(child),
        }
    }

    /// Resolve a nested path, creating unset cells along the way when
    /// `create` is set. An unset cell becomes a list when the next segment is
    /// an index and a map otherwise.
    pub fn get_mut(&mut self, path: &str, create: bool) -> Option<&mut Prop> {
        let (entry, rest) = split_path(path)?;

        if self.child_at(entry).is_none() {
            if !create {
                return None;
            }
            self.set(entry, PropInput::Unset, false)?;
        }

        let child = self.child_at_mut(entry)?;
        match rest {
            Some(rest) => child.get_mut(rest, create),
            None => Some(child),
        }
    }

    /// Place a value or cell under `key`, purging whatever was there.
    ///
    /// Literal, expression and slot cells reject structural writes unless
    /// `force` is set, in which case they are coerced into a list (index
    /// key) or map. A list rejects non-index keys unless forced, and indices
    /// past its end: a list grows by one append at a time.
    pub fn set(&mut self, key: &str, input: impl Into<PropInput>, force: bool) -> Option<&mut Prop> {
        let index = parse_index(key);
        let kind = self.kind();

        let structural = matches!(kind, PropKind::Map | PropKind::List | PropKind::Unset);
        if !structural && !force {
            warn!(path = %self.path, key, "rejected structural write on a {:?} cell", kind);
            return None;
        }
        if kind == PropKind::List && index.is_none() && !force {
            return None;
        }
        if let Some(index) = index.filter(|_| kind != PropKind::Map) {
            let len = if kind == PropKind::List { self.len() } else { 0 };
            if index > len {
                warn!(path = %self.path, index, len, "rejected list write past the end");
                return None;
            }
        }

        if kind == PropKind::Unset || (force && kind != PropKind::Map) {
            match index {
                Some(_) if kind != PropKind::List => {
                    self.set_value(Value::Array(Vec::new()));
                }
                Some(_) => {}
                None => {
                    self.set_value(Value::Object(Map::new()));
                }
            }
        }

        let input: PropInput = input.into();
        let mut prop = match input {
            PropInput::Unset => Prop::unset(key),
            PropInput::Raw(raw) => Prop::new(key, raw),
            PropInput::Cell(prop) => prop,
        };

        let parent = self.path.clone();
        match (self.kind(), index) {
            (PropKind::List, Some(index)) => {
                prop.rebase(&parent, &index.to_string(), true);
                let items = self.list_items_mut()?;
                if index < items.len() {
                    let mut old = std::mem::replace(&mut items[index], prop);
                    old.purge();
                } else {
                    items.push(prop);
                }
                items.get_mut(index)
            }
            _ => {
                prop.rebase(&parent, key, false);
                let items = self.map_items_mut()?;
                if let Some(mut old) = items.insert(key.to_string(), prop) {
                    old.purge();
                }
                items.get_mut(key)
            }
        }
    }

    /// Remove and purge a direct child. List entries after it shift down.
    pub fn delete_key(&mut self, key: &str) -> bool {
        match self.kind() {
            PropKind::Map => match self.map_items_mut().and_then(|items| items.shift_remove(key)) {
                Some(mut removed) => {
                    removed.purge();
                    true
                }
                None => false,
            },
            PropKind::List => {
                let Some(index) = parse_index(key) else {
                    return false;
                };
                let parent = self.path.clone();
                let Some(items) = self.list_items_mut() else {
                    return false;
                };
                if index >= items.len() {
                    return false;
                }
                items.remove(index).purge();
                for (i, item) in items.iter_mut().enumerate().skip(index) {
                    item.rebase(&parent, &i.to_string(), true);
                }
                true
            }
            _ => false,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.child_at(key).is_some()
    }

    /// Number of direct children (0 for non-containers)
    pub fn len(&self) -> usize {
        match self.kind() {
            PropKind::Map => self.map_items().map_or(0, IndexMap::len),
            PropKind::List => self.list_items().map_or(0, Vec::len),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct children in order
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Prop> + '_> {
        match self.kind() {
            PropKind::Map => match self.map_items() {
                Some(items) => Box::new(items.values()),
                None => Box::new(std::iter::empty()),
            },
            PropKind::List => match self.list_items() {
                Some(items) => Box::new(items.iter()),
                None => Box::new(std::iter::empty()),
            },
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Re-home the cell (and its descendants) under a new parent path
    fn rebase(&mut self, parent: &str, key: &str, indexed: bool) {
        self.key = key.to_string();
        self.path = child_path(parent, key, indexed);

        let path = self.path.clone();
        match &mut self.value {
            PropValue::Map(map) => {
                if let Some(items) = map.items.get_mut() {
                    for (k, child) in items.iter_mut() {
                        child.rebase(&path, k, false);
                    }
                }
            }
            PropValue::List(list) => {
                if let Some(items) = list.items.get_mut() {
                    for (i, child) in items.iter_mut().enumerate() {
                        child.rebase(&path, &i.to_string(), true);
                    }
                }
            }
            _ => {}
        }
        for (k, child) in self.previous.get_mut().iter_mut() {
            child.rebase(&path, k, false);
        }
    }

    /// Raw JSON of this cell; `None` when there is nothing to emit
    pub fn export(&self) -> Option<Value> {
        self.export_with(ExportStage::Serialize)
    }

    pub fn export_with(&self, stage: ExportStage) -> Option<Value> {
        match &self.value {
            PropValue::Unset => None,
            PropValue::Literal(v) | PropValue::Expression(v) => Some(v.clone()),
            PropValue::Slot(v) => {
                let mut v = v.clone();
                if stage == ExportStage::Clone {
                    strip_node_ids(&mut v);
                }
                Some(v)
            }
            PropValue::Map(_) => {
                let mut out = Map::new();
                for (key, prop) in self.map_items()? {
                    if let Some(v) = prop.export_with(stage) {
                        out.insert(key.clone(), v);
                    }
                }
                (!out.is_empty()).then_some(Value::Object(out))
            }
            PropValue::List(_) => {
                let values: Vec<Option<Value>> =
                    self.list_items()?.iter().map(|p| p.export_with(stage)).collect();
                if values.iter().all(Option::is_none) {
                    return None;
                }
                Some(Value::Array(
                    values.into_iter().map(|v| v.unwrap_or(Value::Null)).collect(),
                ))
            }
        }
    }
}

fn build_map(
    raw: &Map<String, Value>,
    path: &str,
    previous: &RefCell<IndexMap<String, Prop>>,
) -> IndexMap<String, Prop> {
    let mut previous = previous.borrow_mut();
    let mut items = IndexMap::with_capacity(raw.len());

    for (key, value) in raw {
        let prop = match previous.shift_remove(key) {
            Some(mut prop) => {
                prop.set_value(value.clone());
                prop
            }
            None => Prop::child(path, key, false, value.clone()),
        };
        items.insert(key.clone(), prop);
    }

    for (_, mut stale) in previous.drain(..) {
        stale.purge();
    }
    items
}

fn build_list(raw: &[Value], path: &str) -> Vec<Prop> {
    raw.iter()
        .enumerate()
        .map(|(i, value)| Prop::child(path, &i.to_string(), true, value.clone()))
        .collect()
}

/// Drop `id` from every node schema nested in a slot payload
fn strip_node_ids(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.contains_key("componentName") {
                map.shift_remove("id");
            }
            map.values_mut().for_each(strip_node_ids);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_node_ids),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_is_derived_from_raw_value() {
        assert_eq!(Prop::new("a", json!(null)).kind(), PropKind::Literal);
        assert_eq!(Prop::new("a", json!("x")).kind(), PropKind::Literal);
        assert_eq!(Prop::new("a", json!([1])).kind(), PropKind::List);
        assert_eq!(Prop::new("a", json!({ "b": 1 })).kind(), PropKind::Map);
        assert_eq!(
            Prop::new("a", json!({ "type": "JSExpression", "value": "this.x" })).kind(),
            PropKind::Expression
        );
        assert_eq!(
            Prop::new("a", json!({ "type": "JSSlot", "value": [] })).kind(),
            PropKind::Slot
        );
        assert_eq!(Prop::unset("a").kind(), PropKind::Unset);
    }

    #[test]
    fn test_round_trip() {
        let values = [
            json!(null),
            json!(3.5),
            json!("text"),
            json!({ "a": 1, "b": { "c": [1, "two", null] } }),
            json!([{ "x": true }, [1, 2], "s"]),
            json!({ "onClick": { "type": "JSFunction", "value": "() => {}" } }),
        ];

        for value in values {
            let mut prop = Prop::unset("p");
            prop.set_value(value.clone());
            assert_eq!(prop.export(), Some(value));
        }
    }

    #[test]
    fn test_empty_containers_export_nothing() {
        let mut prop = Prop::unset("p");
        prop.set_value(json!({ "a": {} }));
        assert_eq!(prop.export(), None);

        prop.set_value(json!([]));
        assert_eq!(prop.export(), None);
    }

    #[test]
    fn test_list_of_unset_exports_nothing() {
        let mut prop = Prop::new("p", json!([1, 2]));
        for item in ["0", "1"] {
            prop.get_mut(item, false).unwrap().unset_value();
        }
        assert_eq!(prop.export(), None);

        prop.get_mut("1", false).unwrap().set_value(json!("b"));
        assert_eq!(prop.export(), Some(json!([null, "b"])));
    }

    #[test]
    fn test_map_children_survive_replacement() {
        let mut prop = Prop::new("p", json!({ "a": 1, "b": 2 }));
        let a = prop.get("a").unwrap().id();
        let b = prop.get("b").unwrap().id();

        assert!(prop.set_value(json!({ "a": 2 })));
        let a_again = prop.get("a").unwrap();

        assert_eq!(a_again.id(), a);
        assert_eq!(a_again.export(), Some(json!(2)));
        assert!(prop.get("b").is_none());

        prop.set_value(json!({ "a": 3, "b": 4 }));
        assert_ne!(prop.get("b").unwrap().id(), b);
    }

    #[test]
    fn test_list_children_are_rebuilt() {
        let mut prop = Prop::new("p", json!([1, 2]));
        let first = prop.get("[0]").unwrap().id();

        prop.set_value(json!([1, 3]));
        assert_ne!(prop.get("[0]").unwrap().id(), first);
    }

    #[test]
    fn test_set_value_equal_is_noop() {
        let mut prop = Prop::new("p", json!({ "a": 1 }));
        let a = prop.get("a").unwrap().id();

        assert!(!prop.set_value(json!({ "a": 1 })));
        assert_eq!(prop.get("a").unwrap().id(), a);
    }

    #[test]
    fn test_set_value_sees_child_edits() {
        let mut prop = Prop::new("p", json!({ "a": 1 }));
        prop.get_mut("a", false).unwrap().set_value(json!(2));

        // The raw container is stale; the cell compares against its export
        assert!(prop.set_value(json!({ "a": 1 })));
        assert_eq!(prop.export(), Some(json!({ "a": 1 })));
    }

    #[test]
    fn test_get_mut_auto_vivifies() {
        let mut prop = Prop::unset("root");
        let leaf = prop.get_mut("b[0].c", true).unwrap();
        assert_eq!(leaf.path(), "root.b[0].c");
        leaf.set_value(json!("deep"));

        assert_eq!(prop.kind(), PropKind::Map);
        assert_eq!(prop.get("b").unwrap().kind(), PropKind::List);
        assert_eq!(prop.get("b[0]").unwrap().kind(), PropKind::Map);
        assert_eq!(prop.export(), Some(json!({ "b": [{ "c": "deep" }] })));
    }

    #[test]
    fn test_get_without_create_returns_none() {
        let mut prop = Prop::new("p", json!({ "a": 1 }));
        assert!(prop.get("missing").is_none());
        assert!(prop.get_mut("missing.deeper", false).is_none());
        assert!(prop.get("a.b").is_none());
        assert!(!prop.has("missing"));
    }

    #[test]
    fn test_list_rejects_name_keys() {
        let mut prop = Prop::new("p", json!([1]));
        assert!(prop.get("x").is_none());
        assert!(prop.set("x", json!(1), false).is_none());
        assert!(prop.get_mut("x", true).is_none());
    }

    #[test]
    fn test_literal_rejects_structural_set_unless_forced() {
        let mut prop = Prop::new("p", json!(5));
        assert!(prop.set("a", json!(1), false).is_none());
        assert!(prop.get_mut("a", true).is_none());

        prop.set("0", json!("x"), true).unwrap();
        assert_eq!(prop.kind(), PropKind::List);
        assert_eq!(prop.export(), Some(json!(["x"])));
    }

    #[test]
    fn test_forced_name_key_turns_list_into_map() {
        let mut prop = Prop::new("p", json!([1]));
        prop.set("name", json!("n"), true).unwrap();
        assert_eq!(prop.kind(), PropKind::Map);
        assert_eq!(prop.export(), Some(json!({ "name": "n" })));
    }

    #[test]
    fn test_set_appends_but_refuses_gaps() {
        let mut prop = Prop::new("p", json!(["a"]));
        prop.set("1", json!("b"), false).unwrap();
        assert!(prop.set("3", json!("d"), false).is_none());
        assert!(prop.set("18446744073709551615", json!("e"), false).is_none());

        assert_eq!(prop.len(), 2);
        assert_eq!(prop.export(), Some(json!(["a", "b"])));

        let mut fresh = Prop::unset("q");
        assert!(fresh.get_mut("[5000000]", true).is_none());
        assert!(fresh.is_unset());

        let mut map = Prop::new("m", json!({ "a": 1 }));
        assert!(map.set("7", json!(7), false).is_some());
        assert_eq!(map.export(), Some(json!({ "a": 1, "7": 7 })));
    }

    #[test]
    fn test_set_adopts_cell() {
        let inner = Prop::new("tmp", json!({ "x": 1 }));
        let id = inner.id();
        assert_eq!(inner.get("x").unwrap().path(), "tmp.x");

        let mut prop = Prop::new("p", json!({}));
        let adopted = prop.set("q", inner, false).unwrap();

        assert_eq!(adopted.id(), id);
        assert_eq!(adopted.key(), "q");
        assert_eq!(adopted.get("x").unwrap().path(), "p.q.x");
    }

    #[test]
    fn test_delete_key_shifts_list() {
        let mut prop = Prop::new("p", json!(["a", "b", "c"]));
        assert!(prop.delete_key("0"));

        assert_eq!(prop.export(), Some(json!(["b", "c"])));
        assert_eq!(prop.get("[0]").unwrap().key(), "0");
        assert_eq!(prop.get("[1]").unwrap().path(), "p[1]");
        assert!(!prop.delete_key("5"));
    }

    #[test]
    fn test_unset_keeps_cell() {
        let mut prop = Prop::new("p", json!({ "a": 1 }));
        let id = prop.id();

        assert!(prop.unset_value());
        assert!(prop.is_unset());
        assert!(!prop.is_purged());
        assert_eq!(prop.id(), id);
        assert_eq!(prop.export(), None);
    }

    #[test]
    fn test_purge_is_idempotent() {
        let mut prop = Prop::new("p", json!({ "slot": { "type": "JSSlot", "value": [] } }));
        assert_eq!(prop.get("slot").unwrap().kind(), PropKind::Slot);

        prop.purge();
        prop.purge();
        assert!(prop.is_purged());
        assert!(prop.is_unset());
        assert!(prop.get("slot").is_none());
    }

    #[test]
    fn test_clone_stage_strips_slot_node_ids() {
        let prop = Prop::new(
            "p",
            json!({ "type": "JSSlot", "value": [{ "id": "n1", "componentName": "Text" }] }),
        );

        assert_eq!(
            prop.export_with(ExportStage::Clone),
            Some(json!({ "type": "JSSlot", "value": [{ "componentName": "Text" }] }))
        );
        assert_eq!(
            prop.export(),
            Some(json!({ "type": "JSSlot", "value": [{ "id": "n1", "componentName": "Text" }] }))
        );
    }

    #[test]
    fn test_iter_preserves_order() {
        let prop = Prop::new("p", json!({ "z": 1, "a": 2, "m": 3 }));
        let keys: Vec<&str> = prop.iter().map(Prop::key).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }
}
