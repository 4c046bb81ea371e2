//! # Property Sets
//!
//! Ordered, keyed collection of top-level [`Prop`]s attached to one node.
//!
//! User-visible props and internal "extra" props share one list. An extra
//! key has its first path segment wrapped in [`EXTRA_KEY_DELIMITER`]:
//! `hidden` → `___hidden___`, `loop.items` → `___loop___.items`.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::node::ExportStage;
use crate::path::split_path;
use crate::prop::Prop;

pub const EXTRA_KEY_DELIMITER: &str = "___";

/// Internal form of an extra key or path
pub fn to_extra_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let head_len = match key.find('.') {
        Some(at) if at > 0 => at,
        _ => key.len(),
    };
    let (head, rest) = key.split_at(head_len);
    format!("{EXTRA_KEY_DELIMITER}{head}{EXTRA_KEY_DELIMITER}{rest}")
}

/// Inverse of [`to_extra_key`]. Keys that are not extra keys are returned
/// unchanged.
pub fn from_extra_key(key: &str) -> String {
    match split_extra_key(key) {
        Some((head, rest)) => format!("{head}{rest}"),
        None => key.to_string(),
    }
}

pub fn is_extra_key(key: &str) -> bool {
    split_extra_key(key).is_some()
}

/// Unwrap the delimited first segment: `___loop___.items` → (`loop`, `.items`)
fn split_extra_key(key: &str) -> Option<(&str, &str)> {
    let inner = key.strip_prefix(EXTRA_KEY_DELIMITER)?;
    let (head, rest) = inner.split_at(inner.find('.').unwrap_or(inner.len()));
    let head = head.strip_suffix(EXTRA_KEY_DELIMITER)?;
    (!head.is_empty()).then_some((head, rest))
}

/// Exported property set, split by namespace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropsExport {
    pub props: Map<String, Value>,
    pub extras: Map<String, Value>,
}

#[derive(Debug, Default)]
pub struct Props {
    items: IndexMap<String, Prop>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_maps(props: Option<&Map<String, Value>>, extras: Option<&Map<String, Value>>) -> Self {
        Self {
            items: build_items(props, extras),
        }
    }

    /// Replace the whole set. Cells of the previous generation are purged
    /// only after the new set is in place.
    pub fn import(&mut self, props: Option<&Map<String, Value>>, extras: Option<&Map<String, Value>>) {
        let previous = std::mem::replace(&mut self.items, build_items(props, extras));
        for (_, mut prop) in previous {
            prop.purge();
        }
    }

    /// Update matching keys in place, creating cells for new keys. Existing
    /// cells keep their identity. Returns whether anything changed.
    pub fn merge(&mut self, props: Option<&Map<String, Value>>, extras: Option<&Map<String, Value>>) -> bool {
        let mut changed = false;
        for (key, value) in props.into_iter().flatten() {
            if let Some(prop) = self.get_mut(key, true) {
                changed |= prop.set_value(value.clone());
            }
        }
        for (key, value) in extras.into_iter().flatten() {
            if let Some(prop) = self.get_extra_mut(key, true) {
                changed |= prop.set_value(value.clone());
            }
        }
        changed
    }

    pub fn export(&self, stage: ExportStage) -> PropsExport {
        let mut out = PropsExport::default();
        for (key, prop) in &self.items {
            if prop.is_unset() {
                continue;
            }
            let Some(value) = prop.export_with(stage) else {
                continue;
            };
            if is_extra_key(key) {
                out.extras.insert(from_extra_key(key), value);
            } else {
                out.props.insert(key.clone(), value);
            }
        }
        out
    }

    /// Resolve a path such as `style.color` or `items[2]`
    pub fn get(&self, path: &str) -> Option<&Prop> {
        let (entry, rest) = split_path(path)?;
        let prop = self.items.get(entry)?;
        match rest {
            Some(rest) => prop.get(rest),
            None => Some(prop),
        }
    }

    /// Resolve a path for writing, optionally creating it
    pub fn get_mut(&mut self, path: &str, create: bool) -> Option<&mut Prop> {
        let (entry, rest) = split_path(path)?;
        if !self.items.contains_key(entry) {
            if !create {
                return None;
            }
            self.items.insert(entry.to_string(), Prop::unset(entry));
        }
        let prop = self.items.get_mut(entry)?;
        match rest {
            Some(rest) => prop.get_mut(rest, create),
            None => Some(prop),
        }
    }

    pub fn get_extra(&self, path: &str) -> Option<&Prop> {
        self.get(&to_extra_key(path))
    }

    pub fn get_extra_mut(&mut self, path: &str, create: bool) -> Option<&mut Prop> {
        self.get_mut(&to_extra_key(path), create)
    }

    /// Add or replace a top-level prop; a replaced cell is purged
    pub fn add(&mut self, key: &str, value: Value) -> &mut Prop {
        let prop = Prop::new(key, value);
        let (index, old) = self.items.insert_full(key.to_string(), prop);
        if let Some(mut old) = old {
            old.purge();
        }
        &mut self.items[index]
    }

    pub fn delete(&mut self, key: &str) -> bool {
        match self.items.shift_remove(key) {
            Some(mut prop) => {
                prop.purge();
                true
            }
            None => false,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prop> {
        self.items.values()
    }

    /// Purge every cell, leaving the set empty
    pub(crate) fn purge(&mut self) {
        for (_, mut prop) in self.items.drain(..) {
            prop.purge();
        }
    }
}

fn build_items(
    props: Option<&Map<String, Value>>,
    extras: Option<&Map<String, Value>>,
) -> IndexMap<String, Prop> {
    let mut items = IndexMap::new();
    for (key, value) in props.into_iter().flatten() {
        items.insert(key.clone(), Prop::new(key.as_str(), value.clone()));
    }
    for (key, value) in extras.into_iter().flatten() {
        let key = to_extra_key(key);
        items.insert(key.clone(), Prop::new(key, value.clone()));
    }
    items
}
