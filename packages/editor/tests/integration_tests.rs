//! Integration tests for editor crate

use std::cell::RefCell;
use std::rc::Rc;

use pagecraft_editor::{
    Document, DocumentConfig, DocumentEvent, ExportStage, HistoryConfig, ManualClock, NodeId, NodeSchema, Prop,
    PropKind, Props,
};
use serde_json::json;

fn page() -> NodeSchema {
    NodeSchema::new("Page")
        .with_id("root")
        .with_child(NodeSchema::new("Header").with_id("a"))
        .with_child(NodeSchema::new("Body").with_id("b"))
        .with_child(NodeSchema::new("Footer").with_id("c"))
}

fn ids(doc: &Document, parent: &str) -> Vec<String> {
    doc.node(&NodeId::from(parent))
        .unwrap()
        .children()
        .iter()
        .map(|id| id.to_string())
        .collect()
}

#[test]
fn test_value_round_trip() {
    let values = [
        json!(null),
        json!(42),
        json!("text"),
        json!([1, "two", null, { "x": false }]),
        json!({ "a": { "b": [1, 2] }, "c": null }),
    ];

    for value in values {
        let mut cell = Prop::unset("v");
        cell.set_value(value.clone());
        assert_eq!(cell.export(), Some(value));
    }
}

#[test]
fn test_empty_containers_export_nothing() {
    let mut cell = Prop::new("v", json!({}));
    assert_eq!(cell.export(), None);

    cell.set_value(json!({ "a": {} }));
    assert_eq!(cell.export(), None);

    cell.set_value(json!([{}, {}]));
    assert_eq!(cell.export(), None);
}

#[test]
fn test_map_children_keep_identity() {
    let mut cell = Prop::new("style", json!({ "a": 1, "b": 2 }));
    let a = cell.get("a").unwrap().id();

    cell.set_value(json!({ "a": 2 }));

    let after = cell.get("a").unwrap();
    assert_eq!(after.id(), a);
    assert_eq!(after.export(), Some(json!(2)));
    assert!(cell.get("b").is_none());
}

#[test]
fn test_path_auto_vivification() {
    let mut props = Props::new();
    let leaf = props.get_mut("a.b[0].c", true).unwrap();
    leaf.set_value(json!("deep"));

    assert_eq!(props.get("a").unwrap().kind(), PropKind::Map);
    assert_eq!(props.get("a.b").unwrap().kind(), PropKind::List);
    assert_eq!(
        props.export(ExportStage::Serialize).props.get("a"),
        Some(&json!({ "b": [{ "c": "deep" }] }))
    );
}

#[test]
fn test_child_insert_is_a_move() {
    let mut doc = Document::from_schema(&page(), &DocumentConfig::default());
    let a = NodeId::from("a");

    doc.insert_child(&NodeId::from("root"), &a, Some(0)).unwrap();
    let index = doc.insert_child(&NodeId::from("root"), &a, Some(2)).unwrap();

    assert_eq!(index, 2);
    assert_eq!(ids(&doc, "root"), vec!["b", "c", "a"]);

    let index = doc.insert_child(&NodeId::from("root"), &a, Some(99)).unwrap();
    assert_eq!(index, 2);
    assert_eq!(ids(&doc, "root").len(), 3);
}

#[test]
fn test_merge_keeps_bound_cells() {
    let mut doc = Document::from_schema(&page(), &DocumentConfig::default());
    let a = NodeId::from("a");
    doc.set_prop(&a, "style.color", json!("red")).unwrap();
    let color = doc.props(&a).unwrap().get("style.color").unwrap().id();

    let mut update = serde_json::Map::new();
    update.insert("style".into(), json!({ "color": "blue", "margin": 4 }));
    assert!(doc.merge_props(&a, Some(&update), None).unwrap());

    let props = doc.props(&a).unwrap();
    assert_eq!(props.get("style.color").unwrap().id(), color);
    assert_eq!(doc.get_prop(&a, "style.margin"), Some(json!(4)));
}

#[test]
fn test_import_props_replaces_cells() {
    let mut doc = Document::from_schema(&page(), &DocumentConfig::default());
    let a = NodeId::from("a");
    doc.set_prop(&a, "title", json!("x")).unwrap();
    let before = doc.props(&a).unwrap().get("title").unwrap().id();

    let mut next = serde_json::Map::new();
    next.insert("title".into(), json!("y"));
    doc.import_props(&a, Some(&next), None).unwrap();

    let after = doc.props(&a).unwrap().get("title").unwrap();
    assert_ne!(after.id(), before);
    assert_eq!(after.export(), Some(json!("y")));
}

#[test]
fn test_every_mutation_notifies() {
    let mut doc = Document::from_schema(&page(), &DocumentConfig::default());
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    doc.subscribe(move |_| *sink.borrow_mut() += 1);

    let b = NodeId::from("b");
    doc.set_prop(&b, "x", json!(1)).unwrap();
    doc.unset_prop(&b, "x").unwrap();
    doc.set_extra(&b, "hidden", json!(true)).unwrap();
    doc.edit_props(&b, |props| {
        props.add("y", json!(2));
    })
    .unwrap();
    doc.unlink_child(&b).unwrap();
    doc.insert_child(&NodeId::from("root"), &b, None).unwrap();
    doc.remove_node(&b).unwrap();

    assert_eq!(*count.borrow(), 7);
    assert_eq!(doc.version(), 7);
}

#[test]
fn test_undo_restores_tree_and_props() {
    let clock = ManualClock::new();
    let mut doc = Document::from_schema(&page(), &DocumentConfig::default());
    let history = doc.attach_history(&HistoryConfig::default(), Rc::new(clock.clone()));
    let original = doc.export(ExportStage::Serialize);

    clock.advance(1500);
    doc.remove_node(&NodeId::from("b")).unwrap();
    clock.advance(1500);
    doc.set_prop(&NodeId::from("a"), "title", json!("Welcome")).unwrap();
    assert_eq!(history.records_len(), 3);

    assert!(doc.undo());
    assert!(doc.undo());
    assert!(!doc.undo());

    assert_eq!(doc.export(ExportStage::Serialize), original);
    assert_eq!(ids(&doc, "root"), vec!["a", "b", "c"]);
    assert_eq!(history.records_len(), 3);

    assert!(doc.go(2));
    assert_eq!(doc.get_prop(&NodeId::from("a"), "title"), Some(json!("Welcome")));
    assert!(!doc.contains(&NodeId::from("b")));
}

#[test]
fn test_undo_emits_import_event() {
    let clock = ManualClock::new();
    let mut doc = Document::from_schema(&page(), &DocumentConfig::default());
    doc.attach_history(&HistoryConfig::default(), Rc::new(clock.clone()));

    clock.advance(2000);
    doc.set_prop(&NodeId::from("c"), "year", json!(2024)).unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    doc.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    doc.undo();
    assert_eq!(*events.borrow(), vec![DocumentEvent::Imported]);
}

#[test]
fn test_save_point_on_document() {
    let clock = ManualClock::new();
    let mut doc = Document::from_schema(&page(), &DocumentConfig::default());
    let history = doc.attach_history(&HistoryConfig::default(), Rc::new(clock.clone()));

    doc.save_point();
    assert!(!history.is_modified());

    doc.set_prop(&NodeId::from("a"), "title", json!("Draft")).unwrap();
    assert!(history.is_modified());

    assert!(doc.undo());
    assert!(!history.is_modified());
}

#[test]
fn test_clone_export_reimports_with_fresh_ids() {
    let doc = Document::from_schema(&page(), &DocumentConfig::default());
    let copy = doc.export(ExportStage::Clone);

    let mut other = Document::new("Page");
    let root = other.root().clone();
    let pasted = other.create_node(&copy);
    other.insert_child(&root, &pasted, None).unwrap();

    let children = ids(&other, pasted.as_str());
    assert_eq!(children.len(), 3);
    assert!(children.iter().all(|id| id.starts_with("node-")));
}

#[test]
fn test_load_schema_from_json() -> anyhow::Result<()> {
    let schema: NodeSchema = serde_json::from_str(
        r#"{
            "componentName": "Page",
            "props": {
                "title": "Home",
                "onLoad": { "type": "JSFunction", "value": "function() {}" },
                "items": [{}, {}]
            },
            "children": [{ "componentName": "Text", "loop": { "type": "JSExpression", "value": "this.rows" } }]
        }"#,
    )?;
    let doc = Document::from_schema(&schema, &DocumentConfig::default());

    let root = doc.root().clone();
    assert_eq!(doc.props(&root).unwrap().get("onLoad").unwrap().kind(), PropKind::Expression);
    assert_eq!(doc.get_prop(&root, "items"), None);

    let text = doc.node(&root).unwrap().children().get(0).unwrap().clone();
    let extra = doc.props(&text).unwrap().get_extra("loop").unwrap();
    assert_eq!(extra.kind(), PropKind::Expression);

    let json = doc.to_json(ExportStage::Clone)?;
    let exported: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(exported["children"][0]["loop"]["value"], "this.rows");
    assert!(exported.get("id").is_none());
    Ok(())
}
