#![no_main]

use arbitrary::Arbitrary;
use formtree_core::{ExportMap, ExportValue, FormNode, NodeKind};
use formtree_engine::{Config, ConfigOverrides, Engine};
use formtree_harness::MemNode;
use libfuzzer_sys::fuzz_target;

const KEYS: [&str; 4] = ["a", "b", "c", "d"];
const MAX_NODES: usize = 512;

#[derive(Arbitrary, Debug)]
enum Kind {
    Container,
    Text,
    Checkbox,
    Radio,
    Select,
    Other,
}

#[derive(Arbitrary, Debug)]
struct Shape {
    kind: Kind,
    key: Option<u8>,
    value: u8,
    checked: bool,
    target: bool,
    children: Vec<Shape>,
}

fn build(shape: &Shape, budget: &mut usize) -> MemNode {
    *budget = budget.saturating_sub(1);
    let key = shape.key.map(|k| KEYS[usize::from(k) % KEYS.len()]);
    let value = format!("v{}", shape.value % 4);
    let mut node = match shape.kind {
        Kind::Container => MemNode::container(),
        Kind::Text => MemNode::new(NodeKind::TextInput).value(&value),
        Kind::Checkbox => MemNode::new(NodeKind::Checkbox).value(&value).checked(shape.checked),
        Kind::Radio => MemNode::new(NodeKind::Radio).value(&value).checked(shape.checked),
        Kind::Select => {
            let select = MemNode::new(NodeKind::Select);
            for option in ["v0", "v1", "v2"] {
                select.push_child(MemNode::other(option));
            }
            select.select_option(&value);
            select
        }
        Kind::Other => MemNode::other(&value),
    };
    if let Some(key) = key {
        node = node.key(key);
    }
    if shape.target {
        node = node.target();
    }
    for child in &shape.children {
        if *budget == 0 {
            break;
        }
        node.push_child(build(child, budget));
    }
    node
}

fn has_empty_map(map: &ExportMap) -> bool {
    map.iter().any(|(_, value)| match value {
        ExportValue::Scalar(_) => false,
        ExportValue::List(items) => items.iter().any(|item| match item {
            ExportValue::Map(inner) => inner.is_empty() || has_empty_map(inner),
            _ => false,
        }),
        ExportValue::Map(inner) => inner.is_empty() || has_empty_map(inner),
    })
}

fuzz_target!(|shape: Shape| {
    let mut budget = MAX_NODES;
    let root = build(&shape, &mut budget);

    let engine = Engine::new();
    let registered = engine.watch(&root);
    assert_eq!(engine.watch(&root), 0);

    let mut fired = 0;
    for node in root.descendants() {
        if node.kind().is_value_control() {
            fired += node.fire_change();
        }
    }
    assert_eq!(fired, registered);

    let first = engine.export(&root);
    assert!(!has_empty_map(&first));
    assert_eq!(first, engine.export(&root));

    let everything = Engine::with_config(Config::from_overrides(
        &ConfigOverrides::export_only_target(false),
    ));
    assert!(!has_empty_map(&everything.export(&root)));
    let _ = everything.validate(&root);

    for node in root.descendants() {
        node.clear_listeners();
    }
});
