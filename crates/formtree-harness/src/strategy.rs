#![forbid(unsafe_code)]

//! Proptest strategies for arbitrary form trees.
//!
//! Strategies produce [`NodeFixture`] values (plain data that shrinks well);
//! call [`NodeFixture::build`] inside the property to get a live tree.
//!
//! Keys and values come from small pools so that same-keyed siblings,
//! checkbox groups, and repeated keyed containers show up often.

use formtree_core::NodeKind;
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

use crate::fixture::NodeFixture;

const KEYS: &[&str] = &["a", "b", "c", "tags"];
const VALUES: &[&str] = &["", "x", "y", "z"];

fn arb_key() -> impl Strategy<Value = Option<String>> {
    option::weighted(0.75, proptest::sample::select(KEYS).prop_map(str::to_owned))
}

fn arb_value() -> impl Strategy<Value = String> {
    proptest::sample::select(VALUES).prop_map(str::to_owned)
}

/// A single leaf control (text, checkbox, radio, select, or other).
pub fn arb_leaf() -> impl Strategy<Value = NodeFixture> {
    let control = prop_oneof![
        Just(NodeKind::TextInput),
        Just(NodeKind::Checkbox),
        Just(NodeKind::Radio),
        Just(NodeKind::Other),
    ];
    let simple = (control, arb_key(), arb_value(), any::<bool>(), any::<bool>(), any::<bool>())
        .prop_map(|(kind, key, value, checked, required, target)| NodeFixture {
            kind,
            key,
            value: Some(value),
            checked: checked && matches!(kind, NodeKind::Checkbox | NodeKind::Radio),
            required,
            target,
            ..NodeFixture::default()
        });
    let select = (arb_key(), option::of(0usize..3), any::<bool>()).prop_map(
        |(key, selected, target)| {
            let options: Vec<String> = ["s", "m", "l"].iter().map(|s| (*s).to_owned()).collect();
            NodeFixture {
                kind: NodeKind::Select,
                key,
                selected: selected.map(|i| options[i].clone()),
                options,
                target,
                ..NodeFixture::default()
            }
        },
    );
    prop_oneof![4 => simple, 1 => select]
}

/// A tree of nested containers (keyed or transparent) over arbitrary leaves.
pub fn arb_tree() -> impl Strategy<Value = NodeFixture> {
    arb_leaf().prop_recursive(4, 48, 5, |inner| {
        (arb_key(), vec(inner, 0..5)).prop_map(|(key, children)| NodeFixture {
            kind: NodeKind::Container,
            key,
            children,
            ..NodeFixture::default()
        })
    })
}

/// Wrap `fixture` in `depth` key-less containers.
#[must_use]
pub fn wrap_transparent(fixture: NodeFixture, depth: usize) -> NodeFixture {
    (0..depth).fold(fixture, |inner, _| NodeFixture {
        kind: NodeKind::Container,
        children: vec![inner],
        ..NodeFixture::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_core::FormNode;

    proptest! {
        #[test]
        fn generated_trees_build(fixture in arb_tree()) {
            let root = fixture.build().unwrap();
            prop_assert!(root.descendants().len() >= 1);
        }
    }

    #[test]
    fn wrap_adds_levels() {
        let leaf = NodeFixture {
            kind: NodeKind::TextInput,
            key: Some("a".into()),
            ..NodeFixture::default()
        };
        let wrapped = wrap_transparent(leaf, 3).build().unwrap();
        assert_eq!(wrapped.kind(), NodeKind::Container);
        assert_eq!(wrapped.descendants().len(), 4);
        assert_eq!(wrapped.attribute("data-key"), None);
    }
}
