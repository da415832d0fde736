#![forbid(unsafe_code)]

//! Dirty tracking: one-shot change observers that set the target marker.
//!
//! # Invariants
//!
//! 1. **Single registration**: a node is registered at most once per session;
//!    the registry is checked before `on_change` is called, so overlapping
//!    `watch` calls are idempotent.
//! 2. **Monotonic marks**: the tracker only ever writes `"true"`.
//! 3. **Group marking**: a changed checkbox marks every node that shares its
//!    export key under any root watched in the current session, regardless of
//!    which `watch` call registered the checkbox.
//! 4. **Late configuration**: observers read keywords when they fire, not
//!    when they were registered.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Engine dropped before change | Observer upgrades a dead `Weak`, no-op |
//! | Engine detached before change | Session mismatch, no-op |
//! | Checkbox without export key | Only the checkbox itself is marked |

use std::rc::{Rc, Weak};

use ahash::AHashSet;
use formtree_core::{Config, FormNode, NodeKind};

use crate::engine::EngineState;
use crate::key::resolve_key;

const MARKER_VALUE: &str = "true";

/// Register observers on every untracked value control under `root`.
///
/// Returns the number of newly registered nodes.
pub(crate) fn watch<N: FormNode>(state: &Rc<EngineState<N>>, root: &N) -> usize {
    let _span = tracing::debug_span!("watch", root = %root.id()).entered();
    let session = state.session.get();
    {
        let mut roots = state.roots.borrow_mut();
        if !roots.iter().any(|known| known.id() == root.id()) {
            roots.push(root.clone());
        }
    }
    let mut visited = 0usize;
    let mut registered = 0usize;

    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        visited += 1;
        if !node.kind().is_value_control() {
            stack.extend(node.children().into_iter().rev());
            continue;
        }
        if !state.tracked.borrow_mut().insert(node.id()) {
            continue;
        }
        register(state, &node, session);
        registered += 1;
    }

    tracing::debug!(visited, registered, "watch complete");
    registered
}

fn register<N: FormNode>(state: &Rc<EngineState<N>>, node: &N, session: u64) {
    tracing::trace!(node = %node.id(), kind = %node.kind(), "registering change observer");
    let weak: Weak<EngineState<N>> = Rc::downgrade(state);
    let target = node.clone();
    node.on_change(Box::new(move || {
        let Some(state) = weak.upgrade() else {
            return;
        };
        if state.session.get() != session {
            tracing::trace!(node = %target.id(), "change after detach ignored");
            return;
        }
        let config = state.config.borrow().clone();
        let roots = state.roots.borrow().clone();
        mark_changed(&config, &target, &roots);
    }));
}

/// Apply the first-change rule to `node`.
///
/// Checkboxes with an export key mark every same-keyed node under any of
/// `roots`, plus themselves; everything else marks only itself. Nested or
/// repeated roots are walked once. Returns how many nodes were marked.
pub(crate) fn mark_changed<N: FormNode>(config: &Config, node: &N, roots: &[N]) -> usize {
    let target_attr = config.target_attr();

    let group_key = match node.kind() {
        NodeKind::Checkbox => resolve_key(node, &config.keywords),
        _ => None,
    };
    let Some(key) = group_key else {
        node.set_attribute(target_attr, MARKER_VALUE);
        tracing::trace!(node = %node.id(), "marked");
        return 1;
    };

    let key_attr = config.export_key_attr();
    let mut seen = AHashSet::new();
    let mut marked = 0usize;
    for root in roots {
        let mut stack = vec![root.clone()];
        while let Some(candidate) = stack.pop() {
            if !seen.insert(candidate.id()) {
                continue;
            }
            if candidate.attribute(key_attr).as_deref() == Some(key.as_str()) {
                candidate.set_attribute(target_attr, MARKER_VALUE);
                marked += 1;
            }
            stack.extend(candidate.children().into_iter().rev());
        }
    }
    if !seen.contains(&node.id()) {
        node.set_attribute(target_attr, MARKER_VALUE);
        marked += 1;
    }
    tracing::trace!(node = %node.id(), key = %key, marked, "marked checkbox group");
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_core::Keywords;
    use formtree_harness::MemNode;

    #[test]
    fn scalar_marks_itself_only() {
        let name = MemNode::text("name", "Ann");
        let other = MemNode::text("name", "Bob");
        let root = MemNode::container().with_children([name.clone(), other.clone()]);

        assert_eq!(mark_changed(&Config::default(), &name, &[root]), 1);
        assert!(name.is_target());
        assert!(!other.is_target());
    }

    #[test]
    fn checkbox_marks_group_under_root() {
        let a = MemNode::checkbox("colors", "red", false);
        let b = MemNode::checkbox("colors", "blue", false);
        let c = MemNode::checkbox("colors", "green", false);
        let unrelated = MemNode::checkbox("sizes", "s", false);
        let root = MemNode::container().with_children([
            a.clone(),
            MemNode::container().with_children([b.clone(), unrelated.clone()]),
            c.clone(),
        ]);

        assert_eq!(mark_changed(&Config::default(), &a, &[root]), 3);
        assert!(a.is_target() && b.is_target() && c.is_target());
        assert!(!unrelated.is_target());
    }

    #[test]
    fn nested_roots_are_walked_once() {
        let a = MemNode::checkbox("colors", "red", false);
        let b = MemNode::checkbox("colors", "blue", true);
        let inner = MemNode::container().child(a.clone());
        let root = MemNode::container().with_children([inner.clone(), b.clone()]);

        assert_eq!(mark_changed(&Config::default(), &a, &[inner, root.clone(), root]), 2);
        assert!(a.is_target() && b.is_target());
    }

    #[test]
    fn group_spans_disjoint_roots() {
        let a = MemNode::checkbox("colors", "red", false);
        let b = MemNode::checkbox("colors", "blue", false);
        let left = MemNode::container().child(a.clone());
        let right = MemNode::container().child(b.clone());

        assert_eq!(mark_changed(&Config::default(), &a, &[left, right]), 2);
        assert!(a.is_target() && b.is_target());
    }

    #[test]
    fn checkbox_outside_roots_still_marks_itself() {
        let stray = MemNode::checkbox("colors", "red", false);
        let member = MemNode::checkbox("colors", "blue", false);
        let root = MemNode::container().child(member.clone());

        assert_eq!(mark_changed(&Config::default(), &stray, &[root]), 2);
        assert!(stray.is_target() && member.is_target());
        assert_eq!(mark_changed(&Config::default(), &stray, &[]), 1);
    }

    #[test]
    fn keyless_checkbox_marks_itself() {
        let lonely = MemNode::new(NodeKind::Checkbox);
        let root = MemNode::container().child(lonely.clone());
        assert_eq!(mark_changed(&Config::default(), &lonely, &[root]), 1);
        assert!(lonely.is_target());
    }

    #[test]
    fn custom_target_attribute() {
        let config = Config {
            keywords: Keywords {
                target: "dirty".into(),
                ..Keywords::default()
            },
            ..Config::default()
        };
        let node = MemNode::text("name", "");
        mark_changed(&config, &node, &[]);
        assert!(node.has_marker("dirty"));
        assert!(!node.is_target());
    }
}
