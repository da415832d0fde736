#![forbid(unsafe_code)]

//! Export traversal: fold a node tree into a nested [`ExportMap`].
//!
//! # Algorithm
//!
//! The walk is depth-first in document order and uses an explicit work
//! stack, so tree depth is bounded by memory rather than the call stack.
//! Each keyed container pushes a pending output frame; its children write
//! into that frame, and closing the container folds the frame into its
//! parent.
//!
//! Node roles:
//!
//! | Node | Role |
//! |------|------|
//! | value control (text, checkbox, radio, select) | leaf, children ignored |
//! | `Other` without children | leaf |
//! | container or `Other` with children, no key | transparent, children splice into the parent frame |
//! | container or `Other` with children, keyed | nested frame at its key |
//! | `Container` without children | empty container, contributes nothing |
//!
//! Leaf contributions (after the target gate):
//!
//! | Kind | Contribution |
//! |------|--------------|
//! | select | selected option value, nothing if none selected |
//! | checkbox | key becomes a list; value pushed when checked |
//! | radio | value when checked |
//! | text / other | value |
//!
//! Every scalar or nested write goes through
//! [`ExportMap::insert_promoting`], so a repeated key becomes a list
//! instead of being overwritten.
//!
//! # Invariants
//!
//! 1. **No empty objects**: a keyed container whose frame is empty is
//!    dropped.
//! 2. **Transparency**: wrapping any subtree in key-less containers does not
//!    change the output.
//! 3. **Pure read**: export never writes to the tree.

use formtree_core::{Config, ExportMap, ExportValue, FormNode, NodeKind, marker_is_set};

use crate::key::resolve_key;

enum Step<N> {
    /// Process a node.
    Visit(N),
    /// Fold the innermost pending frame into its parent.
    Close,
}

/// Export `root` (inclusive) into a fresh map.
pub(crate) fn export<N: FormNode>(config: &Config, root: &N) -> ExportMap {
    let _span = tracing::debug_span!("export", root = %root.id()).entered();

    let mut output = ExportMap::new();
    let mut frames: Vec<(String, ExportMap)> = Vec::new();
    let mut steps = vec![Step::Visit(root.clone())];
    let mut visited = 0usize;

    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(node) => {
                visited += 1;
                let kind = node.kind();
                let key = resolve_key(&node, &config.keywords);
                let children = if kind.is_value_control() {
                    Vec::new()
                } else {
                    node.children()
                };

                if children.is_empty() && kind != NodeKind::Container {
                    if let Some(key) = key {
                        let out = match frames.last_mut() {
                            Some((_, frame)) => frame,
                            None => &mut output,
                        };
                        contribute_leaf(config, &node, kind, key, out);
                    }
                    continue;
                }

                if let Some(key) = key {
                    frames.push((key, ExportMap::new()));
                    steps.push(Step::Close);
                }
                steps.extend(children.into_iter().rev().map(Step::Visit));
            }
            Step::Close => {
                let Some((key, nested)) = frames.pop() else {
                    continue;
                };
                if nested.is_empty() {
                    tracing::trace!(key = %key, "dropping empty container");
                    continue;
                }
                let out = match frames.last_mut() {
                    Some((_, frame)) => frame,
                    None => &mut output,
                };
                out.insert_promoting(key, ExportValue::Map(nested));
            }
        }
    }

    tracing::debug!(visited, keys = output.len(), "export complete");
    output
}

fn contribute_leaf<N: FormNode>(
    config: &Config,
    node: &N,
    kind: NodeKind,
    key: String,
    out: &mut ExportMap,
) {
    if config.export_only_target()
        && !marker_is_set(node.attribute(config.target_attr()).as_deref())
    {
        tracing::trace!(node = %node.id(), key = %key, "skipping untouched leaf");
        return;
    }

    match kind {
        NodeKind::Select => {
            if let Some(value) = node.selected_option_value() {
                out.insert_promoting(key, ExportValue::Scalar(value));
            }
        }
        NodeKind::Checkbox => {
            if node.is_checked() {
                out.push_to_list(key, ExportValue::Scalar(node.current_value().unwrap_or_default()));
            } else {
                out.ensure_list(key);
            }
        }
        NodeKind::Radio => {
            if node.is_checked() {
                out.insert_promoting(key, ExportValue::Scalar(node.current_value().unwrap_or_default()));
            }
        }
        NodeKind::TextInput | NodeKind::Other | NodeKind::Container => {
            out.insert_promoting(key, ExportValue::Scalar(node.current_value().unwrap_or_default()));
        }
    }
}
