#![forbid(unsafe_code)]

//! Presence validation over required nodes.

use formtree_core::{Config, FormNode, ValidationReport, Violation, marker_is_set};

use crate::key::{control_value, resolve_key};

/// Report every keyed, required node under `root` (inclusive) whose value
/// is absent or empty.
pub(crate) fn validate<N: FormNode>(config: &Config, root: &N) -> ValidationReport {
    let _span = tracing::debug_span!("validate", root = %root.id()).entered();
    let mut report = ValidationReport::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        stack.extend(node.children().into_iter().rev());

        let Some(key) = resolve_key(&node, &config.keywords) else {
            continue;
        };
        if !marker_is_set(node.attribute(config.required_attr()).as_deref()) {
            continue;
        }
        let empty = control_value(&node).is_none_or(|value| value.is_empty());
        if empty {
            tracing::trace!(node = %node.id(), key = %key, "required value is empty");
            report.push(key, Violation::Empty);
        }
    }

    tracing::debug!(violations = report.len(), "validate complete");
    report
}
