#![forbid(unsafe_code)]

//! Export key resolution.

use formtree_core::{FormNode, Keywords, NodeKind};

/// Read `node`'s export key.
///
/// Returns `None` when the attribute is unset or empty; such nodes are
/// transparent to export.
#[must_use]
pub fn resolve_key<N: FormNode>(node: &N, keywords: &Keywords) -> Option<String> {
    node.attribute(&keywords.export_key)
        .filter(|key| !key.is_empty())
}

/// The value a control currently holds.
///
/// Selects report their selected option; every other kind reports
/// `current_value()`.
pub(crate) fn control_value<N: FormNode>(node: &N) -> Option<String> {
    match node.kind() {
        NodeKind::Select => node.selected_option_value(),
        _ => node.current_value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_harness::MemNode;

    #[test]
    fn reads_configured_attribute() {
        let node = MemNode::text("email", "").attr("name", "contact");
        assert_eq!(resolve_key(&node, &Keywords::default()).as_deref(), Some("email"));

        let custom = Keywords {
            export_key: "name".into(),
            ..Keywords::default()
        };
        assert_eq!(resolve_key(&node, &custom).as_deref(), Some("contact"));
    }

    #[test]
    fn empty_or_missing_is_transparent() {
        let keywords = Keywords::default();
        assert_eq!(resolve_key(&MemNode::container(), &keywords), None);
        assert_eq!(resolve_key(&MemNode::container().key(""), &keywords), None);
    }

    #[test]
    fn select_value_comes_from_option() {
        let select = MemNode::select("size", &["s", "m"], Some("s"));
        assert_eq!(control_value(&select).as_deref(), Some("s"));
        assert_eq!(control_value(&MemNode::text("a", "v")).as_deref(), Some("v"));
        assert_eq!(control_value(&MemNode::container()), None);
    }
}
