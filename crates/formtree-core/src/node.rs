#![forbid(unsafe_code)]

//! Node capability set consumed by the export engine.
//!
//! A [`FormNode`] is a cheap handle into a tree owned by an external
//! collaborator. The engine only reads structure and values, and only writes
//! the marker attributes it is configured to use.
//!
//! # Invariants
//!
//! 1. **Acyclic**: `children()` never yields an ancestor of `self`.
//! 2. **Stable identity**: two handles to the same node return the same
//!    [`NodeId`] for the node's whole lifetime.
//! 3. **Shared state**: cloning a handle does not clone the node;
//!    `set_attribute` through any clone is visible through every other.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing attribute | Marker never written | `attribute()` returns `None` |
//! | No value | Container or unset control | `current_value()` returns `None` |
//! | Nothing selected | Select with no selection | `selected_option_value()` returns `None` |

use core::fmt;

use serde::{Deserialize, Serialize};

/// One-shot change notification callback.
///
/// Adapters invoke a registered callback at most once, on the first value
/// change observed after registration, and then drop it.
pub type ChangeCallback = Box<dyn FnOnce()>;

/// Stable identity of a node within its tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The role a node plays in a form.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Grouping element (a `div`, a fieldset, a widget panel).
    #[default]
    Container,
    /// Free-form scalar input (text, email, textarea, ...).
    TextInput,
    /// Checkbox; same-keyed checkboxes form a group exported as a list.
    Checkbox,
    /// Radio button; same-keyed radios export the checked member only.
    Radio,
    /// Single-choice select; option children are not traversed.
    Select,
    /// Anything else. Treated as a scalar leaf when it has no children.
    Other,
}

impl NodeKind {
    /// Whether this kind carries a user-editable value.
    ///
    /// Value controls are leaves for export purposes even when they have
    /// structural children (a select's options).
    #[must_use]
    pub const fn is_value_control(self) -> bool {
        matches!(
            self,
            Self::TextInput | Self::Checkbox | Self::Radio | Self::Select
        )
    }

    /// Lowercase name used by fixtures and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::TextInput => "text-input",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability set an external tree exposes to the engine.
///
/// Handles are `Clone` and use interior mutability, mirroring DOM element
/// handles: `set_attribute` and `on_change` take `&self`.
pub trait FormNode: Clone + 'static {
    /// Stable identity of the underlying node.
    fn id(&self) -> NodeId;

    /// Role of the node.
    fn kind(&self) -> NodeKind;

    /// Read an attribute by name.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Write an attribute by name.
    fn set_attribute(&self, name: &str, value: &str);

    /// Ordered children, in document order.
    fn children(&self) -> Vec<Self>;

    /// Current value of a control. `None` for nodes without a value.
    fn current_value(&self) -> Option<String>;

    /// Checked state. Only meaningful for checkboxes and radios.
    fn is_checked(&self) -> bool;

    /// Value of the selected option. Only meaningful for selects.
    fn selected_option_value(&self) -> Option<String>;

    /// Register a one-shot change notification.
    fn on_change(&self, callback: ChangeCallback);
}

/// Marker attribute truthiness.
///
/// A marker is set when present and not the literal `"false"` (ASCII
/// case-insensitive). An empty value counts as set, like an HTML boolean
/// attribute.
#[must_use]
pub fn marker_is_set(value: Option<&str>) -> bool {
    match value {
        Some(v) => !v.trim().eq_ignore_ascii_case("false"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_controls() {
        assert!(NodeKind::TextInput.is_value_control());
        assert!(NodeKind::Checkbox.is_value_control());
        assert!(NodeKind::Radio.is_value_control());
        assert!(NodeKind::Select.is_value_control());
        assert!(!NodeKind::Container.is_value_control());
        assert!(!NodeKind::Other.is_value_control());
    }

    #[test]
    fn kind_names() {
        assert_eq!(NodeKind::TextInput.to_string(), "text-input");
        assert_eq!(NodeKind::default(), NodeKind::Container);
    }

    #[test]
    fn marker_truthiness() {
        assert!(!marker_is_set(None));
        assert!(marker_is_set(Some("")));
        assert!(marker_is_set(Some("true")));
        assert!(marker_is_set(Some("required")));
        assert!(!marker_is_set(Some("false")));
        assert!(!marker_is_set(Some("FALSE")));
        assert!(!marker_is_set(Some(" false ")));
    }

    #[test]
    fn kind_serde_names_match_display() {
        for kind in [
            NodeKind::Container,
            NodeKind::TextInput,
            NodeKind::Checkbox,
            NodeKind::Radio,
            NodeKind::Select,
            NodeKind::Other,
        ] {
            let encoded = serde_json::to_value(kind).unwrap();
            assert_eq!(encoded, serde_json::Value::String(kind.to_string()));
        }
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId(7).to_string(), "#7");
    }
}
