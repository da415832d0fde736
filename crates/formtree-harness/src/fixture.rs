#![forbid(unsafe_code)]

//! Declarative tree fixtures.
//!
//! A fixture is a JSON description of a form tree:
//!
//! ```json
//! {
//!   "kind": "container",
//!   "key": "user",
//!   "children": [
//!     { "kind": "text-input", "key": "name", "value": "Ann", "required": true },
//!     { "kind": "checkbox", "key": "tags", "value": "x", "checked": true },
//!     { "kind": "select", "key": "size", "options": ["s", "m"], "selected": "m" }
//!   ]
//! }
//! ```
//!
//! `key`, `required`, and `target` use the default keyword names; `attrs`
//! sets arbitrary attributes (applied after the shorthands).

use std::collections::BTreeMap;

use formtree_core::NodeKind;
use serde::{Deserialize, Serialize};

use crate::mem::MemNode;

/// Errors from building a tree out of a fixture.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("invalid fixture JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("select {key:?} has no option {selected:?}")]
    UnknownOption { key: String, selected: String },
    #[error("options are only valid on select nodes (found on {0})")]
    OptionsOnNonSelect(NodeKind),
}

/// Serializable description of a node and its subtree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeFixture {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub target: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeFixture>,
}

impl NodeFixture {
    /// Parse a fixture from JSON.
    pub fn from_json_str(source: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Build the described tree.
    pub fn build(&self) -> Result<MemNode, FixtureError> {
        let mut node = match self.kind {
            NodeKind::Select => {
                let node = MemNode::new(NodeKind::Select);
                for option in &self.options {
                    node.push_child(MemNode::other(option));
                }
                if let Some(selected) = &self.selected
                    && !node.select_option(selected)
                {
                    return Err(FixtureError::UnknownOption {
                        key: self.key.clone().unwrap_or_default(),
                        selected: selected.clone(),
                    });
                }
                node
            }
            kind if !self.options.is_empty() => return Err(FixtureError::OptionsOnNonSelect(kind)),
            kind => MemNode::new(kind),
        };

        if let Some(key) = &self.key {
            node = node.key(key);
        }
        if let Some(value) = &self.value {
            node = node.value(value);
        }
        if self.checked {
            node = node.checked(true);
        }
        if self.required {
            node = node.required();
        }
        if self.target {
            node = node.target();
        }
        for (name, value) in &self.attrs {
            node = node.attr(name, value);
        }
        for child in &self.children {
            node.push_child(child.build()?);
        }
        Ok(node)
    }
}

/// Parse and build a tree from fixture JSON.
pub fn tree_from_json(source: &str) -> Result<MemNode, FixtureError> {
    NodeFixture::from_json_str(source)?.build()
}
