#![forbid(unsafe_code)]

//! Dirty tracking, presence validation, and nested export over form trees.
//!
//! The engine works against any tree that implements
//! [`formtree_core::FormNode`]. It never owns the tree; it reads attributes
//! and values through node handles and writes exactly one thing back: the
//! target marker on nodes the user has changed.
//!
//! # Operations
//!
//! | Operation | Effect on the tree | Result |
//! |-----------|--------------------|--------|
//! | [`Engine::watch`] | registers one-shot change observers | newly registered count |
//! | [`Engine::validate`] | none | [`ValidationReport`] |
//! | [`Engine::export`] | none | nested [`ExportMap`] |
//!
//! Changing a watched control marks it with the target attribute. A changed
//! checkbox marks its whole group (every node sharing its export key under the
//! watched root), so the group exports as one list.
//!
//! # Example
//!
//! ```
//! use formtree_engine::Engine;
//! use formtree_harness::MemNode;
//!
//! let name = MemNode::text("name", "Ann");
//! let city = MemNode::text("city", "Oslo");
//! let form = MemNode::container()
//!     .key("user")
//!     .with_children([name.clone(), city.clone()]);
//!
//! let engine = Engine::new();
//! engine.watch(&form);
//! city.change_value("Bergen");
//!
//! assert_eq!(engine.export(&form).to_string(), r#"{"user":{"city":"Bergen"}}"#);
//! ```

mod engine;
mod error;
mod export;
mod key;
mod tracker;
mod validate;

pub use engine::Engine;
pub use error::EngineError;
pub use key::resolve_key;

pub use formtree_core::{
    Config, ConfigOverrides, ExportMap, ExportValue, FormNode, Keywords, NodeId, NodeKind,
    ValidationReport, Violation,
};
