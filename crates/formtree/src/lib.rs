#![forbid(unsafe_code)]

//! formtree: turn a tree of form controls into nested key-value data.
//!
//! This crate re-exports the workspace crates behind one dependency:
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `formtree-core` | node trait, config, output model |
//! | `formtree-engine` | watch / validate / export |
//! | `formtree-harness` | in-memory tree, as `harness` (feature `harness`) |
//!
//! Most callers only need the [`prelude`]:
//!
//! ```
//! use formtree::prelude::*;
//! use formtree_harness::MemNode;
//!
//! let email = MemNode::text("email", "").required();
//! let engine = Engine::new();
//! assert_eq!(engine.validate(&email).get("email"), Some(&[Violation::Empty][..]));
//! ```

#[cfg(feature = "harness")]
pub use formtree_harness as harness;

pub use formtree_core::{
    ChangeCallback, Config, ConfigOverrides, ExportMap, ExportOptions, ExportValue, FormNode,
    Keywords, NodeId, NodeKind, OptionOverrides, PartialKeywords, ValidationReport, Violation,
    marker_is_set,
};
#[cfg(feature = "config-files")]
pub use formtree_core::ConfigError;
pub use formtree_engine::{Engine, EngineError, resolve_key};

/// Common imports.
pub mod prelude {
    pub use crate::{
        Config, ConfigOverrides, Engine, EngineError, ExportMap, ExportValue, FormNode, Keywords,
        NodeKind, ValidationReport, Violation,
    };
}
