#![forbid(unsafe_code)]

//! Core types for formtree.
//!
//! This crate defines the vocabulary shared by the export engine and any
//! concrete tree adapter:
//!
//! - [`FormNode`]: the capability set an external UI tree must expose.
//! - [`Config`]: recognized marker attribute names plus export options.
//! - [`ExportMap`] / [`ExportValue`]: the nested key-value output.
//! - [`ValidationReport`]: per-key presence violations.
//!
//! The core owns no tree. Nodes are handles into a tree owned elsewhere
//! (a browser document, a widget tree, or the in-memory harness tree).

pub mod config;
pub mod node;
pub mod output;
pub mod validation;

pub use config::{Config, ConfigOverrides, ExportOptions, Keywords, OptionOverrides, PartialKeywords};
#[cfg(feature = "config-files")]
pub use config::ConfigError;
pub use node::{ChangeCallback, FormNode, NodeId, NodeKind, marker_is_set};
pub use output::{ExportMap, ExportValue};
pub use validation::{ValidationReport, Violation};
