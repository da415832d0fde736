#![forbid(unsafe_code)]

//! Test harness and reference fixtures for formtree.
//!
//! - [`MemNode`]: an in-memory tree implementing [`formtree_core::FormNode`],
//!   with helpers that simulate user edits and change notifications.
//! - [`NodeFixture`]: JSON-described trees for demos and table tests.
//! - [`strategy`]: proptest strategies over arbitrary trees.
//! - [`assert_json_eq!`]: compare anything serializable against a
//!   `serde_json::json!` literal.

pub mod fixture;
pub mod mem;
pub mod strategy;

pub use fixture::{FixtureError, NodeFixture, tree_from_json};
pub use mem::MemNode;

#[doc(hidden)]
pub use serde_json;

/// Assert that a serializable value equals an expected JSON value.
///
/// ```
/// use formtree_harness::assert_json_eq;
/// use serde_json::json;
///
/// let tags = vec!["x", "y"];
/// assert_json_eq!(tags, json!(["x", "y"]));
/// ```
#[macro_export]
macro_rules! assert_json_eq {
    ($actual:expr, $expected:expr $(,)?) => {{
        let actual: $crate::serde_json::Value =
            $crate::serde_json::to_value(&$actual).expect("value serializes to JSON");
        let expected: $crate::serde_json::Value = $expected;
        if actual != expected {
            panic!(
                "JSON mismatch\n  actual:   {}\n  expected: {}",
                actual, expected
            );
        }
    }};
}
