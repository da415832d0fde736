#![forbid(unsafe_code)]

//! Presence validation results.

use core::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single validation failure kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Violation {
    /// A required node has no value.
    Empty,
}

impl Violation {
    /// Tag used in serialized reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Violations per export key, in the order keys were first reported.
///
/// Each key lists a violation at most once.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    entries: IndexMap<String, Vec<Violation>>,
}

impl ValidationReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `violation` for `key`. Duplicates are ignored.
    pub fn push(&mut self, key: impl Into<String>, violation: Violation) {
        let list = self.entries.entry(key.into()).or_default();
        if !list.contains(&violation) {
            list.push(violation);
        }
    }

    /// Violations for `key`, if any were recorded.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[Violation]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Whether nothing was reported.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys with violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Same as [`ValidationReport::is_valid`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys with their violations.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Violation])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Convert to a `serde_json::Value` object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(key, violations)| {
                    let tags = violations
                        .iter()
                        .map(|v| serde_json::Value::String(v.as_str().to_owned()))
                        .collect();
                    (key.clone(), serde_json::Value::Array(tags))
                })
                .collect(),
        )
    }
}
