#![forbid(unsafe_code)]

//! Nested key-value output produced by export.
//!
//! The output is a plain mapping / sequence / scalar structure, so it
//! serializes losslessly to JSON (or any serde format).
//!
//! # Invariants
//!
//! 1. **Document order**: keys iterate in first-insertion order, which is the
//!    order the traversal encountered them.
//! 2. **No silent overwrite**: [`ExportMap::insert_promoting`] never replaces
//!    an existing value. A second contribution at the same key turns the
//!    value into a list (promotion).
//! 3. **Lists are flat**: promotion never nests a list inside a list; a
//!    second value at a list key is pushed onto it.

use core::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

/// A single exported value.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportValue {
    /// A leaf value.
    Scalar(String),
    /// Checkbox group values, repeated leaves, or repeated keyed containers.
    List(Vec<ExportValue>),
    /// A keyed container's contributions.
    Map(ExportMap),
}

impl ExportValue {
    /// Scalar contents, if this is a scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// List contents, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[ExportValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Nested map, if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&ExportMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Scalar(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Map(map) => map.to_json(),
        }
    }
}

impl From<String> for ExportValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for ExportValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<ExportMap> for ExportValue {
    fn from(map: ExportMap) -> Self {
        Self::Map(map)
    }
}

/// Insertion-ordered mapping from export key to value.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportMap {
    entries: IndexMap<String, ExportValue>,
}

impl ExportMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ExportValue> {
        self.entries.get(key)
    }

    /// Whether the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExportValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert `value` at `key`, promoting on collision.
    ///
    /// - absent: inserted as is.
    /// - existing list: `value` is pushed.
    /// - existing scalar or map: promoted to a one-element list, then
    ///   `value` is pushed.
    pub fn insert_promoting(&mut self, key: impl Into<String>, value: ExportValue) {
        match self.entries.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                ExportValue::List(items) => items.push(value),
                existing => {
                    let previous = core::mem::replace(existing, ExportValue::List(Vec::new()));
                    *existing = ExportValue::List(vec![previous, value]);
                }
            },
        }
    }

    /// Make sure `key` holds a list.
    ///
    /// An absent key becomes an empty list; a scalar or map is promoted to a
    /// one-element list.
    pub fn ensure_list(&mut self, key: impl Into<String>) {
        self.update_list(key.into(), |_| {});
    }

    /// Append `value` to the list at `key`, creating or promoting it first
    /// as [`ExportMap::ensure_list`] does.
    pub fn push_to_list(&mut self, key: impl Into<String>, value: ExportValue) {
        self.update_list(key.into(), |items| items.push(value));
    }

    fn update_list(&mut self, key: String, update: impl FnOnce(&mut Vec<ExportValue>)) {
        let slot = self
            .entries
            .entry(key)
            .or_insert_with(|| ExportValue::List(Vec::new()));
        let mut items = match core::mem::replace(slot, ExportValue::List(Vec::new())) {
            ExportValue::List(items) => items,
            previous => vec![previous],
        };
        update(&mut items);
        *slot = ExportValue::List(items);
    }

    /// Convert to a `serde_json::Value` object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ExportMap {
    type Item = (&'a String, &'a ExportValue);
    type IntoIter = indexmap::map::Iter<'a, String, ExportValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ExportMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_into_empty() {
        let mut map = ExportMap::new();
        map.insert_promoting("name", "Ann".into());
        assert_eq!(map.get("name").and_then(ExportValue::as_str), Some("Ann"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn scalar_collision_promotes() {
        let mut map = ExportMap::new();
        map.insert_promoting("phone", "111".into());
        map.insert_promoting("phone", "222".into());
        map.insert_promoting("phone", "333".into());
        assert_eq!(map.to_json(), json!({"phone": ["111", "222", "333"]}));
    }

    #[test]
    fn map_collision_promotes() {
        let mut row = ExportMap::new();
        row.insert_promoting("qty", "1".into());
        let mut other = ExportMap::new();
        other.insert_promoting("qty", "2".into());

        let mut map = ExportMap::new();
        map.insert_promoting("rows", row.into());
        map.insert_promoting("rows", other.into());
        assert_eq!(map.to_json(), json!({"rows": [{"qty": "1"}, {"qty": "2"}]}));
    }

    #[test]
    fn ensure_list_creates_and_promotes() {
        let mut map = ExportMap::new();
        map.ensure_list("tags");
        assert_eq!(map.to_json(), json!({"tags": []}));
        map.push_to_list("tags", "x".into());
        map.ensure_list("tags");
        assert_eq!(map.to_json(), json!({"tags": ["x"]}));

        map.insert_promoting("solo", "a".into());
        map.push_to_list("solo", "b".into());
        assert_eq!(map.get("solo").unwrap().to_json(), json!(["a", "b"]));
    }

    #[test]
    fn list_helpers_promote_maps_without_loss() {
        let mut row = ExportMap::new();
        row.insert_promoting("qty", "1".into());

        let mut map = ExportMap::new();
        map.insert_promoting("rows", row.into());
        map.ensure_list("rows");
        assert_eq!(map.to_json(), json!({"rows": [{"qty": "1"}]}));

        map.push_to_list("fresh", "x".into());
        assert_eq!(map.get("fresh").and_then(ExportValue::as_list).map(<[_]>::len), Some(1));
    }

    #[test]
    fn keys_keep_document_order() {
        let mut map = ExportMap::new();
        for key in ["zeta", "alpha", "mid"] {
            map.insert_promoting(key, "v".into());
        }
        assert_eq!(map.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
        assert_eq!(map.to_string(), r#"{"zeta":"v","alpha":"v","mid":"v"}"#);
    }

    #[test]
    fn serde_shape_is_plain_json() {
        let mut inner = ExportMap::new();
        inner.insert_promoting("name", "Ann".into());
        inner.push_to_list("tags", "x".into());
        let mut map = ExportMap::new();
        map.insert_promoting("user", inner.into());

        let encoded = serde_json::to_value(&map).unwrap();
        assert_eq!(encoded, json!({"user": {"name": "Ann", "tags": ["x"]}}));
        assert_eq!(encoded, map.to_json());

        let decoded: ExportMap = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, map);
    }

    mod promotion {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn no_value_is_lost(writes in proptest::collection::vec(("[ab]", "[a-z]{0,3}"), 0..24)) {
                let mut map = ExportMap::new();
                for (key, value) in &writes {
                    map.insert_promoting(key.as_str(), ExportValue::Scalar(value.clone()));
                }
                for key in ["a", "b"] {
                    let expected: Vec<&str> = writes
                        .iter()
                        .filter(|(k, _)| k == key)
                        .map(|(_, v)| v.as_str())
                        .collect();
                    let stored: Vec<&str> = match map.get(key) {
                        None => Vec::new(),
                        Some(ExportValue::Scalar(v)) => vec![v.as_str()],
                        Some(ExportValue::List(items)) => {
                            items.iter().filter_map(ExportValue::as_str).collect()
                        }
                        Some(ExportValue::Map(_)) => unreachable!(),
                    };
                    prop_assert_eq!(stored, expected);
                }
            }
        }
    }
}
