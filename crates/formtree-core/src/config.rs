#![forbid(unsafe_code)]

//! Engine configuration: marker attribute names and export options.
//!
//! A [`Config`] is rebuilt wholesale on every `configure` call from
//! [`ConfigOverrides`]:
//!
//! - `keywords`, when present, replaces the whole [`Keywords`] record.
//! - each field of `options` that is present replaces only that option;
//!   absent fields keep their defaults.
//!
//! Attribute names are never validated. A name that matches nothing simply
//! makes every lookup miss, which surfaces as an empty export.
//!
//! # File-based overrides
//!
//! With the `config-files` feature, overrides can be loaded from JSON or
//! TOML:
//!
//! ```toml
//! [keywords]
//! exportKey = "data-field"
//! required = "data-mandatory"
//!
//! [options]
//! exportOnlyTarget = false
//! ```

use serde::{Deserialize, Serialize};

/// Default attribute holding a node's export key.
pub const DEFAULT_EXPORT_KEY_ATTR: &str = "data-key";
/// Default attribute marking a node as required.
pub const DEFAULT_REQUIRED_ATTR: &str = "data-required";
/// Default attribute the dirty tracker writes on changed nodes.
pub const DEFAULT_TARGET_ATTR: &str = "data-modified";

// =============================================================================
// Keywords
// =============================================================================

/// Names of the attributes the engine reads and writes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Keywords {
    /// Attribute holding the export key.
    /// Default: `data-key`
    #[serde(alias = "dataKey")]
    pub export_key: String,

    /// Attribute marking a node as required.
    /// Default: `data-required`
    #[serde(alias = "dataRequired")]
    pub required: String,

    /// Attribute written by the dirty tracker.
    /// Default: `data-modified`
    #[serde(alias = "dataModified")]
    pub target: String,
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            export_key: DEFAULT_EXPORT_KEY_ATTR.to_owned(),
            required: DEFAULT_REQUIRED_ATTR.to_owned(),
            target: DEFAULT_TARGET_ATTR.to_owned(),
        }
    }
}

impl Keywords {
    /// Apply a partial override. Missing or empty names keep the current value.
    #[must_use]
    pub fn with_overrides(mut self, partial: &PartialKeywords) -> Self {
        fn pick(slot: &mut String, candidate: Option<&String>) {
            if let Some(name) = candidate.filter(|n| !n.is_empty()) {
                slot.clone_from(name);
            }
        }
        pick(&mut self.export_key, partial.export_key.as_ref());
        pick(&mut self.required, partial.required.as_ref());
        pick(&mut self.target, partial.target.as_ref());
        self
    }
}

/// Keyword override where each name is optional.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialKeywords {
    #[serde(alias = "dataKey")]
    pub export_key: Option<String>,
    #[serde(alias = "dataRequired")]
    pub required: Option<String>,
    #[serde(alias = "dataModified")]
    pub target: Option<String>,
}

impl PartialKeywords {
    /// Whether no name is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.export_key.is_none() && self.required.is_none() && self.target.is_none()
    }
}

// =============================================================================
// Options
// =============================================================================

/// Behavior switches for export.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// Only export leaves carrying the target marker.
    /// Default: true
    pub export_only_target: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            export_only_target: true,
        }
    }
}

/// Shallow option override: only `Some` fields change.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionOverrides {
    pub export_only_target: Option<bool>,
}

impl OptionOverrides {
    fn merge_onto(self, mut base: ExportOptions) -> ExportOptions {
        if let Some(only_target) = self.export_only_target {
            base.export_only_target = only_target;
        }
        base
    }
}

// =============================================================================
// Config
// =============================================================================

/// Caller-supplied configuration overrides.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOverrides {
    /// Full replacement for the keyword set.
    pub keywords: Option<Keywords>,
    /// Shallow option overrides.
    pub options: OptionOverrides,
}

impl ConfigOverrides {
    /// Override only the keyword set.
    #[must_use]
    pub fn keywords(keywords: Keywords) -> Self {
        Self {
            keywords: Some(keywords),
            options: OptionOverrides::default(),
        }
    }

    /// Override only `export_only_target`.
    #[must_use]
    pub fn export_only_target(value: bool) -> Self {
        Self {
            keywords: None,
            options: OptionOverrides {
                export_only_target: Some(value),
            },
        }
    }

    /// Builder-style variant of [`ConfigOverrides::export_only_target`].
    #[must_use]
    pub fn with_export_only_target(mut self, value: bool) -> Self {
        self.options.export_only_target = Some(value);
        self
    }
}

/// Resolved engine configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub keywords: Keywords,
    pub options: ExportOptions,
}

impl Config {
    /// Build a config from defaults plus `overrides`.
    #[must_use]
    pub fn from_overrides(overrides: &ConfigOverrides) -> Self {
        Self {
            keywords: overrides.keywords.clone().unwrap_or_default(),
            options: overrides.options.merge_onto(ExportOptions::default()),
        }
    }

    /// Attribute holding the export key.
    #[must_use]
    pub fn export_key_attr(&self) -> &str {
        &self.keywords.export_key
    }

    /// Attribute marking a node as required.
    #[must_use]
    pub fn required_attr(&self) -> &str {
        &self.keywords.required
    }

    /// Attribute written by the dirty tracker.
    #[must_use]
    pub fn target_attr(&self) -> &str {
        &self.keywords.target
    }

    /// Whether export is gated on the target marker.
    #[must_use]
    pub fn export_only_target(&self) -> bool {
        self.options.export_only_target
    }
}

// =============================================================================
// File loading
// =============================================================================

#[cfg(feature = "config-files")]
mod file {
    use std::path::{Path, PathBuf};

    use super::ConfigOverrides;

    /// Errors from loading configuration overrides.
    #[derive(Debug, thiserror::Error)]
    pub enum ConfigError {
        #[error("failed to read config file {}: {source}", .path.display())]
        Io {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("invalid JSON config: {0}")]
        Json(#[from] serde_json::Error),
        #[error("invalid TOML config: {0}")]
        Toml(#[from] toml::de::Error),
        #[error("unsupported config format for {} (expected .json or .toml)", .0.display())]
        UnsupportedFormat(PathBuf),
    }

    impl ConfigOverrides {
        /// Parse overrides from a JSON document.
        pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
            Ok(serde_json::from_str(source)?)
        }

        /// Parse overrides from a TOML document.
        pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
            Ok(toml::from_str(source)?)
        }

        /// Load overrides from a `.json` or `.toml` file.
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            let path = path.as_ref();
            let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            match path.extension().and_then(|ext| ext.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&source),
                Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&source),
                _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
            }
        }
    }
}

#[cfg(feature = "config-files")]
pub use file::ConfigError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.export_key_attr(), "data-key");
        assert_eq!(config.required_attr(), "data-required");
        assert_eq!(config.target_attr(), "data-modified");
        assert!(config.export_only_target());
    }

    #[test]
    fn keywords_replace_whole_set() {
        let overrides = ConfigOverrides::keywords(Keywords {
            export_key: "name".into(),
            required: "req".into(),
            target: "dirty".into(),
        });
        let config = Config::from_overrides(&overrides);
        assert_eq!(config.export_key_attr(), "name");
        assert_eq!(config.required_attr(), "req");
        assert_eq!(config.target_attr(), "dirty");
        // Options untouched.
        assert!(config.export_only_target());
    }

    #[test]
    fn options_merge_shallowly() {
        let config = Config::from_overrides(&ConfigOverrides::export_only_target(false));
        assert!(!config.export_only_target());
        assert_eq!(config.keywords, Keywords::default());
    }

    #[test]
    fn each_call_starts_from_defaults() {
        let first = Config::from_overrides(
            &ConfigOverrides::keywords(Keywords {
                export_key: "k".into(),
                ..Keywords::default()
            })
            .with_export_only_target(false),
        );
        assert_eq!(first.export_key_attr(), "k");

        let second = Config::from_overrides(&ConfigOverrides::default());
        assert_eq!(second, Config::default());
    }

    #[test]
    fn partial_keywords_ignore_empty() {
        let partial = PartialKeywords {
            export_key: Some(String::new()),
            required: Some("must".into()),
            target: None,
        };
        let keywords = Keywords::default().with_overrides(&partial);
        assert_eq!(keywords.export_key, "data-key");
        assert_eq!(keywords.required, "must");
        assert_eq!(keywords.target, "data-modified");
        assert!(!partial.is_empty());
        assert!(PartialKeywords::default().is_empty());
    }

    #[test]
    fn nonsense_names_are_accepted() {
        let overrides = ConfigOverrides::keywords(Keywords {
            export_key: "]]not an attribute[[".into(),
            ..Keywords::default()
        });
        let config = Config::from_overrides(&overrides);
        assert_eq!(config.export_key_attr(), "]]not an attribute[[");
    }

    #[test]
    fn deserialize_with_legacy_names() {
        let overrides: ConfigOverrides = serde_json::from_str(
            r#"{"keywords":{"dataKey":"name"},"options":{"exportOnlyTarget":false}}"#,
        )
        .unwrap();
        let config = Config::from_overrides(&overrides);
        assert_eq!(config.export_key_attr(), "name");
        assert_eq!(config.required_attr(), "data-required");
        assert!(!config.export_only_target());
    }

    #[cfg(feature = "config-files")]
    mod files {
        use super::super::*;
        use std::io::Write;

        #[test]
        fn toml_overrides() {
            let overrides = ConfigOverrides::from_toml_str(
                "[keywords]\nexportKey = \"field\"\n\n[options]\nexportOnlyTarget = false\n",
            )
            .unwrap();
            let config = Config::from_overrides(&overrides);
            assert_eq!(config.export_key_attr(), "field");
            assert!(!config.export_only_target());
        }

        #[test]
        fn load_by_extension() {
            let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
            write!(file, r#"{{"options":{{"exportOnlyTarget":false}}}}"#).unwrap();
            let overrides = ConfigOverrides::load(file.path()).unwrap();
            assert_eq!(overrides.options.export_only_target, Some(false));
            assert!(overrides.keywords.is_none());
        }

        #[test]
        fn unknown_extension_rejected() {
            let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
            let err = ConfigOverrides::load(file.path()).unwrap_err();
            assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
        }

        #[test]
        fn missing_file_is_io_error() {
            let err = ConfigOverrides::load("/definitely/not/here.json").unwrap_err();
            assert!(matches!(err, ConfigError::Io { .. }));
            assert!(err.to_string().contains("/definitely/not/here.json"));
        }

        #[test]
        fn malformed_json_reported() {
            let err = ConfigOverrides::from_json_str("{not json").unwrap_err();
            assert!(matches!(err, ConfigError::Json(_)));
        }
    }
}
