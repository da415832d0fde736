#![forbid(unsafe_code)]

//! Load a fixture tree, simulate user edits, and print what would be sent.
//!
//! ```text
//! formtree-demo fixtures/user_form.json --change name --change tags --validate
//! RUST_LOG=formtree_engine=trace formtree-demo fixtures/user_form.json --all-changed
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use formtree_core::{ConfigError, ConfigOverrides, FormNode, PartialKeywords};
use formtree_engine::{Engine, EngineError};
use formtree_harness::{FixtureError, MemNode, tree_from_json};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "formtree-demo")]
#[command(about = "Export a form fixture after simulated edits")]
struct Cli {
    /// Path to a JSON tree fixture
    fixture: PathBuf,
    /// JSON or TOML file with configuration overrides
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Fire a change on every value control with this export key (repeatable)
    #[arg(long = "change", value_name = "KEY")]
    changes: Vec<String>,
    /// Fire a change on every value control
    #[arg(long)]
    all_changed: bool,
    /// Include the validation report in the output
    #[arg(long)]
    validate: bool,
    /// Attribute holding the export key
    #[arg(long, value_name = "NAME")]
    key_attr: Option<String>,
    /// Attribute marking required nodes
    #[arg(long, value_name = "NAME")]
    required_attr: Option<String>,
    /// Attribute written on changed nodes
    #[arg(long, value_name = "NAME")]
    target_attr: Option<String>,
}

impl Cli {
    fn keyword_overrides(&self) -> PartialKeywords {
        PartialKeywords {
            export_key: self.key_attr.clone(),
            required: self.required_attr.clone(),
            target: self.target_attr.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("cannot render output: {0}")]
    Render(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli).and_then(|value| Ok(serde_json::to_string_pretty(&value)?)) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Value, DemoError> {
    let root = load_fixture(&cli.fixture)?;
    let mut overrides = cli
        .config
        .as_deref()
        .map(ConfigOverrides::load)
        .transpose()?
        .unwrap_or_default();
    let partial = cli.keyword_overrides();
    if !partial.is_empty() {
        let keywords = overrides.keywords.take().unwrap_or_default();
        overrides.keywords = Some(keywords.with_overrides(&partial));
    }

    let mut engine = Engine::new();
    engine.attach(root.clone(), Some(&overrides))?;

    let fired = simulate_changes(&engine, &root, &cli.changes, cli.all_changed);
    tracing::info!(fired, "simulated changes");

    let export = engine.export_attached()?;
    let output = if cli.validate {
        json!({
            "export": export.to_json(),
            "validation": engine.validate_attached()?.to_json(),
        })
    } else {
        export.to_json()
    };

    engine.detach();
    for node in root.descendants() {
        node.clear_listeners();
    }
    Ok(output)
}

fn load_fixture(path: &Path) -> Result<MemNode, DemoError> {
    let source = std::fs::read_to_string(path).map_err(|source| DemoError::Read {
        path: path.to_owned(),
        source,
    })?;
    Ok(tree_from_json(&source)?)
}

/// Fire change notifications on matching value controls. Returns how many
/// controls were notified.
fn simulate_changes(engine: &Engine<MemNode>, root: &MemNode, keys: &[String], all: bool) -> usize {
    let mut seen = vec![false; keys.len()];
    let mut fired = 0usize;

    for node in root.descendants() {
        if !node.kind().is_value_control() || !engine.is_tracked(&node) {
            continue;
        }
        let key = engine.resolve_key(&node);
        let position = key
            .as_deref()
            .and_then(|key| keys.iter().position(|wanted| wanted == key));
        if let Some(i) = position {
            seen[i] = true;
        }
        if all || position.is_some() {
            node.fire_change();
            fired += 1;
        }
    }

    for (key, _) in keys.iter().zip(&seen).filter(|(_, seen)| !**seen) {
        tracing::warn!(key = %key, "no value control with this key");
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/user_form.json")
    }

    fn cli(args: &[&str]) -> Cli {
        let fixture = fixture_path();
        let mut argv = vec!["formtree-demo", fixture.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn nothing_changed_exports_nothing() {
        assert_eq!(run(&cli(&[])).unwrap(), json!({}));
    }

    #[test]
    fn changed_keys_are_exported() {
        let out = run(&cli(&["--change", "name", "--change", "tags", "--change", "city"])).unwrap();
        assert_eq!(
            out,
            json!({"user": {"name": "Ann", "tags": ["x", "z"], "address": {"city": "Oslo"}}})
        );
    }

    #[test]
    fn all_changed_with_validation() {
        let out = run(&cli(&["--all-changed", "--validate"])).unwrap();
        assert_eq!(
            out,
            json!({
                "export": {"user": {
                    "name": "Ann",
                    "email": "",
                    "tags": ["x", "z"],
                    "plan": "pro",
                    "size": "m",
                    "address": {"city": "Oslo", "zip": ""},
                }},
                "validation": {"email": ["empty"]},
            })
        );
    }

    #[test]
    fn config_file_overrides_gate() {
        let config = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/export_all.toml");
        let out = run(&cli(&["--config", config.to_str().unwrap()])).unwrap();
        assert_eq!(out["user"]["address"], json!({"city": "Oslo", "zip": ""}));
        assert_eq!(out["user"]["plan"], json!("pro"));
    }

    #[test]
    fn json_config_renames_keywords() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"keywords": {{"exportKey": "name"}}, "options": {{"exportOnlyTarget": false}}}}"#).unwrap();
        let out = run(&cli(&["--config", file.path().to_str().unwrap()])).unwrap();
        assert_eq!(out, json!({}));
    }

    #[test]
    fn keyword_flags_override_config_file() {
        let config = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/export_all.toml");
        let out = run(&cli(&[
            "--config",
            config.to_str().unwrap(),
            "--key-attr",
            "data-field",
            "--target-attr",
            "",
        ]))
        .unwrap();
        assert_eq!(out, json!({}));
    }

    #[test]
    fn missing_fixture_is_an_error() {
        let cli = Cli::try_parse_from(["formtree-demo", "/no/such/fixture.json"]).unwrap();
        assert!(matches!(run(&cli), Err(DemoError::Read { .. })));
    }

    #[test]
    fn bad_config_extension_is_an_error() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = run(&cli(&["--config", file.path().to_str().unwrap()])).unwrap_err();
        assert!(matches!(err, DemoError::Config(_)));
    }
}
