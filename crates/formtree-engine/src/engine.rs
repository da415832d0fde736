#![forbid(unsafe_code)]

//! The export engine instance.
//!
//! An [`Engine`] owns its configuration and its tracked-node registry.
//! Engines are independent: two engines watching overlapping trees keep
//! separate registries and write whatever markers their own config names.
//!
//! # Lifecycle
//!
//! The stateless operations (`watch`, `validate`, `export`) take a root per
//! call. The attach / detach pair remembers one root for callers that want
//! the "attach once, export on demand" shape:
//!
//! ```
//! use formtree_engine::Engine;
//! use formtree_harness::MemNode;
//!
//! let name = MemNode::text("name", "Ann");
//! let form = MemNode::container().key("user").child(name.clone());
//!
//! let mut engine = Engine::new();
//! engine.attach(form, None).unwrap();
//! assert!(engine.export_attached().unwrap().is_empty());
//!
//! name.change_value("Bo");
//! let out = engine.export_attached().unwrap();
//! assert_eq!(out.to_string(), r#"{"user":{"name":"Bo"}}"#);
//!
//! assert!(engine.detach());
//! assert!(engine.export_attached().is_err());
//! ```

use core::fmt;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ahash::AHashSet;
use formtree_core::{Config, ConfigOverrides, ExportMap, FormNode, NodeId, ValidationReport};

use crate::error::EngineError;
use crate::{export, key, tracker, validate};

/// State shared between an engine and the observers it registered.
pub(crate) struct EngineState<N> {
    pub(crate) config: RefCell<Config>,
    pub(crate) tracked: RefCell<AHashSet<NodeId>>,
    /// Every root passed to `watch` this session, in call order.
    pub(crate) roots: RefCell<Vec<N>>,
    /// Bumped on detach; observers from older sessions ignore changes.
    pub(crate) session: Cell<u64>,
}

/// Dirty tracking, validation, and export over trees of `N`.
pub struct Engine<N: FormNode> {
    state: Rc<EngineState<N>>,
    root: Option<N>,
}

impl<N: FormNode> Default for Engine<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: FormNode> Engine<N> {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an engine with an explicit configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            state: Rc::new(EngineState {
                config: RefCell::new(config),
                tracked: RefCell::new(AHashSet::new()),
                roots: RefCell::new(Vec::new()),
                session: Cell::new(0),
            }),
            root: None,
        }
    }

    // ── Configuration ───────────────────────────────────────────────

    /// Replace the configuration with defaults plus `overrides`.
    ///
    /// Takes effect for the next `watch`, `validate`, or `export` call and
    /// for every observer that fires afterwards.
    pub fn configure(&self, overrides: &ConfigOverrides) {
        let config = Config::from_overrides(overrides);
        tracing::debug!(?config, "configure");
        self.set_config(config);
    }

    /// Replace the configuration wholesale.
    pub fn set_config(&self, config: Config) {
        *self.state.config.borrow_mut() = config;
    }

    /// Snapshot of the current configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        self.state.config.borrow().clone()
    }

    // ── Core operations ─────────────────────────────────────────────

    /// Export key of `node` under the current keywords.
    #[must_use]
    pub fn resolve_key(&self, node: &N) -> Option<String> {
        key::resolve_key(node, &self.state.config.borrow().keywords)
    }

    /// Attach one-shot change observers to every untracked value control
    /// under `root` (inclusive).
    ///
    /// Returns how many nodes were newly registered. Calling `watch` again on
    /// an overlapping subtree registers nothing twice. `root` joins the set of
    /// watched roots that checkbox group marking searches.
    pub fn watch(&self, root: &N) -> usize {
        tracker::watch(&self.state, root)
    }

    /// Apply the first-change marking rule to `node` directly.
    ///
    /// For adapters that deliver change notifications through their own
    /// channel instead of [`FormNode::on_change`]. Checkbox groups are
    /// resolved under every root watched this session. Returns how many
    /// nodes were marked.
    pub fn mark_changed(&self, node: &N) -> usize {
        let config = self.config();
        let roots = self.state.roots.borrow().clone();
        tracker::mark_changed(&config, node, &roots)
    }

    /// Number of distinct roots watched in the current session.
    #[must_use]
    pub fn watched_root_count(&self) -> usize {
        self.state.roots.borrow().len()
    }

    /// Whether `node` has an observer registered in the current session.
    #[must_use]
    pub fn is_tracked(&self, node: &N) -> bool {
        self.state.tracked.borrow().contains(&node.id())
    }

    /// Number of nodes registered in the current session.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.state.tracked.borrow().len()
    }

    /// Report required nodes under `root` (inclusive) with empty values.
    #[must_use]
    pub fn validate(&self, root: &N) -> ValidationReport {
        let config = self.config();
        validate::validate(&config, root)
    }

    /// Export `root` (inclusive) into a fresh nested map.
    #[must_use]
    pub fn export(&self, root: &N) -> ExportMap {
        let config = self.config();
        export::export(&config, root)
    }

    // ── Attach / detach ─────────────────────────────────────────────

    /// Configure (when `overrides` is given), watch `root`, and remember it.
    pub fn attach(&mut self, root: N, overrides: Option<&ConfigOverrides>) -> Result<(), EngineError> {
        if self.root.is_some() {
            tracing::warn!("attach called on an attached engine");
            return Err(EngineError::AlreadyAttached);
        }
        if let Some(overrides) = overrides {
            self.configure(overrides);
        }
        self.watch(&root);
        self.root = Some(root);
        Ok(())
    }

    /// Forget the attached root and disarm every pending observer.
    ///
    /// Markers already written stay on the tree. Returns `true` once the
    /// engine is detached, including when it was never attached.
    pub fn detach(&mut self) -> bool {
        if self.root.take().is_some() {
            tracing::debug!("detach");
        }
        self.state.tracked.borrow_mut().clear();
        self.state.roots.borrow_mut().clear();
        self.state.session.set(self.state.session.get().wrapping_add(1));
        self.root.is_none()
    }

    /// Whether a root is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.root.is_some()
    }

    /// The attached root, if any.
    #[must_use]
    pub fn attached_root(&self) -> Option<&N> {
        self.root.as_ref()
    }

    /// Export the attached root.
    pub fn export_attached(&self) -> Result<ExportMap, EngineError> {
        let root = self.root.as_ref().ok_or(EngineError::NotAttached)?;
        Ok(self.export(root))
    }

    /// Validate the attached root.
    pub fn validate_attached(&self) -> Result<ValidationReport, EngineError> {
        let root = self.root.as_ref().ok_or(EngineError::NotAttached)?;
        Ok(self.validate(root))
    }
}

impl<N: FormNode> fmt::Debug for Engine<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &*self.state.config.borrow())
            .field("tracked", &self.state.tracked.borrow().len())
            .field("roots", &self.state.roots.borrow().len())
            .field("session", &self.state.session.get())
            .field("attached", &self.root.as_ref().map(FormNode::id))
            .finish()
    }
}
