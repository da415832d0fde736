#![forbid(unsafe_code)]

//! In-memory reference tree implementing [`FormNode`].
//!
//! `MemNode` stands in for a browser document in tests and demos. Handles
//! share one `Rc<RefCell<..>>`, so a marker written by the engine through one
//! handle is visible through every clone.
//!
//! Attribute helpers (`key`, `required`, `target`) use the default keyword
//! names. Use [`MemNode::attr`] when testing custom keywords.
//!
//! # Simulating the user
//!
//! Mutators only change state. [`MemNode::fire_change`] delivers the change
//! notification, draining every pending one-shot callback. The combined
//! helpers (`change_value`, `toggle`, `choose`) do both.
//!
//! # Building trees
//!
//! ```
//! use formtree_harness::MemNode;
//!
//! let form = MemNode::container().key("user").with_children([
//!     MemNode::text("name", "Ann").required(),
//!     MemNode::checkbox("tags", "x", true),
//!     MemNode::checkbox("tags", "y", false),
//! ]);
//! assert_eq!(form.find_by_key("tags").len(), 2);
//! ```

use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use formtree_core::config::{DEFAULT_EXPORT_KEY_ATTR, DEFAULT_REQUIRED_ATTR, DEFAULT_TARGET_ATTR};
use formtree_core::{ChangeCallback, FormNode, NodeId, NodeKind, marker_is_set};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> NodeId {
    NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

struct Inner {
    id: NodeId,
    kind: NodeKind,
    attributes: Vec<(String, String)>,
    value: Option<String>,
    checked: bool,
    selected: Option<usize>,
    children: Vec<MemNode>,
    listeners: Vec<ChangeCallback>,
}

/// Handle to an in-memory form node.
#[derive(Clone)]
pub struct MemNode {
    inner: Rc<RefCell<Inner>>,
}

impl MemNode {
    /// Create a bare node of `kind`.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                id: next_id(),
                kind,
                attributes: Vec::new(),
                value: None,
                checked: false,
                selected: None,
                children: Vec::new(),
                listeners: Vec::new(),
            })),
        }
    }

    // ── Builders ────────────────────────────────────────────────────

    /// Key-less container.
    #[must_use]
    pub fn container() -> Self {
        Self::new(NodeKind::Container)
    }

    /// Keyed text input with a value.
    #[must_use]
    pub fn text(key: &str, value: &str) -> Self {
        Self::new(NodeKind::TextInput).key(key).value(value)
    }

    /// Keyed checkbox.
    #[must_use]
    pub fn checkbox(key: &str, value: &str, checked: bool) -> Self {
        Self::new(NodeKind::Checkbox)
            .key(key)
            .value(value)
            .checked(checked)
    }

    /// Keyed radio button.
    #[must_use]
    pub fn radio(key: &str, value: &str, checked: bool) -> Self {
        Self::new(NodeKind::Radio).key(key).value(value).checked(checked)
    }

    /// Keyed select whose options become `Other` children.
    ///
    /// `selected` picks an option by value; an unknown value selects nothing.
    #[must_use]
    pub fn select(key: &str, options: &[&str], selected: Option<&str>) -> Self {
        let node = Self::new(NodeKind::Select).key(key);
        for option in options {
            node.push_child(Self::new(NodeKind::Other).value(option));
        }
        if let Some(value) = selected {
            node.select_option(value);
        }
        node
    }

    /// Node of kind `Other` with a value.
    #[must_use]
    pub fn other(value: &str) -> Self {
        Self::new(NodeKind::Other).value(value)
    }

    /// Set the export key using the default keyword.
    #[must_use]
    pub fn key(self, key: &str) -> Self {
        self.attr(DEFAULT_EXPORT_KEY_ATTR, key)
    }

    /// Set an arbitrary attribute.
    #[must_use]
    pub fn attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Mark as required using the default keyword.
    #[must_use]
    pub fn required(self) -> Self {
        self.attr(DEFAULT_REQUIRED_ATTR, "")
    }

    /// Pre-set the target marker using the default keyword.
    #[must_use]
    pub fn target(self) -> Self {
        self.attr(DEFAULT_TARGET_ATTR, "true")
    }

    /// Set the value.
    #[must_use]
    pub fn value(self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    /// Set the checked state.
    #[must_use]
    pub fn checked(self, checked: bool) -> Self {
        self.set_checked(checked);
        self
    }

    /// Append one child.
    #[must_use]
    pub fn child(self, child: MemNode) -> Self {
        self.push_child(child);
        self
    }

    /// Append several children.
    #[must_use]
    pub fn with_children(self, children: impl IntoIterator<Item = MemNode>) -> Self {
        for child in children {
            self.push_child(child);
        }
        self
    }

    /// Append a child to an existing node.
    pub fn push_child(&self, child: MemNode) {
        self.inner.borrow_mut().children.push(child);
    }

    // ── Mutators ────────────────────────────────────────────────────

    /// Change the value without notifying.
    pub fn set_value(&self, value: &str) {
        self.inner.borrow_mut().value = Some(value.to_owned());
    }

    /// Clear the value without notifying.
    pub fn clear_value(&self) {
        self.inner.borrow_mut().value = None;
    }

    /// Change the checked state without notifying.
    pub fn set_checked(&self, checked: bool) {
        self.inner.borrow_mut().checked = checked;
    }

    /// Select the option child whose value is `value`.
    ///
    /// Returns `false` (and selects nothing) when no option matches.
    pub fn select_option(&self, value: &str) -> bool {
        let position = self
            .inner
            .borrow()
            .children
            .iter()
            .position(|option| option.current_value().as_deref() == Some(value));
        self.inner.borrow_mut().selected = position;
        position.is_some()
    }

    /// Deliver a change notification to every pending listener.
    ///
    /// Listeners are drained first, so each fires at most once. Returns how
    /// many fired.
    pub fn fire_change(&self) -> usize {
        let listeners = std::mem::take(&mut self.inner.borrow_mut().listeners);
        let fired = listeners.len();
        tracing::trace!(node = %self.id(), fired, "fire_change");
        for listener in listeners {
            listener();
        }
        fired
    }

    /// Set the value and notify.
    pub fn change_value(&self, value: &str) -> usize {
        self.set_value(value);
        self.fire_change()
    }

    /// Flip the checked state and notify.
    pub fn toggle(&self) -> usize {
        let checked = self.is_checked();
        self.set_checked(!checked);
        self.fire_change()
    }

    /// Select an option and notify.
    pub fn choose(&self, value: &str) -> usize {
        self.select_option(value);
        self.fire_change()
    }

    /// Drop pending listeners without firing them.
    pub fn clear_listeners(&self) {
        self.inner.borrow_mut().listeners.clear();
    }

    // ── Inspection ──────────────────────────────────────────────────

    /// Number of pending change listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Whether marker attribute `name` is set.
    #[must_use]
    pub fn has_marker(&self, name: &str) -> bool {
        marker_is_set(self.attribute(name).as_deref())
    }

    /// Whether the default target marker is set.
    #[must_use]
    pub fn is_target(&self) -> bool {
        self.has_marker(DEFAULT_TARGET_ATTR)
    }

    /// Remove an attribute.
    pub fn remove_attribute(&self, name: &str) {
        self.inner.borrow_mut().attributes.retain(|(n, _)| n != name);
    }

    /// This node and all descendants in pre-order.
    #[must_use]
    pub fn descendants(&self) -> Vec<MemNode> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }

    /// Nodes (pre-order) whose default export key equals `key`.
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Vec<MemNode> {
        self.descendants()
            .into_iter()
            .filter(|node| node.attribute(DEFAULT_EXPORT_KEY_ATTR).as_deref() == Some(key))
            .collect()
    }

    /// First node (pre-order) with the given default export key.
    #[must_use]
    pub fn first_by_key(&self, key: &str) -> Option<MemNode> {
        self.descendants()
            .into_iter()
            .find(|node| node.attribute(DEFAULT_EXPORT_KEY_ATTR).as_deref() == Some(key))
    }

    /// Whether two handles refer to the same node.
    #[must_use]
    pub fn same_node(&self, other: &MemNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl FormNode for MemNode {
    fn id(&self) -> NodeId {
        self.inner.borrow().id
    }

    fn kind(&self) -> NodeKind {
        self.inner.borrow().kind
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let mut inner = self.inner.borrow_mut();
        match inner.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => {
                value.clone_into(slot);
            }
            None => inner.attributes.push((name.to_owned(), value.to_owned())),
        }
    }

    fn children(&self) -> Vec<Self> {
        self.inner.borrow().children.clone()
    }

    fn current_value(&self) -> Option<String> {
        let inner = self.inner.borrow();
        if inner.kind == NodeKind::Select {
            drop(inner);
            return self.selected_option_value();
        }
        inner.value.clone()
    }

    fn is_checked(&self) -> bool {
        self.inner.borrow().checked
    }

    fn selected_option_value(&self) -> Option<String> {
        let inner = self.inner.borrow();
        let option = inner.children.get(inner.selected?)?;
        option.current_value()
    }

    fn on_change(&self, callback: ChangeCallback) {
        self.inner.borrow_mut().listeners.push(callback);
    }
}

impl fmt::Debug for MemNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemNode")
            .field("id", &inner.id)
            .field("kind", &inner.kind)
            .field("attributes", &inner.attributes)
            .field("value", &inner.value)
            .field("checked", &inner.checked)
            .field("children", &inner.children)
            .finish()
    }
}
