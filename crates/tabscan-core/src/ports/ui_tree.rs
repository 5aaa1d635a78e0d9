use std::sync::Arc;

use thiserror::Error;

/// Failure of one operation on one accessibility-tree node.
///
/// Every [`UiNode`] method returns this uniformly. `Stale` is the expected
/// outcome when the underlying UI element disappeared between two calls; it
/// can show up at any time, including between two consecutive operations on
/// the same node, and is handled once at each call site rather than through
/// scattered catches.
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("référence d'élément périmée")]
    Stale,

    #[error("erreur du backend d'accessibilité: {message}")]
    Backend { message: String },
}

/// Control roles the engine distinguishes. Everything else collapses to
/// `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlRole {
    TabItem,
    Button,
    Other,
}

/// Accessible-name matcher used by structured queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    Exact(String),
    CaseInsensitive(String),
}

impl NameMatch {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Exact(expected) => name == expected,
            NameMatch::CaseInsensitive(expected) => name.eq_ignore_ascii_case(expected),
        }
    }
}

/// Structured predicate for descendant and direct-child queries. Every
/// populated field must match; `classes` and `names` each match any of
/// their entries.
#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    pub role: Option<ControlRole>,
    pub classes: Vec<String>,
    pub names: Vec<NameMatch>,
}

impl NodeFilter {
    pub fn role(role: ControlRole) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn classes(classes: Vec<String>) -> Self {
        Self {
            classes,
            ..Self::default()
        }
    }

    pub fn with_classes(mut self, classes: Vec<String>) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_names(mut self, names: Vec<NameMatch>) -> Self {
        self.names = names;
        self
    }

    /// Reference matching semantics; backends either call this directly or
    /// translate the filter into their native query language.
    pub fn matches(&self, role: ControlRole, class: &str, name: &str) -> bool {
        if let Some(expected) = self.role {
            if role != expected {
                return false;
            }
        }
        if !self.classes.is_empty() && !self.classes.iter().any(|known| known == class) {
            return false;
        }
        if !self.names.is_empty() && !self.names.iter().any(|matcher| matcher.matches(name)) {
            return false;
        }
        true
    }
}

/// Stable identity of one logical UI element, as provided by the tree
/// itself. Two in-process references may alias one identity, so
/// deduplication always goes through this key and never through reference
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeIdentity(pub Vec<i32>);

/// Outcome of a capability probe on a node. Absence of a capability is a
/// regular outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Applied,
    Unsupported,
}

/// Shared, non-owning reference into the OS accessibility tree.
pub type NodeRef = Arc<dyn UiNode>;

/// One element of the OS accessibility tree. The OS owns the element; this
/// trait only borrows it, so every method may report [`NodeError::Stale`].
pub trait UiNode: Send + Sync {
    /// The element's display name (a tab's title, a button's label).
    fn name(&self) -> Result<String, NodeError>;

    fn class_name(&self) -> Result<String, NodeError>;

    fn role(&self) -> Result<ControlRole, NodeError>;

    fn identity(&self) -> Result<NodeIdentity, NodeError>;

    /// Direct children, in tree order.
    fn children(&self) -> Result<Vec<NodeRef>, NodeError>;

    /// Descendant-scoped structured query (the element itself excluded).
    fn find_descendants(&self, filter: &NodeFilter) -> Result<Vec<NodeRef>, NodeError>;

    /// Direct-child-scoped structured query.
    fn find_children(&self, filter: &NodeFilter) -> Result<Vec<NodeRef>, NodeError>;

    /// Selection state; `Ok(None)` when the node exposes no selection
    /// capability.
    fn selected(&self) -> Result<Option<bool>, NodeError>;

    /// Apply the selection capability, if present.
    fn select(&self) -> Result<ProbeOutcome, NodeError>;

    /// Apply the generic invocation capability, if present.
    fn invoke(&self) -> Result<ProbeOutcome, NodeError>;
}
