use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use tabscan_core::ports::{
    ControlRole, NodeError, NodeFilter, NodeIdentity, NodeRef, ProbeOutcome, UiNode,
};

static NEXT_IDENTITY: AtomicI32 = AtomicI32::new(1);

/// Ordered record of the interaction calls a test triggered (`restore:`,
/// `select:`, `invoke:` entries). One journal is shared by a [`super::FakeDesktop`]
/// and every node attached to it.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn position_of(&self, entry: &str) -> Option<usize> {
        self.entries.lock().unwrap().iter().position(|e| e == entry)
    }
}

/// Handle for flipping a node stale after it was handed to the engine.
/// Every clone of the node shares the flag.
#[derive(Debug, Clone)]
pub struct StaleHandle(Arc<AtomicBool>);

impl StaleHandle {
    pub fn make_stale(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// One node of a scriptable accessibility tree.
///
/// Handing the node out (through `children` or a query) clones it into a
/// fresh reference, so two results for the same logical node are distinct
/// references sharing one identity, exactly what the real tree does.
#[derive(Debug, Clone)]
pub struct FakeNode {
    name: String,
    class: String,
    role: ControlRole,
    identity: NodeIdentity,
    selected: Option<bool>,
    invokable: bool,
    opaque: bool,
    stale: Arc<AtomicBool>,
    journal: CallJournal,
    children: Vec<FakeNode>,
}

impl FakeNode {
    pub fn new(role: ControlRole, class: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            class: class.to_string(),
            role,
            identity: NodeIdentity(vec![NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed)]),
            selected: None,
            invokable: false,
            opaque: false,
            stale: Arc::new(AtomicBool::new(false)),
            journal: CallJournal::new(),
            children: Vec::new(),
        }
    }

    /// A selection-capable tab item, the Chromium shape.
    pub fn tab(title: &str) -> Self {
        let mut node = Self::new(ControlRole::TabItem, "Tab", title);
        node.selected = Some(false);
        node
    }

    /// A tab-strip container.
    pub fn container(class: &str) -> Self {
        Self::new(ControlRole::Other, class, "")
    }

    /// A generic intermediate pane.
    pub fn pane(name: &str) -> Self {
        Self::new(ControlRole::Other, "Pane", name)
    }

    /// An invokable button.
    pub fn button(name: &str) -> Self {
        let mut node = Self::new(ControlRole::Button, "Button", name);
        node.invokable = true;
        node
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    /// Force a specific identity, for aliasing scenarios where two distinct
    /// node objects stand for one logical element.
    pub fn with_identity(mut self, identity: i32) -> Self {
        self.identity = NodeIdentity(vec![identity]);
        self
    }

    pub fn with_children(mut self, children: Vec<FakeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    /// Strip the selection capability and expose invocation instead, the
    /// shape of the invoke-only tab family.
    pub fn invoke_only(mut self) -> Self {
        self.selected = None;
        self.invokable = true;
        self
    }

    /// Drop every interaction capability.
    pub fn inert(mut self) -> Self {
        self.selected = None;
        self.invokable = false;
        self
    }

    /// Models the minimized-window provider behavior: descendant queries
    /// still match this node but never see past it; `children` keeps
    /// working.
    pub fn blocks_descendant_queries(mut self) -> Self {
        self.opaque = true;
        self
    }

    /// Start out stale.
    pub fn stale(self) -> Self {
        self.stale.store(true, Ordering::SeqCst);
        self
    }

    pub fn stale_handle(&self) -> StaleHandle {
        StaleHandle(self.stale.clone())
    }

    pub(crate) fn attach_journal(mut self, journal: &CallJournal) -> Self {
        self.journal = journal.clone();
        self.children = self
            .children
            .into_iter()
            .map(|child| child.attach_journal(journal))
            .collect();
        self
    }

    fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    fn to_ref(&self) -> NodeRef {
        Arc::new(self.clone())
    }
}

impl UiNode for FakeNode {
    fn name(&self) -> Result<String, NodeError> {
        if self.is_stale() {
            return Err(NodeError::Stale);
        }
        Ok(self.name.clone())
    }

    fn class_name(&self) -> Result<String, NodeError> {
        if self.is_stale() {
            return Err(NodeError::Stale);
        }
        Ok(self.class.clone())
    }

    fn role(&self) -> Result<ControlRole, NodeError> {
        if self.is_stale() {
            return Err(NodeError::Stale);
        }
        Ok(self.role)
    }

    fn identity(&self) -> Result<NodeIdentity, NodeError> {
        if self.is_stale() {
            return Err(NodeError::Stale);
        }
        Ok(self.identity.clone())
    }

    fn children(&self) -> Result<Vec<NodeRef>, NodeError> {
        if self.is_stale() {
            return Err(NodeError::Stale);
        }
        Ok(self.children.iter().map(FakeNode::to_ref).collect())
    }

    fn find_descendants(&self, filter: &NodeFilter) -> Result<Vec<NodeRef>, NodeError> {
        if self.is_stale() {
            return Err(NodeError::Stale);
        }

        // Depth-first document order, like the real provider. Matching
        // reads the node's recorded properties even when the node went
        // stale in the meantime; the failure then surfaces on first use.
        let mut matches = Vec::new();
        let mut stack: Vec<&FakeNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if filter.matches(node.role, &node.class, &node.name) {
                matches.push(node.to_ref());
            }
            if !node.opaque {
                for child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        Ok(matches)
    }

    fn find_children(&self, filter: &NodeFilter) -> Result<Vec<NodeRef>, NodeError> {
        if self.is_stale() {
            return Err(NodeError::Stale);
        }
        Ok(self
            .children
            .iter()
            .filter(|child| filter.matches(child.role, &child.class, &child.name))
            .map(|child| child.to_ref())
            .collect())
    }

    fn selected(&self) -> Result<Option<bool>, NodeError> {
        if self.is_stale() {
            return Err(NodeError::Stale);
        }
        Ok(self.selected)
    }

    fn select(&self) -> Result<ProbeOutcome, NodeError> {
        if self.is_stale() {
            return Err(NodeError::Stale);
        }
        if self.selected.is_none() {
            return Ok(ProbeOutcome::Unsupported);
        }
        self.journal.record(format!("select:{}", self.name));
        Ok(ProbeOutcome::Applied)
    }

    fn invoke(&self) -> Result<ProbeOutcome, NodeError> {
        if self.is_stale() {
            return Err(NodeError::Stale);
        }
        if !self.invokable {
            return Ok(ProbeOutcome::Unsupported);
        }
        self.journal.record(format!("invoke:{}", self.name));
        Ok(ProbeOutcome::Applied)
    }
}
