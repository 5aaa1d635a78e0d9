use std::fmt;

use super::{BrowserKind, ProcessId, WindowHandle};
use crate::ports::NodeRef;

/// Identifier for a tab within one discovery pass. Indexes are positional,
/// so an id stays unique only until windows or tabs change; refresh means
/// re-running discovery, not patching existing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId {
    pub pid: ProcessId,
    pub index: u32,
}

/// One discovered browser tab. Immutable after construction; the `node`
/// reference is borrowed from the OS and must be treated as invalidated
/// after any user-visible change to its window.
#[derive(Clone)]
pub struct Tab {
    pub id: TabId,
    /// Validated display title: never empty, never the new-tab placeholder.
    pub title: String,
    /// Title with its browser-name suffix stripped when one was present.
    pub url_or_title: String,
    /// Best-effort selection state; false when the node does not report one.
    pub active: bool,
    /// Zero-based position in the tab strip. Fixed to 0 for tabs found under
    /// a minimized window, where order is not derivable.
    pub index: u32,
    pub browser: BrowserKind,
    pub window: WindowHandle,
    pub minimized: bool,
    pub node: NodeRef,
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("url_or_title", &self.url_or_title)
            .field("active", &self.active)
            .field("index", &self.index)
            .field("browser", &self.browser)
            .field("window", &self.window)
            .field("minimized", &self.minimized)
            .finish_non_exhaustive()
    }
}
