use tracing::{debug, trace};

use crate::config::Config;
use crate::domain::{BrowserWindow, Tab, TabId};
use crate::ports::{NodeError, NodeRef};

const PLACEHOLDER_TITLE: &str = "New Tab";
const BLANK_PAGE_MARKER: &str = "about:blank";

/// Validate one matched node and produce its [`Tab`] record.
///
/// Returns `None` for placeholder pages and for any node failure; a failure
/// here never aborts the surrounding traversal.
pub(crate) fn build_tab(
    node: NodeRef,
    window: &BrowserWindow,
    index: u32,
    config: &Config,
) -> Option<Tab> {
    let title = match node.name() {
        Ok(title) => title,
        Err(NodeError::Stale) => {
            trace!("node went stale while reading its title");
            return None;
        }
        Err(error) => {
            debug!(%error, "title read failed");
            return None;
        }
    };

    if title.is_empty() || title == PLACEHOLDER_TITLE || title.contains(BLANK_PAGE_MARKER) {
        trace!(title = %title, "placeholder tab skipped");
        return None;
    }

    // Selection is a capability probe: a node without the capability is a
    // perfectly valid tab that is simply not reported active.
    let active = match node.selected() {
        Ok(Some(selected)) => selected,
        Ok(None) => false,
        Err(NodeError::Stale) => {
            trace!(title = %title, "node went stale while reading selection");
            return None;
        }
        Err(error) => {
            debug!(title = %title, %error, "selection read failed");
            return None;
        }
    };

    let url_or_title = config.browsers.strip_title_suffix(&title).to_string();

    Some(Tab {
        id: TabId {
            pid: window.pid,
            index,
        },
        title,
        url_or_title,
        active,
        index,
        browser: window.browser,
        window: window.handle,
        minimized: window.minimized,
        node,
    })
}
