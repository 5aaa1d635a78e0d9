use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::domain::{BrowserWindow, WindowHandle};
use crate::ports::{DesktopPort, WindowState};

/// List every top-level window owned by an allow-listed browser process. A
/// window qualifies when its title is non-empty and its process image name
/// matches the allow-list; one process with several windows yields one
/// entry per window.
pub(crate) fn browser_windows(
    desktop: &dyn DesktopPort,
    config: &Config,
    cancel: &CancelToken,
) -> Vec<BrowserWindow> {
    let mut windows = Vec::new();

    for handle in desktop.list_windows() {
        if cancel.is_cancelled() {
            return Vec::new();
        }

        let Some(title) = desktop.window_title(handle) else {
            continue;
        };
        if title.is_empty() {
            continue;
        }

        let Some(pid) = desktop.window_process(handle) else {
            continue;
        };

        // The process can exit between the pid capture above and the name
        // lookup below; that window is silently dropped.
        let Some(process_name) = desktop.process_name(pid) else {
            trace!(pid, "process exited during enumeration");
            continue;
        };

        let Some(browser) = config.browsers.browser_for_process(&process_name) else {
            continue;
        };

        let minimized = classify_state(desktop, handle);
        trace!(?handle, pid, browser = browser.label(), minimized, "qualified browser window");
        windows.push(BrowserWindow {
            handle,
            pid,
            browser,
            minimized,
        });
    }

    debug!(count = windows.len(), "window enumeration complete");
    windows
}

/// A window counts as minimized only when the placement query succeeds and
/// reports the minimized show-state. A failed query classifies the window
/// as normal, toward the traversal path more likely to succeed.
pub(crate) fn classify_state(desktop: &dyn DesktopPort, handle: WindowHandle) -> bool {
    match desktop.placement(handle) {
        Ok(WindowState::Minimized) => true,
        Ok(WindowState::Normal) => false,
        Err(error) => {
            trace!(?handle, %error, "placement query failed, assuming normal");
            false
        }
    }
}
