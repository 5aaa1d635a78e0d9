use tracing::{debug, trace, warn};

use crate::domain::Tab;
use crate::ports::{
    ControlRole, DesktopPort, NameMatch, NodeError, NodeFilter, ProbeOutcome,
};

/// Capability probes tried in order when activating a tab. Chromium strips
/// expose selection; at least one non-Chromium family only exposes
/// invocation.
const ACTIVATION_PROBES: &[ActivationProbe] = &[ActivationProbe::Select, ActivationProbe::Invoke];

#[derive(Debug, Clone, Copy)]
enum ActivationProbe {
    Select,
    Invoke,
}

const CLOSE_BUTTON_NAME: &str = "Close";
const CLOSE_TAB_BUTTON_NAME: &str = "Close tab";

/// Bring a discovered tab to the foreground. Every failure path reports
/// `false`; nothing propagates past this boundary.
pub(crate) fn activate(desktop: &dyn DesktopPort, tab: &Tab) -> bool {
    if tab.minimized {
        if let Err(error) = desktop.restore(tab.window) {
            debug!(handle = ?tab.window, %error, "window restore failed");
        }
    }

    for probe in ACTIVATION_PROBES {
        let outcome = match probe {
            ActivationProbe::Select => tab.node.select(),
            ActivationProbe::Invoke => tab.node.invoke(),
        };
        match outcome {
            Ok(ProbeOutcome::Applied) => {
                trace!(tab = ?tab.id, ?probe, "tab activated");
                return true;
            }
            Ok(ProbeOutcome::Unsupported) => continue,
            Err(NodeError::Stale) => {
                debug!(tab = ?tab.id, "tab node went stale during activation");
                return false;
            }
            Err(error) => {
                warn!(tab = ?tab.id, %error, "activation failed");
                return false;
            }
        }
    }

    debug!(tab = ?tab.id, "no activation capability on tab node");
    false
}

/// Close a discovered tab through its close button.
///
/// The button lookup is restricted to the tab node's direct children so an
/// adjacent tab's close control can never match.
pub(crate) fn close(desktop: &dyn DesktopPort, tab: &Tab) -> bool {
    // Some families only expose the close affordance on the active tab, so
    // activation always comes first.
    if !activate(desktop, tab) {
        debug!(tab = ?tab.id, "activation before close failed");
    }

    let filter = NodeFilter::role(ControlRole::Button).with_names(vec![
        NameMatch::Exact(CLOSE_BUTTON_NAME.to_string()),
        NameMatch::CaseInsensitive(CLOSE_TAB_BUTTON_NAME.to_string()),
    ]);

    let buttons = match tab.node.find_children(&filter) {
        Ok(buttons) => buttons,
        Err(NodeError::Stale) => {
            debug!(tab = ?tab.id, "tab node went stale during close");
            return false;
        }
        Err(error) => {
            warn!(tab = ?tab.id, %error, "close button query failed");
            return false;
        }
    };

    let Some(button) = buttons.into_iter().next() else {
        debug!(tab = ?tab.id, "no close button on tab node");
        return false;
    };

    match button.invoke() {
        Ok(ProbeOutcome::Applied) => {
            trace!(tab = ?tab.id, "tab closed");
            true
        }
        Ok(ProbeOutcome::Unsupported) => {
            debug!(tab = ?tab.id, "close button is not invokable");
            false
        }
        Err(error) => {
            debug!(tab = ?tab.id, %error, "close invocation failed");
            false
        }
    }
}
