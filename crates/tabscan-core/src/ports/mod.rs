mod desktop;
mod ui_tree;

pub use desktop::{DesktopError, DesktopPort, WindowState};
pub use ui_tree::{
    ControlRole, NameMatch, NodeError, NodeFilter, NodeIdentity, NodeRef, ProbeOutcome, UiNode,
};
