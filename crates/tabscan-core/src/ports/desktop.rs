use thiserror::Error;

use super::ui_tree::{NodeError, NodeRef};
use crate::domain::{ProcessId, WindowHandle};

#[derive(Error, Debug)]
pub enum DesktopError {
    #[error("fenêtre introuvable: {handle:?}")]
    WindowGone { handle: WindowHandle },

    #[error("erreur de l'API fenêtres: {message}")]
    Backend { message: String },
}

/// Placement state of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Normal,
    Minimized,
}

/// The OS windowing surface the engine runs against. Implemented by the
/// Windows backend in tabscan-adapters and by the in-memory fake used in
/// tests.
pub trait DesktopPort: Send + Sync {
    /// Every top-level window currently known to the OS, in no particular
    /// order.
    fn list_windows(&self) -> Vec<WindowHandle>;

    /// The window's title text; `None` when the window is gone or reports
    /// no title.
    fn window_title(&self, handle: WindowHandle) -> Option<String>;

    /// The process owning the window.
    fn window_process(&self, handle: WindowHandle) -> Option<ProcessId>;

    /// The image name of a process; `None` when the process already exited.
    fn process_name(&self, pid: ProcessId) -> Option<String>;

    /// Placement query. Callers decide what a failure means; the engine
    /// classifies a failed query as [`WindowState::Normal`].
    fn placement(&self, handle: WindowHandle) -> Result<WindowState, DesktopError>;

    /// Issue a restore command on a minimized window.
    fn restore(&self, handle: WindowHandle) -> Result<(), DesktopError>;

    /// Root accessibility node of the window.
    fn window_root(&self, handle: WindowHandle) -> Result<NodeRef, NodeError>;
}
