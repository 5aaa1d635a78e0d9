use std::sync::Mutex;

use tabscan_core::cancel::CancelToken;
use tabscan_core::domain::{ProcessId, WindowHandle};
use tabscan_core::ports::{DesktopError, DesktopPort, NodeError, NodeRef, WindowState};

use super::fake_node::{CallJournal, FakeNode};

/// One scripted top-level window.
#[derive(Debug, Clone)]
pub struct FakeWindow {
    handle: WindowHandle,
    title: String,
    pid: ProcessId,
    process_name: Option<String>,
    state: WindowState,
    placement_fails: bool,
    root: FakeNode,
}

impl FakeWindow {
    pub fn new(handle: u64, pid: ProcessId, process_name: &str, title: &str) -> Self {
        Self {
            handle: WindowHandle(handle),
            title: title.to_string(),
            pid,
            process_name: Some(process_name.to_string()),
            state: WindowState::Normal,
            placement_fails: false,
            root: FakeNode::pane(title),
        }
    }

    pub fn minimized(mut self) -> Self {
        self.state = WindowState::Minimized;
        self
    }

    /// The placement query for this window fails; the engine must classify
    /// it as normal.
    pub fn with_placement_failure(mut self) -> Self {
        self.placement_fails = true;
        self
    }

    /// The owning process exits between pid capture and name resolution.
    pub fn with_exited_process(mut self) -> Self {
        self.process_name = None;
        self
    }

    pub fn with_root(mut self, root: FakeNode) -> Self {
        self.root = root;
        self
    }
}

/// In-memory desktop backend. Windows are scripted up front; interaction
/// calls land in a shared [`CallJournal`] so tests can assert call order.
#[derive(Debug, Default)]
pub struct FakeDesktop {
    windows: Mutex<Vec<FakeWindow>>,
    journal: CallJournal,
    cancel_on_root: Mutex<Option<CancelToken>>,
}

impl FakeDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_window(&self, window: FakeWindow) {
        let mut window = window;
        window.root = window.root.attach_journal(&self.journal);
        self.windows.lock().unwrap().push(window);
    }

    pub fn journal(&self) -> CallJournal {
        self.journal.clone()
    }

    /// Trigger `token` on the next window-root lookup, simulating a caller
    /// that cancels after discovery already started processing windows.
    pub fn cancel_on_window_root(&self, token: &CancelToken) {
        *self.cancel_on_root.lock().unwrap() = Some(token.clone());
    }

    fn with_window<T>(&self, handle: WindowHandle, read: impl Fn(&FakeWindow) -> T) -> Option<T> {
        self.windows
            .lock()
            .unwrap()
            .iter()
            .find(|window| window.handle == handle)
            .map(read)
    }
}

impl DesktopPort for FakeDesktop {
    fn list_windows(&self) -> Vec<WindowHandle> {
        self.windows
            .lock()
            .unwrap()
            .iter()
            .map(|window| window.handle)
            .collect()
    }

    fn window_title(&self, handle: WindowHandle) -> Option<String> {
        self.with_window(handle, |window| window.title.clone())
    }

    fn window_process(&self, handle: WindowHandle) -> Option<ProcessId> {
        self.with_window(handle, |window| window.pid)
    }

    fn process_name(&self, pid: ProcessId) -> Option<String> {
        self.windows
            .lock()
            .unwrap()
            .iter()
            .find(|window| window.pid == pid)
            .and_then(|window| window.process_name.clone())
    }

    fn placement(&self, handle: WindowHandle) -> Result<WindowState, DesktopError> {
        let Some((state, fails)) =
            self.with_window(handle, |window| (window.state, window.placement_fails))
        else {
            return Err(DesktopError::WindowGone { handle });
        };
        if fails {
            return Err(DesktopError::Backend {
                message: "placement query rejected".to_string(),
            });
        }
        Ok(state)
    }

    fn restore(&self, handle: WindowHandle) -> Result<(), DesktopError> {
        let mut windows = self.windows.lock().unwrap();
        let Some(window) = windows.iter_mut().find(|window| window.handle == handle) else {
            return Err(DesktopError::WindowGone { handle });
        };
        window.state = WindowState::Normal;
        self.journal.record(format!("restore:{}", handle.0));
        Ok(())
    }

    fn window_root(&self, handle: WindowHandle) -> Result<NodeRef, NodeError> {
        if let Some(token) = self.cancel_on_root.lock().unwrap().take() {
            token.cancel();
        }

        self.with_window(handle, |window| window.root.clone())
            .map(|root| std::sync::Arc::new(root) as NodeRef)
            .ok_or(NodeError::Stale)
    }
}
