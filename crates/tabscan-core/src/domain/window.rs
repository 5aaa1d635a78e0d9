use super::BrowserKind;

pub type ProcessId = u32;

/// Opaque top-level window handle as reported by the desktop backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// One qualifying browser window, produced fresh by every enumeration pass
/// and never cached. A process with several windows (profiles, pop-outs,
/// incognito) yields one value per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserWindow {
    pub handle: WindowHandle,
    pub pid: ProcessId,
    pub browser: BrowserKind,
    pub minimized: bool,
}
