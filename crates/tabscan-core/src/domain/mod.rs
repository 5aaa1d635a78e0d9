mod browser;
mod tab;
mod window;

pub use browser::BrowserKind;
pub use tab::{Tab, TabId};
pub use window::{BrowserWindow, ProcessId, WindowHandle};
