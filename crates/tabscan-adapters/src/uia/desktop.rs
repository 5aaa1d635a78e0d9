use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;

use tracing::trace;
use windows::Win32::Foundation::{CloseHandle, BOOL, HWND, LPARAM};
use windows::Win32::System::ProcessStatus::GetModuleBaseNameW;
use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowPlacement, GetWindowTextLengthW, GetWindowTextW,
    GetWindowThreadProcessId, IsWindowVisible, ShowWindow, SW_RESTORE, SW_SHOWMINIMIZED,
    WINDOWPLACEMENT,
};

use tabscan_core::domain::{ProcessId, WindowHandle};
use tabscan_core::ports::{DesktopError, DesktopPort, NodeError, NodeRef, WindowState};

use super::com;
use super::tree::UiaSession;

/// Desktop backend over Win32 windowing APIs and UI Automation.
pub struct WindowsDesktop;

impl WindowsDesktop {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsDesktop {
    fn default() -> Self {
        Self::new()
    }
}

fn hwnd_from(handle: WindowHandle) -> HWND {
    HWND(handle.0 as usize as *mut core::ffi::c_void)
}

impl DesktopPort for WindowsDesktop {
    fn list_windows(&self) -> Vec<WindowHandle> {
        let mut handles: Vec<WindowHandle> = Vec::new();
        unsafe {
            let _ = EnumWindows(
                Some(enum_window_callback),
                LPARAM(&mut handles as *mut Vec<WindowHandle> as isize),
            );
        }
        handles
    }

    fn window_title(&self, handle: WindowHandle) -> Option<String> {
        let hwnd = hwnd_from(handle);
        unsafe {
            let length = GetWindowTextLengthW(hwnd);
            if length == 0 {
                return None;
            }
            let mut buffer = vec![0u16; (length + 1) as usize];
            let copied = GetWindowTextW(hwnd, &mut buffer);
            if copied == 0 {
                return None;
            }
            Some(
                OsString::from_wide(&buffer[..copied as usize])
                    .to_string_lossy()
                    .to_string(),
            )
        }
    }

    fn window_process(&self, handle: WindowHandle) -> Option<ProcessId> {
        let mut pid: u32 = 0;
        unsafe {
            GetWindowThreadProcessId(hwnd_from(handle), Some(&mut pid));
        }
        (pid != 0).then_some(pid)
    }

    fn process_name(&self, pid: ProcessId) -> Option<String> {
        unsafe {
            let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;
            let mut buffer = [0u16; 260];
            let length = GetModuleBaseNameW(process, None, &mut buffer);
            let _ = CloseHandle(process);
            if length == 0 {
                return None;
            }
            Some(
                OsString::from_wide(&buffer[..length as usize])
                    .to_string_lossy()
                    .to_string(),
            )
        }
    }

    fn placement(&self, handle: WindowHandle) -> Result<WindowState, DesktopError> {
        let mut placement = WINDOWPLACEMENT {
            length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        unsafe {
            GetWindowPlacement(hwnd_from(handle), &mut placement).map_err(|error| {
                DesktopError::Backend {
                    message: error.to_string(),
                }
            })?;
        }
        if placement.showCmd == SW_SHOWMINIMIZED.0 as u32 {
            Ok(WindowState::Minimized)
        } else {
            Ok(WindowState::Normal)
        }
    }

    fn restore(&self, handle: WindowHandle) -> Result<(), DesktopError> {
        unsafe {
            // The returned BOOL reports previous visibility, not success.
            let previously_visible = ShowWindow(hwnd_from(handle), SW_RESTORE);
            trace!(?handle, previously_visible = previously_visible.as_bool(), "window restore issued");
        }
        Ok(())
    }

    fn window_root(&self, handle: WindowHandle) -> Result<NodeRef, NodeError> {
        com::ensure_initialized();
        let session = UiaSession::new()?;
        session.element_from_window(handle)
    }
}

unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let handles = &mut *(lparam.0 as *mut Vec<WindowHandle>);
    if IsWindowVisible(hwnd).as_bool() {
        handles.push(WindowHandle(hwnd.0 as usize as u64));
    }
    BOOL(1)
}
