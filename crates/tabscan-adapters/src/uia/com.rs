use std::cell::Cell;

use windows::Win32::System::Com::{CoInitializeEx, COINIT_MULTITHREADED};

thread_local! {
    static COM_READY: Cell<bool> = const { Cell::new(false) };
}

/// Join the calling thread to the multithreaded COM apartment.
///
/// Engine work runs on pool threads, so every entry point into this backend
/// goes through here first. S_FALSE (thread already initialized) is as good
/// as S_OK.
pub(crate) fn ensure_initialized() {
    COM_READY.with(|ready| {
        if !ready.get() {
            unsafe {
                let _ = CoInitializeEx(None, COINIT_MULTITHREADED);
            }
            ready.set(true);
        }
    });
}
