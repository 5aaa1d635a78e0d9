//! tabscan adapters - Infrastructure backends
//!
//! This crate contains concrete implementations of the ports defined in
//! tabscan-core: the Windows UI Automation backend and a deterministic
//! in-memory backend for tests.

pub mod testing;
#[cfg(target_os = "windows")]
pub mod uia;

pub use testing::{CallJournal, FakeDesktop, FakeNode, FakeWindow};
#[cfg(target_os = "windows")]
pub use uia::WindowsDesktop;
