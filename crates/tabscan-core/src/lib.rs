//! tabscan core library
//!
//! Contains domain types, port definitions (traits) and the tab discovery
//! engine. This crate has no knowledge of any concrete accessibility
//! backend; the Windows implementation lives in tabscan-adapters.

pub mod cancel;
pub mod config;
pub mod domain;
pub mod engine;
pub mod ports;

pub use cancel::CancelToken;
pub use config::{BrowserConfig, Config, ConfigError, TreeConfig};
pub use domain::{BrowserKind, BrowserWindow, ProcessId, Tab, TabId, WindowHandle};
pub use engine::TabEngine;
pub use ports::{
    ControlRole, DesktopError, DesktopPort, NameMatch, NodeError, NodeFilter, NodeIdentity,
    NodeRef, ProbeOutcome, UiNode, WindowState,
};
