//! Deterministic in-memory desktop backend for engine tests.
//!
//! The fake mirrors the behaviors the real accessibility surface is known
//! for: windows whose owning process exits mid-enumeration, placement
//! queries that fail, nodes that go stale between two calls, descendant
//! queries that stop answering below the tab strip of a minimized window,
//! and several references aliasing one logical node.

mod fake_desktop;
mod fake_node;

pub use fake_desktop::{FakeDesktop, FakeWindow};
pub use fake_node::{CallJournal, FakeNode, StaleHandle};
