use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use super::{builder, pool};
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::domain::{BrowserWindow, Tab};
use crate::ports::{ControlRole, DesktopPort, NodeError, NodeFilter, NodeIdentity, NodeRef};

/// Scan one browser window. Selects the traversal strategy from the
/// window's minimized state and isolates every failure to this window.
pub(crate) async fn scan_window(
    desktop: Arc<dyn DesktopPort>,
    config: Arc<Config>,
    limiter: Arc<Semaphore>,
    cancel: CancelToken,
    window: BrowserWindow,
) -> Vec<Tab> {
    if cancel.is_cancelled() {
        return Vec::new();
    }

    let root = {
        let desktop = desktop.clone();
        let handle = window.handle;
        match pool::run_limited(&limiter, move || desktop.window_root(handle)).await {
            Some(Ok(root)) => root,
            Some(Err(NodeError::Stale)) => {
                debug!(handle = ?window.handle, "window root went stale before traversal");
                return Vec::new();
            }
            Some(Err(error)) => {
                warn!(handle = ?window.handle, %error, "failed to resolve window root");
                return Vec::new();
            }
            None => return Vec::new(),
        }
    };

    if window.minimized {
        minimized_scan(root, config, limiter, cancel, window).await
    } else {
        normal_scan(root, config, limiter, cancel, window).await
    }
}

/// Normal-path walker: one descendant-scoped query for tab-item nodes whose
/// implementation class is on the allow-list. Large match sets are split
/// into index ranges processed concurrently; output order is unspecified.
async fn normal_scan(
    root: NodeRef,
    config: Arc<Config>,
    limiter: Arc<Semaphore>,
    cancel: CancelToken,
    window: BrowserWindow,
) -> Vec<Tab> {
    let filter =
        NodeFilter::role(ControlRole::TabItem).with_classes(config.tree.tab_classes.clone());

    let matches = {
        let root = root.clone();
        match pool::run_limited(&limiter, move || root.find_descendants(&filter)).await {
            Some(Ok(matches)) => matches,
            Some(Err(NodeError::Stale)) => {
                debug!(handle = ?window.handle, "window went stale during descendant query");
                return Vec::new();
            }
            Some(Err(error)) => {
                warn!(handle = ?window.handle, %error, "descendant query failed");
                return Vec::new();
            }
            None => return Vec::new(),
        }
    };

    if matches.is_empty() {
        return Vec::new();
    }
    trace!(handle = ?window.handle, matched = matches.len(), "tab items matched");

    let chunk_len = config.tree.partition_threshold.max(1);
    if matches.len() < chunk_len {
        return build_range(&config, &cancel, &window, matches, 0);
    }

    let mut tasks = JoinSet::new();
    for (chunk_index, chunk) in matches.chunks(chunk_len).enumerate() {
        let chunk: Vec<NodeRef> = chunk.to_vec();
        let config = config.clone();
        let limiter = limiter.clone();
        let cancel = cancel.clone();
        let base = (chunk_index * chunk_len) as u32;
        tasks.spawn(async move {
            pool::run_limited(&limiter, move || {
                build_range(&config, &cancel, &window, chunk, base)
            })
            .await
            .unwrap_or_default()
        });
    }

    let mut tabs = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(chunk_tabs) => tabs.extend(chunk_tabs),
            Err(error) => warn!(%error, "tab build task failed"),
        }
    }
    tabs
}

/// Build tabs for one contiguous index range of matched nodes. A node that
/// went stale in the meantime is skipped without aborting the range.
fn build_range(
    config: &Config,
    cancel: &CancelToken,
    window: &BrowserWindow,
    nodes: Vec<NodeRef>,
    base_index: u32,
) -> Vec<Tab> {
    let mut tabs = Vec::new();
    for (offset, node) in nodes.into_iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        let index = base_index + offset as u32;
        if let Some(tab) = builder::build_tab(node, window, index, config) {
            tabs.push(tab);
        }
    }
    tabs
}

/// Minimized-path walker. Chromium-family providers return an empty
/// tab-item result for a descendant query on a minimized window even though
/// the tab nodes still exist; the tab-strip containers stay discoverable.
/// So: locate the containers with one descendant query, then walk each
/// container manually over direct children only.
async fn minimized_scan(
    root: NodeRef,
    config: Arc<Config>,
    limiter: Arc<Semaphore>,
    cancel: CancelToken,
    window: BrowserWindow,
) -> Vec<Tab> {
    let filter = NodeFilter::classes(config.tree.container_classes.clone());

    let containers = {
        let root = root.clone();
        match pool::run_limited(&limiter, move || root.find_descendants(&filter)).await {
            Some(Ok(containers)) => containers,
            Some(Err(NodeError::Stale)) => {
                debug!(handle = ?window.handle, "window went stale during container query");
                return Vec::new();
            }
            Some(Err(error)) => {
                warn!(handle = ?window.handle, %error, "container query failed");
                return Vec::new();
            }
            None => return Vec::new(),
        }
    };

    trace!(handle = ?window.handle, containers = containers.len(), "tab-strip containers located");

    let mut tasks = JoinSet::new();
    for container in containers {
        let config = config.clone();
        let limiter = limiter.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            pool::run_limited(&limiter, move || {
                walk_container(container, &config, &cancel, &window)
            })
            .await
            .unwrap_or_default()
        });
    }

    // Concurrent container walks can reach one tab node through more than
    // one container edge; the merge deduplicates by the tree's stable
    // per-node identity, never by reference.
    let mut seen: HashSet<NodeIdentity> = HashSet::new();
    let mut tabs = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(found) => {
                for (identity, tab) in found {
                    if seen.insert(identity) {
                        tabs.push(tab);
                    }
                }
            }
            Err(error) => warn!(%error, "container walk task failed"),
        }
    }
    tabs
}

/// Iterative depth traversal inspecting only the direct children of each
/// visited node. Never recursive; the visited set, keyed by stable
/// identity, bounds cyclic-looking trees.
fn walk_container(
    container: NodeRef,
    config: &Config,
    cancel: &CancelToken,
    window: &BrowserWindow,
) -> Vec<(NodeIdentity, Tab)> {
    let mut found = Vec::new();
    let mut visited: HashSet<NodeIdentity> = HashSet::new();
    let mut stack: Vec<NodeRef> = vec![container];

    while let Some(node) = stack.pop() {
        if cancel.is_cancelled() {
            break;
        }

        let children = match node.children() {
            Ok(children) => children,
            Err(NodeError::Stale) => {
                trace!("node went stale during container walk");
                continue;
            }
            Err(error) => {
                debug!(%error, "child listing failed during container walk");
                continue;
            }
        };

        for child in children {
            let Ok(identity) = child.identity() else {
                continue;
            };
            if !visited.insert(identity.clone()) {
                continue;
            }

            if is_minimized_tab(&child, config) {
                // Position is not derivable on this path; the index stays 0.
                if let Some(tab) = builder::build_tab(child, window, 0, config) {
                    found.push((identity, tab));
                }
            } else {
                stack.push(child);
            }
        }
    }

    found
}

fn is_minimized_tab(node: &NodeRef, config: &Config) -> bool {
    let Ok(role) = node.role() else {
        return false;
    };
    if role != ControlRole::TabItem {
        return false;
    }
    let Ok(class) = node.class_name() else {
        return false;
    };
    config
        .tree
        .minimized_tab_classes
        .iter()
        .any(|known| known == &class)
}
