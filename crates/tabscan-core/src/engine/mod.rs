mod actions;
mod builder;
mod enumerator;
mod pool;
mod walker;

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::domain::Tab;
use crate::ports::DesktopPort;

/// Tab discovery and action engine over a desktop accessibility backend.
///
/// `discover` fans every qualifying browser window out as an independent
/// concurrent unit; no failure in one window can prevent discovery in any
/// other. `activate` and `close` operate on a previously returned [`Tab`]
/// and report plain success or failure.
pub struct TabEngine {
    desktop: Arc<dyn DesktopPort>,
    config: Arc<Config>,
    limiter: Arc<Semaphore>,
}

impl TabEngine {
    pub fn new(desktop: Arc<dyn DesktopPort>, config: Config) -> Self {
        Self {
            desktop,
            config: Arc::new(config),
            limiter: pool::worker_limiter(),
        }
    }

    /// Snapshot every open tab across all matching browser windows.
    ///
    /// The returned order is unspecified; callers must rely only on the
    /// fields of individual [`Tab`] values. Once `cancel` is triggered the
    /// call returns an empty collection, never a partial one.
    pub async fn discover(&self, cancel: &CancelToken) -> Vec<Tab> {
        if cancel.is_cancelled() {
            debug!("discovery cancelled before start");
            return Vec::new();
        }

        let windows = {
            let desktop = self.desktop.clone();
            let config = self.config.clone();
            let cancel = cancel.clone();
            pool::run_limited(&self.limiter, move || {
                enumerator::browser_windows(&*desktop, &config, &cancel)
            })
            .await
            .unwrap_or_default()
        };

        let mut tasks = JoinSet::new();
        for window in windows {
            let desktop = self.desktop.clone();
            let config = self.config.clone();
            let limiter = self.limiter.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                walker::scan_window(desktop, config, limiter, cancel, window).await
            });
        }

        let mut tabs = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(window_tabs) => tabs.extend(window_tabs),
                Err(error) => warn!(%error, "window scan task failed"),
            }
        }

        if cancel.is_cancelled() {
            debug!("discovery cancelled, dropping partial results");
            return Vec::new();
        }

        debug!(tab_count = tabs.len(), "discovery finished");
        tabs
    }

    /// Bring a discovered tab to the foreground. Returns false when the tab
    /// node went stale or exposes no usable capability.
    pub fn activate(&self, tab: &Tab) -> bool {
        actions::activate(&*self.desktop, tab)
    }

    /// Close a discovered tab through its close button. Returns false when
    /// the button is missing, not invokable, or the node went stale.
    pub fn close(&self, tab: &Tab) -> bool {
        actions::close(&*self.desktop, tab)
    }
}
