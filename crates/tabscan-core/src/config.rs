use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::BrowserKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("erreur de lecture: {source}")]
    Read {
        #[from]
        source: std::io::Error,
    },

    #[error("erreur de parsing TOML: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
}

/// Immutable configuration handed to the engine at construction. The
/// defaults carry the real allow-lists; a config file can narrow or extend
/// them but nothing mutates them afterwards.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub browsers: BrowserConfig,
    pub tree: TreeConfig,
}

/// Which processes count as browsers, and how their window titles decorate
/// page titles.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Process image name (lowercase) to browser family.
    pub processes: HashMap<String, BrowserKind>,
    /// Known title suffixes, tried in order; only the first match is
    /// stripped.
    pub title_suffixes: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            processes: HashMap::from([
                ("chrome.exe".to_string(), BrowserKind::Chrome),
                ("msedge.exe".to_string(), BrowserKind::Edge),
                ("firefox.exe".to_string(), BrowserKind::Firefox),
                ("brave.exe".to_string(), BrowserKind::Brave),
                ("opera.exe".to_string(), BrowserKind::Opera),
                ("vivaldi.exe".to_string(), BrowserKind::Vivaldi),
            ]),
            title_suffixes: vec![
                " - Google Chrome".to_string(),
                " - Microsoft Edge".to_string(),
                " - Mozilla Firefox".to_string(),
                " - Brave".to_string(),
                " - Opera".to_string(),
                " - Vivaldi".to_string(),
            ],
        }
    }
}

impl BrowserConfig {
    pub fn browser_for_process(&self, process_name: &str) -> Option<BrowserKind> {
        let lowercase = process_name.to_lowercase();
        self.processes.get(&lowercase).copied()
    }

    /// Strip the first matching browser-name suffix from a window or tab
    /// title. A title without any known suffix comes back unchanged, so the
    /// operation is idempotent.
    pub fn strip_title_suffix<'a>(&self, title: &'a str) -> &'a str {
        for suffix in &self.title_suffixes {
            if let Some(stripped) = title.strip_suffix(suffix.as_str()) {
                return stripped;
            }
        }
        title
    }
}

/// Class-name allow-lists for the accessibility-tree walkers. Tab strips are
/// vendor-specific; these lists are what distinguishes the known
/// implementations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Implementation class names of tab items, matched by the normal
    /// (descendant-query) walker.
    pub tab_classes: Vec<String>,
    /// Implementation class names of tab-strip containers, matched by the
    /// minimized-window walker.
    pub container_classes: Vec<String>,
    /// Tab signature for the manual walk under a minimized window.
    pub minimized_tab_classes: Vec<String>,
    /// Minimum match count before a window's tab strip is split into index
    /// ranges processed concurrently.
    pub partition_threshold: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            tab_classes: vec![
                "Tab".to_string(),
                "EdgeTab".to_string(),
                "tab".to_string(),
            ],
            container_classes: vec![
                "TabStrip".to_string(),
                "TabStripRegionView".to_string(),
                "tabbrowser-tabs".to_string(),
            ],
            minimized_tab_classes: vec!["Tab".to_string()],
            partition_threshold: 32,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabscan")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = Config::default();

        assert!(config.browsers.processes.contains_key("chrome.exe"));
        assert!(config.browsers.processes.contains_key("firefox.exe"));
        assert!(config.tree.tab_classes.contains(&"Tab".to_string()));
        assert!(config.tree.container_classes.contains(&"TabStrip".to_string()));
        assert!(config.tree.partition_threshold > 0);
    }

    #[test]
    fn browser_lookup_is_case_insensitive() {
        let config = BrowserConfig::default();

        assert_eq!(
            config.browser_for_process("Chrome.exe"),
            Some(BrowserKind::Chrome)
        );
        assert_eq!(
            config.browser_for_process("MSEDGE.EXE"),
            Some(BrowserKind::Edge)
        );
        assert_eq!(config.browser_for_process("notepad.exe"), None);
    }

    #[test]
    fn strip_title_suffix_removes_known_suffix() {
        let config = BrowserConfig::default();

        assert_eq!(
            config.strip_title_suffix("Example Site - Google Chrome"),
            "Example Site"
        );
    }

    #[test]
    fn strip_title_suffix_is_idempotent() {
        let config = BrowserConfig::default();

        let once = config.strip_title_suffix("Example Site - Google Chrome");
        let twice = config.strip_title_suffix(once);

        assert_eq!(once, "Example Site");
        assert_eq!(twice, once);
    }

    #[test]
    fn strip_title_suffix_keeps_unknown_titles() {
        let config = BrowserConfig::default();

        assert_eq!(
            config.strip_title_suffix("Example Site - Some Editor"),
            "Example Site - Some Editor"
        );
    }

    #[test]
    fn strip_title_suffix_only_removes_the_first_match() {
        let config = BrowserConfig::default();

        assert_eq!(
            config.strip_title_suffix("Nested - Google Chrome - Google Chrome"),
            "Nested - Google Chrome"
        );
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [tree]
            partition_threshold = 8
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.tree.partition_threshold, 8);
        assert!(config.browsers.processes.contains_key("chrome.exe"));
    }

    #[test]
    fn parse_browser_overrides() {
        let toml = r#"
            [browsers.processes]
            "chromium.exe" = "chrome"
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(
            config.browsers.browser_for_process("chromium.exe"),
            Some(BrowserKind::Chrome)
        );
        assert!(config.browsers.browser_for_process("msedge.exe").is_none());
    }

    #[test]
    fn parse_tree_overrides() {
        let toml = r#"
            [tree]
            tab_classes = ["Tab"]
            container_classes = ["TabStrip"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.tree.tab_classes, vec!["Tab".to_string()]);
        assert_eq!(config.tree.container_classes, vec!["TabStrip".to_string()]);
        assert_eq!(config.tree.partition_threshold, 32);
    }
}
