//! Application configuration and `.env` loading.

use std::collections::HashMap;

use tracing::debug;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Window`](crate::window::Window) and its router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base title appended to every page title: `"{page} | {title}"`.
    pub title: String,
    /// Id of the element the router mounts into.
    pub root_id: String,
    /// Id of the slot inside each layout that receives the page component.
    pub content_slot: String,
    /// Location the history starts at.
    pub initial_path: String,
    /// Language selected at startup.
    pub default_language: String,
    /// Whether the host environment can attach shadow roots.
    pub shadow_dom: bool,
    /// Optional backend endpoint exposed to components.
    pub api_endpoint: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "dim".into(),
            root_id: "app".into(),
            content_slot: "app-content".into(),
            initial_path: "/".into(),
            default_language: "en".into(),
            shadow_dom: true,
            api_endpoint: None,
        }
    }
}

impl AppConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from the contents of a `.env` file.
    ///
    /// Reads `APP_TITLE` and `API_ENDPOINT`; everything else keeps its
    /// default.
    pub fn from_env_str(contents: &str) -> Self {
        let env = parse_env(contents);
        let mut config = Self::default();
        if let Some(title) = env.get("APP_TITLE") {
            config.title = title.clone();
        }
        config.api_endpoint = env.get("API_ENDPOINT").cloned();
        debug!(keys = env.len(), "loaded environment");
        config
    }

    /// Set the base title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the mount root id (builder).
    pub fn with_root_id(mut self, id: impl Into<String>) -> Self {
        self.root_id = id.into();
        self
    }

    /// Set the layout content slot id (builder).
    pub fn with_content_slot(mut self, id: impl Into<String>) -> Self {
        self.content_slot = id.into();
        self
    }

    /// Set the starting location (builder).
    pub fn with_initial_path(mut self, path: impl Into<String>) -> Self {
        self.initial_path = path.into();
        self
    }

    /// Set the startup language (builder).
    pub fn with_default_language(mut self, lang: impl Into<String>) -> Self {
        self.default_language = lang.into();
        self
    }

    /// Enable or disable shadow root support (builder).
    pub fn with_shadow_dom(mut self, enabled: bool) -> Self {
        self.shadow_dom = enabled;
        self
    }

    /// Set the API endpoint (builder).
    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }
}

// ---------------------------------------------------------------------------
// .env parsing
// ---------------------------------------------------------------------------

/// Parse `KEY=value` lines.
///
/// Keys and values are trimmed. Lines without `=`, with an empty key or an
/// empty value, and `#` comments are skipped. Only the first `=` splits, so
/// values may contain `=`.
pub fn parse_env(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::new();
        assert_eq!(config.title, "dim");
        assert_eq!(config.root_id, "app");
        assert_eq!(config.content_slot, "app-content");
        assert_eq!(config.initial_path, "/");
        assert!(config.shadow_dom);
        assert!(config.api_endpoint.is_none());
    }

    #[test]
    fn builders_chain() {
        let config = AppConfig::new()
            .with_title("Site")
            .with_root_id("root")
            .with_content_slot("slot")
            .with_initial_path("/x")
            .with_default_language("de")
            .with_shadow_dom(false)
            .with_api_endpoint("https://api.example.com");
        assert_eq!(config.title, "Site");
        assert_eq!(config.root_id, "root");
        assert_eq!(config.content_slot, "slot");
        assert_eq!(config.initial_path, "/x");
        assert_eq!(config.default_language, "de");
        assert!(!config.shadow_dom);
        assert_eq!(config.api_endpoint.as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn parse_env_lines() {
        let env = parse_env("A=1\n B = two \n# C=3\nnovalue\nEMPTY=\n=x\nURL=http://h/?a=b\n");
        assert_eq!(env.len(), 3);
        assert_eq!(env["A"], "1");
        assert_eq!(env["B"], "two");
        assert_eq!(env["URL"], "http://h/?a=b");
    }

    #[test]
    fn from_env_str_reads_known_keys() {
        let config = AppConfig::from_env_str("APP_TITLE=My Site\nAPI_ENDPOINT=/api\nOTHER=x");
        assert_eq!(config.title, "My Site");
        assert_eq!(config.api_endpoint.as_deref(), Some("/api"));
        assert_eq!(config.root_id, "app");
    }

    #[test]
    fn from_env_str_empty_keeps_defaults() {
        assert_eq!(AppConfig::from_env_str(""), AppConfig::default());
    }
}
