//! Application configuration for novelfetch.
//!
//! User config lives at `~/.novelfetch/novelfetch.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NovelFetchError, Result};
use crate::types::{DEFAULT_MAX_CHAPTERS, SiteProfile};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "novelfetch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".novelfetch";

/// Browser-like User-Agent; several novel hosts reject unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching novelfetch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Request defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// HTTP fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Content extraction settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Extra site profiles, merged over the built-in ones.
    #[serde(default)]
    pub profiles: Vec<SiteProfile>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Chapter cap when none is given on the command line.
    #[serde(default = "default_max_chapters")]
    pub max_chapters: usize,

    /// Whether built-in auto filters are on by default.
    #[serde(default = "default_true")]
    pub use_auto_filters: bool,

    /// Blacklist entries applied to every crawl.
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_chapters: default_max_chapters(),
            use_auto_filters: true,
            blacklist: Vec::new(),
        }
    }
}

fn default_max_chapters() -> usize {
    DEFAULT_MAX_CHAPTERS
}
fn default_true() -> bool {
    true
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between two chapter fetches, in ms.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            delay_ms: default_delay_ms(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_delay_ms() -> u64 {
    1000
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_max_redirects() -> usize {
    5
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Run the readability strategy between profile and heuristic selectors.
    #[serde(default = "default_true")]
    pub readability: bool,

    /// Literals appended to the built-in auto filter table.
    #[serde(default)]
    pub extra_auto_filters: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            readability: true,
            extra_auto_filters: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration, derived from the config file.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Inter-chapter politeness delay.
    pub delay: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Redirects followed per request.
    pub max_redirects: usize,
    /// Whether the readability strategy runs.
    pub readability: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.fetch.timeout_secs),
            delay: Duration::from_millis(config.fetch.delay_ms),
            user_agent: config.fetch.user_agent.clone(),
            max_redirects: config.fetch.max_redirects,
            readability: config.extraction.readability,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.novelfetch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NovelFetchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.novelfetch/novelfetch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NovelFetchError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        NovelFetchError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NovelFetchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NovelFetchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NovelFetchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_chapters"));
        assert!(toml_str.contains("delay_ms"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_chapters, 10);
        assert_eq!(parsed.fetch.timeout_secs, 10);
        assert!(parsed.extraction.readability);
    }

    #[test]
    fn config_with_profiles() {
        let toml_str = r##"
[defaults]
max_chapters = 25
blacklist = ["Translator: Foo"]

[extraction]
readability = false

[[profiles]]
domain = "example-novels.com"
content_selectors = ["#text", ".reader"]
removal_selectors = [".promo"]
"##;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.max_chapters, 25);
        assert_eq!(config.defaults.blacklist, vec!["Translator: Foo".to_string()]);
        assert!(config.defaults.use_auto_filters);
        assert!(!config.extraction.readability);
        assert_eq!(config.profiles.len(), 1);
        assert_eq!(config.profiles[0].content_selectors.len(), 2);
        assert!(config.profiles[0].title_selectors.is_empty());
    }

    #[test]
    fn crawl_config_from_app_config() {
        let app = AppConfig::default();
        let crawl = CrawlConfig::from(&app);
        assert_eq!(crawl.timeout, Duration::from_secs(10));
        assert_eq!(crawl.delay, Duration::from_millis(1000));
        assert_eq!(crawl.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(crawl.max_redirects, 5);
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("novelfetch-does-not-exist-4711.toml");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, NovelFetchError::Io { .. }));
    }
}
