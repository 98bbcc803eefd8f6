//! Application configuration for arxiv-digest.
//!
//! An optional TOML file (`~/.arxiv-digest/arxiv-digest.toml` or `--config`)
//! is overlaid with environment variables, which override file values, which
//! override defaults. The resolved [`AppConfig`] is built once at startup and
//! passed by reference into the matcher and notifier.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DigestError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "arxiv-digest.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".arxiv-digest";

/// Environment variable holding the Slack incoming-webhook URL.
pub const WEBHOOK_URL_ENV: &str = "SLACK_WEBHOOK_URL";
const CHANNEL_ENV: &str = "SLACK_CHANNEL";
const USERNAME_ENV: &str = "SLACK_USERNAME";
const ICON_ENV: &str = "SLACK_ICON";
const KEYWORDS_ENV: &str = "ARXIV_KEYWORDS";
const MAX_RESULTS_ENV: &str = "ARXIV_MAX_RESULTS";
const FEED_URL_ENV: &str = "ARXIV_FEED_URL";

// ---------------------------------------------------------------------------
// Config structs (matching arxiv-digest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Feed query and keyword settings.
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Webhook delivery settings.
    #[serde(default)]
    pub slack: SlackConfig,
}

/// `[matcher]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Line-oriented keyword file.
    #[serde(default = "default_keywords_path")]
    pub keywords_path: PathBuf,

    /// Base URL of the arXiv query API.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Category codes OR-ed together in the search query.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Result cap passed as `max_results`.
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Request timeout for the feed fetch.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            keywords_path: default_keywords_path(),
            feed_url: default_feed_url(),
            categories: default_categories(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_keywords_path() -> PathBuf {
    PathBuf::from("astro_key.txt")
}
fn default_feed_url() -> String {
    "http://export.arxiv.org/api/query".into()
}
fn default_categories() -> Vec<String> {
    ["GA", "CO", "EP", "HE", "IM", "SR"]
        .iter()
        .map(|c| format!("astro-ph.{c}"))
        .collect()
}
fn default_max_results() -> u32 {
    1000
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[slack]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Incoming-webhook URL. Usually supplied via `SLACK_WEBHOOK_URL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Destination channel.
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Display name of the posting bot.
    #[serde(default = "default_username")]
    pub username: String,

    /// Emoji shortcode used as the bot avatar.
    #[serde(default = "default_icon_emoji")]
    pub icon_emoji: String,

    /// Request timeout for the webhook POST.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            channel: default_channel(),
            username: default_username(),
            icon_emoji: default_icon_emoji(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_channel() -> String {
    "#general".into()
}
fn default_username() -> String {
    "astro-bot".into()
}
fn default_icon_emoji() -> String {
    ":robot_face:".into()
}

impl SlackConfig {
    /// The webhook URL, or a config error if it is unset or unparsable.
    pub fn require_webhook(&self) -> Result<Url> {
        let raw = self
            .webhook_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                DigestError::config(format!("{WEBHOOK_URL_ENV} env var not set"))
            })?;

        Url::parse(raw.trim())
            .map_err(|e| DigestError::config(format!("invalid webhook URL: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Environment overlay
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup. Empty values count as unset.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(WEBHOOK_URL_ENV) {
            self.slack.webhook_url = Some(v);
        }
        if let Some(v) = get(CHANNEL_ENV) {
            self.slack.channel = v;
        }
        if let Some(v) = get(USERNAME_ENV) {
            self.slack.username = v;
        }
        if let Some(v) = get(ICON_ENV) {
            self.slack.icon_emoji = v;
        }
        if let Some(v) = get(KEYWORDS_ENV) {
            self.matcher.keywords_path = PathBuf::from(v);
        }
        if let Some(v) = get(FEED_URL_ENV) {
            self.matcher.feed_url = v;
        }
        if let Some(v) = get(MAX_RESULTS_ENV) {
            self.matcher.max_results = v.trim().parse().map_err(|e| {
                DigestError::config(format!("{MAX_RESULTS_ENV}='{v}' is not a number: {e}"))
            })?;
        }

        Ok(())
    }

    /// Copy with the webhook URL masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.slack.webhook_url.is_some() {
            copy.slack.webhook_url = Some("<redacted>".into());
        }
        copy
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.arxiv-digest/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DigestError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.arxiv-digest/arxiv-digest.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using defaults");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DigestError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DigestError::config(format!("failed to parse {}: {e}", path.display()))
    })
}
