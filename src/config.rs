use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{DEFAULT_PLATFORM, GAMERPOWER_API_BASE, WEBHOOK_URL_VAR};

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Top-level application config deserialized from `config.toml`.
///
/// Every section is optional; a missing file is the same as an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Discord webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL. The `WEBHOOK_URL` environment variable takes precedence.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_avatar_url")]
    pub avatar_url: String,
}

/// Upstream giveaway listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_platform")]
    pub platform: String,
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// JSON file holding the ids already announced.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    /// Timeout applied to every outbound HTTP request.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_username() -> String {
    "Free Games Bot".to_string()
}

fn default_avatar_url() -> String {
    "https://i.imgur.com/4M34hi2.png".to_string()
}

fn default_api_base() -> String {
    GAMERPOWER_API_BASE.to_string()
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

fn default_history_file() -> PathBuf {
    PathBuf::from("seen_games.json")
}

fn default_http_timeout() -> u64 {
    30
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: default_username(),
            avatar_url: default_avatar_url(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            platform: default_platform(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            history_file: default_history_file(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

/// Validated settings the run is built from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub webhook: WebhookTarget,
    pub api_base: Url,
    pub platform: String,
    pub history_file: PathBuf,
    pub http_timeout: Duration,
}

/// Where and as whom notifications are posted.
#[derive(Debug, Clone)]
pub struct WebhookTarget {
    pub url: Url,
    pub username: String,
    pub avatar_url: String,
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load config if the file exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the config into the values a run needs.
    ///
    /// `env_webhook_url` (normally `WEBHOOK_URL`) overrides `[webhook] url`.
    /// Fails when no usable webhook URL is configured; nothing has touched the
    /// network or the history file at that point.
    pub fn resolve(self, env_webhook_url: Option<String>) -> Result<ResolvedConfig> {
        let raw_url = env_webhook_url
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.webhook.url.filter(|u| !u.trim().is_empty()));
        let Some(raw_url) = raw_url else {
            bail!("{WEBHOOK_URL_VAR} is missing: set it in the environment or as [webhook] url");
        };
        let url = parse_http_url(raw_url.trim()).context("invalid webhook URL")?;
        let api_base =
            parse_http_url(&self.source.api_base).context("invalid [source] api_base")?;

        if self.source.platform.trim().is_empty() {
            bail!("[source] platform must not be empty");
        }
        if self.settings.http_timeout_secs == 0 {
            bail!("[settings] http_timeout_secs must be positive");
        }

        Ok(ResolvedConfig {
            webhook: WebhookTarget {
                url,
                username: self.webhook.username,
                avatar_url: self.webhook.avatar_url,
            },
            api_base,
            platform: self.source.platform.trim().to_string(),
            history_file: self.settings.history_file,
            http_timeout: Duration::from_secs(self.settings.http_timeout_secs),
        })
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("cannot parse {raw:?} as a URL"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("unsupported URL scheme {other:?} (expected http or https)"),
    }
}
