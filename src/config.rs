//! Configuration management using the prefer crate for file discovery.
//!
//! Settings are layered: built-in defaults, then the config file (TOML,
//! YAML or JSON), then environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::scrapers::{HttpClient, ScrapeError, UpstreamSource, WikiConfig};

/// ECDC case distribution feed.
pub const DEFAULT_FEED_URL: &str = "https://opendata.ecdc.europa.eu/covid19/casedistribution/json/";

/// German wiki page with per-state tables.
pub const DEFAULT_WIKI_URL: &str = "https://de.wikipedia.org/wiki/COVID-19-Pandemie_in_Deutschland";

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Default number of retries after a failed upstream request.
pub const DEFAULT_REQUEST_RETRIES: u32 = 1;

/// Default delay before the first retry, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Runtime settings after all layers are applied.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address to bind the server to (HOST, PORT or HOST:PORT).
    pub bind: String,
    pub feed_url: String,
    pub wiki_url: String,
    pub request_timeout: Duration,
    pub request_retries: u32,
    pub retry_backoff: Duration,
    /// User agent override; `None` uses the built-in one.
    pub user_agent: Option<String>,
    pub wiki: WikiConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            wiki_url: DEFAULT_WIKI_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
            request_retries: DEFAULT_REQUEST_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            user_agent: None,
            wiki: WikiConfig::default(),
        }
    }
}

impl Settings {
    /// Check URLs and lookup tables before anything is fetched.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("feed_url", &self.feed_url), ("wiki_url", &self.wiki_url)] {
            Url::parse(value).map_err(|e| format!("Invalid {} {:?}: {}", name, value, e))?;
        }
        self.wiki.validate()
    }

    /// HTTP client configured with timeout, retries and user agent.
    pub fn http_client(&self) -> Result<HttpClient, ScrapeError> {
        HttpClient::with_user_agent(
            self.request_timeout,
            self.request_retries,
            self.retry_backoff,
            self.user_agent.as_deref(),
        )
    }

    /// Data source backed by the configured upstream URLs.
    pub fn upstream(&self) -> Result<UpstreamSource, ScrapeError> {
        Ok(UpstreamSource::new(
            self.http_client()?,
            self.feed_url.clone(),
            self.wiki_url.clone(),
            self.wiki.clone(),
        ))
    }
}

/// Configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// JSON feed URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
    /// Regional wiki page URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Retries after a failed request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_retries: Option<u32>,
    /// Delay before the first retry in milliseconds; doubles per retry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_backoff_ms: Option<u64>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Regional pipeline lookup tables.
    #[serde(default)]
    pub wiki: WikiConfig,
    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers covidscrape config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("covidscrape").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file: {}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e)),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(ref url) = self.feed_url {
            settings.feed_url = url.clone();
        }
        if let Some(ref url) = self.wiki_url {
            settings.wiki_url = url.clone();
        }
        if let Some(secs) = self.request_timeout {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.request_retries {
            settings.request_retries = retries;
        }
        if let Some(ms) = self.retry_backoff_ms {
            settings.retry_backoff = Duration::from_millis(ms);
        }
        if let Some(ref ua) = self.user_agent {
            settings.user_agent = Some(ua.clone());
        }
        settings.wiki = self.wiki.clone();
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (skips discovery).
    pub config_path: Option<PathBuf>,
}

/// Apply `COVIDSCRAPE_*` environment overrides using `lookup` to read
/// variables. Empty values are ignored.
fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(bind) = var("COVIDSCRAPE_BIND") {
        tracing::debug!("Using COVIDSCRAPE_BIND from environment: {}", bind);
        settings.bind = bind;
    }
    if let Some(url) = var("COVIDSCRAPE_FEED_URL") {
        tracing::debug!("Using COVIDSCRAPE_FEED_URL from environment: {}", url);
        settings.feed_url = url;
    }
    if let Some(url) = var("COVIDSCRAPE_WIKI_URL") {
        tracing::debug!("Using COVIDSCRAPE_WIKI_URL from environment: {}", url);
        settings.wiki_url = url;
    }
}

/// Load settings with explicit options.
pub async fn load_settings_with_options(options: LoadOptions) -> anyhow::Result<Settings> {
    let config = match options.config_path {
        Some(ref path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            Config::load_from_path(Path::new(&expanded))
                .await
                .map_err(anyhow::Error::msg)?
        }
        None => Config::load().await,
    };

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());

    settings.validate().map_err(anyhow::Error::msg)?;
    Ok(settings)
}
