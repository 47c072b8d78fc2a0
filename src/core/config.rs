use crate::core::price::TimePeriod;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const CRYPTO_API_KEY_ENV: &str = "COINBOARD_CRYPTO_API_KEY";
pub const NEWS_API_KEY_ENV: &str = "COINBOARD_NEWS_API_KEY";

/// Connection settings for one RapidAPI-hosted provider.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_host: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ApiConfig {
    fn coinranking() -> Self {
        ApiConfig {
            base_url: "https://coinranking1.p.rapidapi.com".to_string(),
            api_host: Some("coinranking1.p.rapidapi.com".to_string()),
            api_key: None,
        }
    }

    fn news() -> Self {
        ApiConfig {
            base_url: "https://bing-news-search1.p.rapidapi.com".to_string(),
            api_host: Some("bing-news-search1.p.rapidapi.com".to_string()),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub coinranking: Option<ApiConfig>,
    pub news: Option<ApiConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            coinranking: Some(ApiConfig::coinranking()),
            news: Some(ApiConfig::news()),
        }
    }
}

impl ProvidersConfig {
    pub fn coinranking(&self) -> ApiConfig {
        self.coinranking.clone().unwrap_or_else(ApiConfig::coinranking)
    }

    pub fn news(&self) -> ApiConfig {
        self.news.clone().unwrap_or_else(ApiConfig::news)
    }
}

fn default_coin_limit() -> usize {
    100
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_coin_limit")]
    pub coin_limit: usize,
    #[serde(default)]
    pub default_period: TimePeriod,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            coin_limit: default_coin_limit(),
            default_period: TimePeriod::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default().with_env_keys());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "coinboard", "coinboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config = Self::from_yaml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config.with_env_keys())
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document is a valid, all-defaults config
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// API keys from the environment take precedence over the file.
    fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var(CRYPTO_API_KEY_ENV) {
            let mut api = self.providers.coinranking();
            api.api_key = Some(key);
            self.providers.coinranking = Some(api);
        }
        if let Ok(key) = std::env::var(NEWS_API_KEY_ENV) {
            let mut api = self.providers.news();
            api.api_key = Some(key);
            self.providers.news = Some(api);
        }
        self
    }
}
