use std::path::{Path, PathBuf};

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8888;

/// Which caption backend the service uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    #[default]
    Timedtext,
    DataApi,
}

/// OAuth client credentials for the YouTube Data API source
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl GoogleCredentials {
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.refresh_token.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub transcript_source: Option<SourceKind>,
    pub timedtext_url: Option<String>,
    pub openai_base_url: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google: Option<GoogleCredentials>,
    pub google_api_base: Option<String>,
    pub google_token_url: Option<String>,
}

impl Config {
    /// Load config from ~/.config/tldr/config.toml if it exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Overlay credentials and port from the environment.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(key) = var("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(key);
        }
        if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
            self.port = Some(port);
        }

        let mut google = self.google.take().unwrap_or_default();
        if let Some(v) = var("GOOGLE_CLIENT_ID") {
            google.client_id = v;
        }
        if let Some(v) = var("GOOGLE_CLIENT_SECRET") {
            google.client_secret = v;
        }
        if let Some(v) = var("GOOGLE_REFRESH_TOKEN") {
            google.refresh_token = v;
        }
        self.google = Some(google);

        self
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("tldr")
        .join("config.toml")
}
