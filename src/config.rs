use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::api::endpoints;

pub const CONFIG_FILE: &str = "tempest.toml";

/// Dashboard settings loaded from tempest.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Model identifiers, tried in this order until one answers
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Sent to api.weather.gov, which rejects anonymous requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// IANA zone used for rendering local times. Falls back to the
    /// station's own zone, then to the host zone.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: usize,
    #[serde(default = "default_hourly_limit")]
    pub hourly_limit: usize,
    #[serde(default = "default_true")]
    pub hourly_future_only: bool,
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
    #[serde(default = "default_tempest_base_url")]
    pub tempest_base_url: String,
    #[serde(default = "default_nws_base_url")]
    pub nws_base_url: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            user_agent: default_user_agent(),
            timezone: None,
            forecast_days: default_forecast_days(),
            hourly_limit: default_hourly_limit(),
            hourly_future_only: true,
            http_timeout_secs: None,
            tempest_base_url: default_tempest_base_url(),
            nws_base_url: default_nws_base_url(),
            gemini_base_url: default_gemini_base_url(),
        }
    }
}

fn default_true() -> bool { true }
fn default_forecast_days() -> usize { 7 }
fn default_hourly_limit() -> usize { 24 }
fn default_user_agent() -> String { "(tempest-teacher, contact@example.com)".to_string() }
fn default_tempest_base_url() -> String { endpoints::TEMPEST_API.to_string() }
fn default_nws_base_url() -> String { endpoints::NWS_API.to_string() }
fn default_gemini_base_url() -> String { endpoints::GEMINI_API.to_string() }
fn default_models() -> Vec<String> {
    vec!["gemini-2.5-flash", "gemini-2.0-flash", "gemini-1.5-flash"]
        .into_iter().map(String::from).collect()
}

impl AppConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&data)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.models.iter().all(|m| m.trim().is_empty()) {
            bail!("Config must list at least one model");
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Option<std::time::Duration> {
        self.http_timeout_secs.map(std::time::Duration::from_secs)
    }
}

/// API secrets read from the environment (after .env is loaded)
#[derive(Clone)]
pub struct Credentials {
    pub tempest_token: String,
    pub gemini_api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank values count as missing
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());
        let gemini_api_key = var("GEMINI_API_KEY")
            .context("Gemini key missing (set GEMINI_API_KEY)")?;
        let tempest_token = var("TEMPEST_TOKEN")
            .context("Tempest token missing (set TEMPEST_TOKEN)")?;
        Ok(Self { tempest_token, gemini_api_key })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tempest_token", &"<redacted>")
            .field("gemini_api_key", &"<redacted>")
            .finish()
    }
}
