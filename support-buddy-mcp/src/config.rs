//! Server configuration.
//!
//! Values come from an optional TOML file and are then overridden by
//! environment variables. A missing default file is not an error; a missing
//! file named explicitly through `SUPPORT_BUDDY_CONFIG` is.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use support_buddy_toolbox::{DEFAULT_AI_TIMEOUT_SECS, DEFAULT_GEMINI_MODEL, SlidingWindowLimiter};

/// Explicit config file path.
pub const CONFIG_PATH_ENV: &str = "SUPPORT_BUDDY_CONFIG";
/// Gemini API key; enables the AI analyzer when non-empty.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "SUPPORT_BUDDY_GEMINI_MODEL";
pub const MAX_CALLS_ENV: &str = "SUPPORT_BUDDY_AI_MAX_CALLS";
pub const WINDOW_SECS_ENV: &str = "SUPPORT_BUDDY_AI_WINDOW_SECS";
pub const AI_TIMEOUT_SECS_ENV: &str = "SUPPORT_BUDDY_AI_TIMEOUT_SECS";

const CONFIG_DIR_NAME: &str = "support-buddy";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gemini API key. `None` disables AI analysis.
    pub gemini_api_key: Option<String>,
    /// Gemini model name.
    pub gemini_model: String,
    /// AI calls allowed per window.
    pub ai_max_calls: usize,
    /// AI rate-limit window in seconds.
    pub ai_window_secs: u64,
    /// Per-request timeout for the AI backend.
    #[serde(alias = "request_timeout_secs")]
    pub ai_timeout_secs: u64,
    /// User agent sent to the AI backend.
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            ai_max_calls: 10,
            ai_window_secs: 60,
            ai_timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
            user_agent: "SupportBuddy/1.0".to_string(),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl AppConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `env` for every variable lookup.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match env(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    bail!("Config file {} does not exist", path.display());
                }
                Self::from_file(&path)?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(env)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = env(API_KEY_ENV) {
            self.gemini_api_key = Some(key);
        }
        if let Some(model) = env(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            self.gemini_model = model.trim().to_string();
        }
        if let Some(value) = env(MAX_CALLS_ENV) {
            self.ai_max_calls = value
                .trim()
                .parse()
                .with_context(|| format!("{MAX_CALLS_ENV} must be a whole number, got {value:?}"))?;
        }
        if let Some(value) = env(WINDOW_SECS_ENV) {
            self.ai_window_secs = value
                .trim()
                .parse()
                .with_context(|| format!("{WINDOW_SECS_ENV} must be a whole number, got {value:?}"))?;
        }
        if let Some(value) = env(AI_TIMEOUT_SECS_ENV) {
            self.ai_timeout_secs = value.trim().parse().with_context(|| {
                format!("{AI_TIMEOUT_SECS_ENV} must be a whole number, got {value:?}")
            })?;
        }
        Ok(())
    }

    /// Trimmed API key, `None` when unset or blank.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn rate_limiter(&self) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(self.ai_max_calls, Duration::from_secs(self.ai_window_secs))
    }

    /// Per-request timeout for the AI backend, at least one second.
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs.max(1))
    }

    /// HTTP client for the AI backend.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.ai_timeout())
            .user_agent(&self.user_agent)
            .build()
            .context("Failed to build HTTP client")
    }
}

/// Features available with the loaded configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// AI ticket analysis is attempted before the keyword rules.
    pub ai_enabled: bool,
}

impl Capabilities {
    pub fn detect(config: &AppConfig) -> Self {
        Self {
            ai_enabled: config.api_key().is_some(),
        }
    }
}
