//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.macros.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".macros.toml";

/// Actions on Google renders at most this many suggestion chips.
const MAX_SUGGESTIONS: usize = 8;

/// Actions on Google truncates chip titles longer than this.
const MAX_SUGGESTION_CHARS: usize = 25;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Nutrient lookup settings.
    #[serde(default)]
    pub nutrition: NutritionConfig,

    /// Conversation settings.
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Route receiving the fulfillment requests.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            path: default_path(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/fulfillment".to_string()
}

/// Nutrient lookup API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionConfig {
    /// Natural-language nutrients endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Application id sent as `x-app-id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    /// Application key sent as `x-app-key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_key: Option<String>,

    /// Locale tag sent with every query.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            app_id: None,
            app_key: None,
            locale: default_locale(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "https://trackapi.nutritionix.com/v2/natural/nutrients".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_timeout() -> u64 {
    // Dialogflow gives the webhook 5s in total
    4
}

impl NutritionConfig {
    /// Returns the application id and key, failing if either is unset.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let app_id = self
            .app_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .context("Nutritionix app id is not set (use --app-id or NUTRITIONIX_APP_ID)")?;
        let app_key = self
            .app_key
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .context("Nutritionix app key is not set (use --app-key or NUTRITIONIX_APP_KEY)")?;
        Ok((app_id, app_key))
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Example utterances offered as suggestion chips.
    #[serde(default = "default_suggestions")]
    pub suggestions: Vec<String>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            suggestions: default_suggestions(),
        }
    }
}

fn default_suggestions() -> Vec<String> {
    vec![
        "I ate 1 banana",
        "I drank 250 mL of milk",
        "7 apples",
        "3 big macs and an orange",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.macros.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and their environment variables) take precedence over
    /// config file settings, but only when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref path) = args.path {
            self.server.path = path.clone();
        }

        if let Some(ref endpoint) = args.endpoint {
            self.nutrition.endpoint = endpoint.clone();
        }
        if let Some(ref app_id) = args.app_id {
            self.nutrition.app_id = Some(app_id.clone());
        }
        if let Some(ref app_key) = args.app_key {
            self.nutrition.app_key = Some(app_key.clone());
        }
        if let Some(ref locale) = args.locale {
            self.nutrition.locale = locale.clone();
        }
        if let Some(timeout) = args.timeout {
            self.nutrition.timeout_seconds = timeout;
        }
    }

    /// Check the merged configuration before serving.
    pub fn validate(&self) -> Result<()> {
        if !self.server.path.starts_with('/') {
            bail!("Fulfillment path must start with '/': {}", self.server.path);
        }

        if !self.nutrition.endpoint.starts_with("http://")
            && !self.nutrition.endpoint.starts_with("https://")
        {
            bail!("Nutrition endpoint must start with 'http://' or 'https://'");
        }

        if self.nutrition.timeout_seconds == 0 {
            bail!("Timeout must be at least 1 second");
        }

        if self.conversation.suggestions.len() > MAX_SUGGESTIONS {
            bail!("At most {} suggestions are allowed", MAX_SUGGESTIONS);
        }

        if let Some(long) = self
            .conversation
            .suggestions
            .iter()
            .find(|s| s.chars().count() > MAX_SUGGESTION_CHARS)
        {
            bail!(
                "Suggestion '{}' is longer than {} characters",
                long,
                MAX_SUGGESTION_CHARS
            );
        }

        self.nutrition.credentials()?;

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
