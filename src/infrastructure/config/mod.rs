//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::application::errors::ConfigError;
use crate::domain::entities::UserId;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub audit: AuditConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    /// Leading characters that mark a message as a command
    pub command_markers: Vec<char>,
    /// Admins written out when the admin list is empty at startup
    pub seed_admins: Vec<UserId>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StorageConfig {
    pub directory: PathBuf,
    pub admins_file: String,
    pub moderators_file: String,
    pub commands_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoggingConfig {
    /// Directory for per-run log files; `None` logs to stdout only
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AuditConfig {
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AdaptersConfig {
    pub telegram: TelegramConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
    pub poll_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// Identity the console user acts as
    pub user_id: UserId,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "gatekeeper-bot".to_string(),
            command_markers: vec!['/', '!'],
            seed_admins: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            admins_file: "admins.json".to_string(),
            moderators_file: "mods.json".to_string(),
            commands_file: "commands.json".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: Some(PathBuf::from("logs")),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: Some(PathBuf::from("logs/audit.jsonl")),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: None,
            poll_timeout_seconds: 30,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_id: UserId(0),
        }
    }
}

/// Legacy `config.json` layout: `{"bot_token": "..."}`
#[derive(Debug, Deserialize)]
struct LegacyConfig {
    bot_token: String,
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Config as `run` uses it: file (or defaults), then environment, then
    /// the command-line token, validated once everything is applied
    pub fn resolve(path: impl AsRef<Path>, token_override: Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default(path)?;
        config.apply_env();
        if let Some(token) = token_override {
            config.set_token(token);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load the YAML config if present, else defaults plus a legacy
    /// `config.json` token if one sits next to it
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        let mut config = Config::default();
        let legacy = path.with_file_name("config.json");
        if legacy.exists() {
            let content = std::fs::read_to_string(&legacy)
                .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", legacy.display(), e)))?;
            let legacy: LegacyConfig = serde_json::from_str(&content)
                .map_err(|e| ConfigError::Parse(format!("Failed to parse {}: {}", legacy.display(), e)))?;
            config.set_token(legacy.bot_token);
        }
        Ok(config)
    }

    /// Apply environment overrides (`BOT_TOKEN`, `BOT_DATA_DIR`)
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            if !token.is_empty() {
                self.set_token(token);
            }
        }

        if let Ok(dir) = std::env::var("BOT_DATA_DIR") {
            self.storage.directory = PathBuf::from(dir);
        }
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.adapters.telegram.token = Some(token.into());
        self.adapters.telegram.enabled = true;
    }

    /// Token to use if the Telegram adapter is enabled
    pub fn telegram_token(&self) -> Option<&str> {
        if !self.adapters.telegram.enabled {
            return None;
        }
        self.adapters.telegram.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.command_markers.is_empty() {
            return Err(ConfigError::InvalidValue("bot.command-markers must not be empty".to_string()));
        }
        if !self.bot.command_markers.contains(&'/') {
            return Err(ConfigError::InvalidValue("bot.command-markers must include '/' for the built-in commands".to_string()));
        }
        if self.bot.command_markers.iter().any(|c| c.is_whitespace()) {
            return Err(ConfigError::InvalidValue("bot.command-markers must not contain whitespace".to_string()));
        }
        if self.adapters.telegram.enabled && self.telegram_token().is_none() {
            return Err(ConfigError::MissingField("adapters.telegram.token".to_string()));
        }
        Ok(())
    }
}
