// src/config/mod.rs - Bot settings loaded from an optional YAML file

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const DEFAULT_CONFIG_PATH: &str = "config/bot.yaml";

/// Top-level bot configuration (`bot.yaml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub storage: StorageSettings,
    pub commands: CommandSettings,
}

/// Where durable feature state lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub fortune_file: PathBuf,
    pub meals_file: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            fortune_file: PathBuf::from("data/fortune_last.json"),
            meals_file: PathBuf::from("data/meals.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSettings {
    pub command_prefix: String,
    pub fortune_cooldown_minutes: u64,
    pub meal_max_picks: usize,
    pub meal_list_default: usize,
    pub meal_list_max: usize,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            command_prefix: "!".to_string(),
            fortune_cooldown_minutes: 10,
            meal_max_picks: 5,
            meal_list_default: 10,
            meal_list_max: 20,
        }
    }
}

impl CommandSettings {
    pub fn fortune_cooldown(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.fortune_cooldown_minutes as i64)
    }
}

impl BotConfig {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: BotConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;

        debug!("Loaded bot configuration from {}", path.display());
        Ok(config)
    }

    /// Config file location, overridable with `BOT_CONFIG`
    pub fn path_from_env() -> PathBuf {
        env::var("BOT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn validate(&self) -> Result<()> {
        let commands = &self.commands;

        if commands.command_prefix.trim().is_empty() {
            return Err(anyhow::anyhow!("Command prefix cannot be empty"));
        }
        if commands.fortune_cooldown_minutes == 0 {
            return Err(anyhow::anyhow!("Fortune cooldown must be at least 1 minute"));
        }
        if commands.meal_max_picks == 0 {
            return Err(anyhow::anyhow!("meal_max_picks must be at least 1"));
        }
        if commands.meal_list_default == 0 || commands.meal_list_max == 0 {
            return Err(anyhow::anyhow!("Meal list limits must be at least 1"));
        }
        if commands.meal_list_default > commands.meal_list_max {
            return Err(anyhow::anyhow!(
                "meal_list_default ({}) cannot exceed meal_list_max ({})",
                commands.meal_list_default,
                commands.meal_list_max
            ));
        }

        Ok(())
    }
}

/// `DEBUG=true` turns on debug logging
pub fn debug_enabled() -> bool {
    env::var("DEBUG").map(|v| v == "true").unwrap_or(false)
}
