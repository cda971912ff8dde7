//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use command_router::DispatcherConfig;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,

    /// Identity and channel the console speaks as
    #[serde(default)]
    pub console: ConsoleConfig,

    /// Cooldown cache configuration
    #[serde(default)]
    pub cooldown: CooldownConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Command prefix
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// The bot's own user id, enables `<@id>` invocation
    #[serde(default)]
    pub bot_id: Option<String>,

    /// Comma-separated ids allowed to run owner-only commands
    #[serde(default, deserialize_with = "comma_list")]
    pub owner_ids: Vec<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Shut down after this long without input
    #[serde(default = "default_idle_timeout", with = "humantime_serde")]
    pub idle_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Guild to speak in. Unset means every line is a direct message.
    #[serde(default = "default_guild_id")]
    pub guild_id: Option<String>,

    #[serde(default = "default_guild_name")]
    pub guild_name: String,

    /// Guild owner, defaults to the console user
    #[serde(default)]
    pub guild_owner_id: Option<String>,

    #[serde(default = "default_channel_id")]
    pub channel_id: String,

    #[serde(default = "default_channel_name")]
    pub channel_name: String,

    /// Comma-separated role ids held by the console user
    #[serde(default, deserialize_with = "comma_list")]
    pub roles: Vec<String>,

    /// Comma-separated permissions granted to the console user
    #[serde(default = "default_permissions", deserialize_with = "comma_list")]
    pub permissions: Vec<String>,

    /// Comma-separated permissions granted to the bot
    #[serde(default = "default_permissions", deserialize_with = "comma_list")]
    pub bot_permissions: Vec<String>,

    #[serde(default)]
    pub nsfw: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CooldownConfig {
    /// How often expired cooldown entries are swept
    #[serde(default = "default_purge_interval", with = "humantime_serde")]
    pub purge_interval: Duration,
}

// Default implementations
impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            bot_id: None,
            owner_ids: Vec::new(),
            log_level: default_log_level(),
            idle_timeout: default_idle_timeout(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            user_name: default_user_name(),
            guild_id: default_guild_id(),
            guild_name: default_guild_name(),
            guild_owner_id: None,
            channel_id: default_channel_id(),
            channel_name: default_channel_name(),
            roles: Vec::new(),
            permissions: default_permissions(),
            bot_permissions: default_permissions(),
            nsfw: false,
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            purge_interval: default_purge_interval(),
        }
    }
}

// Default value functions
fn default_prefix() -> String {
    "!".into()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_idle_timeout() -> Duration {
    Duration::from_secs(30 * 60) // 30 minutes
}

fn default_user_id() -> String {
    "1".into()
}

fn default_user_name() -> String {
    "console".into()
}

fn default_guild_id() -> Option<String> {
    Some("console-guild".into())
}

fn default_guild_name() -> String {
    "Console".into()
}

fn default_channel_id() -> String {
    "console".into()
}

fn default_channel_name() -> String {
    "general".into()
}

fn default_permissions() -> Vec<String> {
    vec!["SEND_MESSAGES".into(), "MANAGE_ROLES".into()]
}

fn default_purge_interval() -> Duration {
    Duration::from_secs(60)
}

/// Environment values are plain strings, so lists arrive comma-separated.
fn comma_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_source(config::Environment::default().separator("__"))
    }

    fn from_source(source: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            // Ids like 0012 must stay strings.
            .add_source(source.try_parsing(false))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Settings handed to the dispatcher.
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            prefix: self.bot.prefix.clone(),
            bot_id: self.bot.bot_id.clone(),
            owner_ids: self.bot.owner_ids.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(
            config::Environment::default()
                .separator("__")
                .source(Some(source)),
        )
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.bot.log_level, "info");
        assert_eq!(config.bot.idle_timeout, Duration::from_secs(1800));
        assert_eq!(config.console.guild_id.as_deref(), Some("console-guild"));
        assert!(config.console.permissions.contains(&"MANAGE_ROLES".to_string()));
        assert_eq!(config.cooldown.purge_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_env_overrides() {
        let config = load(&[
            ("BOT__PREFIX", "?"),
            ("BOT__BOT_ID", "900"),
            ("BOT__OWNER_IDS", "0012, 34,,"),
            ("BOT__IDLE_TIMEOUT", "5m"),
            ("CONSOLE__ROLES", "mods"),
            ("COOLDOWN__PURGE_INTERVAL", "10s"),
        ])
        .unwrap();

        assert_eq!(config.bot.prefix, "?");
        assert_eq!(config.bot.owner_ids, vec!["0012".to_string(), "34".to_string()]);
        assert_eq!(config.bot.idle_timeout, Duration::from_secs(300));
        assert_eq!(config.console.roles, vec!["mods".to_string()]);
        assert_eq!(config.cooldown.purge_interval, Duration::from_secs(10));

        let dispatcher = config.dispatcher_config();
        assert_eq!(dispatcher.prefix, "?");
        assert_eq!(dispatcher.bot_id.as_deref(), Some("900"));
        assert_eq!(dispatcher.owner_ids.len(), 2);
    }

    #[test]
    fn test_bad_duration_fails() {
        let err = load(&[("BOT__IDLE_TIMEOUT", "soon")]).unwrap_err();
        assert!(format!("{:#}", err).contains("deserialize"));
    }
}
