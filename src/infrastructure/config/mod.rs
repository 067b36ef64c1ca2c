//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Role name → members (`nick`, `host`, or `nick!host`)
    #[serde(default)]
    pub roles: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub nickname: String,
    #[serde(default)]
    pub realname: Option<String>,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginConfig {
    /// Directories scanned for modules, in order
    #[serde(default = "default_locations")]
    pub locations: Vec<PathBuf>,
    /// Role allowed to run `reload`. Defaults to `admins` when the key is
    /// absent; an explicit `reload-role: ~` lets anyone reload.
    #[serde(default = "default_reload_role")]
    pub reload_role: Option<String>,
}

/// Identity used by the console adapter for lines typed on stdin
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub nick: String,
    pub host: String,
    pub channel: String,
}

fn default_prefix() -> String {
    ".".to_string()
}

fn default_locations() -> Vec<PathBuf> {
    vec![PathBuf::from("./plugins")]
}

fn default_reload_role() -> Option<String> {
    Some("admins".to_string())
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            locations: default_locations(),
            reload_role: default_reload_role(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            nick: "console".to_string(),
            host: "console@localhost".to_string(),
            channel: "#console".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut roles = HashMap::new();
        roles.insert("admins".to_string(), vec!["console!console@localhost".to_string()]);

        Self {
            bot: BotConfig {
                nickname: "chii".to_string(),
                realname: Some("chii".to_string()),
                prefix: default_prefix(),
            },
            plugins: PluginConfig::default(),
            roles,
            console: ConsoleConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.nickname.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.nickname".to_string()));
        }
        if self.bot.prefix.is_empty() || self.bot.prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue(format!(
                "bot.prefix must be non-empty and contain no whitespace: {:?}",
                self.bot.prefix
            )));
        }
        if let Some(role) = &self.plugins.reload_role {
            if !self.roles.contains_key(role) {
                tracing::warn!("Reload role '{}' is not defined; reload will be denied to everyone", role);
            }
        }
        Ok(())
    }

    /// Apply environment overrides on top of `self`
    pub fn with_env(mut self) -> Self {
        if let Ok(nickname) = std::env::var("BOT_NICKNAME") {
            self.bot.nickname = nickname;
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        self
    }

    pub fn load_env() -> Self {
        Config::default().with_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_yaml() {
        let config = Config::from_yaml("bot:\n  nickname: chii\n").unwrap();
        assert_eq!(config.bot.prefix, ".");
        assert_eq!(config.plugins.locations, vec![PathBuf::from("./plugins")]);
        assert_eq!(config.console.channel, "#console");
    }

    #[test]
    fn parses_roles_and_locations() {
        let yaml = r#"
bot:
  nickname: chii
  prefix: "!"
plugins:
  locations: [commands, events, tasks]
  reload-role: admins
roles:
  admins: ["zk!is@whatit.is"]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.plugins.locations.len(), 3);
        assert_eq!(config.plugins.reload_role.as_deref(), Some("admins"));
        assert_eq!(config.roles["admins"], vec!["zk!is@whatit.is"]);
    }

    #[test]
    fn plugins_section_without_reload_role_stays_restricted() {
        let yaml = "bot:\n  nickname: chii\nplugins:\n  locations: [plugins]\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.plugins.reload_role.as_deref(), Some("admins"));

        let config = Config::from_yaml("bot:\n  nickname: chii\nplugins: {}\n").unwrap();
        assert_eq!(config.plugins.locations, vec![PathBuf::from("./plugins")]);
        assert_eq!(config.plugins.reload_role.as_deref(), Some("admins"));
    }

    #[test]
    fn null_reload_role_opts_out() {
        let yaml = "bot:\n  nickname: chii\nplugins:\n  reload-role: ~\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.plugins.reload_role, None);
    }

    #[test]
    fn rejects_empty_prefix() {
        let err = Config::from_yaml("bot:\n  nickname: chii\n  prefix: \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn rejects_blank_nickname() {
        let err = Config::from_yaml("bot:\n  nickname: \" \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn default_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.bot.nickname, "chii");
    }
}
