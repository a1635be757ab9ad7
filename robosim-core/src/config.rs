//! Configuration management for robosim
//!
//! Config files are stored in platform-appropriate locations:
//! - Linux: ~/.config/robosim/
//! - macOS: ~/Library/Application Support/robosim/
//! - Windows: %APPDATA%\robosim\

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid JWT secret (must be base64): {0}")]
    InvalidSecret(#[from] base64::DecodeError),

    #[error("Config directory not found")]
    NoDirFound,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub robot: RobotConfig,

    /// Accounts allowed to log in
    #[serde(default = "default_users")]
    pub users: Vec<UserConfig>,
}

/// Server-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// JWT secret (base64 encoded)
    /// If not set, a random secret is generated on every start
    pub jwt_secret: Option<String>,

    /// Token TTL in seconds
    #[serde(default = "default_token_ttl")]
    pub access_token_ttl: u64,
}

/// Simulated robot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Battery level reported by the status route (0-100)
    #[serde(default = "default_battery")]
    pub initial_battery: u8,
}

/// A login account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,

    /// Plaintext password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// argon2 PHC string, preferred over `password`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    crate::DEFAULT_HTTP_PORT
}
fn default_token_ttl() -> u64 {
    crate::DEFAULT_TOKEN_TTL
}
fn default_battery() -> u8 {
    crate::robot::DEFAULT_BATTERY
}
fn default_users() -> Vec<UserConfig> {
    vec![UserConfig {
        username: "octavian".to_string(),
        password: Some("password123".to_string()),
        password_hash: None,
    }]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            jwt_secret: None,
            access_token_ttl: default_token_ttl(),
        }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            initial_battery: default_battery(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            robot: RobotConfig::default(),
            users: default_users(),
        }
    }
}

impl ServerConfig {
    /// Decoded JWT secret, if one is configured
    pub fn jwt_secret_bytes(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        self.jwt_secret
            .as_deref()
            .map(|s| base64::engine::general_purpose::STANDARD.decode(s))
            .transpose()
            .map_err(ConfigError::from)
    }
}

impl Config {
    /// Get config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join("robosim"))
            .ok_or(ConfigError::NoDirFound)
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, crate::DEFAULT_HTTP_PORT);
        assert_eq!(config.server.access_token_ttl, 1800);
        assert_eq!(config.robot.initial_battery, 87);
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.users[0].username, "octavian");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[[users]]"));

        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.users[0].password.as_deref(), Some("password123"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [server]
            port = 8081

            [[users]]
            username = "ops"
            password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNo"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.server.port, 8081);
        assert_eq!(parsed.server.listen_addr, "0.0.0.0");
        assert_eq!(parsed.robot.initial_battery, 87);
        assert_eq!(parsed.users.len(), 1);
        assert!(parsed.users[0].password.is_none());
    }

    #[test]
    fn test_jwt_secret_decoding() {
        let mut server = ServerConfig::default();
        assert!(server.jwt_secret_bytes().unwrap().is_none());

        server.jwt_secret = Some("c3VwZXJzZWNyZXRrZXk=".to_string());
        assert_eq!(server.jwt_secret_bytes().unwrap().unwrap(), b"supersecretkey");

        server.jwt_secret = Some("!!not base64!!".to_string());
        assert!(matches!(server.jwt_secret_bytes(), Err(ConfigError::InvalidSecret(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip_path() {
        let dir = std::env::temp_dir().join(format!("robosim-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = Config::default();
        config.server.port = 9000;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server.port, 9000);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
