//! # Server Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DUKA_PORT=8080                                                     │
//! │     DUKA_JWT_SECRET=...                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $DUKA_CONFIG, or ./duka.toml                                       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # duka.toml
//! log_level = "info,duka_api=debug"
//!
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//! cors_origins = ["http://localhost:5173"]
//!
//! [database]
//! path = "./duka.db"
//! max_connections = 5
//!
//! [auth]
//! jwt_secret = "change-me-to-something-long-and-random"
//! access_lifetime_secs = 3600
//! refresh_lifetime_secs = 604800
//! admin_email = "owner@duka.co.ke"    # first-start admin, only if none exists
//! admin_password = "..."
//!
//! [dashboard]
//! refresh_secs = 60
//! period = "today"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use duka_core::Period;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Dev-only signing key; [`ApiConfig::uses_default_secret`] lets `main` warn.
pub const DEFAULT_JWT_SECRET: &str = "duka-dev-secret-change-in-production";

const MIN_SECRET_LEN: usize = 16;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
    pub port: u16,
    /// Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: PathBuf::from("./duka.db"),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub access_lifetime_secs: i64,
    pub refresh_lifetime_secs: i64,
    pub admin_name: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            access_lifetime_secs: 3600,
            refresh_lifetime_secs: 7 * 24 * 3600,
            admin_name: "Administrator".to_string(),
            admin_email: None,
            admin_password: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Seconds between background recomputations of the admin dashboard.
    pub refresh_secs: u64,
    /// Period the cached dashboard covers.
    pub period: Period,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            refresh_secs: 60,
            period: Period::Today,
        }
    }
}

// =============================================================================
// ApiConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub dashboard: DashboardSettings,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            log_level: "info".to_string(),
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            auth: AuthSettings::default(),
            dashboard: DashboardSettings::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else `$DUKA_CONFIG`, else `./duka.toml`)
    /// 3. `DUKA_*` environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = config_path.or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    fn default_config_path() -> Option<PathBuf> {
        match std::env::var("DUKA_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => Some(PathBuf::from("./duka.toml")),
        }
    }

    /// Applies `DUKA_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("DUKA_LOG") {
            self.log_level = level;
        }
        if let Some(addr) = lookup("DUKA_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(port) = lookup("DUKA_PORT") {
            self.server.port = parse_value("DUKA_PORT", &port)?;
        }
        if let Some(origins) = lookup("DUKA_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(path) = lookup("DUKA_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }
        if let Some(max) = lookup("DUKA_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_value("DUKA_DATABASE_MAX_CONNECTIONS", &max)?;
        }
        if let Some(secret) = lookup("DUKA_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(secs) = lookup("DUKA_ACCESS_LIFETIME_SECS") {
            self.auth.access_lifetime_secs = parse_value("DUKA_ACCESS_LIFETIME_SECS", &secs)?;
        }
        if let Some(secs) = lookup("DUKA_REFRESH_LIFETIME_SECS") {
            self.auth.refresh_lifetime_secs = parse_value("DUKA_REFRESH_LIFETIME_SECS", &secs)?;
        }
        if let Some(name) = lookup("DUKA_ADMIN_NAME") {
            self.auth.admin_name = name;
        }
        if let Some(email) = lookup("DUKA_ADMIN_EMAIL") {
            self.auth.admin_email = Some(email);
        }
        if let Some(password) = lookup("DUKA_ADMIN_PASSWORD") {
            self.auth.admin_password = Some(password);
        }
        if let Some(secs) = lookup("DUKA_DASHBOARD_REFRESH_SECS") {
            self.dashboard.refresh_secs = parse_value("DUKA_DASHBOARD_REFRESH_SECS", &secs)?;
        }
        if let Some(period) = lookup("DUKA_DASHBOARD_PERIOD") {
            self.dashboard.period = parse_value("DUKA_DASHBOARD_PERIOD", &period)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "jwt_secret must be at least {MIN_SECRET_LEN} characters"
            )));
        }
        if self.auth.access_lifetime_secs <= 0 {
            return Err(ConfigError::Invalid(
                "access_lifetime_secs must be greater than 0".into(),
            ));
        }
        if self.auth.refresh_lifetime_secs <= self.auth.access_lifetime_secs {
            return Err(ConfigError::Invalid(
                "refresh_lifetime_secs must be longer than access_lifetime_secs".into(),
            ));
        }
        if self.auth.admin_email.is_some() != self.auth.admin_password.is_some() {
            return Err(ConfigError::Invalid(
                "admin_email and admin_password must be set together".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        if self.dashboard.refresh_secs == 0 {
            return Err(ConfigError::Invalid(
                "dashboard.refresh_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn uses_default_secret(&self) -> bool {
        if self.auth.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("Using the built-in JWT secret; set DUKA_JWT_SECRET in production");
            return true;
        }
        false
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.dashboard.period, Period::Today);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApiConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [dashboard]
            period = "this_month"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.dashboard.period, Period::ThisMonth);
        assert_eq!(config.dashboard.refresh_secs, 60);
        assert_eq!(config.auth.access_lifetime_secs, 3600);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ApiConfig::default();
        config
            .apply_overrides(env(&[
                ("DUKA_PORT", "3000"),
                ("DUKA_DATABASE_PATH", "/var/lib/duka/duka.db"),
                ("DUKA_CORS_ORIGINS", "http://a.test, http://b.test"),
                ("DUKA_DASHBOARD_PERIOD", "last_7_days"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, PathBuf::from("/var/lib/duka/duka.db"));
        assert_eq!(config.server.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.dashboard.period, Period::Last7Days);
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let mut config = ApiConfig::default();
        let err = config
            .apply_overrides(env(&[("DUKA_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "DUKA_PORT"));
    }

    #[test]
    fn test_validation_rules() {
        let mut config = ApiConfig::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.auth.admin_email = Some("owner@duka.co.ke".to_string());
        assert!(config.validate().is_err());
        config.auth.admin_password = Some("Secret123".to_string());
        assert!(config.validate().is_ok());

        let mut config = ApiConfig::default();
        config.auth.refresh_lifetime_secs = config.auth.access_lifetime_secs;
        assert!(config.validate().is_err());
    }
}
