use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use validator::Validate;

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiSettings {
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_connect_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Raw `Cookie` header, e.g. `sessionid=...; csrftoken=...`
    #[serde(default)]
    pub cookie: Option<String>,
    #[serde(default = "default_csrf_cookie_name")]
    pub csrf_cookie_name: String,
    #[serde(default = "default_csrf_header")]
    pub csrf_header: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie: None,
            csrf_cookie_name: default_csrf_cookie_name(),
            csrf_header: default_csrf_header(),
        }
    }
}

fn default_csrf_cookie_name() -> String { "csrftoken".to_string() }
fn default_csrf_header() -> String { "X-CSRFToken".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with VOLUNTEER_MATCH)
    pub fn load() -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VOLUNTEER_MATCH__API__BASE_URL -> api.base_url
            .add_source(environment())
            .build()?;

        Self::finish(config)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        Self::finish(config)
    }

    /// Apply command-line overrides on top of the loaded settings
    pub fn apply_overrides(&mut self, base_url: Option<String>, cookie: Option<String>) {
        if let Some(base_url) = base_url {
            self.api.base_url = base_url;
        }
        if let Some(cookie) = cookie {
            self.session.cookie = Some(cookie);
        }
    }

    /// Check value ranges that serde cannot express
    ///
    /// Not run by `load`/`load_from`; call it once overrides are applied.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.api.validate()?;
        Ok(())
    }

    /// Render the effective settings as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    fn finish(config: Config) -> Result<Self, SettingsError> {
        Ok(config.try_deserialize()?)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("VOLUNTEER_MATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, "http://localhost:8000");
        assert_eq!(settings.api.timeout_secs, 30);
        assert_eq!(settings.session.csrf_cookie_name, "csrftoken");
        assert_eq!(settings.session.csrf_header, "X-CSRFToken");
        assert!(settings.session.cookie.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut settings = Settings::default();
        settings.api.base_url = "not a url".to_string();
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut settings = Settings::default();
        settings.api.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("volunteer-match-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://match.example.org\"\ntimeout_secs = 5\n\n[session]\ncookie = \"csrftoken=abc\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.api.base_url, "https://match.example.org");
        assert_eq!(settings.api.timeout_secs, 5);
        assert_eq!(settings.api.connect_timeout_secs, 10);
        assert_eq!(settings.session.cookie.as_deref(), Some("csrftoken=abc"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_override_repairs_bad_base_url() {
        let dir = std::env::temp_dir().join(format!("volunteer-match-override-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, "[api]\nbase_url = \"not a url\"\n").unwrap();

        let mut settings = Settings::load_from(&path).unwrap();
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        settings.apply_overrides(Some("https://match.example.org".to_string()), Some("csrftoken=xyz".to_string()));
        assert!(settings.validate().is_ok());
        assert_eq!(settings.api.base_url, "https://match.example.org");
        assert_eq!(settings.session.cookie.as_deref(), Some("csrftoken=xyz"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_to_toml_round_trip_keys() {
        let rendered = Settings::default().to_toml().unwrap();
        assert!(rendered.contains("base_url = \"http://localhost:8000\""));
        assert!(rendered.contains("[logging]"));
    }
}
