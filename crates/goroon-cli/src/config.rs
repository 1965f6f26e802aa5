//! Client configuration.
//!
//! Optional settings live in `~/.config/goroon/config.toml`. Every value
//! can be overridden by a command-line flag or its environment variable.
//!
//! ```toml
//! endpoint = "https://example.cybozu.com/g"
//! locale = "jp"
//!
//! [schedule]
//! columns = "id,detail,start,end"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use goroon_api::SoapConfig;
use goroon_core::format::{DEFAULT_BULLETIN_COLUMNS, DEFAULT_SCHEDULE_COLUMNS};
use goroon_core::record::ALL_EVENT_TYPES;

use crate::error::{ClientError, ClientResult};

/// Name of the session file in the home directory.
pub const SESSION_FILE_NAME: &str = ".goroon";

/// Configuration for the goroon client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the Garoon installation.
    pub endpoint: Option<String>,

    /// Name of the session cookie.
    pub session_cookie: String,

    /// Locale sent with every request.
    pub locale: String,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Where the login session is stored.
    pub session_file: Option<PathBuf>,

    /// Defaults for `goroon schedule`.
    pub schedule: ScheduleSettings,

    /// Defaults for `goroon bulletin`.
    pub bulletin: BulletinSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            session_cookie: SoapConfig::DEFAULT_SESSION_COOKIE.to_string(),
            locale: SoapConfig::DEFAULT_LOCALE.to_string(),
            timeout: SoapConfig::DEFAULT_TIMEOUT_SECS,
            session_file: None,
            schedule: ScheduleSettings::default(),
            bulletin: BulletinSettings::default(),
        }
    }
}

/// Schedule command defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Comma-separated output columns.
    pub columns: String,

    /// Event kind filter (`all` keeps everything).
    pub event_type: String,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            columns: DEFAULT_SCHEDULE_COLUMNS.to_string(),
            event_type: ALL_EVENT_TYPES.to_string(),
        }
    }
}

/// Bulletin command defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletinSettings {
    /// Comma-separated output columns.
    pub columns: String,

    /// Page size.
    pub limit: u32,
}

impl Default for BulletinSettings {
    fn default() -> Self {
        Self {
            columns: DEFAULT_BULLETIN_COLUMNS.to_string(),
            limit: goroon_api::FollowQuery::DEFAULT_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Checks values that would only fail later, at request time.
    pub fn validate(&self) -> ClientResult<()> {
        if let Some(ref endpoint) = self.endpoint {
            SoapConfig::new(endpoint).map_err(|e| {
                ClientError::Config(format!("invalid endpoint {:?}: {}", endpoint, e))
            })?;
        }
        if self.timeout == 0 {
            return Err(ClientError::Config("timeout must be positive".to_string()));
        }
        if self.session_cookie.trim().is_empty() {
            return Err(ClientError::Config(
                "session_cookie must not be empty".to_string(),
            ));
        }
        if self.bulletin.limit == 0 {
            return Err(ClientError::Config(
                "bulletin.limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the session file path: configured, or `~/.goroon`.
    pub fn session_path(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(Self::default_session_path)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("goroon")
    }

    /// Returns the default session file path.
    pub fn default_session_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SESSION_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert!(config.endpoint.is_none());
        assert_eq!(config.session_cookie, "CBSESSID");
        assert_eq!(config.locale, "jp");
        assert_eq!(config.timeout, 30);
        assert_eq!(config.schedule.columns, "detail,start,end");
        assert_eq!(config.schedule.event_type, "all");
        assert_eq!(config.bulletin.columns, "creator,text");
        assert_eq!(config.bulletin.limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
endpoint = "https://example.cybozu.com/g"
timeout = 10

[schedule]
columns = "id,detail"
"#
        )
        .unwrap();

        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://example.cybozu.com/g")
        );
        assert_eq!(config.timeout, 10);
        assert_eq!(config.schedule.columns, "id,detail");
        assert_eq!(config.schedule.event_type, "all");
        assert_eq!(config.bulletin.limit, 20);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout = \"soon\"").unwrap();
        let err = ClientConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let config = ClientConfig {
            endpoint: Some("not a url".to_string()),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            timeout: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn session_path_override() {
        let config = ClientConfig {
            session_file: Some(PathBuf::from("/tmp/goroon-session")),
            ..ClientConfig::default()
        };
        assert_eq!(config.session_path(), PathBuf::from("/tmp/goroon-session"));
        assert!(
            ClientConfig::default()
                .session_path()
                .ends_with(SESSION_FILE_NAME)
        );
    }

    #[test]
    fn serializes_to_toml() {
        let config = ClientConfig {
            endpoint: Some("https://example.cybozu.com/g".to_string()),
            ..ClientConfig::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("endpoint = \"https://example.cybozu.com/g\""));
        assert!(toml_str.contains("[schedule]"));
        let back: ClientConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.endpoint, config.endpoint);
    }
}
