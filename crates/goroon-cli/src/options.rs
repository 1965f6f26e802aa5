//! Per-command options.
//!
//! Each command gets one immutable options value, resolved once from flags,
//! environment and the config file (in that order of precedence).

use std::path::PathBuf;
use std::time::Duration;

use goroon_api::{FollowQuery, SoapClient, SoapConfig};
use goroon_core::{ColumnSpec, DateSelector};
use tracing::debug;

use crate::cli::{BulletinArgs, ConnectionArgs, ScheduleArgs};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionFile;

/// Connection settings shared by every command.
#[derive(Clone)]
pub struct Connection {
    /// Requested endpoint, if any.
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Session cookie name.
    pub session_cookie: String,
    pub locale: String,
    pub timeout: Duration,
    /// Session file location.
    pub session_file: PathBuf,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("session_cookie", &self.session_cookie)
            .field("locale", &self.locale)
            .field("timeout", &self.timeout)
            .field("session_file", &self.session_file)
            .finish()
    }
}

impl Connection {
    /// Merges connection flags with the config file.
    pub fn new(args: &ConnectionArgs, config: &ClientConfig) -> Self {
        Self {
            endpoint: args.endpoint.clone().or_else(|| config.endpoint.clone()),
            username: args.username.clone(),
            password: args.password.clone(),
            session_cookie: config.session_cookie.clone(),
            locale: config.locale.clone(),
            timeout: Duration::from_secs(config.timeout),
            session_file: config.session_path(),
        }
    }

    /// Builds a SOAP configuration for `endpoint` with no authentication.
    pub fn soap_config(&self, endpoint: &str) -> ClientResult<SoapConfig> {
        let config = SoapConfig::new(endpoint)
            .map_err(|e| ClientError::Config(format!("invalid endpoint {:?}: {}", endpoint, e)))?;
        Ok(config
            .with_session_cookie(self.session_cookie.as_str())
            .with_locale(self.locale.as_str())
            .with_timeout(self.timeout))
    }

    /// Builds an authenticated client.
    ///
    /// A stored session is used when it belongs to the requested endpoint
    /// (or no endpoint was requested); otherwise username and password are
    /// sent with every request.
    pub fn client(&self, session: Option<&SessionFile>) -> ClientResult<SoapClient> {
        let config = match session.filter(|s| s.matches_endpoint(self.endpoint.as_deref())) {
            Some(session) => {
                debug!(endpoint = %session.endpoint, "Using stored session");
                self.soap_config(&session.endpoint)?
                    .with_session(session.session_id.as_str())
            }
            None => {
                let endpoint = self.endpoint.as_deref().ok_or_else(|| {
                    ClientError::Config(
                        "no endpoint: pass --endpoint, set GAROON_ENDPOINT, or run `goroon login`"
                            .to_string(),
                    )
                })?;
                let (username, password) = self.credentials()?;
                debug!(endpoint = %endpoint, username = %username, "Using credentials");
                self.soap_config(endpoint)?
                    .with_credentials(username, password)
            }
        };
        Ok(SoapClient::new(config)?)
    }

    /// Returns username and password, or an error naming what is missing.
    pub fn credentials(&self) -> ClientResult<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) => Ok((u, p)),
            (None, _) => Err(ClientError::AuthRequired(
                "no username: pass --username or set GAROON_USERNAME".to_string(),
            )),
            (Some(_), None) => Err(ClientError::AuthRequired(
                "no password: pass --password or set GAROON_PASSWORD".to_string(),
            )),
        }
    }
}

/// Options for `goroon login`.
#[derive(Debug, Clone)]
pub struct LoginOptions {
    pub connection: Connection,
}

impl LoginOptions {
    pub fn new(connection: &ConnectionArgs, config: &ClientConfig) -> Self {
        Self {
            connection: Connection::new(connection, config),
        }
    }
}

/// Options for `goroon schedule`.
#[derive(Debug, Clone)]
pub struct ScheduleOptions {
    pub connection: Connection,
    /// How the query window is chosen.
    pub selector: DateSelector,
    /// Login name of the user whose schedule is read, if not your own.
    pub target_login_name: Option<String>,
    /// Event kind filter.
    pub event_type: String,
    pub columns: ColumnSpec,
}

impl ScheduleOptions {
    pub fn new(connection: &ConnectionArgs, args: &ScheduleArgs, config: &ClientConfig) -> Self {
        Self {
            connection: Connection::new(connection, config),
            selector: args.selector(),
            target_login_name: args.userid.clone().filter(|s| !s.is_empty()),
            event_type: args
                .event_type
                .clone()
                .unwrap_or_else(|| config.schedule.event_type.clone()),
            columns: ColumnSpec::parse(
                args.columns.as_deref().unwrap_or(&config.schedule.columns),
            ),
        }
    }
}

/// Options for `goroon bulletin`.
#[derive(Debug, Clone)]
pub struct BulletinOptions {
    pub connection: Connection,
    pub query: FollowQuery,
    pub columns: ColumnSpec,
}

impl BulletinOptions {
    pub fn new(connection: &ConnectionArgs, args: &BulletinArgs, config: &ClientConfig) -> Self {
        Self {
            connection: Connection::new(connection, config),
            query: FollowQuery::new(args.topic_id)
                .with_offset(args.offset)
                .with_limit(args.limit.unwrap_or(config.bulletin.limit)),
            columns: ColumnSpec::parse(
                args.columns.as_deref().unwrap_or(&config.bulletin.columns),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goroon_api::Auth;

    fn args(
        endpoint: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> ConnectionArgs {
        ConnectionArgs {
            username: username.map(String::from),
            password: password.map(String::from),
            endpoint: endpoint.map(String::from),
        }
    }

    mod connection {
        use super::*;

        #[test]
        fn flag_endpoint_beats_config() {
            let config = ClientConfig {
                endpoint: Some("https://config.example.com/g".to_string()),
                timeout: 5,
                ..ClientConfig::default()
            };
            let conn = Connection::new(
                &args(Some("https://flag.example.com/g"), None, None),
                &config,
            );
            assert_eq!(conn.endpoint.as_deref(), Some("https://flag.example.com/g"));
            assert_eq!(conn.timeout, Duration::from_secs(5));

            let conn = Connection::new(&args(None, None, None), &config);
            assert_eq!(conn.endpoint.as_deref(), Some("https://config.example.com/g"));
        }

        #[test]
        fn matching_session_is_used() {
            let conn = Connection::new(
                &args(Some("https://example.cybozu.com/g"), Some("alice"), Some("pw")),
                &ClientConfig::default(),
            );
            let session = SessionFile::new("f00dcafe", "https://example.cybozu.com/g/");
            let client = conn.client(Some(&session)).unwrap();
            assert_eq!(client.config().auth, Auth::Session("f00dcafe".to_string()));
        }

        #[test]
        fn session_without_requested_endpoint_is_used() {
            let conn = Connection::new(&args(None, None, None), &ClientConfig::default());
            let session = SessionFile::new("abc", "https://example.cybozu.com/g");
            let client = conn.client(Some(&session)).unwrap();
            assert_eq!(
                client.config().endpoint.as_str(),
                "https://example.cybozu.com/g"
            );
        }

        #[test]
        fn foreign_session_falls_back_to_credentials() {
            let conn = Connection::new(
                &args(Some("https://other.cybozu.com/g"), Some("alice"), Some("pw")),
                &ClientConfig::default(),
            );
            let session = SessionFile::new("abc", "https://example.cybozu.com/g");
            let client = conn.client(Some(&session)).unwrap();
            assert_eq!(
                client.config().auth,
                Auth::Credentials {
                    username: "alice".to_string(),
                    password: "pw".to_string()
                }
            );
        }

        #[test]
        fn missing_endpoint_or_credentials() {
            let conn = Connection::new(
                &args(None, Some("alice"), Some("pw")),
                &ClientConfig::default(),
            );
            assert!(matches!(conn.client(None), Err(ClientError::Config(_))));

            let conn = Connection::new(
                &args(Some("https://example.cybozu.com/g"), Some("alice"), None),
                &ClientConfig::default(),
            );
            assert!(matches!(conn.client(None), Err(ClientError::AuthRequired(_))));
        }

        #[test]
        fn debug_hides_password() {
            let conn = Connection::new(
                &args(None, Some("alice"), Some("hunter2")),
                &ClientConfig::default(),
            );
            assert!(!format!("{:?}", conn).contains("hunter2"));
        }
    }

    #[test]
    fn schedule_options_fall_back_to_config() {
        let mut config = ClientConfig::default();
        config.schedule.columns = "id, detail".to_string();
        config.schedule.event_type = "normal".to_string();

        let options =
            ScheduleOptions::new(&args(None, None, None), &ScheduleArgs::default(), &config);
        assert_eq!(options.columns.columns(), ["id", "detail"]);
        assert_eq!(options.event_type, "normal");
        assert_eq!(options.selector, DateSelector::default());
        assert!(options.target_login_name.is_none());

        let flags = ScheduleArgs {
            event_type: Some("banner".to_string()),
            columns: Some("type".to_string()),
            userid: Some("bob".to_string()),
            ..ScheduleArgs::default()
        };
        let options = ScheduleOptions::new(&args(None, None, None), &flags, &config);
        assert_eq!(options.columns.columns(), ["type"]);
        assert_eq!(options.event_type, "banner");
        assert_eq!(options.target_login_name.as_deref(), Some("bob"));
    }

    #[test]
    fn bulletin_options_limit() {
        let mut config = ClientConfig::default();
        config.bulletin.limit = 50;
        let flags = BulletinArgs {
            topic_id: 9,
            offset: 3,
            limit: None,
            columns: None,
        };
        let options = BulletinOptions::new(&args(None, None, None), &flags, &config);
        assert_eq!(options.query, FollowQuery::new(9).with_offset(3).with_limit(50));
        assert_eq!(options.columns.columns(), ["creator", "text"]);
    }
}
