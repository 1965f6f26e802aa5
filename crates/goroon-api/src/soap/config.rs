//! SOAP client configuration.

use std::time::Duration;
use url::Url;

use super::envelope::Action;

/// How requests authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// No authentication (login requests carry credentials in the body).
    Anonymous,
    /// WS-Security UsernameToken header.
    Credentials { username: String, password: String },
    /// Session cookie obtained from an earlier login.
    Session(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Credentials { username, .. } => f
                .debug_struct("Credentials")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Session(_) => f.write_str("Session(***)"),
        }
    }
}

/// Configuration for [`SoapClient`](super::SoapClient).
#[derive(Debug, Clone)]
pub struct SoapConfig {
    /// Base URL of the Garoon installation, e.g. `https://example.cybozu.com/g`.
    pub endpoint: Url,

    /// Authentication used for every request.
    pub auth: Auth,

    /// Name of the session cookie.
    pub session_cookie: String,

    /// Value of the `Locale` SOAP header.
    pub locale: String,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl SoapConfig {
    /// Default session cookie name.
    pub const DEFAULT_SESSION_COOKIE: &'static str = "CBSESSID";

    /// Default locale.
    pub const DEFAULT_LOCALE: &'static str = "jp";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(endpoint.as_ref())?;
        Ok(Self {
            endpoint,
            auth: Auth::Anonymous,
            session_cookie: Self::DEFAULT_SESSION_COOKIE.to_string(),
            locale: Self::DEFAULT_LOCALE.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("goroon/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Authenticates with a WS-Security username token.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Auth::Credentials {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Authenticates with a session cookie value.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.auth = Auth::Session(session_id.into());
        self
    }

    /// Sets the session cookie name.
    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self
    }

    /// Sets the locale header value.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the URL an action is posted to.
    pub fn service_url(&self, action: Action) -> String {
        format!(
            "{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            action.service_path()
        )
    }

    /// Returns the `Cookie` header value when session auth is configured.
    pub fn cookie_header(&self) -> Option<String> {
        match &self.auth {
            Auth::Session(id) => Some(format!("{}={}", self.session_cookie, id)),
            Auth::Anonymous | Auth::Credentials { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = SoapConfig::new("https://example.cybozu.com/g").unwrap();
        assert_eq!(config.auth, Auth::Anonymous);
        assert_eq!(config.session_cookie, "CBSESSID");
        assert_eq!(config.locale, "jp");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.cookie_header().is_none());
    }

    #[test]
    fn service_urls() {
        let config = SoapConfig::new("https://example.cybozu.com/g/").unwrap();
        assert_eq!(
            config.service_url(Action::ScheduleGetEvents),
            "https://example.cybozu.com/g/cbpapi/schedule/api.csp"
        );
        assert_eq!(
            config.service_url(Action::UtilLogin),
            "https://example.cybozu.com/g/util_api/util/api.csp"
        );
    }

    #[test]
    fn session_cookie_header() {
        let config = SoapConfig::new("https://example.cybozu.com/g")
            .unwrap()
            .with_session_cookie("JSESSIONID")
            .with_session("abc");
        assert_eq!(config.cookie_header(), Some("JSESSIONID=abc".to_string()));
    }

    #[test]
    fn credentials_are_not_debug_printed() {
        let config = SoapConfig::new("https://example.cybozu.com/g")
            .unwrap()
            .with_credentials("alice", "hunter2");
        let debug = format!("{:?}", config.auth);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn invalid_url_returns_error() {
        assert!(SoapConfig::new("not a url").is_err());
    }
}
