//! HTTP transport for SOAP calls.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Client, StatusCode};
use tracing::{Level, debug, trace};

use goroon_core::{BulletinFollowView, ScheduleEventView, TimeWindow};

use crate::api::{BoxFuture, FollowQuery, GaroonApi, SessionToken};
use crate::error::{ApiError, ApiResult};

use super::config::SoapConfig;
use super::envelope::{self, Action, Element};
use super::response;
use super::xml::{self, Node};

const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=UTF-8";

static PASSWORD_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(<(?:\w+:)?[Pp]assword>).*?(</(?:\w+:)?[Pp]assword>)")
        .expect("Invalid password regex")
});

/// A response that passed fault and status checks.
struct SoapResponse {
    root: Node,
    set_cookies: Vec<String>,
}

impl SoapResponse {
    fn returns(&self, action: Action) -> ApiResult<&Node> {
        response::returns(&self.root).map_err(|e| e.with_action(action.name()))
    }
}

/// SOAP client for one Garoon endpoint.
pub struct SoapClient {
    client: Client,
    config: SoapConfig,
}

impl SoapClient {
    /// Creates a client with the given configuration.
    pub fn new(config: SoapConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SoapConfig {
        &self.config
    }

    /// Posts one action and returns the checked response.
    async fn call(&self, action: Action, parameters: Element) -> ApiResult<SoapResponse> {
        let body = envelope::build(action, &parameters, &self.config, Utc::now())?;
        let url = self.config.service_url(action);

        debug!(action = %action, url = %url, "Sending request");
        if tracing::enabled!(Level::DEBUG) {
            debug!("Request body:\n{}", PASSWORD_ELEMENT.replace_all(&body, "${1}***${2}"));
        }

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(body);
        if let Some(cookie) = self.config.cookie_header() {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| {
            ApiError::network(format!("Request to {} failed: {}", url, e))
                .with_action(action.name())
                .with_source(e)
        })?;

        let status = response.status();
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let text = response.text().await.map_err(|e| {
            ApiError::network(format!("Failed to read response: {}", e))
                .with_action(action.name())
                .with_source(e)
        })?;

        trace!(status = %status, bytes = text.len(), "Received response");
        debug!("Response body:\n{}", text);

        // Faults usually arrive with a 500 status; decode them first.
        let parsed = xml::parse(&text);
        if let Ok(ref root) = parsed {
            if let Some(fault) = response::fault(root) {
                return Err(fault.into_error(action));
            }
        }
        if !status.is_success() {
            return Err(status_error(status, &url).with_action(action.name()));
        }

        let root = parsed.map_err(|e| e.with_action(action.name()))?;
        Ok(SoapResponse { root, set_cookies })
    }

    async fn login_session(&self, login_name: &str, password: &str) -> ApiResult<SessionToken> {
        let action = Action::UtilLogin;
        let parameters = Element::parameters()
            .child(Element::new("login_name").text(login_name))
            .child(Element::new("password").text(password));
        let response = self.call(action, parameters).await?;
        let returns = response.returns(action)?;

        response::session_id(returns, &response.set_cookies, &self.config.session_cookie)?
            .map(SessionToken::new)
            .ok_or_else(|| {
                ApiError::authentication(format!(
                    "login response carried no {} cookie",
                    self.config.session_cookie
                ))
                .with_action(action.name())
            })
    }

    async fn lookup_user(&self, login_name: &str) -> ApiResult<u64> {
        let action = Action::BaseGetUsersByLoginName;
        let parameters =
            Element::parameters().child(Element::new("login_name").text(login_name));
        let response = self.call(action, parameters).await?;
        let returns = response.returns(action)?;

        response::user_id(returns)
            .map_err(|e| e.with_action(action.name()))?
            .ok_or_else(|| {
                ApiError::not_found(format!("no user with login name {:?}", login_name))
                    .with_action(action.name())
            })
    }

    async fn events(
        &self,
        window: TimeWindow,
        target_user: Option<u64>,
    ) -> ApiResult<Vec<ScheduleEventView>> {
        let mut parameters = Element::parameters()
            .attr("start", envelope::format_datetime(window.start))
            .attr("end", envelope::format_datetime(window.end));
        let action = match target_user {
            Some(id) => {
                parameters = parameters.child(Element::new("user").attr("id", id));
                Action::ScheduleGetEventsByTarget
            }
            None => Action::ScheduleGetEvents,
        };

        let response = self.call(action, parameters).await?;
        let events = response::schedule_events(response.returns(action)?)
            .map_err(|e| e.with_action(action.name()))?;
        debug!(count = events.len(), "Fetched schedule events");
        Ok(events)
    }

    async fn follows(&self, query: FollowQuery) -> ApiResult<Vec<BulletinFollowView>> {
        let action = Action::BulletinGetFollows;
        let parameters = Element::parameters()
            .attr("topic_id", query.topic_id)
            .attr("offset", query.offset)
            .attr("limit", query.limit);

        let response = self.call(action, parameters).await?;
        let follows = response::follows(response.returns(action)?)
            .map_err(|e| e.with_action(action.name()))?;
        debug!(count = follows.len(), topic_id = query.topic_id, "Fetched follows");
        Ok(follows)
    }
}

impl GaroonApi for SoapClient {
    fn login<'a>(
        &'a self,
        login_name: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, ApiResult<SessionToken>> {
        Box::pin(self.login_session(login_name, password))
    }

    fn user_id_by_login_name<'a>(&'a self, login_name: &'a str) -> BoxFuture<'a, ApiResult<u64>> {
        Box::pin(self.lookup_user(login_name))
    }

    fn fetch_events(
        &self,
        window: TimeWindow,
        target_user: Option<u64>,
    ) -> BoxFuture<'_, ApiResult<Vec<ScheduleEventView>>> {
        Box::pin(self.events(window, target_user))
    }

    fn fetch_follows(
        &self,
        query: FollowQuery,
    ) -> BoxFuture<'_, ApiResult<Vec<BulletinFollowView>>> {
        Box::pin(self.follows(query))
    }
}

/// Maps a non-success status without a SOAP fault to an error.
fn status_error(status: StatusCode, url: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ApiError::authentication(format!("Access denied ({})", status))
        }
        StatusCode::NOT_FOUND => {
            ApiError::not_found(format!("No API at {}; check the endpoint", url))
        }
        s if s.is_server_error() => ApiError::server(format!("Server error ({})", s)),
        s => ApiError::invalid_response(format!("Unexpected status {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorCode;

    #[test]
    fn client_creation() {
        let config = SoapConfig::new("https://example.cybozu.com/g").unwrap();
        let client = SoapClient::new(config).unwrap();
        assert_eq!(client.config().endpoint.as_str(), "https://example.cybozu.com/g");
    }

    #[test]
    fn passwords_are_redacted_in_dumps() {
        let body = "<Password>hunter2</Password><password>p\nw</password><login_name>a</login_name>";
        let redacted = PASSWORD_ELEMENT.replace_all(body, "${1}***${2}");
        assert_eq!(
            redacted,
            "<Password>***</Password><password>***</password><login_name>a</login_name>"
        );
    }

    #[test]
    fn status_mapping() {
        let url = "https://example.cybozu.com/g/cbpapi/schedule/api.csp";
        assert_eq!(
            status_error(StatusCode::UNAUTHORIZED, url).code(),
            ApiErrorCode::AuthenticationFailed
        );
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, url).code(),
            ApiErrorCode::NotFound
        );
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, url).code(),
            ApiErrorCode::ServerError
        );
        assert_eq!(
            status_error(StatusCode::IM_A_TEAPOT, url).code(),
            ApiErrorCode::InvalidResponse
        );
    }
}
