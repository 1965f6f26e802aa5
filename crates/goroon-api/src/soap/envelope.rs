//! SOAP 1.2 request envelopes.
//!
//! A request is `<Action><parameters .../></Action>` wrapped in an envelope
//! whose header names the action and carries auth, timestamp and locale.

use std::io::Cursor;

use chrono::{DateTime, TimeDelta, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{ApiError, ApiResult};

use super::config::{Auth, SoapConfig};

/// SOAP 1.2 envelope namespace.
pub const SOAP_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
/// WS-Security namespace.
pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
/// WS-Security utility namespace.
pub const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";

/// Lifetime in seconds written into the `Timestamp` header.
const TIMESTAMP_TTL_SECS: i64 = 3600;

/// The remote actions this client calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    UtilLogin,
    BaseGetUsersByLoginName,
    ScheduleGetEvents,
    ScheduleGetEventsByTarget,
    BulletinGetFollows,
}

impl Action {
    /// Returns the action name used in the header and body.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UtilLogin => "UtilLogin",
            Self::BaseGetUsersByLoginName => "BaseGetUsersByLoginName",
            Self::ScheduleGetEvents => "ScheduleGetEvents",
            Self::ScheduleGetEventsByTarget => "ScheduleGetEventsByTarget",
            Self::BulletinGetFollows => "BulletinGetFollows",
        }
    }

    /// Returns the service path relative to the endpoint.
    pub fn service_path(&self) -> &'static str {
        match self {
            Self::UtilLogin => "util_api/util/api.csp",
            Self::BaseGetUsersByLoginName => "cbpapi/base/api.csp",
            Self::ScheduleGetEvents | Self::ScheduleGetEventsByTarget => {
                "cbpapi/schedule/api.csp"
            }
            Self::BulletinGetFollows => "cbpapi/bulletin/api.csp",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A small XML element used for request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The `<parameters>` element every action body carries.
    pub fn parameters() -> Self {
        Self::new("parameters")
    }

    /// Adds an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((name.into(), value.to_string()));
        self
    }

    /// Sets the text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Appends a child element.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    fn write(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> ApiResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        if self.text.is_none() && self.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }
        write_event(writer, Event::Start(start))?;
        if let Some(ref text) = self.text {
            write_event(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

/// Formats a UTC instant the way the server expects request times.
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Builds the full request document for `action`.
pub fn build(
    action: Action,
    parameters: &Element,
    config: &SoapConfig,
    created: DateTime<Utc>,
) -> ApiResult<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut envelope = BytesStart::new("soap:Envelope");
    envelope.push_attribute(("xmlns:soap", SOAP_NS));
    write_event(&mut writer, Event::Start(envelope))?;

    write_event(&mut writer, Event::Start(BytesStart::new("soap:Header")))?;
    Element::new("Action").text(action.name()).write(&mut writer)?;
    if let Auth::Credentials { username, password } = &config.auth {
        Element::new("Security")
            .attr("xmlns:wsse", WSSE_NS)
            .attr("xmlns:wsu", WSU_NS)
            .child(
                Element::new("UsernameToken")
                    .child(Element::new("Username").text(username.as_str()))
                    .child(Element::new("Password").text(password.as_str())),
            )
            .write(&mut writer)?;
    }
    let expires = created + TimeDelta::seconds(TIMESTAMP_TTL_SECS);
    Element::new("Timestamp")
        .attr("SOAP-ENV:mustUnderstand", "1")
        .attr("Id", "id")
        .attr("xmlns:SOAP-ENV", SOAP_NS)
        .attr("xmlns", WSU_NS)
        .child(Element::new("Created").text(format_datetime(created)))
        .child(Element::new("Expires").text(format_datetime(expires)))
        .write(&mut writer)?;
    Element::new("Locale")
        .text(config.locale.as_str())
        .write(&mut writer)?;
    write_event(&mut writer, Event::End(BytesEnd::new("soap:Header")))?;

    write_event(&mut writer, Event::Start(BytesStart::new("soap:Body")))?;
    Element::new(action.name())
        .child(parameters.clone())
        .write(&mut writer)?;
    write_event(&mut writer, Event::End(BytesEnd::new("soap:Body")))?;

    write_event(&mut writer, Event::End(BytesEnd::new("soap:Envelope")))?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| ApiError::internal("request is not valid UTF-8").with_source(e))
}

fn write_event(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> ApiResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ApiError::internal(format!("failed to write request: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 1, 0, 0).unwrap()
    }

    fn config() -> SoapConfig {
        SoapConfig::new("https://example.cybozu.com/g").unwrap()
    }

    #[test]
    fn action_names_and_paths() {
        assert_eq!(Action::BulletinGetFollows.name(), "BulletinGetFollows");
        assert_eq!(
            Action::ScheduleGetEventsByTarget.service_path(),
            "cbpapi/schedule/api.csp"
        );
        assert_eq!(Action::UtilLogin.to_string(), "UtilLogin");
    }

    #[test]
    fn envelope_with_credentials() {
        let config = config().with_credentials("alice", "s3cret");
        let params = Element::parameters()
            .attr("start", "2024-03-14T15:00:00Z")
            .attr("end", "2024-03-15T14:59:59Z");
        let xml = build(Action::ScheduleGetEvents, &params, &config, created()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<Action>ScheduleGetEvents</Action>"));
        assert!(xml.contains(
            "<UsernameToken><Username>alice</Username><Password>s3cret</Password></UsernameToken>"
        ));
        assert!(xml.contains("<Created>2024-03-15T01:00:00Z</Created>"));
        assert!(xml.contains("<Expires>2024-03-15T02:00:00Z</Expires>"));
        assert!(xml.contains("<Locale>jp</Locale>"));
        assert!(xml.contains(
            "<soap:Body><ScheduleGetEvents><parameters start=\"2024-03-14T15:00:00Z\" end=\"2024-03-15T14:59:59Z\"/></ScheduleGetEvents></soap:Body>"
        ));
    }

    #[test]
    fn session_auth_omits_security_header() {
        let config = config().with_session("abc");
        let xml = build(
            Action::ScheduleGetEvents,
            &Element::parameters(),
            &config,
            created(),
        )
        .unwrap();
        assert!(!xml.contains("Security"));
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let params = Element::parameters()
            .child(Element::new("login_name").text("a<b&c"))
            .child(Element::new("user").attr("name", "\"q\""));
        let xml = build(Action::UtilLogin, &params, &config(), created()).unwrap();
        assert!(xml.contains("<login_name>a&lt;b&amp;c</login_name>"));
        assert!(xml.contains("<user name=\"&quot;q&quot;\"/>"));
    }

    #[test]
    fn datetime_format_drops_subseconds() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 15, 14, 59, 59).unwrap()
            + TimeDelta::nanoseconds(999_999);
        assert_eq!(format_datetime(dt), "2024-03-15T14:59:59Z");
    }
}
