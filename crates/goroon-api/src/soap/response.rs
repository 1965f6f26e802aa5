//! Turns parsed responses into record views.
//!
//! Only the attributes the output columns need are read. Anything else the
//! server sends (versions, timezones, exclusive dates, files) is ignored.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;

use goroon_core::{BulletinFollowView, EventTime, Member, RepeatCondition, ScheduleEventView};

use crate::error::{ApiError, ApiResult};

use super::envelope::Action;
use super::xml::Node;

/// A decoded SOAP fault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fault {
    /// Human-readable reason from `Reason/Text`.
    pub reason: String,
    /// Server error code, e.g. `GRN_CMMN_00105`.
    pub code: Option<String>,
    /// Diagnosis message from the fault detail.
    pub diagnosis: Option<String>,
    /// Cause message from the fault detail.
    pub cause: Option<String>,
}

impl Fault {
    /// Converts the fault into an error for `action`.
    ///
    /// A fault on login means the credentials were rejected.
    pub fn into_error(self, action: Action) -> ApiError {
        let mut message = self
            .diagnosis
            .filter(|d| !d.is_empty())
            .unwrap_or(self.reason);
        if let Some(cause) = self.cause.filter(|c| !c.is_empty()) {
            message = format!("{} ({})", message, cause);
        }
        let error = match action {
            Action::UtilLogin => ApiError::authentication(message),
            _ => ApiError::server(message),
        };
        let error = error.with_action(action.name());
        match self.code {
            Some(code) => error.with_fault_code(code),
            None => error,
        }
    }
}

/// Returns the fault carried by a response document, if any.
pub fn fault(root: &Node) -> Option<Fault> {
    let fault = root.find("Fault")?;
    let reason = fault
        .find("Reason")
        .and_then(|r| r.find("Text"))
        .or_else(|| fault.find("faultstring"))
        .map(|t| t.text().to_string())
        .unwrap_or_default();
    let detail = fault.find("Detail");
    let detail_text = |name: &str| {
        detail
            .and_then(|d| d.find(name))
            .map(|n| n.text().trim().to_string())
    };
    Some(Fault {
        reason,
        code: detail_text("code"),
        diagnosis: detail_text("diagnosis"),
        cause: detail_text("cause"),
    })
}

/// Returns the `<returns>` element of a successful response.
pub fn returns(root: &Node) -> ApiResult<&Node> {
    root.find("returns")
        .ok_or_else(|| ApiError::invalid_response("response has no <returns> element"))
}

/// Extracts the session value for `cookie_name`.
///
/// The login response names the cookie in its body; `Set-Cookie` headers
/// are consulted when the body does not.
pub fn session_id(
    returns: &Node,
    set_cookies: &[String],
    cookie_name: &str,
) -> ApiResult<Option<String>> {
    let pattern = Regex::new(&format!("{}=([^;]+)", regex::escape(cookie_name))).map_err(|e| {
        ApiError::configuration(format!("invalid session cookie name {:?}", cookie_name))
            .with_source(e)
    })?;
    let body_cookie = returns.find("cookie").map(|c| c.text());
    let found = body_cookie
        .into_iter()
        .chain(set_cookies.iter().map(String::as_str))
        .find_map(|cookie| pattern.captures(cookie))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string());
    Ok(found.filter(|s| !s.is_empty()))
}

/// Extracts the id of the first user in a user lookup response.
pub fn user_id(returns: &Node) -> ApiResult<Option<u64>> {
    match returns.find_all("user").first() {
        Some(user) => {
            let key = user
                .attr("key")
                .or_else(|| user.attr("id"))
                .ok_or_else(|| ApiError::invalid_response("user has no key attribute"))?;
            Ok(Some(parse_id(key, "user key")?))
        }
        None => Ok(None),
    }
}

/// Extracts every schedule event, in server order.
pub fn schedule_events(returns: &Node) -> ApiResult<Vec<ScheduleEventView>> {
    returns
        .find_all("schedule_event")
        .into_iter()
        .map(schedule_event)
        .collect()
}

/// Extracts every bulletin follow, in server order.
pub fn follows(returns: &Node) -> ApiResult<Vec<BulletinFollowView>> {
    returns
        .find_all("follow")
        .into_iter()
        .map(|node| {
            let number = node
                .attr("number")
                .or_else(|| node.attr("id"))
                .ok_or_else(|| ApiError::invalid_response("follow has no number"))?;
            let creator = node
                .child("creator")
                .and_then(|c| c.attr("name"))
                .unwrap_or_default();
            Ok(BulletinFollowView::new(
                parse_id(number, "follow number")?,
                creator,
                node.attr("text").unwrap_or_default(),
            ))
        })
        .collect()
}

fn schedule_event(node: &Node) -> ApiResult<ScheduleEventView> {
    let id = node
        .attr("id")
        .ok_or_else(|| ApiError::invalid_response("schedule_event has no id"))?;
    let description = node
        .attr("description")
        .or_else(|| node.child("description").map(Node::text))
        .unwrap_or_default();

    let mut event = ScheduleEventView::new(
        parse_id(id, "event id")?,
        node.attr("event_type").unwrap_or_default(),
    )
    .with_detail(node.attr("detail").unwrap_or_default())
    .with_description(description);

    if let Some(members) = node.child("members") {
        for entry in members.children().iter().filter(|m| m.name() == "member") {
            if let Some(m) = entry.children().first().map(member).transpose()? {
                event = event.with_member(m);
            }
        }
    }

    if let Some(when) = node.child("when") {
        let (start, end) = event_times(when)?;
        event = event.with_times(start, end);
    }

    if let Some(condition) = node
        .child("repeat_info")
        .and_then(|r| r.child("condition"))
    {
        event = event.with_repeat(repeat_condition(condition)?);
    }

    Ok(event)
}

fn member(node: &Node) -> ApiResult<Member> {
    let id = match node.attr("id") {
        Some(id) => parse_id(id, "member id")?,
        None => 0,
    };
    let name = node.attr("name").unwrap_or_default().to_string();
    Ok(match node.name() {
        "organization" => Member::Organization { id, name },
        "facility" => Member::Facility { id, name },
        _ => Member::User { id, name },
    })
}

fn event_times(when: &Node) -> ApiResult<(Option<EventTime>, Option<EventTime>)> {
    if let Some(datetime) = when.child("datetime") {
        let parse = |attr: &str| {
            datetime
                .attr(attr)
                .map(|s| parse_datetime(s).map(EventTime::from_utc))
                .transpose()
        };
        return Ok((parse("start")?, parse("end")?));
    }
    if let Some(date) = when.child("date") {
        let parse = |attr: &str| {
            date.attr(attr)
                .map(|s| parse_date(s).map(EventTime::from_date))
                .transpose()
        };
        return Ok((parse("start")?, parse("end")?));
    }
    Ok((None, None))
}

fn repeat_condition(node: &Node) -> ApiResult<RepeatCondition> {
    let date = |attr: &str| node.attr(attr).map(parse_date).transpose();
    let time = |attr: &str| node.attr(attr).map(parse_time).transpose();
    Ok(RepeatCondition {
        kind: node.attr("type").unwrap_or_default().to_string(),
        start_date: date("start_date")?,
        end_date: date("end_date")?,
        start_time: time("start_time")?,
        end_time: time("end_time")?,
    })
}

fn parse_id(value: &str, what: &str) -> ApiResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid_response(format!("invalid {}: {:?}", what, value)))
}

fn parse_datetime(value: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::invalid_response(format!("invalid date-time: {:?}", value)))
}

fn parse_date(value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::invalid_response(format!("invalid date: {:?}", value)))
}

fn parse_time(value: &str) -> ApiResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| ApiError::invalid_response(format!("invalid time: {:?}", value)))
}
