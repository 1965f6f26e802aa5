//! Record views for schedule events and bulletin follows.
//!
//! - [`ScheduleEventView`]: one schedule event as returned by the server
//! - [`Member`]: an event participant (user, organization or facility)
//! - [`RepeatCondition`]: the time-of-day rule of a recurring event
//! - [`BulletinFollowView`]: one reply in a bulletin topic thread
//!
//! Views are built once per fetched record and only read afterwards.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::time::EventTime;

/// Event kind token used by the server for recurring events.
pub const REPEAT_EVENT_TYPE: &str = "repeat";

/// Filter value that matches every event kind.
pub const ALL_EVENT_TYPES: &str = "all";

/// A participant of a schedule event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    /// A user account.
    User { id: u64, name: String },
    /// An organization (department).
    Organization { id: u64, name: String },
    /// A facility (room, equipment).
    Facility { id: u64, name: String },
}

impl Member {
    /// Creates a user member.
    pub fn user(id: u64, name: impl Into<String>) -> Self {
        Self::User {
            id,
            name: name.into(),
        }
    }

    /// Returns the display name if this member is a user.
    pub fn user_name(&self) -> Option<&str> {
        match self {
            Self::User { name, .. } => Some(name),
            Self::Organization { .. } | Self::Facility { .. } => None,
        }
    }
}

/// The recurrence rule of a repeat event.
///
/// Only the time-of-day part is used for display; the date rule is kept for
/// completeness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatCondition {
    /// Recurrence type token (`day`, `week`, `month`, ...).
    pub kind: String,
    /// First date of the recurrence.
    pub start_date: Option<NaiveDate>,
    /// Last date of the recurrence.
    pub end_date: Option<NaiveDate>,
    /// Time of day each occurrence starts.
    pub start_time: Option<NaiveTime>,
    /// Time of day each occurrence ends.
    pub end_time: Option<NaiveTime>,
}

/// A schedule event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEventView {
    /// Event identifier.
    pub id: u64,
    /// Raw event kind token (`normal`, `repeat`, `banner`, ...).
    pub event_type: String,
    /// Short detail (title) text.
    pub detail: String,
    /// Free-text description.
    pub description: String,
    /// Participants in server order.
    pub members: Vec<Member>,
    /// When the event starts, if the server sent a start.
    pub start: Option<EventTime>,
    /// When the event ends, if the server sent an end.
    pub end: Option<EventTime>,
    /// Recurrence rule for repeat events.
    pub repeat: Option<RepeatCondition>,
}

impl ScheduleEventView {
    /// Creates an event with an id and kind; everything else empty.
    pub fn new(id: u64, event_type: impl Into<String>) -> Self {
        Self {
            id,
            event_type: event_type.into(),
            detail: String::new(),
            description: String::new(),
            members: Vec::new(),
            start: None,
            end: None,
            repeat: None,
        }
    }

    /// Returns true for recurring events.
    pub fn is_repeat(&self) -> bool {
        self.event_type == REPEAT_EVENT_TYPE
    }

    /// Returns true if the event passes an event-kind filter.
    ///
    /// [`ALL_EVENT_TYPES`] matches everything; any other value must equal
    /// the kind token exactly.
    pub fn matches_type(&self, filter: &str) -> bool {
        filter == ALL_EVENT_TYPES || self.event_type == filter
    }

    /// Builder method to set the detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to add a member.
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Builder method to set start and end.
    pub fn with_times(mut self, start: Option<EventTime>, end: Option<EventTime>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Builder method to set the recurrence rule.
    pub fn with_repeat(mut self, repeat: RepeatCondition) -> Self {
        self.repeat = Some(repeat);
        self
    }
}

/// A follow (reply) in a bulletin topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletinFollowView {
    /// Sequence number within the topic.
    pub number: u64,
    /// Display name of the author.
    pub creator: String,
    /// Body text as sent by the server.
    pub text: String,
}

impl BulletinFollowView {
    /// Creates a follow view.
    pub fn new(number: u64, creator: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number,
            creator: creator.into(),
            text: text.into(),
        }
    }
}
