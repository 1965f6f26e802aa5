//! Column projection and row formatting.
//!
//! A [`ColumnSpec`] names the fields to print, in order. The
//! [`RecordProjector`] resolves each name against a record implementing
//! [`Project`] and yields one string per column. Unknown names and missing
//! fields resolve to the empty string, so a row always has exactly as many
//! cells as there are columns.
//!
//! # Example
//!
//! ```rust
//! use chrono::{FixedOffset, TimeZone};
//! use goroon_core::format::{ColumnSpec, RecordProjector};
//! use goroon_core::BulletinFollowView;
//!
//! let tz = FixedOffset::east_opt(9 * 3600).unwrap();
//! let now = tz.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
//! let projector = RecordProjector::new(&now);
//!
//! let follow = BulletinFollowView::new(3, "Alice", "first\r\nsecond");
//! let columns = ColumnSpec::parse("id,creator,text");
//! assert_eq!(projector.row(&follow, &columns), "3\tAlice\tfirst second");
//! ```

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};

use crate::record::{BulletinFollowView, ScheduleEventView};
use crate::time::EventTime;

/// Columns printed by `schedule` when none are requested.
pub const DEFAULT_SCHEDULE_COLUMNS: &str = "detail,start,end";

/// Columns printed by `bulletin` when none are requested.
pub const DEFAULT_BULLETIN_COLUMNS: &str = "creator,text";

/// Separator between cells of one output row.
pub const CELL_SEPARATOR: &str = "\t";

/// Separator between member names in the `members` column.
pub const MEMBER_SEPARATOR: &str = ":";

/// An ordered list of requested column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    columns: Vec<String>,
}

impl ColumnSpec {
    /// Parses a comma-separated column list.
    ///
    /// Order and duplicates are kept. Surrounding whitespace is trimmed from
    /// each name; empty names are kept and print as empty cells.
    pub fn parse(spec: &str) -> Self {
        Self {
            columns: spec.split(',').map(|c| c.trim().to_string()).collect(),
        }
    }

    /// Returns the column names in request order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no columns were requested.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromStr for ColumnSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.columns.join(","))
    }
}

/// A record that can be projected onto named columns.
pub trait Project {
    /// Returns the value of `column`, or `None` if the record has no such
    /// column.
    fn field<Tz>(&self, column: &str, projector: &RecordProjector<Tz>) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display;
}

/// Turns records into rows of display strings.
///
/// Captures the display timezone and today's date once, so every row of a
/// command is rendered against the same clock.
#[derive(Debug, Clone)]
pub struct RecordProjector<Tz: TimeZone> {
    tz: Tz,
    today: NaiveDate,
}

impl<Tz> RecordProjector<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    /// Creates a projector for the timezone and date of `now`.
    pub fn new(now: &DateTime<Tz>) -> Self {
        Self {
            tz: now.timezone(),
            today: now.date_naive(),
        }
    }

    /// Returns the date used for repeat events.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Projects a record onto `columns`, one string per column in order.
    pub fn project<R: Project>(&self, record: &R, columns: &ColumnSpec) -> Vec<String> {
        columns
            .columns()
            .iter()
            .map(|column| record.field(column, self).unwrap_or_default())
            .collect()
    }

    /// Projects a record and joins the cells into one tab-separated row.
    pub fn row<R: Project>(&self, record: &R, columns: &ColumnSpec) -> String {
        self.project(record, columns).join(CELL_SEPARATOR)
    }

    /// Projects every record, keeping input order.
    pub fn rows<'a, R, I>(&self, records: I, columns: &ColumnSpec) -> Vec<String>
    where
        R: Project + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        records
            .into_iter()
            .map(|record| self.row(record, columns))
            .collect()
    }

    /// Formats an event bound: local datetime, bare date, or empty.
    fn event_time(&self, time: Option<&EventTime>) -> String {
        time.map(|t| t.display_in(&self.tz)).unwrap_or_default()
    }

    /// Formats a repeat-event bound as today's date at `time`.
    ///
    /// The occurrence date of the event is not consulted.
    fn repeat_time(&self, time: Option<NaiveTime>) -> String {
        let time = time
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        format!("{}T{}", self.today.format("%Y-%m-%d"), time)
    }
}

impl Project for ScheduleEventView {
    fn field<Tz>(&self, column: &str, projector: &RecordProjector<Tz>) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let value = match column {
            "id" => self.id.to_string(),
            "members" => member_names(self),
            "type" => self.event_type.clone(),
            "detail" => strip_newlines(&self.detail),
            "desc" => strip_newlines(&self.description),
            "start" if self.is_repeat() => {
                projector.repeat_time(self.repeat.as_ref().and_then(|r| r.start_time))
            }
            "end" if self.is_repeat() => {
                projector.repeat_time(self.repeat.as_ref().and_then(|r| r.end_time))
            }
            "start" => projector.event_time(self.start.as_ref()),
            "end" => projector.event_time(self.end.as_ref()),
            _ => return None,
        };
        Some(value)
    }
}

impl Project for BulletinFollowView {
    fn field<Tz>(&self, column: &str, _projector: &RecordProjector<Tz>) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let value = match column {
            "id" => self.number.to_string(),
            "creator" => self.creator.clone(),
            "text" => crlf_to_space(&self.text),
            _ => return None,
        };
        Some(value)
    }
}

/// Joins member user names with `:`; non-user members leave an empty slot.
fn member_names(event: &ScheduleEventView) -> String {
    event
        .members
        .iter()
        .map(|m| m.user_name().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(MEMBER_SEPARATOR)
}

/// Deletes every `\n`.
pub fn strip_newlines(s: &str) -> String {
    s.replace('\n', "")
}

/// Replaces every `\r\n` pair with a single space.
pub fn crlf_to_space(s: &str) -> String {
    s.replace("\r\n", " ")
}
