//! Time types and query-window resolution.
//!
//! This module provides [`EventTime`] for event start/end values (either a
//! specific datetime or a bare date), [`TimeWindow`] for query ranges, and
//! [`resolve`], which turns a [`DateSelector`] into a concrete window built
//! from local calendar-day boundaries.

use chrono::{
    DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format accepted for explicit `--start` / `--end` values.
pub const EXPLICIT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset from local midnight to the end-of-day bound.
///
/// 23:59:59 plus 999 999 nanoseconds. The server has always been queried
/// with this exact value, so it is not rounded to a clean boundary.
pub const END_OF_DAY_OFFSET: TimeDelta = match TimeDelta::new(86_399, 999_999) {
    Some(offset) => offset,
    None => panic!("end-of-day offset out of range"),
};

/// The time of a schedule event bound.
///
/// Schedule events carry either a specific point in time or, for all-day
/// and banner events, a date without a time component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific datetime, stored in UTC.
    DateTime(DateTime<Utc>),
    /// A bare date (no time component).
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates a new `EventTime::DateTime` from a UTC datetime.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }

    /// Creates a new `EventTime::AllDay` from a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` if this is a bare date.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Formats the value for display in the given timezone.
    ///
    /// Datetimes render as `YYYY-MM-DDTHH:MM:SS` in `tz`, bare dates as
    /// `YYYY-MM-DD`.
    pub fn display_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match self {
            Self::DateTime(dt) => dt.with_timezone(tz).format("%Y-%m-%dT%H:%M:%S").to_string(),
            Self::AllDay(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// A time window for querying schedule events.
///
/// Both bounds are stored in UTC, the form in which they are sent to the
/// server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window.
    pub start: DateTime<Utc>,
    /// End of the window.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a new time window, rejecting an inverted range.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ResolveError> {
        if start > end {
            return Err(ResolveError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates the window covering one local calendar day.
    pub fn for_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        Self::new(
            start_of_day(date, tz).with_timezone(&Utc),
            end_of_day(date, tz).with_timezone(&Utc),
        )
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// How the user selected the query window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSelector {
    /// The current local day.
    Today,
    /// The local day before today.
    Yesterday,
    /// Explicit bounds; a missing bound falls back to today's boundary.
    Explicit {
        start: Option<String>,
        end: Option<String>,
    },
}

impl Default for DateSelector {
    fn default() -> Self {
        Self::Explicit {
            start: None,
            end: None,
        }
    }
}

/// Errors from window resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// An explicit bound did not match `YYYY-MM-DD HH:MM:SS`.
    #[error("invalid timestamp {input:?}: expected YYYY-MM-DD HH:MM:SS")]
    Parse { input: String },

    /// The resolved start lies after the resolved end.
    #[error("start {start} is after end {end}")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Resolves a date selection against `now` into a UTC window.
///
/// Day boundaries are computed in `now`'s timezone before conversion.
pub fn resolve<Tz: TimeZone>(
    selector: &DateSelector,
    now: &DateTime<Tz>,
) -> Result<TimeWindow, ResolveError> {
    let tz = now.timezone();
    let today = now.date_naive();

    match selector {
        DateSelector::Today => Ok(TimeWindow::for_date(today, &tz)),
        DateSelector::Yesterday => {
            let yesterday = today.pred_opt().unwrap_or(today);
            Ok(TimeWindow::for_date(yesterday, &tz))
        }
        DateSelector::Explicit { start, end } => {
            let start = match start {
                Some(input) => parse_local(input, &tz)?,
                None => start_of_day(today, &tz),
            };
            let end = match end {
                Some(input) => parse_local(input, &tz)?,
                None => end_of_day(today, &tz),
            };
            TimeWindow::try_new(start.with_timezone(&Utc), end.with_timezone(&Utc))
        }
    }
}

/// Parses an explicit `YYYY-MM-DD HH:MM:SS` value in `tz`.
pub fn parse_local<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Tz>, ResolveError> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), EXPLICIT_FORMAT).map_err(|_| {
        ResolveError::Parse {
            input: input.to_string(),
        }
    })?;
    Ok(localize(&naive, tz))
}

/// Local midnight of `date`.
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    localize(&date.and_time(NaiveTime::MIN), tz)
}

/// Local midnight of `date` plus [`END_OF_DAY_OFFSET`].
pub fn end_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    localize(&(date.and_time(NaiveTime::MIN) + END_OF_DAY_OFFSET), tz)
}

/// Maps a wall-clock time onto an instant in `tz`.
///
/// Ambiguous times take the earlier instant. Times inside a DST gap do not
/// exist locally and are converted with the zone's offset at that UTC
/// instant instead.
fn localize<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> DateTime<Tz> {
    if let Some(dt) = tz.from_local_datetime(naive).earliest() {
        return dt;
    }
    let offset = tz.offset_from_utc_datetime(naive).fix();
    let utc = *naive - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    tz.from_utc_datetime(&utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<FixedOffset> {
        jst().with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    mod event_time {
        use super::*;

        #[test]
        fn datetime_displays_in_zone() {
            let et = EventTime::from_utc(utc(2025, 2, 5, 1, 30, 0));
            assert_eq!(et.display_in(&jst()), "2025-02-05T10:30:00");
            assert_eq!(et.display_in(&Utc), "2025-02-05T01:30:00");
        }

        #[test]
        fn all_day_displays_bare_date() {
            let et = EventTime::from_date(date(2025, 2, 5));
            assert!(et.is_all_day());
            assert_eq!(et.display_in(&jst()), "2025-02-05");
        }
    }

    mod resolver {
        use super::*;

        #[test]
        fn end_of_day_offset_is_one_microsecond_short() {
            assert_eq!(END_OF_DAY_OFFSET.num_seconds(), 86_399);
            assert_eq!(END_OF_DAY_OFFSET.subsec_nanos(), 999_999);
        }

        #[test]
        fn today_window() {
            let window = resolve(&DateSelector::Today, &now()).unwrap();
            // 2024-03-15 00:00:00 +09:00
            assert_eq!(window.start, utc(2024, 3, 14, 15, 0, 0));
            // 2024-03-15 23:59:59.000999999 +09:00
            assert_eq!(
                window.end,
                utc(2024, 3, 15, 14, 59, 59) + TimeDelta::nanoseconds(999_999)
            );
        }

        #[test]
        fn yesterday_window() {
            let window = resolve(&DateSelector::Yesterday, &now()).unwrap();
            assert_eq!(window.start, utc(2024, 3, 13, 15, 0, 0));
            assert_eq!(window.start.with_timezone(&jst()).date_naive(), date(2024, 3, 14));
            assert_eq!(window.end.with_timezone(&jst()).date_naive(), date(2024, 3, 14));
        }

        #[test]
        fn yesterday_across_month_boundary() {
            let now = jst().with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
            let window = resolve(&DateSelector::Yesterday, &now).unwrap();
            assert_eq!(window.start.with_timezone(&jst()).date_naive(), date(2024, 2, 29));
        }

        #[test]
        fn default_selector_equals_today() {
            let default = resolve(&DateSelector::default(), &now()).unwrap();
            let today = resolve(&DateSelector::Today, &now()).unwrap();
            assert_eq!(default, today);
        }

        #[test]
        fn explicit_bounds_are_local_instants_in_utc() {
            let selector = DateSelector::Explicit {
                start: Some("2024-03-01 09:00:00".to_string()),
                end: Some("2024-03-02 18:30:15".to_string()),
            };
            let window = resolve(&selector, &now()).unwrap();
            assert_eq!(window.start, utc(2024, 3, 1, 0, 0, 0));
            assert_eq!(window.end, utc(2024, 3, 2, 9, 30, 15));
        }

        #[test]
        fn explicit_start_only_defaults_end_to_today() {
            let selector = DateSelector::Explicit {
                start: Some("2024-03-10 00:00:00".to_string()),
                end: None,
            };
            let window = resolve(&selector, &now()).unwrap();
            let today = resolve(&DateSelector::Today, &now()).unwrap();
            assert_eq!(window.start, utc(2024, 3, 9, 15, 0, 0));
            assert_eq!(window.end, today.end);
        }

        #[test]
        fn explicit_end_only_defaults_start_to_today() {
            let selector = DateSelector::Explicit {
                start: None,
                end: Some("2024-03-20 12:00:00".to_string()),
            };
            let window = resolve(&selector, &now()).unwrap();
            let today = resolve(&DateSelector::Today, &now()).unwrap();
            assert_eq!(window.start, today.start);
            assert_eq!(window.end, utc(2024, 3, 20, 3, 0, 0));
        }

        #[test]
        fn malformed_timestamp_is_parse_error() {
            for input in ["2024-03-01", "2024/03/01 09:00:00", "2024-03-01T09:00:00", "x"] {
                let selector = DateSelector::Explicit {
                    start: Some(input.to_string()),
                    end: None,
                };
                let err = resolve(&selector, &now()).unwrap_err();
                assert_eq!(
                    err,
                    ResolveError::Parse {
                        input: input.to_string()
                    }
                );
            }
        }

        #[test]
        fn malformed_end_is_parse_error() {
            let selector = DateSelector::Explicit {
                start: None,
                end: Some("tomorrow".to_string()),
            };
            assert!(matches!(
                resolve(&selector, &now()),
                Err(ResolveError::Parse { .. })
            ));
        }

        #[test]
        fn inverted_explicit_range_is_rejected() {
            let selector = DateSelector::Explicit {
                start: Some("2024-03-20 00:00:00".to_string()),
                end: Some("2024-03-19 00:00:00".to_string()),
            };
            let err = resolve(&selector, &now()).unwrap_err();
            assert!(matches!(err, ResolveError::Inverted { .. }));
            assert!(err.to_string().contains("is after"));
        }
    }

    mod time_window {
        use super::*;

        #[test]
        #[should_panic(expected = "start must be <= end")]
        fn invalid_window() {
            TimeWindow::new(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 9, 0, 0));
        }

        #[test]
        fn for_date_spans_almost_a_day() {
            let window = TimeWindow::for_date(date(2025, 2, 5), &Utc);
            assert_eq!(window.start, utc(2025, 2, 5, 0, 0, 0));
            assert_eq!(window.duration(), END_OF_DAY_OFFSET);
        }
    }
}
