//! Core types: query windows, record views, column projection

pub mod format;
pub mod record;
pub mod time;
pub mod tracing;

pub use format::{ColumnSpec, Project, RecordProjector};
pub use record::{BulletinFollowView, Member, RepeatCondition, ScheduleEventView};
pub use time::{
    DateSelector, END_OF_DAY_OFFSET, EventTime, ResolveError, TimeWindow, resolve,
};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
