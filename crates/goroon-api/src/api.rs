//! The `GaroonApi` trait.
//!
//! Commands talk to the groupware server only through this trait, so they
//! can be exercised against an in-memory implementation in tests while the
//! binary uses [`SoapClient`](crate::SoapClient).

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use goroon_core::{BulletinFollowView, ScheduleEventView, TimeWindow};

use crate::error::ApiResult;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An opaque session identifier returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw session value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw session value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning the raw value.
    pub fn into_inner(self) -> String {
        self.0
    }
}

// Session values are credentials; keep them out of debug logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Paging parameters for a bulletin follow listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowQuery {
    /// Topic whose follows are listed.
    pub topic_id: u64,
    /// Number of follows to skip.
    pub offset: u32,
    /// Maximum number of follows to return.
    pub limit: u32,
}

impl FollowQuery {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 20;

    /// Creates a query for the first page of a topic.
    pub fn new(topic_id: u64) -> Self {
        Self {
            topic_id,
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    /// Builder method to set the offset.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Builder method to set the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Remote operations the command layer needs.
///
/// Every method performs exactly one request. Implementations must not
/// retry; errors are returned to the caller unchanged.
pub trait GaroonApi: Send + Sync {
    /// Logs in with a login name and password, returning the session.
    fn login<'a>(
        &'a self,
        login_name: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, ApiResult<SessionToken>>;

    /// Looks up a user's numeric id by login name.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error when no such user exists.
    fn user_id_by_login_name<'a>(&'a self, login_name: &'a str) -> BoxFuture<'a, ApiResult<u64>>;

    /// Fetches the schedule events overlapping `window`.
    ///
    /// With `target_user` set, fetches that user's schedule instead of the
    /// authenticated user's.
    fn fetch_events(
        &self,
        window: TimeWindow,
        target_user: Option<u64>,
    ) -> BoxFuture<'_, ApiResult<Vec<ScheduleEventView>>>;

    /// Fetches one page of follows for a bulletin topic.
    fn fetch_follows(&self, query: FollowQuery)
    -> BoxFuture<'_, ApiResult<Vec<BulletinFollowView>>>;
}
