//! `goroon schedule`.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use tracing::debug;

use goroon_api::GaroonApi;
use goroon_core::{RecordProjector, resolve};

use crate::commands::print_rows;
use crate::error::ClientResult;
use crate::options::ScheduleOptions;
use crate::session::SessionFile;

/// Prints the schedule rows for the selected window.
pub async fn run(options: &ScheduleOptions) -> ClientResult<()> {
    let session = SessionFile::read(&options.connection.session_file);
    let client = options.connection.client(session.as_ref())?;
    let rows = rows(&client, options, &Local::now()).await?;
    print_rows(&rows)
}

/// Fetches events and projects the ones passing the type filter.
///
/// Nothing is returned unless every request succeeded.
pub async fn rows<Tz>(
    api: &dyn GaroonApi,
    options: &ScheduleOptions,
    now: &DateTime<Tz>,
) -> ClientResult<Vec<String>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let window = resolve(&options.selector, now)?;
    debug!(start = %window.start, end = %window.end, "Resolved window");

    let target = match options.target_login_name {
        Some(ref login_name) => Some(api.user_id_by_login_name(login_name).await?),
        None => None,
    };
    let events = api.fetch_events(window, target).await?;

    let projector = RecordProjector::new(now);
    Ok(projector.rows(
        events
            .iter()
            .filter(|event| event.matches_type(&options.event_type)),
        &options.columns,
    ))
}
