//! `goroon bulletin`.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

use goroon_api::GaroonApi;
use goroon_core::RecordProjector;

use crate::commands::print_rows;
use crate::error::ClientResult;
use crate::options::BulletinOptions;
use crate::session::SessionFile;

/// Prints one page of follows for a topic.
pub async fn run(options: &BulletinOptions) -> ClientResult<()> {
    let session = SessionFile::read(&options.connection.session_file);
    let client = options.connection.client(session.as_ref())?;
    let rows = rows(&client, options, &Local::now()).await?;
    print_rows(&rows)
}

/// Fetches the requested page and projects every follow.
pub async fn rows<Tz>(
    api: &dyn GaroonApi,
    options: &BulletinOptions,
    now: &DateTime<Tz>,
) -> ClientResult<Vec<String>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let follows = api.fetch_follows(options.query).await?;
    Ok(RecordProjector::new(now).rows(&follows, &options.columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use goroon_api::FollowQuery;
    use goroon_core::{BulletinFollowView, ColumnSpec};

    use crate::cli::ConnectionArgs;
    use crate::commands::testing::{Call, FakeApi};
    use crate::config::ClientConfig;
    use crate::options::Connection;

    fn options(query: FollowQuery, columns: &str) -> BulletinOptions {
        BulletinOptions {
            connection: Connection::new(&ConnectionArgs::default(), &ClientConfig::default()),
            query,
            columns: ColumnSpec::parse(columns),
        }
    }

    fn api() -> FakeApi {
        FakeApi {
            follows: vec![
                BulletinFollowView::new(2, "Carol", "a\r\nb"),
                BulletinFollowView::new(1, "Dave", "first"),
            ],
            ..FakeApi::default()
        }
    }

    #[tokio::test]
    async fn default_columns() {
        let api = api();
        let query = FollowQuery::new(7).with_offset(20).with_limit(5);
        let rows = rows(&api, &options(query, "creator,text"), &Utc::now())
            .await
            .unwrap();

        assert_eq!(rows, vec!["Carol\ta b", "Dave\tfirst"]);
        assert_eq!(api.calls(), vec![Call::Follows(query)]);
    }

    #[tokio::test]
    async fn unknown_column_is_empty() {
        let api = api();
        let rows = rows(&api, &options(FollowQuery::new(7), "id,bogus"), &Utc::now())
            .await
            .unwrap();
        assert_eq!(rows, vec!["2\t", "1\t"]);
    }
}
