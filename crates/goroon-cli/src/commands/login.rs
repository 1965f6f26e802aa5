//! `goroon login`.

use goroon_api::{GaroonApi, SoapClient};
use tracing::info;

use crate::error::{ClientError, ClientResult};
use crate::options::LoginOptions;
use crate::session::SessionFile;

/// Logs in and writes the session file.
pub async fn run(options: &LoginOptions) -> ClientResult<()> {
    let connection = &options.connection;
    let endpoint = connection.endpoint.as_deref().ok_or_else(|| {
        ClientError::Config("no endpoint: pass --endpoint or set GAROON_ENDPOINT".to_string())
    })?;
    let (username, password) = connection.credentials()?;
    let client = SoapClient::new(connection.soap_config(endpoint)?)?;

    let session = login(&client, username, password, endpoint).await?;
    session.write(&connection.session_file)?;

    info!(endpoint = %endpoint, username = %username, "Logged in");
    println!("Session saved to {}", connection.session_file.display());
    Ok(())
}

/// Performs the login call and returns the session to store.
pub async fn login(
    api: &dyn GaroonApi,
    username: &str,
    password: &str,
    endpoint: &str,
) -> ClientResult<SessionFile> {
    let token = api.login(username, password).await?;
    Ok(SessionFile::new(token.into_inner(), endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{Call, FakeApi};
    use goroon_api::ApiErrorCode;

    #[tokio::test]
    async fn login_returns_session_for_endpoint() {
        let api = FakeApi::default();
        let session = login(&api, "alice", "pw", "https://example.cybozu.com/g")
            .await
            .unwrap();

        assert_eq!(session.session_id, "session-for-alice");
        assert_eq!(session.endpoint, "https://example.cybozu.com/g");
        assert_eq!(api.calls(), vec![Call::Login("alice".to_string())]);
    }

    #[tokio::test]
    async fn rejected_login_is_an_api_error() {
        let api = FakeApi::default();
        let err = login(&api, "alice", "wrong", "https://example.cybozu.com/g")
            .await
            .unwrap_err();
        match err {
            ClientError::Api(e) => assert_eq!(e.code(), ApiErrorCode::AuthenticationFailed),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let options = LoginOptions {
            connection: crate::options::Connection::new(
                &crate::cli::ConnectionArgs {
                    endpoint: Some("https://example.cybozu.com/g".to_string()),
                    username: Some("alice".to_string()),
                    password: None,
                },
                &crate::config::ClientConfig::default(),
            ),
        };
        assert!(matches!(
            run(&options).await,
            Err(ClientError::AuthRequired(_))
        ));
    }
}
