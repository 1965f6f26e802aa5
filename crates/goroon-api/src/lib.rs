//! Client for the Garoon groupware API.
//!
//! Commands depend on the [`GaroonApi`] trait; [`SoapClient`] is the
//! implementation that talks to a real server.
//!
//! # Example
//!
//! ```ignore
//! use goroon_api::{GaroonApi, SoapClient, SoapConfig};
//!
//! let config = SoapConfig::new("https://example.cybozu.com/g")?
//!     .with_credentials("alice", "secret");
//! let client = SoapClient::new(config)?;
//! let events = client.fetch_events(window, None).await?;
//! ```

pub mod api;
pub mod error;
pub mod soap;

pub use api::{BoxFuture, FollowQuery, GaroonApi, SessionToken};
pub use error::{ApiError, ApiErrorCode, ApiResult};
pub use soap::{Auth, SoapClient, SoapConfig};
