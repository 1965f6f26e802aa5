//! SOAP transport for the Garoon API.
//!
//! - [`SoapConfig`]: endpoint, auth, locale and timeout
//! - [`SoapClient`]: posts actions and implements [`GaroonApi`](crate::GaroonApi)
//! - [`envelope`]: request documents
//! - [`xml`] and [`response`]: reading responses into record views

mod client;
mod config;
pub mod envelope;
pub mod response;
pub mod xml;

pub use client::SoapClient;
pub use config::{Auth, SoapConfig};
pub use envelope::Action;
