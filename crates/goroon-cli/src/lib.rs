//! CLI, session file, command actions
//!
//! This crate provides the `goroon` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod options;
pub mod session;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
