//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use goroon_core::DateSelector;

/// goroon - Garoon groupware from the command line
#[derive(Debug, Parser)]
#[command(name = "goroon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, env = "GOROON_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Dump requests and responses to stderr
    #[arg(long, short = 'D', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where and as whom to connect.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Login name
    #[arg(long, short = 'u', env = "GAROON_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password
    #[arg(
        long,
        short = 'p',
        env = "GAROON_PASSWORD",
        global = true,
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Base URL, e.g. https://example.cybozu.com/g
    #[arg(long, short = 'e', env = "GAROON_ENDPOINT", global = true)]
    pub endpoint: Option<String>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session for later commands
    #[command(visible_alias = "l")]
    Login,

    /// Print schedule events
    #[command(visible_alias = "s")]
    Schedule(ScheduleArgs),

    /// Print the follows of a bulletin topic
    #[command(visible_alias = "b")]
    Bulletin(BulletinArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Named days accepted by `--date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DateArg {
    Today,
    Yesterday,
}

/// Arguments of `goroon schedule`.
#[derive(Debug, Clone, Default, Args)]
pub struct ScheduleArgs {
    /// Show this user's schedule (login name) instead of your own
    #[arg(long, short = 'i')]
    pub userid: Option<String>,

    /// Window start, "YYYY-MM-DD HH:MM:SS" local time [default: start of today]
    #[arg(long, conflicts_with = "date")]
    pub start: Option<String>,

    /// Window end, "YYYY-MM-DD HH:MM:SS" local time [default: end of today]
    #[arg(long, conflicts_with = "date")]
    pub end: Option<String>,

    /// Named day instead of --start/--end
    #[arg(long, short = 'd', value_enum)]
    pub date: Option<DateArg>,

    /// Only print events of this kind (normal, repeat, banner, ...) [default: all]
    #[arg(long = "type", short = 't')]
    pub event_type: Option<String>,

    /// Comma-separated columns: id,members,type,detail,desc,start,end [default: detail,start,end]
    #[arg(long, short = 'c')]
    pub columns: Option<String>,
}

impl ScheduleArgs {
    /// Returns the date selection these flags describe.
    pub fn selector(&self) -> DateSelector {
        match self.date {
            Some(DateArg::Today) => DateSelector::Today,
            Some(DateArg::Yesterday) => DateSelector::Yesterday,
            None => DateSelector::Explicit {
                start: self.start.clone(),
                end: self.end.clone(),
            },
        }
    }
}

/// Arguments of `goroon bulletin`.
#[derive(Debug, Clone, Args)]
pub struct BulletinArgs {
    /// Topic whose follows are printed
    #[arg(long = "topic-id", alias = "topic_id")]
    pub topic_id: u64,

    /// Number of follows to skip
    #[arg(long, short = 'o', default_value_t = 0)]
    pub offset: u32,

    /// Maximum number of follows [default: 20]
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Comma-separated columns: id,creator,text [default: creator,text]
    #[arg(long, short = 'c')]
    pub columns: Option<String>,
}

/// Configuration actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Dump the effective configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration and session file paths
    Path,
}
