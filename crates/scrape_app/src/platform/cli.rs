use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::logging::LogDestination;
use super::settings::DEFAULT_CONFIG_FILENAME;

#[derive(Debug, Parser)]
#[command(
    name = "scrape_app",
    version,
    about = "Submit site credentials for a post scrape and browse the result"
)]
pub struct Cli {
    /// RON settings file; missing files fall back to defaults.
    #[arg(long, env = "SCRAPE_CONFIG", default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Backend base URL, e.g. https://scraper.example.com
    #[arg(long, env = "SCRAPE_API_URL")]
    pub api_url: Option<String>,

    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Prefilled credentials for the first attempt; prompted for when absent.
#[derive(Debug, Default, Args)]
pub struct CredentialArgs {
    #[arg(long, global = true, env = "SCRAPE_EMAIL")]
    pub email: Option<String>,

    #[arg(long, global = true, env = "SCRAPE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Log in, scrape, and show the scraped feed (default).
    Scrape,
    /// Show the stored feed for a username.
    Feed { username: String },
}
