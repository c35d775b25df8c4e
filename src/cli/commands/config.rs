use crate::config::ConfigOverrides;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

pub const ARG_CONFIG: &str = "config";
pub const ARG_API_URL: &str = "api-url";
pub const ARG_STATE_DIR: &str = "state-dir";
pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_HOME_PATH: &str = "home-path";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_JSON: &str = "json";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CONFIG)
                .short('c')
                .long("config")
                .help("Path to a JSON config file")
                .env("PLEDGE_GUARD_CONFIG")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Base URL of the crowdfunding REST API")
                .env("PLEDGE_GUARD_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long("state-dir")
                .help("Directory holding the persisted session")
                .env("PLEDGE_GUARD_STATE_DIR")
                .global(true),
        )
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long("login-path")
                .help("Route that unauthenticated visitors are sent to")
                .env("PLEDGE_GUARD_LOGIN_PATH")
                .global(true),
        )
        .arg(
            Arg::new(ARG_HOME_PATH)
                .long("home-path")
                .help("Route that unentitled users are sent to")
                .env("PLEDGE_GUARD_HOME_PATH")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long("timeout")
                .help("API request timeout in seconds")
                .env("PLEDGE_GUARD_TIMEOUT_SECONDS")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..=300)),
        )
        .arg(
            Arg::new(ARG_JSON)
                .long("json")
                .help("Print command results as JSON")
                .global(true)
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug)]
pub struct Options {
    pub file: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    pub json: bool,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        let string = |id: &str| matches.get_one::<String>(id).cloned();

        Self {
            file: matches.get_one::<PathBuf>(ARG_CONFIG).cloned(),
            overrides: ConfigOverrides {
                api_base_url: string(ARG_API_URL),
                state_dir: string(ARG_STATE_DIR),
                login_path: string(ARG_LOGIN_PATH),
                home_path: string(ARG_HOME_PATH),
                request_timeout_seconds: matches.get_one::<u64>(ARG_TIMEOUT).copied(),
            },
            json: matches.get_flag(ARG_JSON),
        }
    }
}
