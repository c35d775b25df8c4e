//! Command-line argument dispatch.
//!
//! This module turns validated CLI matches into the configuration shared by
//! every subcommand and maps the chosen subcommand to its action.

use crate::cli::actions::{navigation, session, Action};
use crate::cli::commands::{self, config::Options};
use crate::cli::globals::GlobalArgs;
use crate::config::AppConfig;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if the configuration is invalid or required arguments are
/// missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let (name, sub) = matches
        .subcommand()
        .context("missing subcommand")?;

    let options = Options::parse(sub);
    let config = AppConfig::load(options.file.as_deref(), options.overrides)
        .context("invalid configuration")?;
    let globals = GlobalArgs {
        config,
        json: options.json,
    };

    match name {
        commands::session::CMD_LOGIN => {
            let email = sub
                .get_one::<String>(commands::session::ARG_EMAIL)
                .cloned()
                .context("missing required argument: --email")?;
            let password = sub
                .get_one::<String>(commands::session::ARG_PASSWORD)
                .cloned()
                .context("missing required argument: --password")?;

            Ok(Action::Login(session::LoginArgs {
                globals,
                email,
                password: SecretString::from(password),
                from: sub.get_one::<String>(commands::session::ARG_FROM).cloned(),
            }))
        }
        commands::session::CMD_LOGOUT => Ok(Action::Logout(session::Args { globals })),
        commands::session::CMD_WHOAMI => Ok(Action::WhoAmI(session::WhoAmIArgs {
            globals,
            verify: sub.get_flag(commands::session::ARG_VERIFY),
        })),
        commands::navigation::CMD_NAVIGATE => {
            let location = sub
                .get_one::<String>(commands::navigation::ARG_LOCATION)
                .cloned()
                .context("missing required argument: <location>")?;
            Ok(Action::Navigate(navigation::NavigateArgs { globals, location }))
        }
        commands::navigation::CMD_ROUTES => Ok(Action::Routes(navigation::Args { globals })),
        other => Err(anyhow!("unknown subcommand: {other}")),
    }
}
