use clap::{Arg, ArgAction, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_WHOAMI: &str = "whoami";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_FROM: &str = "from";
pub const ARG_VERIFY: &str = "verify";

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in against the API and persist the session")
                .arg(
                    Arg::new(ARG_EMAIL)
                        .short('e')
                        .long("email")
                        .help("Account email")
                        .env("PLEDGE_GUARD_EMAIL")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_PASSWORD)
                        .long("password")
                        .help("Account password")
                        .env("PLEDGE_GUARD_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_FROM)
                        .long("from")
                        .help("Location to return to after signing in"),
                ),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Clear the persisted session"))
        .subcommand(
            Command::new(CMD_WHOAMI)
                .about("Show the current session")
                .arg(
                    Arg::new(ARG_VERIFY)
                        .long("verify")
                        .help("Check the session token against the API")
                        .action(ArgAction::SetTrue),
                ),
        )
}
