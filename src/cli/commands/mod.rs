pub mod config;
pub mod logging;
pub mod navigation;
pub mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("pledge-guard")
        .about("Session and route access control for the crowdfunding client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true);

    let command = session::with_subcommands(command);
    let command = navigation::with_subcommands(command);
    let command = config::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "pledge-guard");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Session and route access control for the crowdfunding client".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_debug_assert() {
        new().debug_assert();
    }

    #[test]
    fn test_login_args() {
        temp_env::with_vars([("PLEDGE_GUARD_PASSWORD", None::<&str>)], || {
            let matches = new().get_matches_from(vec![
                "pledge-guard",
                "login",
                "--email",
                "ada@pledge.dev",
                "--password",
                "hunter2",
                "--from",
                "/projects/3/pledge",
            ]);
            let (name, sub) = matches.subcommand().expect("subcommand");
            assert_eq!(name, session::CMD_LOGIN);
            assert_eq!(
                sub.get_one::<String>(session::ARG_EMAIL).cloned(),
                Some("ada@pledge.dev".to_string())
            );
            assert_eq!(
                sub.get_one::<String>(session::ARG_FROM).cloned(),
                Some("/projects/3/pledge".to_string())
            );
        });
    }

    #[test]
    fn test_login_requires_password() {
        temp_env::with_vars(
            [
                ("PLEDGE_GUARD_PASSWORD", None::<&str>),
                ("PLEDGE_GUARD_EMAIL", Some("ada@pledge.dev")),
            ],
            || {
                let result = new().try_get_matches_from(vec!["pledge-guard", "login"]);
                assert!(result.is_err());
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PLEDGE_GUARD_API_URL", Some("https://api.pledge.dev")),
                ("PLEDGE_GUARD_STATE_DIR", Some("/tmp/pledge-guard")),
                ("PLEDGE_GUARD_TIMEOUT_SECONDS", Some("5")),
                ("PLEDGE_GUARD_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["pledge-guard", "routes"]);
                assert_eq!(
                    matches.get_one::<String>(config::ARG_API_URL).cloned(),
                    Some("https://api.pledge.dev".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(config::ARG_STATE_DIR).cloned(),
                    Some("/tmp/pledge-guard".to_string())
                );
                assert_eq!(matches.get_one::<u64>(config::ARG_TIMEOUT).copied(), Some(5));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("PLEDGE_GUARD_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["pledge-guard", "logout"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap_or(u8::MAX))
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("PLEDGE_GUARD_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["pledge-guard".to_string(), "routes".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap_or(u8::MAX))
                );
            });
        }
    }
}
