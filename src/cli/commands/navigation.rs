use clap::{Arg, Command};

pub const CMD_NAVIGATE: &str = "navigate";
pub const CMD_ROUTES: &str = "routes";

pub const ARG_LOCATION: &str = "location";

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_NAVIGATE)
                .about("Evaluate the route guard for a location with the current session")
                .arg(
                    Arg::new(ARG_LOCATION)
                        .help("Location to open, e.g. /projects/12?tab=faq")
                        .required(true),
                ),
        )
        .subcommand(Command::new(CMD_ROUTES).about("List routes and their access policies"))
}
