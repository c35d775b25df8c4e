use super::{navigation, session, Action};
use anyhow::Result;

pub(super) async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => session::login(args).await,
        Action::Logout(args) => {
            session::logout(&args);
            Ok(())
        }
        Action::WhoAmI(args) => session::whoami(args).await,
        Action::Navigate(args) => navigation::navigate(&args),
        Action::Routes(args) => navigation::routes(&args),
    }
}
