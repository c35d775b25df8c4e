pub mod navigation;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

#[derive(Debug)]
pub enum Action {
    Login(session::LoginArgs),
    Logout(session::Args),
    WhoAmI(session::WhoAmIArgs),
    Navigate(navigation::NavigateArgs),
    Routes(navigation::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
