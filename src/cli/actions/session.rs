use crate::{
    api::{ApiError, Credentials},
    cli::globals::GlobalArgs,
    routes::post_login_target,
    session::Session,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Endpoint returning the profile behind the current bearer token.
const PROFILE_PATH: &str = "/auth/me";

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

#[derive(Debug)]
pub struct LoginArgs {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
    pub from: Option<String>,
}

#[derive(Debug)]
pub struct WhoAmIArgs {
    pub globals: GlobalArgs,
    pub verify: bool,
}

#[derive(Debug, Serialize)]
struct SessionReport<'a> {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(rename = "userName", skip_serializing_if = "Option::is_none")]
    user_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'a Value>,
}

impl<'a> SessionReport<'a> {
    fn new(session: Option<&'a Session>) -> Self {
        Self {
            authenticated: session.is_some(),
            id: session.map(Session::id),
            role: session.map(|session| session.role().as_str()),
            user_name: session.and_then(Session::user_name),
            next: None,
            profile: None,
        }
    }
}

fn print_report(globals: &GlobalArgs, report: &SessionReport<'_>, text: &str) -> Result<()> {
    if globals.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{text}");
    }
    Ok(())
}

fn describe(session: &Session) -> String {
    format!("{} ({}, id {})", session.display_name(), session.role(), session.id())
}

/// Signs in, persists the session and reports where to continue.
///
/// # Errors
/// Returns an error if the API call fails or the backend returns an
/// incomplete session.
pub async fn login(args: LoginArgs) -> Result<()> {
    let store = args.globals.session_store();
    let client = args.globals.api_client()?;
    let credentials = Credentials {
        email: args.email,
        password: args.password,
    };

    let session = client
        .sign_in(&store, &credentials)
        .await
        .context("login failed")?;

    let paths = args.globals.config.guard_paths();
    let next = post_login_target(args.from.as_deref(), &paths);
    debug!(next = %next, "post-login destination");

    let mut report = SessionReport::new(Some(&session));
    report.next = Some(next.as_str());
    print_report(
        &args.globals,
        &report,
        &format!("Signed in as {}; continue to {next}", describe(&session)),
    )
}

/// Clears the persisted session. Succeeds when already signed out.
pub fn logout(args: &Args) {
    let store = args.globals.session_store();
    let was_signed_in = store.is_authenticated();
    store.logout();

    if args.globals.json {
        println!("{}", serde_json::json!({ "signedOut": was_signed_in }));
    } else if was_signed_in {
        println!("Signed out");
    } else {
        println!("Not signed in");
    }
}

/// Shows the current session, optionally confirming it with the API. A
/// rejected token clears the session.
///
/// # Errors
/// Returns an error if verification fails for reasons other than a rejected
/// token.
pub async fn whoami(args: WhoAmIArgs) -> Result<()> {
    let store = args.globals.session_store();

    let mut rejected = false;
    let profile = if args.verify && store.is_authenticated() {
        let client = args.globals.api_client()?;
        match client.get_authed::<Value, _>(PROFILE_PATH, &store).await {
            Ok(profile) => Some(profile),
            Err(ApiError::Unauthorized) => {
                rejected = true;
                None
            }
            Err(err) => return Err(err).context("session verification failed"),
        }
    } else {
        None
    };

    let session = store.current();
    let mut report = SessionReport::new(session.as_ref());
    report.profile = profile.as_ref();

    let text = match &session {
        Some(session) if profile.is_some() => format!("{} (verified)", describe(session)),
        Some(session) => describe(session),
        None if rejected => "Session rejected by the API; signed out".to_string(),
        None => "Not signed in".to_string(),
    };

    print_report(&args.globals, &report, &text)
}
