//! Route guard: decides render versus redirect for a single navigation from
//! the current session and the destination's policy. Evaluation is pure and
//! never fails; denial is a redirect, not an error.

mod policy;

pub use policy::RoutePolicy;

use crate::session::Session;
use serde::Serialize;
use std::fmt;
use tracing::debug;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HOME_PATH: &str = "/";

/// Well-known destinations the guard redirects to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardPaths {
    pub login: String,
    pub home: String,
}

impl Default for GuardPaths {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_PATH.to_string(),
            home: DEFAULT_HOME_PATH.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    /// Originally requested location, kept only for login redirects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            to: path.into(),
            from: None,
        }
    }

    pub fn to_login(login: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            to: login.into(),
            from: Some(from.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Render,
    Redirect(Redirect),
}

impl Decision {
    #[must_use]
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }

    #[must_use]
    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Render => None,
            Self::Redirect(redirect) => Some(redirect),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render => formatter.write_str("render"),
            Self::Redirect(Redirect { to, from: Some(from) }) => {
                write!(formatter, "redirect {to} (from {from})")
            }
            Self::Redirect(Redirect { to, from: None }) => write!(formatter, "redirect {to}"),
        }
    }
}

/// Evaluates `policy` for a navigation to `requested`.
///
/// Order matters: a missing session is checked before role entitlement, and
/// restriction only steers users who are already entitled.
#[must_use]
pub fn evaluate(
    policy: &RoutePolicy,
    session: Option<&Session>,
    requested: &str,
    paths: &GuardPaths,
) -> Decision {
    let decision = match session {
        None if policy.requires_login() => {
            Decision::Redirect(Redirect::to_login(&paths.login, requested))
        }
        None => Decision::Render,
        Some(session) => {
            let role = session.role();
            if policy.requires_login() && !policy.required_roles().contains(role) {
                Decision::Redirect(Redirect::to(&paths.home))
            } else if policy.restricted_roles().contains(role) {
                let target = policy.fallback_path().unwrap_or(paths.home.as_str());
                Decision::Redirect(Redirect::to(target))
            } else {
                Decision::Render
            }
        }
    };

    debug!(requested, %decision, "route guard evaluated");
    decision
}
