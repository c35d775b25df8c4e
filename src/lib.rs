//! # pledge-guard (Session & Route Access Core)
//!
//! `pledge-guard` is the authorization core of the crowdfunding client. It
//! decides which views a visitor may open and keeps track of who is signed in.
//!
//! ## Session Store
//!
//! The [`session::SessionStore`] owns the authenticated identity (bearer token,
//! user id, role, display name). It hydrates once from durable storage at
//! start-up and is mutated only through `login` / `logout`. Storage sits behind
//! the [`session::SessionStorage`] port so the medium can be swapped.
//!
//! - **Fail-open to logged-out:** missing, corrupt, or partial persisted data
//!   loads as "no session"; start-up never fails because of it.
//! - **Whole or nothing:** a session without token, id, or role is rejected by
//!   `login` and never persisted.
//!
//! ## Route Guard
//!
//! [`guard::evaluate`] is a pure function of the current session and a
//! [`guard::RoutePolicy`]. Evaluation order is fixed:
//!
//! 1. Login required and no session: redirect to login, remembering `from`.
//! 2. Signed in with a role outside `required_roles`: redirect home.
//! 3. Signed in with a role inside `restricted_roles`: redirect to the
//!    policy fallback (or home).
//! 4. Otherwise render.
//!
//! [`routes::RouteTable`] applies the guard along the ancestor chain of a
//! navigation, root to leaf, stopping at the first redirect.
//!
//! ## Backend
//!
//! The REST backend answers with `{ success, data, message }` envelopes.
//! [`api::ApiClient`] turns a successful login into a session record and clears
//! the session whenever the backend answers `401`. Access control here is a UX
//! concern; the API remains the enforcement point.

pub mod api;
pub mod cli;
pub mod config;
pub mod guard;
pub mod routes;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
