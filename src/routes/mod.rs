//! Navigation tree with per-node access policies. Resolving a location yields
//! the ancestor chain; navigating applies the guard along that chain.

pub mod catalog;
mod pattern;
mod table;

pub use pattern::{RouteError, RoutePattern};
pub use table::{Navigation, RouteEntry, RouteMatch, RouteNode, RouteTable};

use crate::guard::GuardPaths;

/// Where to go after a successful login. Only local locations are honored,
/// and never the login page itself.
#[must_use]
pub fn post_login_target(from: Option<&str>, paths: &GuardPaths) -> String {
    let Some(from) = from.map(str::trim).filter(|from| !from.is_empty()) else {
        return paths.home.clone();
    };

    let local = from.starts_with('/') && !from.starts_with("//") && !from.contains('\\');
    let path = table::path_of(from).trim_end_matches('/');
    let is_login = path == paths.login.trim_end_matches('/');

    if local && !is_login {
        from.to_string()
    } else {
        paths.home.clone()
    }
}
