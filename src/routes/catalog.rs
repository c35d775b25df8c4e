//! Route table of the crowdfunding client. Paths mirror the public site, the
//! creator back-office, the staff console and the admin console.

use super::{RouteError, RouteNode, RouteTable};
use crate::guard::RoutePolicy;
use crate::session::Role;

/// Where staff land instead of the public home feed.
pub const STAFF_LANDING: &str = "/invisible-projects";

const PROJECT_ID: &str = r":id(\d+)";

/// Builds the platform route table.
///
/// # Errors
/// Returns an error if a route pattern is invalid.
pub fn crowdfunding() -> Result<RouteTable, RouteError> {
    let root = RouteNode::new("/")?.layout().children([
        RouteNode::new("")?
            .named("home")
            .guarded(RoutePolicy::restrict([Role::Staff], STAFF_LANDING)),
        RouteNode::new("login")?.named("login"),
        RouteNode::new("register")?.named("register"),
        RouteNode::new("forgot-password")?.named("forgot-password"),
        projects()?,
        creator()?,
        RouteNode::new("invisible-projects")?
            .named("invisible-projects")
            .guarded(RoutePolicy::require([Role::Staff, Role::Admin])),
        staff()?,
        admin()?,
    ]);

    Ok(RouteTable::new(root))
}

fn projects() -> Result<RouteNode, RouteError> {
    Ok(RouteNode::new("projects")?.named("projects").children([
        RouteNode::new("new")?
            .named("project-create")
            .guarded(RoutePolicy::require([Role::Customer])),
        RouteNode::new(PROJECT_ID)?.named("project").children([
            RouteNode::new("pledge")?
                .named("project-pledge")
                .guarded(RoutePolicy::require([Role::Customer])),
            RouteNode::new("edit")?
                .named("project-edit")
                .guarded(RoutePolicy::require([Role::Customer])),
            RouteNode::new("updates")?.named("project-updates"),
            RouteNode::new("faqs")?.named("project-faqs"),
            RouteNode::new("comments")?.named("project-comments"),
        ]),
    ]))
}

fn creator() -> Result<RouteNode, RouteError> {
    Ok(RouteNode::new("me")?
        .named("profile")
        .guarded(RoutePolicy::authenticated())
        .children([
            RouteNode::new("pledges")?.named("my-pledges"),
            RouteNode::new("projects")?
                .named("my-projects")
                .guarded(RoutePolicy::require([Role::Customer]))
                .child(RouteNode::new(PROJECT_ID)?.named("my-project-dashboard")),
        ]))
}

fn staff() -> Result<RouteNode, RouteError> {
    Ok(RouteNode::new("staff")?
        .named("staff-console")
        .guarded(RoutePolicy::require([Role::Staff]))
        .children([
            RouteNode::new("projects")?.named("staff-projects"),
            RouteNode::new("comments")?.named("staff-comments"),
            RouteNode::new("*")?.named("staff-other"),
        ]))
}

fn admin() -> Result<RouteNode, RouteError> {
    Ok(RouteNode::new("admin")?
        .named("admin-console")
        .guarded(RoutePolicy::require([Role::Admin]))
        .children([
            RouteNode::new("users")?.named("admin-users"),
            RouteNode::new("staff")?.named("admin-staff"),
            RouteNode::new("*")?.named("admin-other"),
        ]))
}
