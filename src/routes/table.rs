use super::pattern::{split_segments, RouteError, RoutePattern};
use crate::guard::{self, Decision, GuardPaths, Redirect, RoutePolicy};
use crate::session::Session;
use tracing::debug;

/// A navigable node. Children nest below the node's pattern and are subject to
/// every policy on their ancestor chain.
#[derive(Clone, Debug)]
pub struct RouteNode {
    pattern: RoutePattern,
    name: Option<String>,
    policy: Option<RoutePolicy>,
    index: bool,
    children: Vec<RouteNode>,
}

impl RouteNode {
    /// # Errors
    /// Returns an error if `pattern` cannot be parsed.
    pub fn new(pattern: &str) -> Result<Self, RouteError> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            name: None,
            policy: None,
            index: true,
            children: Vec::new(),
        })
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn guarded(mut self, policy: RoutePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Marks the node as a shell that only renders through its children.
    #[must_use]
    pub fn layout(mut self) -> Self {
        self.index = false;
        self
    }

    #[must_use]
    pub fn child(mut self, child: RouteNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = RouteNode>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn policy(&self) -> Option<&RoutePolicy> {
        self.policy.as_ref()
    }

    fn resolve<'a>(
        &'a self,
        path: &[&str],
        chain: &mut Vec<&'a RouteNode>,
        params: &mut Vec<(String, String)>,
    ) -> bool {
        let mark = params.len();
        let Some(consumed) = self.pattern.match_prefix(path, params) else {
            return false;
        };
        let rest = &path[consumed..];
        chain.push(self);

        if rest.is_empty() && (self.index || self.children.is_empty()) {
            return true;
        }

        let mut ordered: Vec<&RouteNode> = self.children.iter().collect();
        ordered.sort_by_key(|child| child.pattern.rank());
        for child in ordered {
            if child.resolve(rest, chain, params) {
                return true;
            }
        }

        chain.pop();
        params.truncate(mark);
        false
    }
}

/// A resolved navigation: the ancestor chain, root first, and the captured
/// path parameters.
#[derive(Clone, Debug)]
pub struct RouteMatch<'a> {
    chain: Vec<&'a RouteNode>,
    params: Vec<(String, String)>,
}

impl<'a> RouteMatch<'a> {
    #[must_use]
    pub fn chain(&self) -> &[&'a RouteNode] {
        &self.chain
    }

    /// The destination node.
    #[must_use]
    pub fn leaf(&self) -> &'a RouteNode {
        // A match always holds at least the root.
        self.chain[self.chain.len() - 1]
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Outcome of a navigation through the route table.
#[derive(Clone, Debug)]
pub enum Navigation<'a> {
    Render(RouteMatch<'a>),
    Redirect(Redirect),
    NotFound,
}

impl Navigation<'_> {
    #[must_use]
    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Redirect(redirect) => Some(redirect),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }
}

/// Flattened view of a route for listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: String,
    pub name: Option<String>,
    /// Policies on the chain from the root to this route.
    pub policies: Vec<RoutePolicy>,
}

#[derive(Clone, Debug)]
pub struct RouteTable {
    root: RouteNode,
}

impl RouteTable {
    #[must_use]
    pub fn new(root: RouteNode) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &RouteNode {
        &self.root
    }

    /// Resolves a location (path, optionally with query or fragment) to its
    /// ancestor chain.
    #[must_use]
    pub fn resolve(&self, location: &str) -> Option<RouteMatch<'_>> {
        let segments: Vec<&str> = split_segments(path_of(location)).collect();
        let mut chain = Vec::new();
        let mut params = Vec::new();

        self.root
            .resolve(&segments, &mut chain, &mut params)
            .then_some(RouteMatch { chain, params })
    }

    /// Applies every policy on the chain, root to leaf, and stops at the first
    /// redirect.
    #[must_use]
    pub fn navigate(
        &self,
        location: &str,
        session: Option<&Session>,
        paths: &GuardPaths,
    ) -> Navigation<'_> {
        let Some(matched) = self.resolve(location) else {
            debug!(location, "no route matches");
            return Navigation::NotFound;
        };

        for node in matched.chain() {
            let Some(policy) = node.policy() else {
                continue;
            };
            if let Decision::Redirect(redirect) = guard::evaluate(policy, session, location, paths)
            {
                return Navigation::Redirect(redirect);
            }
        }

        Navigation::Render(matched)
    }

    /// Every renderable route with its full path and policy chain.
    #[must_use]
    pub fn entries(&self) -> Vec<RouteEntry> {
        let mut entries = Vec::new();
        collect_entries(&self.root, "", &mut Vec::new(), &mut entries);
        entries
    }
}

fn collect_entries(
    node: &RouteNode,
    prefix: &str,
    policies: &mut Vec<RoutePolicy>,
    entries: &mut Vec<RouteEntry>,
) {
    let mut path = prefix.trim_end_matches('/').to_string();
    for segment in split_segments(node.pattern.as_str()) {
        path.push('/');
        path.push_str(segment);
    }
    if path.is_empty() {
        path.push('/');
    }

    let pushed = match &node.policy {
        Some(policy) => {
            policies.push(policy.clone());
            true
        }
        None => false,
    };

    if node.index || node.children.is_empty() {
        entries.push(RouteEntry {
            path: path.clone(),
            name: node.name.clone(),
            policies: policies.clone(),
        });
    }
    for child in &node.children {
        collect_entries(child, &path, policies, entries);
    }

    if pushed {
        policies.pop();
    }
}

/// Strips the query string and fragment from a location.
pub(crate) fn path_of(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    fn table() -> RouteTable {
        let root = RouteNode::new("/")
            .expect("root")
            .layout()
            .children([
                RouteNode::new("").expect("home").named("home"),
                RouteNode::new("projects")
                    .expect("projects")
                    .named("projects")
                    .children([
                        RouteNode::new("new")
                            .expect("new")
                            .named("project-new")
                            .guarded(RoutePolicy::require([Role::Customer])),
                        RouteNode::new(r":id(\d+)").expect("detail").named("project"),
                    ]),
                RouteNode::new("staff")
                    .expect("staff")
                    .layout()
                    .guarded(RoutePolicy::require([Role::Staff]))
                    .child(
                        RouteNode::new("reports")
                            .expect("reports")
                            .named("reports")
                            .guarded(RoutePolicy::require([Role::Admin])),
                    ),
            ]);
        RouteTable::new(root)
    }

    fn session(role: Role) -> Session {
        Session::new("t", "1", role, None).expect("session")
    }

    #[test]
    fn resolves_chain_and_params() {
        let table = table();
        let matched = table.resolve("/projects/42?tab=faq").expect("match");
        assert_eq!(matched.leaf().name(), Some("project"));
        assert_eq!(matched.chain().len(), 3);
        assert_eq!(matched.param("id"), Some("42"));

        assert_eq!(
            table.resolve("/projects/").expect("match").leaf().name(),
            Some("projects")
        );
        assert_eq!(table.resolve("/").expect("match").leaf().name(), Some("home"));
    }

    #[test]
    fn literal_segments_win_over_params() {
        let table = table();
        let matched = table.resolve("/projects/new").expect("match");
        assert_eq!(matched.leaf().name(), Some("project-new"));
        assert_eq!(matched.param("id"), None);
    }

    #[test]
    fn layouts_and_unknown_paths_do_not_resolve() {
        let table = table();
        assert!(table.resolve("/staff").is_none());
        assert!(table.resolve("/projects/abc").is_none());
        assert!(matches!(
            table.navigate("/nowhere", None, &GuardPaths::default()),
            Navigation::NotFound
        ));
    }

    #[test]
    fn ancestor_redirect_short_circuits() {
        let table = table();
        let paths = GuardPaths::default();

        // The staff layout sends anonymous visitors to login before the
        // admin-only child is consulted.
        let navigation = table.navigate("/staff/reports", None, &paths);
        assert_eq!(
            navigation.redirect(),
            Some(&Redirect::to_login("/login", "/staff/reports"))
        );

        // Admins fail the staff layout first and land home.
        let admin = session(Role::Admin);
        let navigation = table.navigate("/staff/reports", Some(&admin), &paths);
        assert_eq!(navigation.redirect(), Some(&Redirect::to("/")));

        // Staff pass the layout but not the admin-only leaf.
        let staff = session(Role::Staff);
        let navigation = table.navigate("/staff/reports", Some(&staff), &paths);
        assert_eq!(navigation.redirect(), Some(&Redirect::to("/")));
    }

    #[test]
    fn login_redirect_keeps_query() {
        let table = table();
        let navigation = table.navigate("/projects/new?draft=3", None, &GuardPaths::default());
        assert_eq!(
            navigation.redirect(),
            Some(&Redirect::to_login("/login", "/projects/new?draft=3"))
        );
    }

    #[test]
    fn entries_list_renderable_routes_with_policies() {
        let entries = table().entries();
        let paths: Vec<&str> = entries.iter().map(|entry| entry.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/", "/projects", "/projects/new", r"/projects/:id(\d+)", "/staff/reports"]
        );
        let reports = entries.last().expect("reports entry");
        assert_eq!(reports.policies.len(), 2);
    }

    #[test]
    fn path_of_strips_query_and_fragment() {
        assert_eq!(path_of("/a/b?x=1#top"), "/a/b");
        assert_eq!(path_of("/a#top"), "/a");
        assert_eq!(path_of("/a"), "/a");
    }
}
