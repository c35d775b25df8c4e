use crate::session::Role;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

/// Access rule attached to a navigable destination. Built once with the route
/// table and never changed afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePolicy {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    required_roles: BTreeSet<Role>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    restricted_roles: BTreeSet<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fallback_path: Option<String>,
}

impl RoutePolicy {
    /// No constraints: renders for everyone.
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    /// Only the given roles may view the destination.
    pub fn require(roles: impl IntoIterator<Item = Role>) -> Self {
        Self::default().with_required(roles)
    }

    /// Any signed-in user holding one of the built-in roles.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::require(Role::BUILT_IN)
    }

    /// Steers the given roles to `fallback` even when otherwise permitted.
    pub fn restrict(roles: impl IntoIterator<Item = Role>, fallback: impl Into<String>) -> Self {
        Self::default()
            .with_restricted(roles)
            .with_fallback(fallback)
    }

    #[must_use]
    pub fn with_required(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.required_roles.extend(roles);
        self
    }

    #[must_use]
    pub fn with_restricted(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.restricted_roles.extend(roles);
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        let trimmed = path.trim();
        self.fallback_path = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    #[must_use]
    pub fn required_roles(&self) -> &BTreeSet<Role> {
        &self.required_roles
    }

    #[must_use]
    pub fn restricted_roles(&self) -> &BTreeSet<Role> {
        &self.restricted_roles
    }

    #[must_use]
    pub fn fallback_path(&self) -> Option<&str> {
        self.fallback_path.as_deref()
    }

    /// True when the policy never redirects anyone.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.required_roles.is_empty() && self.restricted_roles.is_empty()
    }

    #[must_use]
    pub fn requires_login(&self) -> bool {
        !self.required_roles.is_empty()
    }
}

fn join(roles: &BTreeSet<Role>) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(",")
}

impl fmt::Display for RoutePolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_public() {
            return formatter.write_str("public");
        }

        let mut parts = Vec::new();
        if !self.required_roles.is_empty() {
            parts.push(format!("require {}", join(&self.required_roles)));
        }
        if !self.restricted_roles.is_empty() {
            let fallback = self.fallback_path.as_deref().unwrap_or("home");
            parts.push(format!(
                "restrict {} -> {fallback}",
                join(&self.restricted_roles)
            ));
        }
        formatter.write_str(&parts.join("; "))
    }
}
