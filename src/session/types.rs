//! Session identity types. `SessionRecord` is the raw, possibly partial shape
//! read from storage or returned by the backend; `Session` only exists once a
//! record carries a token, a user id, and a role. Tokens are bearer
//! credentials and must never reach logs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session record is missing `{field}`")]
    Incomplete { field: &'static str },
    #[error("invalid role: {0:?}")]
    InvalidRole(String),
}

/// Platform roles. Unknown role names are kept upper-cased so new backend
/// roles can be declared in policies without a release.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Admin,
    Staff,
    Customer,
    Other(RoleName),
}

/// Name of a role outside the built-in set. Only obtainable through
/// [`Role::other`] or parsing, so it is always trimmed and upper-cased.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoleName(String);

impl RoleName {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Role {
    /// Every role the platform ships with.
    pub const BUILT_IN: [Role; 3] = [Role::Admin, Role::Staff, Role::Customer];

    /// Role from a free-form name, normalized the same way backend roles are.
    /// Built-in names map to their variants.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidRole`] for a blank name.
    pub fn other(name: &str) -> Result<Self, SessionError> {
        name.parse()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "ADMIN",
            Self::Staff => "STAFF",
            Self::Customer => "CUSTOMER",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "" => Err(SessionError::InvalidRole(value.to_string())),
            "ADMIN" => Ok(Self::Admin),
            "STAFF" => Ok(Self::Staff),
            "CUSTOMER" => Ok(Self::Customer),
            _ => Ok(Self::Other(RoleName(normalized))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Flat session layout shared by the storage format and the login response.
/// Every field is optional so older or damaged payloads still decode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(
        default,
        rename = "userName",
        alias = "username",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_name: Option<String>,
}

// The backend sends numeric ids; older clients stored them as strings.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

/// A fully populated authenticated identity.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    id: String,
    role: Role,
    user_name: Option<String>,
}

impl Session {
    /// Builds a session from already validated parts.
    ///
    /// # Errors
    /// Returns [`SessionError::Incomplete`] when the token or id is blank.
    pub fn new(
        token: impl Into<String>,
        id: impl Into<String>,
        role: Role,
        user_name: Option<String>,
    ) -> Result<Self, SessionError> {
        Self::try_from(SessionRecord {
            token: Some(token.into()),
            id: Some(id.into()),
            role: Some(role.as_str().to_string()),
            user_name,
        })
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Name suitable for greeting the user, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(&self.id)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("user_name", &self.user_name)
            .finish()
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, SessionError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(SessionError::Incomplete { field })
}

impl TryFrom<SessionRecord> for Session {
    type Error = SessionError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let token = required(record.token, "token")?;
        let id = required(record.id, "id")?;
        let role = required(record.role, "role")?
            .parse()
            .map_err(|_| SessionError::Incomplete { field: "role" })?;
        let user_name = record
            .user_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Self {
            token,
            id,
            role,
            user_name,
        })
    }
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        Self {
            token: Some(session.token.clone()),
            id: Some(session.id.clone()),
            role: Some(session.role.as_str().to_string()),
            user_name: session.user_name.clone(),
        }
    }
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        Self::from(&session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SessionRecord {
        SessionRecord {
            token: Some("tok-123".to_string()),
            id: Some("42".to_string()),
            role: Some("staff".to_string()),
            user_name: Some("Ada".to_string()),
        }
    }

    #[test]
    fn role_parsing_is_case_insensitive_and_keeps_unknown_roles() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" Staff ".parse::<Role>(), Ok(Role::Staff));
        assert_eq!("CUSTOMER".parse::<Role>(), Ok(Role::Customer));
        let moderator = "moderator".parse::<Role>().expect("unknown role");
        assert!(matches!(moderator, Role::Other(_)));
        assert_eq!(moderator.as_str(), "MODERATOR");
        assert!("   ".parse::<Role>().is_err());
    }

    #[test]
    fn role_other_normalizes_like_backend_roles() {
        assert_eq!(Role::other(" moderator "), "MODERATOR".parse::<Role>());
        assert_eq!(Role::other("Moderator").expect("role").as_str(), "MODERATOR");
        assert_eq!(Role::other("admin"), Ok(Role::Admin));
        assert!(matches!(Role::other(""), Err(SessionError::InvalidRole(_))));
    }

    #[test]
    fn complete_record_becomes_session() {
        let session = Session::try_from(record()).expect("complete record");
        assert_eq!(session.token(), "tok-123");
        assert_eq!(session.id(), "42");
        assert_eq!(session.role(), &Role::Staff);
        assert_eq!(session.display_name(), "Ada");
    }

    #[test]
    fn partial_records_are_rejected() {
        let mut missing_role = record();
        missing_role.role = None;
        assert_eq!(
            Session::try_from(missing_role),
            Err(SessionError::Incomplete { field: "role" })
        );

        let mut blank_token = record();
        blank_token.token = Some("  ".to_string());
        assert_eq!(
            Session::try_from(blank_token),
            Err(SessionError::Incomplete { field: "token" })
        );

        let mut missing_id = record();
        missing_id.id = None;
        assert_eq!(
            Session::try_from(missing_id),
            Err(SessionError::Incomplete { field: "id" })
        );
    }

    #[test]
    fn record_uses_flat_camel_case_layout() {
        let session = Session::try_from(record()).expect("complete record");
        let json = serde_json::to_value(SessionRecord::from(&session)).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "token": "tok-123",
                "id": "42",
                "role": "STAFF",
                "userName": "Ada",
            })
        );
    }

    #[test]
    fn record_accepts_numeric_ids_and_absent_fields() {
        let record: SessionRecord =
            serde_json::from_str(r#"{"token":"t","id":7,"role":"ADMIN"}"#).expect("decode");
        assert_eq!(record.id.as_deref(), Some("7"));
        assert_eq!(record.user_name, None);

        let empty: SessionRecord = serde_json::from_str("{}").expect("decode");
        assert_eq!(empty, SessionRecord::default());
    }

    #[test]
    fn debug_output_redacts_token() {
        let session = Session::try_from(record()).expect("complete record");
        let debug = format!("{session:?}");
        assert!(!debug.contains("tok-123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
