//! Single-writer session store. Views read the live session through
//! [`SessionStore::current`] or follow changes through a `watch` receiver;
//! only `load`, `login` and `logout` replace the value.

use super::{
    storage::SessionStorage,
    types::{Session, SessionError, SessionRecord},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Well-known storage key holding the serialized session.
pub const SESSION_STORAGE_KEY: &str = "session";

pub struct SessionStore<S> {
    storage: S,
    key: String,
    state: watch::Sender<Option<Session>>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Creates an empty store backed by `storage`. Call [`Self::load`] to
    /// hydrate it.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, SESSION_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            storage,
            key: key.into(),
            state,
        }
    }

    /// Creates a store and hydrates it from storage.
    pub fn open(storage: S) -> Self {
        let store = Self::new(storage);
        store.load();
        store
    }

    /// Reads the persisted session and makes it current. Anything unreadable
    /// or incomplete loads as no session.
    pub fn load(&self) -> Option<Session> {
        let session = self.read_persisted();
        self.state.send_replace(session.clone());
        session
    }

    /// The live session, if any.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Receiver notified on every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Establishes `record` as the current session and persists it.
    ///
    /// # Errors
    /// Returns [`SessionError::Incomplete`] for a record without token, id or
    /// role; the current session is left untouched.
    pub fn login(&self, record: SessionRecord) -> Result<Session, SessionError> {
        let session = Session::try_from(record).map_err(|err| {
            warn!(error = %err, "login ignored: incomplete session");
            err
        })?;

        self.persist(&session);
        self.state.send_replace(Some(session.clone()));

        info!(user_id = session.id(), role = %session.role(), "session established");
        Ok(session)
    }

    /// Clears the session in memory and in storage. Calling it without a
    /// session changes nothing and notifies nobody.
    pub fn logout(&self) {
        if let Err(err) = self.storage.clear(&self.key) {
            warn!(error = %err, "failed to clear persisted session");
        }

        let cleared = self.state.send_if_modified(|state| state.take().is_some());
        if cleared {
            info!("session cleared");
        } else {
            debug!("logout without an active session");
        }
    }

    fn persist(&self, session: &Session) {
        let result = serde_json::to_string(&SessionRecord::from(session))
            .map_err(|err| err.to_string())
            .and_then(|json| {
                self.storage
                    .write(&self.key, &json)
                    .map_err(|err| err.to_string())
            });

        // The in-memory session stands even when it cannot be persisted.
        if let Err(err) = result {
            warn!(error = %err, "failed to persist session");
        }
    }

    fn read_persisted(&self) -> Option<Session> {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no persisted session");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "failed to read persisted session");
                return None;
            }
        };

        let record: SessionRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "discarding malformed persisted session");
                return None;
            }
        };

        match Session::try_from(record) {
            Ok(session) => {
                debug!(user_id = session.id(), role = %session.role(), "session restored");
                Some(session)
            }
            Err(err) => {
                warn!(error = %err, "discarding incomplete persisted session");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{storage::MemoryStorage, types::Role, StorageError};
    use std::sync::Arc;

    fn record(role: Option<&str>) -> SessionRecord {
        SessionRecord {
            token: Some("tok".to_string()),
            id: Some("1".to_string()),
            role: role.map(ToString::to_string),
            user_name: Some("Grace".to_string()),
        }
    }

    #[test]
    fn load_without_data_is_absent() {
        let store = SessionStore::new(MemoryStorage::new());
        assert!(store.load().is_none());
        assert!(store.current().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn load_treats_malformed_data_as_absent() {
        for raw in ["not json", "[]", r#"{"token":"t","id":"1"}"#, r#"{"token":"","id":"1","role":"ADMIN"}"#] {
            let storage = MemoryStorage::new();
            storage.write(SESSION_STORAGE_KEY, raw).expect("seed");
            let store = SessionStore::new(storage);
            assert!(store.load().is_none(), "{raw} should load as absent");
        }
    }

    #[test]
    fn login_persists_and_updates_current() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(Arc::clone(&storage));

        let session = store.login(record(Some("CUSTOMER"))).expect("login");
        assert_eq!(session.role(), &Role::Customer);
        assert_eq!(store.current(), Some(session));

        let raw = storage
            .read(SESSION_STORAGE_KEY)
            .expect("read")
            .expect("persisted");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(json["role"], "CUSTOMER");
        assert_eq!(json["userName"], "Grace");
    }

    #[test]
    fn incomplete_login_keeps_previous_session() {
        let store = SessionStore::new(MemoryStorage::new());
        let before = store.login(record(Some("ADMIN"))).expect("login");

        let result = store.login(record(None));
        assert_eq!(result, Err(SessionError::Incomplete { field: "role" }));
        assert_eq!(store.current(), Some(before));

        let mut tokenless = record(Some("STAFF"));
        tokenless.token = None;
        assert!(store.login(tokenless).is_err());
        assert_eq!(store.current().map(|s| s.role().clone()), Some(Role::Admin));
    }

    #[test]
    fn logout_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(Arc::clone(&storage));
        store.login(record(Some("STAFF"))).expect("login");

        store.logout();
        assert!(store.current().is_none());
        assert!(storage.read(SESSION_STORAGE_KEY).expect("read").is_none());

        store.logout();
        assert!(store.current().is_none());
    }

    #[test]
    fn subscribers_observe_changes() {
        let store = SessionStore::new(MemoryStorage::new());
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().expect("sender alive"));

        store.login(record(Some("STAFF"))).expect("login");
        assert!(rx.has_changed().expect("sender alive"));
        assert!(rx.borrow_and_update().is_some());

        store.logout();
        assert!(rx.has_changed().expect("sender alive"));
        assert!(rx.borrow_and_update().is_none());

        store.logout();
        assert!(!rx.has_changed().expect("sender alive"));
    }

    #[test]
    fn rejected_login_does_not_notify() {
        let store = SessionStore::new(MemoryStorage::new());
        let rx = store.subscribe();
        let _ = store.login(record(None));
        assert!(!rx.has_changed().expect("sender alive"));
    }

    struct FailingStorage;

    impl SessionStorage for FailingStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }

        fn clear(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn storage_failures_never_escape() {
        let store = SessionStore::open(FailingStorage);
        assert!(store.current().is_none());

        let session = store.login(record(Some("ADMIN"))).expect("login");
        assert_eq!(store.current(), Some(session));

        store.logout();
        assert!(store.current().is_none());
    }
}
