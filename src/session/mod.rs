//! Session feature covering the authenticated identity, its persistence port
//! and the single-writer store shared with every view.
//!
//! Flow Overview: the store hydrates from storage on start-up; a successful
//! backend login hands a record to `login`, which validates, persists and
//! notifies; `logout` (explicit, or triggered by a backend 401) clears both
//! copies. Tokens are bearer credentials and must never be logged.

mod storage;
mod store;
mod types;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use store::{SessionStore, SESSION_STORAGE_KEY};
pub use types::{Role, RoleName, Session, SessionError, SessionRecord};
