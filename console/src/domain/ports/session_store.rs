//! Driven port for the persisted administrator session.
//!
//! Views receive a store by reference instead of reading ambient state, and
//! every mutation replaces all three session keys at once.

use std::sync::Mutex;

use super::define_port_error;
use crate::domain::session::{Session, SessionFields};

define_port_error! {
    /// Errors surfaced by session storage.
    pub enum SessionStoreError {
        /// Reading or writing the backing store failed.
        Io { message: String } => "session storage failed: {message}",
        /// The stored record could not be parsed.
        Corrupt { message: String } => "session storage is corrupt: {message}",
    }
}

/// Port for reading and replacing the current session.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
pub trait SessionStore: Send + Sync {
    /// Current session; `None` when absent or only partially stored.
    fn get(&self) -> Result<Option<Session>, SessionStoreError>;

    /// Replace the stored session.
    fn set(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Remove every session key.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// Process-local store used by tests and one-shot commands.
///
/// # Examples
/// ```
/// use portal_console::domain::Session;
/// use portal_console::domain::ports::{InMemorySessionStore, SessionStore};
///
/// let store = InMemorySessionStore::default();
/// let session = Session::try_from_parts("Ada", "ada@acme.test", "P-1").unwrap();
/// store.set(&session).unwrap();
/// assert_eq!(store.get().unwrap(), Some(session));
/// store.clear().unwrap();
/// assert_eq!(store.get().unwrap(), None);
/// ```
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    fields: Mutex<SessionFields>,
}

impl InMemorySessionStore {
    /// Seed the store with raw fields, including partial ones.
    pub fn with_fields(fields: SessionFields) -> Self {
        Self {
            fields: Mutex::new(fields),
        }
    }

    /// Seed the store with a complete session.
    pub fn with_session(session: &Session) -> Self {
        Self::with_fields(session.to_fields())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SessionFields>, SessionStoreError> {
        self.fields
            .lock()
            .map_err(|_| SessionStoreError::io("session lock poisoned"))
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(Session::from_fields(&*self.lock()?))
    }

    fn set(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self.lock()? = session.to_fields();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.lock()? = SessionFields::default();
        Ok(())
    }
}
