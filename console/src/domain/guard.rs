//! Session check run before any protected view is built.

use tracing::warn;

use super::ports::SessionStore;
use super::session::Session;

/// Result of checking the session before entering a protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// A complete session exists.
    Proceed(Session),
    /// No usable session; send the operator to the login view.
    RedirectToLogin,
}

/// A protected view, or the redirect issued instead of building it.
#[derive(Debug)]
pub enum Navigation<V> {
    /// The view was built and may load data.
    Render(V),
    /// The view was not built and nothing was fetched.
    RedirectToLogin,
}

impl<V> Navigation<V> {
    /// The built view, if the guard let it through.
    pub fn into_view(self) -> Option<V> {
        match self {
            Self::Render(view) => Some(view),
            Self::RedirectToLogin => None,
        }
    }
}

/// Gatekeeper in front of every protected view.
pub struct NavigationGuard;

impl NavigationGuard {
    /// Check for a complete session.
    ///
    /// A store that cannot be read counts as signed out.
    pub fn check(store: &dyn SessionStore) -> GuardOutcome {
        match store.get() {
            Ok(Some(session)) => GuardOutcome::Proceed(session),
            Ok(None) => GuardOutcome::RedirectToLogin,
            Err(error) => {
                warn!(error = %error, "session store unreadable; treating as signed out");
                GuardOutcome::RedirectToLogin
            }
        }
    }

    /// Build `view` from the session, or redirect without building it.
    pub fn enter<V>(store: &dyn SessionStore, view: impl FnOnce(Session) -> V) -> Navigation<V> {
        match Self::check(store) {
            GuardOutcome::Proceed(session) => Navigation::Render(view(session)),
            GuardOutcome::RedirectToLogin => Navigation::RedirectToLogin,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Guard decisions for complete, partial and unreadable sessions.
    use super::*;
    use crate::domain::ports::{InMemorySessionStore, MockSessionStore, SessionStoreError};
    use crate::domain::session::SessionFields;
    use rstest::rstest;

    fn session() -> Session {
        Session::try_from_parts("Ada", "ada@acme.test", "P-1").expect("session")
    }

    #[test]
    fn complete_session_proceeds() {
        let store = InMemorySessionStore::with_session(&session());
        assert_eq!(NavigationGuard::check(&store), GuardOutcome::Proceed(session()));
    }

    #[rstest]
    #[case(SessionFields::default())]
    #[case(SessionFields { user: None, email: Some("ada@acme.test".into()), payer_id: Some("P-1".into()) })]
    #[case(SessionFields { user: Some("Ada".into()), email: None, payer_id: Some("P-1".into()) })]
    fn missing_fields_redirect(#[case] fields: SessionFields) {
        let store = InMemorySessionStore::with_fields(fields);
        assert_eq!(NavigationGuard::check(&store), GuardOutcome::RedirectToLogin);
    }

    #[test]
    fn unreadable_store_redirects() {
        let mut store = MockSessionStore::new();
        store
            .expect_get()
            .returning(|| Err(SessionStoreError::corrupt("bad json")));
        assert_eq!(NavigationGuard::check(&store), GuardOutcome::RedirectToLogin);
    }

    #[test]
    fn redirect_never_builds_the_view() {
        let store = InMemorySessionStore::default();
        let mut built = false;
        let outcome = NavigationGuard::enter(&store, |_| built = true);
        assert!(matches!(outcome, Navigation::RedirectToLogin));
        assert!(!built);
    }
}
