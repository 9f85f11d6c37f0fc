//! Signed-in administrator identity.
//!
//! A session is the triple written at login and read by every protected
//! view. It is all-or-nothing: the persisted representation may be partial
//! (a hand-edited file, an interrupted write) but such a record never
//! becomes a [`Session`].

use serde::{Deserialize, Serialize};

use super::payer::{PayerId, PayerIdValidationError};

/// Persisted key holding the administrator display name.
pub const USER_KEY: &str = "user";
/// Persisted key holding the administrator email.
pub const EMAIL_KEY: &str = "email";
/// Persisted key holding the payer identifier.
pub const PAYER_ID_KEY: &str = "payer_id";

/// Validation errors returned by [`Session::try_from_parts`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionValidationError {
    /// Display name was blank.
    #[error("display name must not be empty")]
    EmptyDisplayName,
    /// Email was blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Payer id failed validation.
    #[error("invalid payer id: {0}")]
    PayerId(#[from] PayerIdValidationError),
}

/// Authenticated administrator identity.
///
/// ## Invariants
/// - `display_name` and `email` are trimmed and non-empty.
/// - `payer_id` satisfies [`PayerId`] validation.
///
/// # Examples
/// ```
/// use portal_console::domain::Session;
///
/// let session = Session::try_from_parts("Ada", "ada@acme.test", "P-1").expect("session");
/// assert_eq!(session.payer_id().as_ref(), "P-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    display_name: String,
    email: String,
    payer_id: PayerId,
}

impl Session {
    /// Build a session from raw strings.
    pub fn try_from_parts(
        display_name: &str,
        email: &str,
        payer_id: &str,
    ) -> Result<Self, SessionValidationError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(SessionValidationError::EmptyDisplayName);
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(SessionValidationError::EmptyEmail);
        }
        Ok(Self {
            display_name: display_name.to_owned(),
            email: email.to_owned(),
            payer_id: PayerId::new(payer_id)?,
        })
    }

    /// Rebuild a session from persisted fields; `None` when any is missing
    /// or invalid.
    pub fn from_fields(fields: &SessionFields) -> Option<Self> {
        let (Some(user), Some(email), Some(payer_id)) = (
            fields.user.as_deref(),
            fields.email.as_deref(),
            fields.payer_id.as_deref(),
        ) else {
            return None;
        };
        Self::try_from_parts(user, email, payer_id).ok()
    }

    /// Persisted representation of this session.
    pub fn to_fields(&self) -> SessionFields {
        SessionFields {
            user: Some(self.display_name.clone()),
            email: Some(self.email.clone()),
            payer_id: Some(self.payer_id.to_string()),
        }
    }

    /// Administrator display name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Administrator email; also the key for certificate lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Payer the administrator acts for.
    pub fn payer_id(&self) -> &PayerId {
        &self.payer_id
    }
}

/// Raw key-value form of a session as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFields {
    /// Display name under [`USER_KEY`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Email under [`EMAIL_KEY`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Payer id under [`PAYER_ID_KEY`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<String>,
}

impl SessionFields {
    /// True when no key is present.
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.email.is_none() && self.payer_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for session validation and partial records.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "a@b.test", "P-1", SessionValidationError::EmptyDisplayName)]
    #[case("Ada", "  ", "P-1", SessionValidationError::EmptyEmail)]
    #[case(
        "Ada",
        "a@b.test",
        "",
        SessionValidationError::PayerId(PayerIdValidationError::Empty)
    )]
    fn invalid_parts(
        #[case] user: &str,
        #[case] email: &str,
        #[case] payer_id: &str,
        #[case] expected: SessionValidationError,
    ) {
        assert_eq!(Session::try_from_parts(user, email, payer_id), Err(expected));
    }

    #[test]
    fn fields_round_trip_through_session() {
        let session = Session::try_from_parts(" Ada ", "ada@acme.test", "P-1").expect("session");
        assert_eq!(session.display_name(), "Ada");
        assert_eq!(Session::from_fields(&session.to_fields()), Some(session));
    }

    #[rstest]
    #[case(SessionFields { user: Some("Ada".into()), email: None, payer_id: Some("P-1".into()) })]
    #[case(SessionFields { user: None, email: Some("a@b.test".into()), payer_id: Some("P-1".into()) })]
    #[case(SessionFields { user: Some("Ada".into()), email: Some(" ".into()), payer_id: Some("P-1".into()) })]
    #[case(SessionFields::default())]
    fn partial_fields_are_absent(#[case] fields: SessionFields) {
        assert_eq!(Session::from_fields(&fields), None);
    }

    #[test]
    fn persisted_keys_use_portal_names() {
        let session = Session::try_from_parts("Ada", "ada@acme.test", "P-1").expect("session");
        let json = serde_json::to_value(session.to_fields()).expect("serialise");
        assert_eq!(json[USER_KEY], "Ada");
        assert_eq!(json[EMAIL_KEY], "ada@acme.test");
        assert_eq!(json[PAYER_ID_KEY], "P-1");
    }
}
