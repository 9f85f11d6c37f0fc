//! Login form rules and validated credentials.
//!
//! The form is checked field by field before any network call. Only a form
//! with no field errors yields [`LoginCredentials`].

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use zeroize::Zeroizing;

use super::validation::{FieldErrorCode, FieldErrors, FieldName};

/// Username input; the portal expects the administrator email.
pub const USERNAME_FIELD: FieldName = FieldName::new("username");
/// Password input.
pub const PASSWORD_FIELD: FieldName = FieldName::new("password");
/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 8;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Whether `raw` looks like an email address.
pub fn is_valid_email(raw: &str) -> bool {
    email_regex().is_match(raw.trim())
}

/// Raw login form input.
#[derive(Clone, Default)]
pub struct LoginForm {
    username: String,
    password: Zeroizing<String>,
}

impl LoginForm {
    /// Capture raw form input.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Every failing field, first failing rule per field.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();

        let username = self.username.trim();
        if username.is_empty() {
            errors.push(USERNAME_FIELD, FieldErrorCode::MissingField, "Email is required");
        } else if !is_valid_email(username) {
            errors.push(USERNAME_FIELD, FieldErrorCode::InvalidEmail, "Invalid email address");
        }

        let password = self.password.as_str();
        if password.is_empty() {
            errors.push(PASSWORD_FIELD, FieldErrorCode::MissingField, "Password is required");
        } else if password.chars().count() < PASSWORD_MIN_LEN {
            errors.push(
                PASSWORD_FIELD,
                FieldErrorCode::TooShort,
                format!("must be at least {PASSWORD_MIN_LEN} characters"),
            );
        } else if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(
                PASSWORD_FIELD,
                FieldErrorCode::MissingDigit,
                "must contain at least one number",
            );
        }

        errors
    }

    /// Whether the submit control is disabled.
    pub fn is_submit_disabled(&self) -> bool {
        !self.validate().is_empty()
    }

    /// Validated credentials, or every field error.
    pub fn credentials(&self) -> Result<LoginCredentials, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(LoginCredentials {
            username: self.username.trim().to_owned(),
            password: self.password.clone(),
        })
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Validated login credentials sent to the portal.
///
/// ## Invariants
/// - `username` is a trimmed email address.
/// - `password` satisfies the form's length and digit rules and keeps any
///   caller-provided whitespace.
///
/// # Examples
/// ```
/// use portal_console::domain::auth::LoginForm;
///
/// let creds = LoginForm::new(" ada@acme.test ", "s3cretpass").credentials().unwrap();
/// assert_eq!(creds.username(), "ada@acme.test");
/// assert_eq!(creds.password(), "s3cretpass");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Username (administrator email).
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password as entered.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
