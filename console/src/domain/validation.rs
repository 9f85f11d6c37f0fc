//! Inline form validation shared by the login and upload forms.
//!
//! Forms collect every failing field at once so the view can show each
//! message beside its input and keep the submit control disabled.

use serde_json::json;

use super::Error;

/// Machine-readable reason attached to a field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorCode {
    /// Required input was blank.
    MissingField,
    /// Input was not an email address.
    InvalidEmail,
    /// Input was shorter than the minimum.
    TooShort,
    /// Input lacked a required digit.
    MissingDigit,
    /// Input was not an absolute URL.
    InvalidUrl,
}

impl FieldErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidEmail => "invalid_email",
            Self::TooShort => "too_short",
            Self::MissingDigit => "missing_digit",
            Self::InvalidUrl => "invalid_url",
        }
    }
}

/// Newtype wrapper for form field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldName(&'static str);

impl FieldName {
    /// Wrap a static field name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Field name as written in the form.
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field the message belongs beside.
    pub field: FieldName,
    /// Message shown to the operator.
    pub message: String,
    /// Machine-readable reason.
    pub code: FieldErrorCode,
}

/// All failing fields of one form, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Record a failure for `field`.
    pub fn push(&mut self, field: FieldName, code: FieldErrorCode, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
            code,
        });
    }

    /// True when every field passed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message for `field`, if it failed.
    pub fn message_for(&self, field: FieldName) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// Iterate failures in field order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Collapse into a console error whose details list every field.
    pub fn to_error(&self) -> Error {
        let message = self
            .0
            .first()
            .map_or("form is invalid", |error| error.message.as_str());
        let fields: Vec<_> = self
            .0
            .iter()
            .map(|error| {
                json!({
                    "field": error.field.as_str(),
                    "message": error.message,
                    "code": error.code.as_str(),
                })
            })
            .collect();
        Error::invalid_request(message).with_details(json!({ "fields": fields }))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error aggregation.
    use super::*;
    use crate::domain::ErrorCode;

    const EMAIL: FieldName = FieldName::new("username");
    const PASSWORD: FieldName = FieldName::new("password");

    #[test]
    fn messages_are_found_per_field() {
        let mut errors = FieldErrors::default();
        errors.push(EMAIL, FieldErrorCode::InvalidEmail, "Invalid email address");
        assert_eq!(errors.message_for(EMAIL), Some("Invalid email address"));
        assert_eq!(errors.message_for(PASSWORD), None);
    }

    #[test]
    fn error_details_list_every_field() {
        let mut errors = FieldErrors::default();
        errors.push(EMAIL, FieldErrorCode::InvalidEmail, "Invalid email address");
        errors.push(PASSWORD, FieldErrorCode::TooShort, "must be at least 8 characters");
        let err = errors.to_error();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Invalid email address");
        let details = err.details().expect("details");
        assert_eq!(details["fields"][1]["code"], "too_short");
    }
}
