//! Payer identity and directory rows.

use std::fmt;

use super::certificate::VerificationSummary;
use super::search::Searchable;

/// Validation errors returned by [`PayerId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayerIdValidationError {
    /// The identifier was blank once trimmed.
    #[error("payer id must not be empty")]
    Empty,
    /// The identifier contained whitespace inside it.
    #[error("payer id must not contain whitespace")]
    ContainsWhitespace,
}

/// Opaque identifier assigned to a payer organisation by the portal.
///
/// ## Invariants
/// - Trimmed, non-empty and free of interior whitespace, so it can be used
///   verbatim in query strings and download file names.
///
/// # Examples
/// ```
/// use portal_console::domain::PayerId;
///
/// let id = PayerId::new(" P-1001 ").expect("valid id");
/// assert_eq!(id.as_ref(), "P-1001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayerId(String);

impl PayerId {
    /// Validate and construct a payer identifier.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PayerIdValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PayerIdValidationError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(PayerIdValidationError::ContainsWhitespace);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PayerId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One organisation listed in the portal directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayerRecord {
    /// Portal-assigned identifier.
    pub payer_id: PayerId,
    /// Organisation name.
    pub payer_name: String,
    /// Administrator display name.
    pub admin_name: String,
    /// Administrator contact email, used as the connection target key.
    pub admin_email: String,
    /// Administrator phone number.
    pub admin_phone: String,
    /// First address line.
    pub address_line1: String,
    /// Second address line.
    pub address_line2: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// Whether any certificate has been uploaded.
    pub certificate_uploaded: bool,
    /// Aggregate verification flag reported by the portal.
    pub certificate_verified: bool,
    /// Number of verified certificate types.
    pub verified_count: u32,
}

impl PayerRecord {
    /// Verification state derived from the portal's verified count.
    pub fn verification(&self) -> VerificationSummary {
        VerificationSummary::from_verified_count(self.verified_count)
    }

    /// True when both certificate types are verified.
    pub fn is_fully_verified(&self) -> bool {
        self.verification().is_fully_verified()
    }

    /// Whether `email` names this payer's administrator.
    pub fn has_admin_email(&self, email: &str) -> bool {
        self.admin_email.trim().eq_ignore_ascii_case(email.trim())
    }
}

impl Searchable for PayerRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.payer_name.as_str(),
            self.admin_name.as_str(),
            self.admin_email.as_str(),
            self.address_line1.as_str(),
            self.address_line2.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for payer identifiers and verification.
    use super::*;
    use rstest::rstest;

    fn payer(verified_count: u32) -> PayerRecord {
        PayerRecord {
            payer_id: PayerId::new("P-1").expect("payer id"),
            payer_name: "Acme Health".to_owned(),
            admin_name: "Ada Admin".to_owned(),
            admin_email: "ada@acme.test".to_owned(),
            admin_phone: "555-0100".to_owned(),
            address_line1: "1 Main St".to_owned(),
            address_line2: String::new(),
            city: "Springfield".to_owned(),
            state: "IL".to_owned(),
            zip: "62701".to_owned(),
            certificate_uploaded: verified_count > 0,
            certificate_verified: verified_count == 2,
            verified_count,
        }
    }

    #[rstest]
    #[case("", PayerIdValidationError::Empty)]
    #[case("   ", PayerIdValidationError::Empty)]
    #[case("P 1", PayerIdValidationError::ContainsWhitespace)]
    fn invalid_payer_ids(#[case] raw: &str, #[case] expected: PayerIdValidationError) {
        assert_eq!(PayerId::new(raw), Err(expected));
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, false)]
    #[case(2, true)]
    #[case(3, false)]
    fn full_verification_requires_exactly_two(#[case] count: u32, #[case] expected: bool) {
        assert_eq!(payer(count).is_fully_verified(), expected);
    }

    #[test]
    fn admin_email_match_ignores_case_and_padding() {
        assert!(payer(0).has_admin_email("  ADA@acme.test "));
        assert!(!payer(0).has_admin_email("bob@acme.test"));
    }
}
