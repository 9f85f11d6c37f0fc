//! Certificate records and the single "fully verified" predicate.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::payer::PayerId;

/// Which side of a mutual-TLS exchange a certificate serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertType {
    /// Certificate presented when this payer calls a peer.
    Client,
    /// Certificate presented when a peer calls this payer.
    Server,
}

impl CertType {
    /// Every certificate type a payer must hold.
    pub const ALL: [Self; 2] = [Self::Client, Self::Server];

    /// Wire and file-name form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for CertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown certificate type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown certificate type '{0}', expected 'client' or 'server'")]
pub struct ParseCertTypeError(String);

impl FromStr for CertType {
    type Err = ParseCertTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            other => Err(ParseCertTypeError(other.to_owned())),
        }
    }
}

/// One certificate row for the signed-in payer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    /// Owning payer.
    pub payer_id: PayerId,
    /// Client or server.
    pub cert_type: CertType,
    /// Whether the portal has verified the certificate.
    pub certificate_verified: bool,
    /// Start of validity.
    pub valid_from: Option<DateTime<Utc>>,
    /// End of validity.
    pub valid_until: Option<DateTime<Utc>>,
}

/// Certificate rows plus the endpoint configured for the payer, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateDetails {
    /// Rows in the order the portal returned them.
    pub records: Vec<CertificateRecord>,
    /// Endpoint URL previously registered with an upload.
    pub endpoint: Option<String>,
}

/// Count of verified certificate types, whatever the source.
///
/// Directory rows carry a `verified_count` while the workflow holds the
/// rows themselves; both reduce to this summary so "fully verified" has one
/// definition.
///
/// # Examples
/// ```
/// use portal_console::domain::VerificationSummary;
///
/// assert!(VerificationSummary::from_verified_count(2).is_fully_verified());
/// assert!(!VerificationSummary::from_verified_count(1).is_fully_verified());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationSummary {
    verified_types: u32,
}

/// Number of verified types required before a payer may connect.
pub const REQUIRED_VERIFIED_TYPES: u32 = 2;

impl VerificationSummary {
    /// Summarise certificate rows; duplicate rows of one type count once.
    pub fn from_records(records: &[CertificateRecord]) -> Self {
        let verified: BTreeSet<CertType> = records
            .iter()
            .filter(|record| record.certificate_verified)
            .map(|record| record.cert_type)
            .collect();
        Self {
            verified_types: u32::try_from(verified.len()).unwrap_or(u32::MAX),
        }
    }

    /// Summarise a portal-reported verified count.
    pub const fn from_verified_count(verified_types: u32) -> Self {
        Self { verified_types }
    }

    /// Number of verified types.
    pub const fn verified_types(self) -> u32 {
        self.verified_types
    }

    /// True when both the client and server certificates are verified.
    pub const fn is_fully_verified(self) -> bool {
        self.verified_types == REQUIRED_VERIFIED_TYPES
    }
}

/// SHA-256 fingerprint of certificate text, for logs in place of contents.
pub fn certificate_fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
