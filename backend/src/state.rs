//! In-memory portal directory shared by every handler.
//!
//! Mutations (uploads, generated certificates, verification, connections)
//! are applied here so the console sees them on its next fetch.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Months, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

/// Certificate type as written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CertKind {
    Client,
    Server,
}

impl fmt::Display for CertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Client => "client",
            Self::Server => "server",
        })
    }
}

/// Administrator login seeded into the portal.
#[derive(Debug, Clone)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub payer_id: String,
}

/// One registered payer organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payer {
    pub payer_id: String,
    pub payer_name: String,
    pub adm_name: String,
    pub adm_email: String,
    pub adm_phone: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub endpoint: Option<String>,
    pub certificate_uploaded: bool,
}

/// A certificate held for a payer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub payer_id: String,
    pub cert_type: CertKind,
    pub certificate_verified: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub pem: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub payer_id: String,
    pub payer_name: String,
    pub status: String,
    pub trust_framework: String,
    pub connected_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: u32,
    pub description: String,
    pub actor: String,
    pub occurred_at: DateTime<Utc>,
}

/// Single-use activation link.
#[derive(Debug, Clone)]
pub struct Activation {
    pub key: String,
    pub act_id: String,
    pub used: bool,
}

/// Counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_payers: usize,
    pub active_connections: usize,
    pub pending_requests: usize,
    pub verified_certificates: usize,
}

/// Plain data the portal starts from.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub accounts: Vec<Account>,
    pub payers: Vec<Payer>,
    pub certificates: Vec<Certificate>,
    pub connections: Vec<Connection>,
    pub activity: Vec<Activity>,
    pub activations: Vec<Activation>,
}

/// Application failures; the handler reports them as an embedded status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortalError {
    #[error("Invalid username or password")]
    BadCredentials,
    #[error("No payer is registered for {email}")]
    UnknownEmail { email: String },
    #[error("No payer with id {payer_id}")]
    UnknownPayer { payer_id: String },
    #[error("A {cert_type} certificate already exists")]
    CertificateExists { cert_type: CertKind },
    #[error("No {cert_type} certificate on file")]
    CertificateMissing { cert_type: CertKind },
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("A payer cannot connect to itself")]
    SelfConnect,
    #[error("Both payers must have verified client and server certificates")]
    NotVerified,
    #[error("portal state is unavailable")]
    Unavailable,
}

impl PortalError {
    /// Status code embedded in the response envelope.
    pub fn status(&self) -> u16 {
        match self {
            Self::BadCredentials => 401,
            Self::UnknownEmail { .. } | Self::UnknownPayer { .. } => 404,
            Self::CertificateMissing { .. } => 404,
            Self::CertificateExists { .. } => 409,
            Self::MissingField { .. } | Self::SelfConnect => 400,
            Self::NotVerified => 412,
            Self::Unavailable => 500,
        }
    }
}

/// Whether a connection request is new or re-establishes an old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    New,
    Existing,
}

const CERTIFICATE_VALIDITY_MONTHS: u32 = 12;
const REQUIRED_VERIFIED_TYPES: usize = 2;

/// Shared portal state.
pub struct PortalState {
    directory: Mutex<Directory>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl PortalState {
    pub fn new(directory: Directory, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            directory: Mutex::new(directory),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Directory>, PortalError> {
        self.directory.lock().map_err(|_| PortalError::Unavailable)
    }

    /// Check a login and return the matching account.
    pub fn login(&self, email: &str, password: &str) -> Result<Account, PortalError> {
        let directory = self.lock()?;
        directory
            .accounts
            .iter()
            .find(|account| account.email.eq_ignore_ascii_case(email.trim()))
            .filter(|account| account.password == password)
            .cloned()
            .ok_or(PortalError::BadCredentials)
    }

    /// Payers with their verified certificate counts.
    pub fn payers(&self) -> Result<Vec<(Payer, usize)>, PortalError> {
        let directory = self.lock()?;
        Ok(directory
            .payers
            .iter()
            .map(|payer| (payer.clone(), directory.verified_count(&payer.payer_id)))
            .collect())
    }

    /// Certificates and registered endpoint for the payer administered by
    /// `email`.
    pub fn certificates_for(
        &self,
        email: &str,
    ) -> Result<(Vec<Certificate>, Option<String>), PortalError> {
        let directory = self.lock()?;
        let payer = directory.payer_by_email(email)?;
        let rows = directory
            .certificates
            .iter()
            .filter(|certificate| certificate.payer_id == payer.payer_id)
            .cloned()
            .collect();
        Ok((rows, payer.endpoint.clone()))
    }

    /// Record an uploaded certificate for `email`'s payer.
    ///
    /// The upload fills the first missing type, client before server. When
    /// both exist it replaces the client row. The stored row is unverified.
    pub fn upload(&self, email: &str, content: &str, endpoint: &str) -> Result<CertKind, PortalError> {
        require("certcontent", content)?;
        require("endpoint", endpoint)?;
        let mut directory = self.lock()?;
        let payer = directory
            .payers
            .iter_mut()
            .find(|payer| payer.adm_email.eq_ignore_ascii_case(email.trim()))
            .ok_or_else(|| PortalError::UnknownEmail {
                email: email.to_owned(),
            })?;
        payer.endpoint = Some(endpoint.trim().to_owned());
        payer.certificate_uploaded = true;
        let payer_id = payer.payer_id.clone();
        let actor = payer.adm_name.clone();

        let cert_type = [CertKind::Client, CertKind::Server]
            .into_iter()
            .find(|kind| directory.certificate(&payer_id, *kind).is_none())
            .unwrap_or(CertKind::Client);
        let now = self.clock.utc();
        let valid_until = now
            .checked_add_months(Months::new(CERTIFICATE_VALIDITY_MONTHS))
            .unwrap_or(now);
        directory
            .certificates
            .retain(|row| !(row.payer_id == payer_id && row.cert_type == cert_type));
        info!(%payer_id, %cert_type, fingerprint = %fingerprint(content), "certificate uploaded");
        directory.certificates.push(Certificate {
            payer_id,
            cert_type,
            certificate_verified: false,
            valid_from: now,
            valid_until,
            pem: content.to_owned(),
        });
        directory.record(now, actor, "Uploaded a certificate");
        Ok(cert_type)
    }

    /// Issue a fresh, unverified certificate of `cert_type`.
    pub fn issue(&self, email: &str, cert_type: CertKind, pem: String) -> Result<(), PortalError> {
        let mut directory = self.lock()?;
        let payer = directory.payer_by_email(email)?.clone();
        if directory.certificate(&payer.payer_id, cert_type).is_some() {
            return Err(PortalError::CertificateExists { cert_type });
        }
        let now = self.clock.utc();
        let valid_until = now
            .checked_add_months(Months::new(CERTIFICATE_VALIDITY_MONTHS))
            .unwrap_or(now);
        info!(payer_id = %payer.payer_id, %cert_type, fingerprint = %fingerprint(&pem), "certificate issued");
        directory.certificates.push(Certificate {
            payer_id: payer.payer_id,
            cert_type,
            certificate_verified: false,
            valid_from: now,
            valid_until,
            pem,
        });
        directory.record(now, payer.adm_name, format!("Issued a {cert_type} certificate"));
        Ok(())
    }

    /// Mark a payer's certificate verified.
    pub fn verify(&self, payer_id: &str, cert_type: CertKind) -> Result<(), PortalError> {
        let mut directory = self.lock()?;
        let actor = directory.payer_by_id(payer_id)?.adm_name.clone();
        let certificate = directory
            .certificates
            .iter_mut()
            .find(|certificate| certificate.payer_id == payer_id && certificate.cert_type == cert_type)
            .ok_or(PortalError::CertificateMissing { cert_type })?;
        certificate.certificate_verified = true;
        let now = self.clock.utc();
        directory.record(now, actor, format!("Verified the {cert_type} certificate"));
        Ok(())
    }

    /// One certificate for download.
    pub fn certificate(&self, payer_id: &str, cert_type: CertKind) -> Result<Certificate, PortalError> {
        let directory = self.lock()?;
        directory.payer_by_id(payer_id)?;
        directory
            .certificate(payer_id, cert_type)
            .cloned()
            .ok_or(PortalError::CertificateMissing { cert_type })
    }

    /// Connect `payer_id` to the payer administered by `target_email`.
    pub fn connect(
        &self,
        payer_id: &str,
        target_email: &str,
        mode: ConnectMode,
    ) -> Result<(), PortalError> {
        let mut directory = self.lock()?;
        let source = directory.payer_by_id(payer_id)?.clone();
        let target = directory.payer_by_email(target_email)?.clone();
        if source.payer_id == target.payer_id {
            return Err(PortalError::SelfConnect);
        }
        if directory.verified_count(&source.payer_id) < REQUIRED_VERIFIED_TYPES
            || directory.verified_count(&target.payer_id) < REQUIRED_VERIFIED_TYPES
        {
            return Err(PortalError::NotVerified);
        }
        let now = self.clock.utc();
        let description = match mode {
            ConnectMode::New => format!("Connected to {}", target.payer_name),
            ConnectMode::Existing => format!("Reconnected to {}", target.payer_name),
        };
        match directory
            .connections
            .iter_mut()
            .find(|connection| connection.payer_id == target.payer_id)
        {
            Some(existing) => existing.status = "active".to_owned(),
            None => directory.connections.push(Connection {
                payer_id: target.payer_id.clone(),
                payer_name: target.payer_name.clone(),
                status: "active".to_owned(),
                trust_framework: "basic".to_owned(),
                connected_on: now.date_naive(),
            }),
        }
        directory.record(now, source.adm_name, description);
        Ok(())
    }

    /// Consume an activation link. Returns false for unknown or used links.
    pub fn activate(&self, key: &str, act_id: &str) -> Result<bool, PortalError> {
        let mut directory = self.lock()?;
        let Some(activation) = directory
            .activations
            .iter_mut()
            .find(|activation| activation.key == key && activation.act_id == act_id && !activation.used)
        else {
            return Ok(false);
        };
        activation.used = true;
        Ok(true)
    }

    pub fn stats(&self) -> Result<Stats, PortalError> {
        let directory = self.lock()?;
        let count_status = |status: &str| {
            directory
                .connections
                .iter()
                .filter(|connection| connection.status == status)
                .count()
        };
        Ok(Stats {
            total_payers: directory.payers.len(),
            active_connections: count_status("active"),
            pending_requests: count_status("pending"),
            verified_certificates: directory
                .certificates
                .iter()
                .filter(|certificate| certificate.certificate_verified)
                .count(),
        })
    }

    pub fn connections(&self) -> Result<Vec<Connection>, PortalError> {
        Ok(self.lock()?.connections.clone())
    }

    /// Activity feed, newest first.
    pub fn activity(&self) -> Result<Vec<Activity>, PortalError> {
        let mut activity = self.lock()?.activity.clone();
        activity.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(activity)
    }
}

impl Directory {
    fn payer_by_email(&self, email: &str) -> Result<&Payer, PortalError> {
        self.payers
            .iter()
            .find(|payer| payer.adm_email.eq_ignore_ascii_case(email.trim()))
            .ok_or_else(|| PortalError::UnknownEmail {
                email: email.to_owned(),
            })
    }

    fn payer_by_id(&self, payer_id: &str) -> Result<&Payer, PortalError> {
        self.payers
            .iter()
            .find(|payer| payer.payer_id == payer_id)
            .ok_or_else(|| PortalError::UnknownPayer {
                payer_id: payer_id.to_owned(),
            })
    }

    fn certificate(&self, payer_id: &str, cert_type: CertKind) -> Option<&Certificate> {
        self.certificates
            .iter()
            .find(|certificate| certificate.payer_id == payer_id && certificate.cert_type == cert_type)
    }

    fn verified_count(&self, payer_id: &str) -> usize {
        [CertKind::Client, CertKind::Server]
            .into_iter()
            .filter(|cert_type| {
                self.certificate(payer_id, *cert_type)
                    .is_some_and(|certificate| certificate.certificate_verified)
            })
            .count()
    }

    fn record(&mut self, at: DateTime<Utc>, actor: String, description: impl Into<String>) {
        let id = self.activity.iter().map(|entry| entry.id).max().unwrap_or(0) + 1;
        self.activity.push(Activity {
            id,
            description: description.into(),
            actor,
            occurred_at: at,
        });
    }
}

fn require(field: &'static str, value: &str) -> Result<(), PortalError> {
    if value.trim().is_empty() {
        Err(PortalError::MissingField { field })
    } else {
        Ok(())
    }
}

/// SHA-256 hex of certificate text, safe to log.
pub fn fingerprint(content: &str) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(content.as_bytes()))
}
