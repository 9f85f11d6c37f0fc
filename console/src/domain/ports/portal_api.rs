//! Driven port for the payer portal's HTTP API.
//!
//! The domain owns request and response shapes so views stay independent of
//! transport. Adapters validate the embedded envelope status before handing
//! anything back, which means every `Ok` here is a confirmed success.

use std::fmt;

use async_trait::async_trait;
use zeroize::Zeroizing;

use super::define_port_error;
use crate::domain::auth::LoginCredentials;
use crate::domain::certificate::{CertType, CertificateDetails};
use crate::domain::dashboard::{ActivityEntry, ConnectionEntry, DashboardStats};
use crate::domain::payer::{PayerId, PayerRecord};

/// Identity returned by a successful login, before session validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginIdentity {
    /// `adm_name`.
    pub display_name: String,
    /// `adm_email`.
    pub email: String,
    /// `payer_id`.
    pub payer_id: String,
}

/// Certificate upload payload; the content is forwarded verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Certificate file text.
    pub certificate_content: String,
    /// Administrator display name.
    pub user: String,
    /// Administrator email.
    pub email: String,
    /// Endpoint URL the certificate protects.
    pub endpoint: String,
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("certificate_content", &"<redacted>")
            .field("user", &self.user)
            .field("email", &self.email)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Request for the portal to generate a certificate of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Administrator email identifying the payer.
    pub email: String,
    /// Type to generate.
    pub cert_type: CertType,
}

/// Key material submitted for signing.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateSigningRequest {
    /// Type being requested.
    pub cert_type: CertType,
    /// PEM private key; zeroed on drop.
    pub private_key: Zeroizing<String>,
    /// PEM certificate signing request.
    pub csr: String,
    /// Requesting payer.
    pub payer_id: PayerId,
    /// Administrator email.
    pub email: String,
}

impl fmt::Debug for CertificateSigningRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateSigningRequest")
            .field("cert_type", &self.cert_type)
            .field("private_key", &"<redacted>")
            .field("payer_id", &self.payer_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Outcome of a verification call that reached the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReply {
    /// Whether the portal accepted the certificate.
    pub passed: bool,
    /// `data.msg`, shown verbatim as the status.
    pub message: String,
}

/// Request for a certificate's JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Owning payer.
    pub payer_id: PayerId,
    /// Administrator email.
    pub email: String,
    /// Type to download.
    pub cert_type: CertType,
}

/// Connection flavour offered for a directory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectKind {
    /// First connection between the payers (`nconnectpayer`).
    New,
    /// Re-establish a previous connection (`oconnectpayer`).
    Existing,
}

/// Payer connection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// New or existing connection.
    pub kind: ConnectKind,
    /// Requesting payer.
    pub payer_id: PayerId,
    /// Administrator email of the payer to connect to.
    pub target_email: String,
}

define_port_error! {
    /// Errors surfaced while calling the portal.
    pub enum PortalApiError {
        /// The request never produced a response.
        Transport { message: String } =>
            "portal transport failed: {message}",
        /// The request exceeded the client timeout.
        Timeout { message: String } =>
            "portal request timed out: {message}",
        /// The portal answered with a non-success HTTP status.
        Status { status: u16, message: String } =>
            "portal returned HTTP {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "portal response could not be decoded: {message}",
        /// The envelope carried a non-200 embedded status.
        Rejected { status: u16, message: String } => "{message}",
    }
}

impl PortalApiError {
    /// Whether the portal answered at all; callers re-fetch after any answer.
    pub fn received_response(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::Decode { .. } | Self::Rejected { .. }
        )
    }
}

/// Port for every portal operation the console performs.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Check credentials and return the administrator identity.
    async fn validate_login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<LoginIdentity, PortalApiError>;

    /// Fetch the whole payer directory.
    async fn fetch_all_payers(&self) -> Result<Vec<PayerRecord>, PortalApiError>;

    /// Fetch certificate rows for the administrator's payer.
    async fn fetch_certificate_details(
        &self,
        email: &str,
    ) -> Result<CertificateDetails, PortalApiError>;

    /// Upload an externally issued certificate.
    async fn upload_certificate(&self, request: &UploadRequest) -> Result<(), PortalApiError>;

    /// Ask the portal to generate a certificate.
    async fn generate_certificate(&self, request: &GenerateRequest) -> Result<(), PortalApiError>;

    /// Submit a private key and CSR for signing.
    async fn submit_certificate_request(
        &self,
        request: &CertificateSigningRequest,
    ) -> Result<(), PortalApiError>;

    /// Ask the portal to verify one certificate.
    async fn verify_certificate(
        &self,
        payer_id: &PayerId,
        cert_type: CertType,
    ) -> Result<VerificationReply, PortalApiError>;

    /// Fetch a certificate's JSON payload for download.
    async fn download_certificate(
        &self,
        request: &DownloadRequest,
    ) -> Result<serde_json::Value, PortalApiError>;

    /// Connect to another payer.
    async fn connect_payer(&self, request: &ConnectRequest) -> Result<(), PortalApiError>;

    /// Confirm an activation link; returns the portal's message.
    async fn verify_activation(&self, key: &str, act_id: &str) -> Result<String, PortalApiError>;

    /// Headline dashboard counters.
    async fn dashboard_stats(&self) -> Result<DashboardStats, PortalApiError>;

    /// Established connections.
    async fn connection_list(&self) -> Result<Vec<ConnectionEntry>, PortalApiError>;

    /// Recent activity feed.
    async fn activity_list(&self) -> Result<Vec<ActivityEntry>, PortalApiError>;
}
