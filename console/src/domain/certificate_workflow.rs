//! Certificate management view: upload, generate, verify and download.
//!
//! The workflow holds the signed-in payer's certificate rows and one state
//! machine per action. Each action either refuses up front (the control is
//! disabled) or sends exactly one request, then re-fetches the rows so the
//! table reflects what the portal now holds.

use tracing::{debug, info, warn};
use url::Url;
use zeroize::Zeroizing;

use super::certificate::{
    CertType, CertificateDetails, CertificateRecord, VerificationSummary, certificate_fingerprint,
};
use super::context::ConsoleContext;
use super::generation::{GenerationToken, RefreshOutcome, RequestGeneration};
use super::guard::{Navigation, NavigationGuard};
use super::ports::{
    CertificateSigningRequest, DownloadRequest, GenerateRequest, PortalApiError, UploadRequest,
};
use super::session::Session;
use super::status::{StatusBoard, StatusTone};
use super::validation::{FieldErrorCode, FieldErrors, FieldName};

/// Certificate file input.
pub const CERTIFICATE_FIELD: FieldName = FieldName::new("certificate");
/// Endpoint URL input.
pub const ENDPOINT_FIELD: FieldName = FieldName::new("endpoint");
/// Private key input of the signing form.
pub const PRIVATE_KEY_FIELD: FieldName = FieldName::new("private_key");
/// CSR input of the signing form.
pub const CSR_FIELD: FieldName = FieldName::new("csr");

/// Status shown after a successful upload.
pub const UPLOAD_SUCCESS: &str = "Certificate uploaded successfully";
/// Status shown after a successful generation.
pub const GENERATE_SUCCESS: &str = "Certificate generated successfully";
/// Status shown after a signing request is accepted.
pub const SIGNING_REQUEST_SUCCESS: &str = "Certificate request submitted successfully";

/// Upload progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    Uploaded,
    Failed,
}

/// Generation progress for one certificate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerateState {
    #[default]
    Idle,
    Generating,
    Generated,
    Failed,
}

/// Verification progress for one certificate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyState {
    #[default]
    Idle,
    VerifyPending,
    Verified,
    VerifyFailed,
}

/// One value per certificate type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PerType<T> {
    client: T,
    server: T,
}

impl<T: Copy> PerType<T> {
    fn get(&self, cert_type: CertType) -> T {
        match cert_type {
            CertType::Client => self.client,
            CertType::Server => self.server,
        }
    }

    fn set(&mut self, cert_type: CertType, value: T) {
        match cert_type {
            CertType::Client => self.client = value,
            CertType::Server => self.server = value,
        }
    }
}

/// What happened when a control was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The control is disabled in the current state; nothing was sent.
    Disabled,
    /// A previous request of this kind is still running.
    InFlight,
    /// Form validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// The portal accepted the request; carries the status text.
    Succeeded(String),
    /// The request failed; carries the status text.
    Failed(String),
}

/// Upload form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    /// Chosen certificate file contents.
    pub certificate: Option<String>,
    /// Endpoint URL the certificate protects.
    pub endpoint_url: String,
}

impl UploadForm {
    /// Every failing field.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if self.certificate.as_deref().is_none_or(|content| content.trim().is_empty()) {
            errors.push(
                CERTIFICATE_FIELD,
                FieldErrorCode::MissingField,
                "Certificate file is required",
            );
        }
        let endpoint = self.endpoint_url.trim();
        if endpoint.is_empty() {
            errors.push(ENDPOINT_FIELD, FieldErrorCode::MissingField, "Endpoint URL is required");
        } else if Url::parse(endpoint).is_err() {
            errors.push(
                ENDPOINT_FIELD,
                FieldErrorCode::InvalidUrl,
                "Endpoint URL must be a valid URL",
            );
        }
        errors
    }
}

/// Private key and CSR pasted into the signing form.
#[derive(Clone, Default)]
pub struct SigningForm {
    /// PEM private key.
    pub private_key: Zeroizing<String>,
    /// PEM certificate signing request.
    pub csr: String,
}

impl SigningForm {
    /// Every failing field.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if self.private_key.trim().is_empty() {
            errors.push(PRIVATE_KEY_FIELD, FieldErrorCode::MissingField, "Private key is required");
        }
        if self.csr.trim().is_empty() {
            errors.push(CSR_FIELD, FieldErrorCode::MissingField, "CSR is required");
        }
        errors
    }
}

impl std::fmt::Debug for SigningForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningForm")
            .field("csr_len", &self.csr.len())
            .finish_non_exhaustive()
    }
}

/// Certificate management view state.
pub struct CertificateWorkflow {
    context: ConsoleContext,
    session: Session,
    details: CertificateDetails,
    generation: RequestGeneration,
    upload: UploadState,
    generate: PerType<GenerateState>,
    verify: PerType<VerifyState>,
    status: StatusBoard,
}

impl CertificateWorkflow {
    /// Build the view if a session exists. Rows are empty until
    /// [`Self::refresh`] runs.
    pub fn open(context: ConsoleContext) -> Navigation<Self> {
        let sessions = context.sessions.clone();
        NavigationGuard::enter(sessions.as_ref(), |session| {
            let status =
                StatusBoard::new(context.clock.clone(), context.options.status_clear_after);
            Self {
                context,
                session,
                details: CertificateDetails::default(),
                generation: RequestGeneration::default(),
                upload: UploadState::default(),
                generate: PerType::default(),
                verify: PerType::default(),
                status,
            }
        })
    }

    /// Signed-in administrator.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Rows in portal order.
    pub fn records(&self) -> &[CertificateRecord] {
        &self.details.records
    }

    /// Row of one type, if present.
    pub fn record(&self, cert_type: CertType) -> Option<&CertificateRecord> {
        self.details
            .records
            .iter()
            .find(|record| record.cert_type == cert_type)
    }

    /// Endpoint registered with the last upload, used to prefill the form.
    pub fn endpoint(&self) -> Option<&str> {
        self.details.endpoint.as_deref()
    }

    /// Verification summary over the current rows.
    pub fn summary(&self) -> VerificationSummary {
        VerificationSummary::from_records(&self.details.records)
    }

    /// Status line.
    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Upload progress.
    pub fn upload_state(&self) -> UploadState {
        self.upload
    }

    /// Generation progress for `cert_type`.
    pub fn generate_state(&self, cert_type: CertType) -> GenerateState {
        self.generate.get(cert_type)
    }

    /// Verification progress for `cert_type`.
    pub fn verify_state(&self, cert_type: CertType) -> VerifyState {
        self.verify.get(cert_type)
    }

    /// Upload submit is disabled while an upload is running.
    pub fn is_upload_disabled(&self) -> bool {
        self.upload == UploadState::Uploading
    }

    /// Generate (and CSR submit) is offered only while no row of that type
    /// exists.
    pub fn can_generate(&self, cert_type: CertType) -> bool {
        self.record(cert_type).is_none()
            && self.generate.get(cert_type) != GenerateState::Generating
    }

    /// Verify is offered only for an existing, unverified row.
    pub fn can_verify(&self, cert_type: CertType) -> bool {
        self.record(cert_type)
            .is_some_and(|record| !record.certificate_verified)
            && self.verify.get(cert_type) != VerifyState::VerifyPending
    }

    /// Start a row fetch, superseding any fetch still in flight.
    pub fn begin_refresh(&mut self) -> GenerationToken {
        self.generation.begin()
    }

    /// Apply a fetch result if `token` is still current.
    pub fn apply_refresh(
        &mut self,
        token: GenerationToken,
        result: Result<CertificateDetails, PortalApiError>,
    ) -> RefreshOutcome {
        if !self.generation.is_current(token) {
            debug!("discarding superseded certificate fetch");
            return RefreshOutcome::Stale;
        }
        match result {
            Ok(details) => {
                self.details = details;
                RefreshOutcome::Applied
            }
            Err(error) => {
                warn!(error = %error, kind = error.kind(), "certificate fetch failed; keeping previous rows");
                self.status.show(
                    StatusTone::Error,
                    format!("Could not load certificates: {error}"),
                );
                RefreshOutcome::Failed
            }
        }
    }

    /// Re-read the session and fetch rows for its email.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        let Some(email) = self.current_email() else {
            debug!("no signed-in email; skipping certificate fetch");
            return RefreshOutcome::Skipped;
        };
        let token = self.begin_refresh();
        let result = self.context.api.fetch_certificate_details(&email).await;
        self.apply_refresh(token, result)
    }

    fn current_email(&self) -> Option<String> {
        match self.context.sessions.get() {
            Ok(session) => session.map(|session| session.email().to_owned()),
            Err(error) => {
                warn!(error = %error, "session store unreadable");
                None
            }
        }
    }

    /// Validate the upload form and mark an upload as running.
    ///
    /// Returns the request to send, or the outcome that stops it.
    pub fn begin_upload(&mut self, form: &UploadForm) -> Result<UploadRequest, ActionOutcome> {
        if self.is_upload_disabled() {
            return Err(ActionOutcome::InFlight);
        }
        let errors = form.validate();
        let Some(content) = form.certificate.as_ref().filter(|_| errors.is_empty()) else {
            return Err(ActionOutcome::Invalid(errors));
        };
        self.upload = UploadState::Uploading;
        Ok(UploadRequest {
            certificate_content: content.clone(),
            user: self.session.display_name().to_owned(),
            email: self.session.email().to_owned(),
            endpoint: form.endpoint_url.trim().to_owned(),
        })
    }

    /// Record an upload result, re-fetch and set the transient status.
    pub async fn finish_upload(&mut self, result: Result<(), PortalApiError>) -> ActionOutcome {
        let (state, tone, text) = match result {
            Ok(()) => (UploadState::Uploaded, StatusTone::Success, UPLOAD_SUCCESS.to_owned()),
            Err(error) => {
                warn!(error = %error, "certificate upload failed");
                (UploadState::Failed, StatusTone::Error, error.to_string())
            }
        };
        self.upload = state;
        self.refresh().await;
        self.status.flash(tone, text.clone());
        match state {
            UploadState::Uploaded => ActionOutcome::Succeeded(text),
            _ => ActionOutcome::Failed(text),
        }
    }

    /// Upload a certificate file for an endpoint.
    pub async fn upload(&mut self, form: &UploadForm) -> ActionOutcome {
        let request = match self.begin_upload(form) {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        info!(
            fingerprint = %certificate_fingerprint(&request.certificate_content),
            endpoint = %request.endpoint,
            "uploading certificate"
        );
        let result = self.context.api.upload_certificate(&request).await;
        self.finish_upload(result).await
    }

    /// Ask the portal to generate a certificate of `cert_type`.
    pub async fn generate(&mut self, cert_type: CertType) -> ActionOutcome {
        if !self.can_generate(cert_type) {
            return ActionOutcome::Disabled;
        }
        self.generate.set(cert_type, GenerateState::Generating);
        let request = GenerateRequest {
            email: self.session.email().to_owned(),
            cert_type,
        };
        let result = self.context.api.generate_certificate(&request).await;
        self.complete_issuance(cert_type, result, GENERATE_SUCCESS).await
    }

    /// Submit a private key and CSR for `cert_type`.
    pub async fn submit_certificate_request(
        &mut self,
        cert_type: CertType,
        form: &SigningForm,
    ) -> ActionOutcome {
        if !self.can_generate(cert_type) {
            return ActionOutcome::Disabled;
        }
        let errors = form.validate();
        if !errors.is_empty() {
            return ActionOutcome::Invalid(errors);
        }
        self.generate.set(cert_type, GenerateState::Generating);
        let request = CertificateSigningRequest {
            cert_type,
            private_key: form.private_key.clone(),
            csr: form.csr.trim().to_owned(),
            payer_id: self.session.payer_id().clone(),
            email: self.session.email().to_owned(),
        };
        info!(
            cert_type = %cert_type,
            csr_fingerprint = %certificate_fingerprint(&request.csr),
            "submitting certificate signing request"
        );
        let result = self.context.api.submit_certificate_request(&request).await;
        self.complete_issuance(cert_type, result, SIGNING_REQUEST_SUCCESS).await
    }

    async fn complete_issuance(
        &mut self,
        cert_type: CertType,
        result: Result<(), PortalApiError>,
        success: &str,
    ) -> ActionOutcome {
        match result {
            Ok(()) => {
                self.generate.set(cert_type, GenerateState::Generated);
                self.refresh().await;
                self.status.flash(StatusTone::Success, success);
                ActionOutcome::Succeeded(success.to_owned())
            }
            Err(error) => {
                warn!(error = %error, cert_type = %cert_type, "certificate issuance failed");
                self.generate.set(cert_type, GenerateState::Failed);
                let text = error.to_string();
                self.status.show(StatusTone::Error, text.clone());
                ActionOutcome::Failed(text)
            }
        }
    }

    /// Ask the portal to verify the row of `cert_type`.
    pub async fn verify(&mut self, cert_type: CertType) -> ActionOutcome {
        if !self.can_verify(cert_type) {
            return ActionOutcome::Disabled;
        }
        self.verify.set(cert_type, VerifyState::VerifyPending);
        let result = self
            .context
            .api
            .verify_certificate(self.session.payer_id(), cert_type)
            .await;
        match result {
            Ok(reply) => {
                let (state, tone) = if reply.passed {
                    (VerifyState::Verified, StatusTone::Success)
                } else {
                    (VerifyState::VerifyFailed, StatusTone::Error)
                };
                self.verify.set(cert_type, state);
                self.refresh().await;
                self.status.flash(tone, reply.message.clone());
                if reply.passed {
                    ActionOutcome::Succeeded(reply.message)
                } else {
                    ActionOutcome::Failed(reply.message)
                }
            }
            Err(error) => {
                warn!(error = %error, cert_type = %cert_type, "certificate verification failed");
                self.verify.set(cert_type, VerifyState::VerifyFailed);
                if error.received_response() {
                    self.refresh().await;
                }
                let text = error.to_string();
                self.status.show(StatusTone::Error, text.clone());
                ActionOutcome::Failed(text)
            }
        }
    }

    /// File name a downloaded certificate is saved under.
    pub fn download_file_name(&self, cert_type: CertType) -> String {
        format!("{}_{cert_type}_certificate.json", self.session.payer_id())
    }

    /// Fetch the row's JSON payload and save it pretty-printed.
    pub async fn download(&mut self, cert_type: CertType) -> ActionOutcome {
        if self.record(cert_type).is_none() {
            return ActionOutcome::Disabled;
        }
        let request = DownloadRequest {
            payer_id: self.session.payer_id().clone(),
            email: self.session.email().to_owned(),
            cert_type,
        };
        let saved = match self.context.api.download_certificate(&request).await {
            Ok(payload) => serde_json::to_string_pretty(&payload)
                .map_err(|error| format!("certificate payload could not be encoded: {error}"))
                .and_then(|pretty| {
                    self.context
                        .downloads
                        .save(&self.download_file_name(cert_type), pretty.as_bytes())
                        .map_err(|error| error.to_string())
                }),
            Err(error) => Err(error.to_string()),
        };
        match saved {
            Ok(location) => {
                info!(cert_type = %cert_type, location = %location, "certificate downloaded");
                let text = format!("Saved {location}");
                self.status.flash(StatusTone::Success, text.clone());
                ActionOutcome::Succeeded(text)
            }
            Err(text) => {
                warn!(error = %text, cert_type = %cert_type, "certificate download failed");
                self.status.show(StatusTone::Error, text.clone());
                ActionOutcome::Failed(text)
            }
        }
    }
}
