//! Reqwest-backed portal adapter.
//!
//! This adapter owns transport details only: request encoding, timeout and
//! HTTP error mapping, and envelope decoding into domain records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::dto::{
    ActivationDto, CertificateDto, DownloadBody, EmailBody, GenerateBody, LoginIdentityDto,
    PayerDto, SigningBody, UploadBody, VerifyDataDto,
};
use crate::domain::auth::LoginCredentials;
use crate::domain::certificate::{CertType, CertificateDetails};
use crate::domain::dashboard::{ActivityEntry, ConnectionEntry, DashboardStats};
use crate::domain::envelope::{Envelope, EnvelopeError};
use crate::domain::payer::{PayerId, PayerRecord};
use crate::domain::ports::{
    CertificateSigningRequest, ConnectKind, ConnectRequest, DownloadRequest, GenerateRequest,
    LoginIdentity, PortalApi, PortalApiError, UploadRequest, VerificationReply,
};

const USER_AGENT: &str = concat!("portal-console/", env!("CARGO_PKG_VERSION"));
const TRACE_ID_HEADER: &str = "trace-id";

/// Portal adapter issuing requests relative to one base URL.
pub struct HttpPortalApi {
    client: Client,
    base_url: Url,
}

impl HttpPortalApi {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    /// Base URL every path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, PortalApiError> {
        self.base_url
            .join(path)
            .map_err(|error| PortalApiError::transport(format!("invalid portal path {path}: {error}")))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, PortalApiError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if let Some(trace_id) = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            debug!(trace_id, status = status.as_u16(), url = %response.url(), "portal responded");
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    async fn envelope(&self, request: RequestBuilder) -> Result<Envelope, PortalApiError> {
        let body = self.send(request).await?;
        Envelope::from_slice(&body).map_err(map_envelope_error)
    }

    async fn acknowledge(&self, request: RequestBuilder) -> Result<(), PortalApiError> {
        let text = self
            .envelope(request)
            .await?
            .into_message_text()
            .map_err(map_envelope_error)?;
        if let Some(text) = text {
            debug!(%text, "portal acknowledged");
        }
        Ok(())
    }

    async fn plain_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PortalApiError> {
        let body = self.send(self.client.get(self.url(path)?)).await?;
        serde_json::from_slice(&body)
            .map_err(|error| PortalApiError::decode(format!("invalid JSON from {path}: {error}")))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn verify_path(cert_type: CertType) -> &'static str {
    match cert_type {
        CertType::Client => "directory/validateclient",
        CertType::Server => "directory/validateserver",
    }
}

fn signing_path(cert_type: CertType) -> &'static str {
    match cert_type {
        CertType::Client => "directory/clientCertificate",
        CertType::Server => "directory/serverCertificate",
    }
}

fn connect_path(kind: ConnectKind) -> &'static str {
    match kind {
        ConnectKind::New => "discovery/nconnectpayer",
        ConnectKind::Existing => "discovery/oconnectpayer",
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn validate_login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<LoginIdentity, PortalApiError> {
        let request = self.client.post(self.url("validatelogin")?).form(&[
            ("username", credentials.username()),
            ("password", credentials.password()),
        ]);
        let identity: LoginIdentityDto = self
            .envelope(request)
            .await?
            .into_message()
            .map_err(map_envelope_error)?;
        Ok(identity.into())
    }

    async fn fetch_all_payers(&self) -> Result<Vec<PayerRecord>, PortalApiError> {
        let request = self.client.get(self.url("directory/fetchAllPayers")?);
        let rows: Vec<PayerDto> = self
            .envelope(request)
            .await?
            .into_message()
            .map_err(map_envelope_error)?;
        rows.into_iter()
            .map(PayerDto::into_domain)
            .collect::<Result<_, _>>()
            .map_err(PortalApiError::decode)
    }

    async fn fetch_certificate_details(
        &self,
        email: &str,
    ) -> Result<CertificateDetails, PortalApiError> {
        let request = self
            .client
            .post(self.url("directory/fetchcertificatedetails")?)
            .json(&EmailBody { email });
        let envelope = self.envelope(request).await?;
        let endpoint = envelope
            .endpoint()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
            .map(str::to_owned);
        let rows: Vec<CertificateDto> = envelope.into_message().map_err(map_envelope_error)?;
        let records = rows
            .into_iter()
            .map(CertificateDto::into_domain)
            .collect::<Result<_, _>>()
            .map_err(PortalApiError::decode)?;
        Ok(CertificateDetails { records, endpoint })
    }

    async fn upload_certificate(&self, request: &UploadRequest) -> Result<(), PortalApiError> {
        let body = UploadBody {
            certcontent: &request.certificate_content,
            user: &request.user,
            email: &request.email,
            endpoint: &request.endpoint,
        };
        let request = self
            .client
            .post(self.url("certificate/uploadcertificate")?)
            .json(&body);
        self.acknowledge(request).await
    }

    async fn generate_certificate(&self, request: &GenerateRequest) -> Result<(), PortalApiError> {
        let body = GenerateBody {
            email: &request.email,
            cert_type: request.cert_type,
        };
        let request = self
            .client
            .post(self.url("directory/generatecertificate")?)
            .json(&body);
        self.acknowledge(request).await
    }

    async fn submit_certificate_request(
        &self,
        request: &CertificateSigningRequest,
    ) -> Result<(), PortalApiError> {
        let body = SigningBody {
            private_key: request.private_key.as_str(),
            csr: &request.csr,
            payer_id: request.payer_id.as_ref(),
            email: &request.email,
        };
        let request = self
            .client
            .post(self.url(signing_path(request.cert_type))?)
            .json(&body);
        self.acknowledge(request).await
    }

    async fn verify_certificate(
        &self,
        payer_id: &PayerId,
        cert_type: CertType,
    ) -> Result<VerificationReply, PortalApiError> {
        let request = self
            .client
            .get(self.url(verify_path(cert_type))?)
            .query(&[("payer_id", payer_id.as_ref())]);
        let data: VerifyDataDto = self
            .envelope(request)
            .await?
            .into_data()
            .map_err(map_envelope_error)?;
        Ok(data.into())
    }

    async fn download_certificate(
        &self,
        request: &DownloadRequest,
    ) -> Result<Value, PortalApiError> {
        let body = DownloadBody {
            payer_id: request.payer_id.as_ref(),
            email: &request.email,
            cert_type: request.cert_type,
        };
        let request = self
            .client
            .post(self.url("directory/downloadcertificate")?)
            .json(&body);
        self.envelope(request)
            .await?
            .into_message()
            .map_err(map_envelope_error)
    }

    async fn connect_payer(&self, request: &ConnectRequest) -> Result<(), PortalApiError> {
        let request = self
            .client
            .get(self.url(connect_path(request.kind))?)
            .query(&[
                ("payer_id", request.payer_id.as_ref()),
                ("email", request.target_email.as_str()),
            ]);
        self.acknowledge(request).await
    }

    async fn verify_activation(&self, key: &str, act_id: &str) -> Result<String, PortalApiError> {
        let request = self
            .client
            .get(self.url("verify/verify")?)
            .query(&[("key", key), ("actId", act_id)]);
        let body = self.send(request).await?;
        let reply: ActivationDto = serde_json::from_slice(&body).map_err(|error| {
            PortalApiError::decode(format!("invalid activation response: {error}"))
        })?;
        Ok(reply.message)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, PortalApiError> {
        self.plain_json("api/dashboard-stats").await
    }

    async fn connection_list(&self) -> Result<Vec<ConnectionEntry>, PortalApiError> {
        self.plain_json("api/connection-list").await
    }

    async fn activity_list(&self) -> Result<Vec<ActivityEntry>, PortalApiError> {
        self.plain_json("api/activity-list").await
    }
}

fn map_envelope_error(error: EnvelopeError) -> PortalApiError {
    match error {
        EnvelopeError::Rejected { status, message } => PortalApiError::rejected(status, message),
        EnvelopeError::Malformed { .. } | EnvelopeError::Payload { .. } => {
            PortalApiError::decode(error.to_string())
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> PortalApiError {
    if error.is_timeout() {
        PortalApiError::timeout(error.to_string())
    } else {
        PortalApiError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PortalApiError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PortalApiError::timeout(format!("status {}", status.as_u16()))
        }
        _ => PortalApiError::status(status.as_u16(), body_preview(body)),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests;
