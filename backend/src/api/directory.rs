//! Payer directory and certificate routes.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use super::envelope::{self, EnvelopeSchema};
use crate::fixtures::placeholder_pem;
use crate::state::{CertKind, Certificate, Payer, PortalError, PortalState};

/// Directory row as listed by `fetchAllPayers`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PayerRow {
    #[schema(example = "P-1001")]
    payer_id: String,
    payer_name: String,
    adm_name: String,
    adm_email: String,
    adm_phone: String,
    address1: String,
    address2: String,
    city: String,
    state: String,
    zip: String,
    certificate_uploaded: bool,
    certificate_verified: bool,
    /// Verified certificate types, 0 to 2.
    verified_count: usize,
}

impl PayerRow {
    fn new(payer: Payer, verified_count: usize) -> Self {
        Self {
            payer_id: payer.payer_id,
            payer_name: payer.payer_name,
            adm_name: payer.adm_name,
            adm_email: payer.adm_email,
            adm_phone: payer.adm_phone,
            address1: payer.address1,
            address2: payer.address2,
            city: payer.city,
            state: payer.state,
            zip: payer.zip,
            certificate_uploaded: payer.certificate_uploaded,
            certificate_verified: verified_count == 2,
            verified_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CertificateRow {
    payer_id: String,
    cert_type: CertKind,
    certificate_verified: bool,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
}

impl From<Certificate> for CertificateRow {
    fn from(value: Certificate) -> Self {
        Self {
            payer_id: value.payer_id,
            cert_type: value.cert_type,
            certificate_verified: value.certificate_verified,
            valid_from: value.valid_from,
            valid_until: value.valid_until,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailBody {
    #[schema(example = "ada@acme.test")]
    email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadBody {
    certcontent: String,
    #[serde(default)]
    user: String,
    email: String,
    endpoint: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateBody {
    email: String,
    cert_type: CertKind,
}

#[derive(Deserialize, ToSchema)]
pub struct SigningBody {
    private_key: String,
    csr: String,
    #[serde(default)]
    payer_id: String,
    email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PayerQuery {
    payer_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DownloadBody {
    payer_id: String,
    #[serde(default)]
    email: String,
    cert_type: CertKind,
}

/// Every registered payer with its verification progress.
#[utoipa::path(
    get,
    path = "/directory/fetchAllPayers",
    tags = ["directory"],
    responses((status = 200, description = "`message` holds `PayerRow` entries", body = EnvelopeSchema))
)]
#[get("/directory/fetchAllPayers")]
pub async fn fetch_all_payers(state: web::Data<PortalState>) -> HttpResponse {
    envelope::respond(state.payers(), |payers| {
        let rows: Vec<PayerRow> = payers
            .into_iter()
            .map(|(payer, count)| PayerRow::new(payer, count))
            .collect();
        envelope::message(rows)
    })
}

/// Certificates held by the caller's payer plus its registered endpoint.
#[utoipa::path(
    post,
    path = "/directory/fetchcertificatedetails",
    tags = ["directory"],
    request_body = EmailBody,
    responses((status = 200, description = "`message` holds `CertificateRow` entries", body = EnvelopeSchema))
)]
#[post("/directory/fetchcertificatedetails")]
pub async fn fetch_certificate_details(
    state: web::Data<PortalState>,
    body: web::Json<EmailBody>,
) -> HttpResponse {
    envelope::respond(state.certificates_for(&body.email), |(rows, endpoint)| {
        let rows: Vec<CertificateRow> = rows.into_iter().map(CertificateRow::from).collect();
        envelope::message_with_endpoint(rows, endpoint)
    })
}

#[utoipa::path(
    post,
    path = "/certificate/uploadcertificate",
    tags = ["certificates"],
    request_body = UploadBody,
    responses((status = 200, description = "Acknowledgement", body = EnvelopeSchema))
)]
#[post("/certificate/uploadcertificate")]
pub async fn upload_certificate(
    state: web::Data<PortalState>,
    body: web::Json<UploadBody>,
) -> HttpResponse {
    info!(user = %body.user, "certificate upload received");
    envelope::respond(
        state.upload(&body.email, &body.certcontent, &body.endpoint),
        |_| envelope::message("Certificate uploaded successfully"),
    )
}

/// Issue a certificate of the requested type for the caller's payer.
#[utoipa::path(
    post,
    path = "/directory/generatecertificate",
    tags = ["certificates"],
    request_body = GenerateBody,
    responses((status = 200, description = "Acknowledgement, or status 409 when one exists", body = EnvelopeSchema))
)]
#[post("/directory/generatecertificate")]
pub async fn generate_certificate(
    state: web::Data<PortalState>,
    body: web::Json<GenerateBody>,
) -> HttpResponse {
    let pem = placeholder_pem(&body.email, body.cert_type);
    envelope::respond(state.issue(&body.email, body.cert_type, pem), |()| {
        envelope::message(format!("{} certificate generated", body.cert_type))
    })
}

fn sign(state: &PortalState, cert_type: CertKind, body: SigningBody) -> HttpResponse {
    let checked = if body.private_key.trim().is_empty() {
        Err(PortalError::MissingField {
            field: "private_key",
        })
    } else if body.csr.trim().is_empty() {
        Err(PortalError::MissingField { field: "csr" })
    } else {
        Ok(())
    };
    let SigningBody {
        csr,
        payer_id,
        email,
        ..
    } = body;
    envelope::respond(
        checked.and_then(|()| state.issue(&email, cert_type, csr)),
        |()| {
            info!(%payer_id, %cert_type, "signing request accepted");
            envelope::message(format!("{cert_type} certificate request submitted"))
        },
    )
}

#[utoipa::path(
    post,
    path = "/directory/clientCertificate",
    tags = ["certificates"],
    request_body = SigningBody,
    responses((status = 200, description = "Acknowledgement", body = EnvelopeSchema))
)]
#[post("/directory/clientCertificate")]
pub async fn client_certificate(
    state: web::Data<PortalState>,
    body: web::Json<SigningBody>,
) -> HttpResponse {
    sign(&state, CertKind::Client, body.into_inner())
}

#[utoipa::path(
    post,
    path = "/directory/serverCertificate",
    tags = ["certificates"],
    request_body = SigningBody,
    responses((status = 200, description = "Acknowledgement", body = EnvelopeSchema))
)]
#[post("/directory/serverCertificate")]
pub async fn server_certificate(
    state: web::Data<PortalState>,
    body: web::Json<SigningBody>,
) -> HttpResponse {
    sign(&state, CertKind::Server, body.into_inner())
}

fn validate(state: &PortalState, cert_type: CertKind, payer_id: &str) -> HttpResponse {
    envelope::respond(state.verify(payer_id, cert_type), |()| {
        envelope::data(json!({
            "status": envelope::STATUS_OK,
            "msg": format!("{cert_type} certificate verified"),
        }))
    })
}

/// Verify the payer's client certificate; `data.msg` carries the outcome.
#[utoipa::path(
    get,
    path = "/directory/validateclient",
    tags = ["certificates"],
    params(PayerQuery),
    responses((status = 200, description = "`data` holds `{status, msg}`", body = EnvelopeSchema))
)]
#[get("/directory/validateclient")]
pub async fn validate_client(
    state: web::Data<PortalState>,
    query: web::Query<PayerQuery>,
) -> HttpResponse {
    validate(&state, CertKind::Client, &query.payer_id)
}

#[utoipa::path(
    get,
    path = "/directory/validateserver",
    tags = ["certificates"],
    params(PayerQuery),
    responses((status = 200, description = "`data` holds `{status, msg}`", body = EnvelopeSchema))
)]
#[get("/directory/validateserver")]
pub async fn validate_server(
    state: web::Data<PortalState>,
    query: web::Query<PayerQuery>,
) -> HttpResponse {
    validate(&state, CertKind::Server, &query.payer_id)
}

/// Certificate payload for saving on the administrator's machine.
#[utoipa::path(
    post,
    path = "/directory/downloadcertificate",
    tags = ["certificates"],
    request_body = DownloadBody,
    responses((status = 200, description = "`message` holds the certificate document", body = EnvelopeSchema))
)]
#[post("/directory/downloadcertificate")]
pub async fn download_certificate(
    state: web::Data<PortalState>,
    body: web::Json<DownloadBody>,
) -> HttpResponse {
    envelope::respond(state.certificate(&body.payer_id, body.cert_type), |cert| {
        info!(payer_id = %cert.payer_id, email = %body.email, "certificate downloaded");
        envelope::message(json!({
            "payer_id": cert.payer_id,
            "cert_type": cert.cert_type,
            "valid_from": cert.valid_from,
            "valid_until": cert.valid_until,
            "certificate": cert.pem,
        }))
    })
}
