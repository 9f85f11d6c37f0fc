//! Wire DTOs for portal request bodies and envelope payloads.
//!
//! Responses decode into these DTOs first, then map into domain records in
//! one pass so field renames stay at the edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::certificate::{CertType, CertificateRecord};
use crate::domain::payer::{PayerId, PayerRecord};
use crate::domain::ports::{LoginIdentity, VerificationReply};

/// Identifier the portal may send as either a string or a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum IdDto {
    Text(String),
    Number(i64),
}

impl IdDto {
    fn into_payer_id(self) -> Result<PayerId, String> {
        let raw = match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        };
        PayerId::new(&raw).map_err(|error| format!("invalid payer id '{raw}': {error}"))
    }

    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginIdentityDto {
    #[serde(default)]
    adm_name: String,
    #[serde(default)]
    adm_email: String,
    payer_id: IdDto,
}

impl From<LoginIdentityDto> for LoginIdentity {
    fn from(value: LoginIdentityDto) -> Self {
        Self {
            display_name: value.adm_name,
            email: value.adm_email,
            payer_id: value.payer_id.into_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PayerDto {
    payer_id: IdDto,
    #[serde(default)]
    payer_name: String,
    #[serde(default)]
    adm_name: String,
    #[serde(default)]
    adm_email: String,
    #[serde(default)]
    adm_phone: String,
    #[serde(default)]
    address1: String,
    #[serde(default)]
    address2: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    zip: String,
    #[serde(default)]
    certificate_uploaded: bool,
    #[serde(default)]
    certificate_verified: bool,
    #[serde(default)]
    verified_count: u32,
}

impl PayerDto {
    pub(super) fn into_domain(self) -> Result<PayerRecord, String> {
        Ok(PayerRecord {
            payer_id: self.payer_id.into_payer_id()?,
            payer_name: self.payer_name,
            admin_name: self.adm_name,
            admin_email: self.adm_email,
            admin_phone: self.adm_phone,
            address_line1: self.address1,
            address_line2: self.address2,
            city: self.city,
            state: self.state,
            zip: self.zip,
            certificate_uploaded: self.certificate_uploaded,
            certificate_verified: self.certificate_verified,
            verified_count: self.verified_count,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CertificateDto {
    payer_id: IdDto,
    cert_type: CertType,
    #[serde(default)]
    certificate_verified: bool,
    #[serde(default)]
    valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    valid_until: Option<DateTime<Utc>>,
}

impl CertificateDto {
    pub(super) fn into_domain(self) -> Result<CertificateRecord, String> {
        Ok(CertificateRecord {
            payer_id: self.payer_id.into_payer_id()?,
            cert_type: self.cert_type,
            certificate_verified: self.certificate_verified,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
        })
    }
}

/// `data` payload of a verification envelope.
#[derive(Debug, Deserialize)]
pub(super) struct VerifyDataDto {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    msg: String,
}

impl From<VerifyDataDto> for VerificationReply {
    fn from(value: VerifyDataDto) -> Self {
        Self {
            passed: verify_status_passed(&value.status),
            message: value.msg,
        }
    }
}

/// Only the numeric code 200 counts as a pass.
fn verify_status_passed(status: &Value) -> bool {
    status.as_u64() == Some(200)
}

#[derive(Debug, Deserialize)]
pub(super) struct ActivationDto {
    #[serde(default)]
    pub(super) message: String,
}

#[derive(Debug, Serialize)]
pub(super) struct EmailBody<'a> {
    pub(super) email: &'a str,
}

#[derive(Serialize)]
pub(super) struct UploadBody<'a> {
    pub(super) certcontent: &'a str,
    pub(super) user: &'a str,
    pub(super) email: &'a str,
    pub(super) endpoint: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerateBody<'a> {
    pub(super) email: &'a str,
    pub(super) cert_type: CertType,
}

#[derive(Serialize)]
pub(super) struct SigningBody<'a> {
    pub(super) private_key: &'a str,
    pub(super) csr: &'a str,
    pub(super) payer_id: &'a str,
    pub(super) email: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct DownloadBody<'a> {
    pub(super) payer_id: &'a str,
    pub(super) email: &'a str,
    pub(super) cert_type: CertType,
}

#[cfg(test)]
mod tests {
    //! DTO mapping edge cases.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn payer_ids_may_be_numeric() {
        let dto: PayerDto =
            serde_json::from_value(json!({ "payer_id": 1001, "payer_name": "Acme" })).expect("dto");
        let payer = dto.into_domain().expect("domain");
        assert_eq!(payer.payer_id.as_ref(), "1001");
        assert_eq!(payer.verified_count, 0);
    }

    #[test]
    fn blank_payer_ids_are_rejected() {
        let dto: CertificateDto =
            serde_json::from_value(json!({ "payer_id": " ", "cert_type": "client" })).expect("dto");
        assert!(dto.into_domain().is_err());
    }

    #[rstest]
    #[case(json!(200), true)]
    #[case(json!(500), false)]
    #[case(json!("200"), false)]
    #[case(json!("success"), false)]
    #[case(json!(true), false)]
    #[case(json!(null), false)]
    fn verification_status_forms(#[case] status: Value, #[case] expected: bool) {
        assert_eq!(verify_status_passed(&status), expected);
    }
}
