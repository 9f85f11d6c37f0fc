//! Decoder for the portal's status-carrying response envelope.
//!
//! Every portal endpoint answers with HTTP 200 and a JSON body of the form
//! `{"status": <code>, "message": <payload or text>}` or
//! `{"status": <code>, "data": <payload>}`. The embedded status is the real
//! outcome, so the payload is only decoded after it reads 200.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Embedded status for a successful operation.
pub const STATUS_OK: u16 = 200;

const DEFAULT_REJECTION: &str = "request was not accepted";

/// Errors produced while decoding an envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// The body was not an envelope at all.
    #[error("malformed envelope: {message}")]
    Malformed {
        /// Parser diagnostic.
        message: String,
    },
    /// The envelope carried a non-200 status.
    #[error("rejected with status {status}: {message}")]
    Rejected {
        /// Embedded status code.
        status: u16,
        /// Text from the `message` field, or a generic description.
        message: String,
    },
    /// A 200 envelope lacked the payload field or it had the wrong shape.
    #[error("envelope payload `{field}` invalid: {message}")]
    Payload {
        /// Field that was expected to hold the payload.
        field: &'static str,
        /// Decoder diagnostic.
        message: String,
    },
}

/// Parsed but unvalidated envelope.
///
/// # Examples
/// ```
/// use portal_console::domain::envelope::{Envelope, EnvelopeError};
///
/// let ok = Envelope::from_slice(br#"{"status":200,"message":["a","b"]}"#).unwrap();
/// let rows: Vec<String> = ok.into_message().unwrap();
/// assert_eq!(rows, ["a", "b"]);
///
/// let rejected = Envelope::from_slice(br#"{"status":500,"message":"Invalid"}"#).unwrap();
/// assert!(matches!(
///     rejected.into_message::<Vec<String>>(),
///     Err(EnvelopeError::Rejected { status: 500, .. })
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    status: u16,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    endpoint: Option<String>,
}

impl Envelope {
    /// Parse an envelope from a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, EnvelopeError> {
        serde_json::from_slice(body).map_err(|error| EnvelopeError::Malformed {
            message: error.to_string(),
        })
    }

    /// Embedded status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Optional endpoint value some certificate responses carry.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Fail unless the embedded status is 200.
    pub fn ensure_ok(&self) -> Result<(), EnvelopeError> {
        if self.status == STATUS_OK {
            return Ok(());
        }
        let message = match &self.message {
            Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
            _ => self
                .data
                .as_ref()
                .and_then(|data| data.get("msg"))
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_REJECTION)
                .to_owned(),
        };
        Err(EnvelopeError::Rejected {
            status: self.status,
            message,
        })
    }

    /// Validate the status and decode the `message` payload.
    pub fn into_message<T: DeserializeOwned>(self) -> Result<T, EnvelopeError> {
        self.ensure_ok()?;
        decode_field("message", self.message)
    }

    /// Validate the status and decode the `data` payload.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, EnvelopeError> {
        self.ensure_ok()?;
        decode_field("data", self.data)
    }

    /// Validate the status and return the `message` text, if it is a string.
    pub fn into_message_text(self) -> Result<Option<String>, EnvelopeError> {
        self.ensure_ok()?;
        Ok(match self.message {
            Some(Value::String(text)) => Some(text),
            _ => None,
        })
    }
}

fn decode_field<T: DeserializeOwned>(
    field: &'static str,
    value: Option<Value>,
) -> Result<T, EnvelopeError> {
    let value = value.ok_or(EnvelopeError::Payload {
        field,
        message: "missing".to_owned(),
    })?;
    serde_json::from_value(value).map_err(|error| EnvelopeError::Payload {
        field,
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    //! Status validation happens before any payload decoding.
    use super::*;
    use rstest::rstest;

    fn parse(body: &str) -> Envelope {
        Envelope::from_slice(body.as_bytes()).expect("valid envelope")
    }

    #[test]
    fn non_ok_status_rejects_even_with_a_payload() {
        let envelope = parse(r#"{"status":403,"message":[{"payer_id":"P-1"}]}"#);
        assert_eq!(
            envelope.into_message::<Vec<Value>>(),
            Err(EnvelopeError::Rejected {
                status: 403,
                message: DEFAULT_REJECTION.to_owned(),
            })
        );
    }

    #[rstest]
    #[case(r#"{"status":500,"message":"Invalid credentials"}"#, "Invalid credentials")]
    #[case(r#"{"status":500,"data":{"status":"failed","msg":"Validation failed"}}"#, "Validation failed")]
    #[case(r#"{"status":500}"#, DEFAULT_REJECTION)]
    fn rejection_text_prefers_message_then_data_msg(#[case] body: &str, #[case] expected: &str) {
        match parse(body).ensure_ok() {
            Err(EnvelopeError::Rejected { message, .. }) => assert_eq!(message, expected),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn data_payload_decodes_after_status_check() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Reply {
            msg: String,
        }
        let reply: Reply = parse(r#"{"status":200,"data":{"msg":"ok"}}"#)
            .into_data()
            .expect("data decodes");
        assert_eq!(reply, Reply { msg: "ok".to_owned() });
    }

    #[test]
    fn missing_payload_is_reported_by_field() {
        let err = parse(r#"{"status":200}"#)
            .into_data::<Value>()
            .expect_err("missing data");
        assert!(matches!(err, EnvelopeError::Payload { field: "data", .. }));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            Envelope::from_slice(b"<html>"),
            Err(EnvelopeError::Malformed { .. })
        ));
    }

    #[test]
    fn endpoint_is_exposed_without_validation() {
        let envelope = parse(r#"{"status":200,"message":[],"endpoint":"https://p.test/fhir"}"#);
        assert_eq!(envelope.endpoint(), Some("https://p.test/fhir"));
    }
}
