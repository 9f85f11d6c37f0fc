//! The portal's status-carrying response body.
//!
//! Every portal route answers HTTP 200. Success carries `status: 200` and a
//! `message` (or `data`) payload; failure carries the real status code and a
//! human-readable `message`.

use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

use crate::state::PortalError;

pub const STATUS_OK: u16 = 200;

#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
}

/// Documented shape of [`Envelope`].
#[derive(Debug, ToSchema)]
#[expect(dead_code, reason = "documentation-only shape; fields are never read")]
pub struct EnvelopeSchema {
    #[schema(example = 200)]
    status: u16,
    #[schema(value_type = Object)]
    message: Option<Value>,
    #[schema(value_type = Object)]
    data: Option<Value>,
    endpoint: Option<String>,
}

fn reply<T: Serialize>(envelope: Envelope<T>) -> HttpResponse {
    HttpResponse::Ok().json(envelope)
}

/// `{"status":200,"message":<payload>}`
pub fn message<T: Serialize>(payload: T) -> HttpResponse {
    reply(Envelope {
        status: STATUS_OK,
        message: Some(payload),
        data: None,
        endpoint: None,
    })
}

/// `{"status":200,"message":<payload>,"endpoint":<url>}`
pub fn message_with_endpoint<T: Serialize>(payload: T, endpoint: Option<String>) -> HttpResponse {
    reply(Envelope {
        status: STATUS_OK,
        message: Some(payload),
        data: None,
        endpoint,
    })
}

/// `{"status":200,"data":<payload>}`
pub fn data<T: Serialize>(payload: T) -> HttpResponse {
    reply(Envelope {
        status: STATUS_OK,
        message: None,
        data: Some(payload),
        endpoint: None,
    })
}

/// `{"status":<code>,"message":<text>}` for an application failure.
pub fn rejected(error: &PortalError) -> HttpResponse {
    let status = error.status();
    warn!(status, %error, "portal request rejected");
    reply(Envelope {
        status,
        message: Some(error.to_string()),
        data: None,
        endpoint: None,
    })
}

/// Reply with `on_ok` for success and [`rejected`] otherwise.
pub fn respond<T>(
    result: Result<T, PortalError>,
    on_ok: impl FnOnce(T) -> HttpResponse,
) -> HttpResponse {
    match result {
        Ok(value) => on_ok(value),
        Err(error) => rejected(&error),
    }
}
