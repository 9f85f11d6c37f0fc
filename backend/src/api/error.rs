//! HTTP error payloads for requests that never reach the portal state.
//!
//! Application failures travel inside the status envelope with HTTP 200
//! (see [`super::envelope`]). [`ApiError`] covers the rest: bodies, forms or
//! query strings that fail to extract, and anything else actix surfaces.

use actix_web::error::{JsonPayloadError, QueryPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::middleware::{TRACE_ID_HEADER, TraceId};

/// Stable machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request body, form or query failed to parse.
    InvalidRequest,
    /// Something went wrong inside the server.
    InternalError,
}

/// Error body returned with a non-200 HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "Json deserialize error: missing field `email`")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "6f1c2a8e-0b7d-4b55-9a0e-2d6f4c3b1a90")]
    trace_id: Option<String>,
}

impl ApiError {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Malformed client input.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Unexpected server failure. The message is logged, not returned.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(%message, "internal error");
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.code {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = &self.trace_id {
            builder.insert_header((TRACE_ID_HEADER, id.clone()));
        }
        if self.code == ErrorCode::InternalError {
            let mut redacted = self.clone();
            redacted.message = "Internal server error".to_owned();
            return builder.json(redacted);
        }
        builder.json(self)
    }
}

fn rejected_input(kind: &str, detail: String, req: &HttpRequest) -> actix_web::Error {
    warn!(path = req.path(), kind, %detail, "request input rejected");
    ApiError::invalid_request(detail).into()
}

/// `JsonConfig` error handler.
pub fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    rejected_input("json", err.to_string(), req)
}

/// `FormConfig` error handler.
pub fn form_error(err: UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    rejected_input("form", err.to_string(), req)
}

/// `QueryConfig` error handler.
pub fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    rejected_input("query", err.to_string(), req)
}

#[cfg(test)]
mod tests;
