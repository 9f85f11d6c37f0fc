//! Status codes, redaction and trace propagation for error bodies.

use super::*;
use actix_web::body::to_bytes;
use rstest::rstest;

async fn body(response: HttpResponse) -> ApiError {
    let bytes = to_bytes(response.into_body()).await.expect("body bytes");
    serde_json::from_slice(&bytes).expect("error body")
}

#[rstest]
#[case(ApiError::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(ApiError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn codes_map_to_statuses(#[case] error: ApiError, #[case] expected: StatusCode) {
    assert_eq!(error.status_code(), expected);
}

#[actix_web::test]
async fn internal_messages_are_redacted() {
    let response = ApiError::internal("database path /var/secret").error_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = body(response).await;
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.code(), ErrorCode::InternalError);
}

#[actix_web::test]
async fn trace_id_is_captured_in_scope() {
    let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
        .parse()
        .expect("valid UUID literal");
    let error = TraceId::scope(trace_id, async { ApiError::invalid_request("missing email") }).await;

    let response = error.error_response();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .expect("trace header")
        .to_str()
        .expect("ascii")
        .to_owned();
    assert_eq!(header, trace_id.to_string());
    let payload = body(response).await;
    assert_eq!(payload.trace_id(), Some(header.as_str()));
    assert_eq!(payload.message(), "missing email");
}

#[test]
fn out_of_scope_errors_carry_no_trace_id() {
    let error = ApiError::invalid_request("bad");
    assert!(error.trace_id().is_none());
    let json = serde_json::to_value(&error).expect("serialise");
    assert!(json.get("traceId").is_none());
}
