//! Adapter behaviour against a local wiremock portal.

use std::time::Duration;

use reqwest::Url;
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::domain::auth::LoginForm;
use crate::domain::ports::PortalApi;

fn adapter(server: &MockServer) -> HttpPortalApi {
    adapter_with_timeout(server, Duration::from_secs(5))
}

fn adapter_with_timeout(server: &MockServer, timeout: Duration) -> HttpPortalApi {
    let base = Url::parse(&format!("{}/portal", server.uri())).expect("base url");
    HttpPortalApi::new(base, timeout).expect("client")
}

fn credentials() -> LoginCredentials {
    LoginForm::new("ada@acme.test", "passw0rd!")
        .credentials()
        .expect("valid form")
}

#[tokio::test]
async fn base_path_gains_a_trailing_slash() {
    let server = MockServer::start().await;
    let api = adapter(&server);
    assert!(api.base_url().path().ends_with("/portal/"));
}

#[tokio::test]
async fn login_posts_a_form_and_maps_the_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/validatelogin"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=ada%40acme.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "message": { "adm_name": "Ada", "adm_email": "ada@acme.test", "payer_id": 1001 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity = adapter(&server)
        .validate_login(&credentials())
        .await
        .expect("identity");
    assert_eq!(identity.display_name, "Ada");
    assert_eq!(identity.payer_id, "1001");
}

#[tokio::test]
async fn embedded_rejections_surface_the_portal_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/validatelogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 401,
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let err = adapter(&server)
        .validate_login(&credentials())
        .await
        .expect_err("rejected");
    assert_eq!(err, PortalApiError::rejected(401_u16, "Invalid credentials"));
}

#[tokio::test]
async fn slow_portals_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/portal/directory/fetchAllPayers"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!({ "status": 200, "message": [] })),
        )
        .mount(&server)
        .await;

    let err = adapter_with_timeout(&server, Duration::from_millis(50))
        .fetch_all_payers()
        .await
        .expect_err("timeout");
    assert!(matches!(err, PortalApiError::Timeout { .. }), "got {err:?}");
}

#[rstest]
#[case(503, "maintenance window")]
#[case(404, "no such route")]
#[tokio::test]
async fn http_failures_keep_status_and_body(#[case] status: u16, #[case] body: &'static str) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/portal/api/dashboard-stats"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;

    let err = adapter(&server)
        .dashboard_stats()
        .await
        .expect_err("status");
    assert_eq!(err, PortalApiError::status(status, body));
}

#[tokio::test]
async fn malformed_bodies_are_decode_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/portal/directory/fetchAllPayers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = adapter(&server)
        .fetch_all_payers()
        .await
        .expect_err("decode");
    assert!(matches!(err, PortalApiError::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn payer_rows_map_into_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/portal/directory/fetchAllPayers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "message": [{
                "payer_id": "P-2",
                "payer_name": "Blue River Health",
                "adm_email": "ops@blueriver.test",
                "city": "Austin",
                "verified_count": 2
            }]
        })))
        .mount(&server)
        .await;

    let payers = adapter(&server)
        .fetch_all_payers()
        .await
        .expect("payers");
    assert_eq!(payers.len(), 1);
    assert_eq!(payers[0].payer_name, "Blue River Health");
    assert!(payers[0].is_fully_verified());
}

#[tokio::test]
async fn certificate_details_carry_the_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/directory/fetchcertificatedetails"))
        .and(body_json(json!({ "email": "ada@acme.test" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "endpoint": "https://payer.acme.test/fhir",
            "message": [
                { "payer_id": "P-1", "cert_type": "client", "certificate_verified": true },
                { "payer_id": "P-1", "cert_type": "server" }
            ]
        })))
        .mount(&server)
        .await;

    let details = adapter(&server)
        .fetch_certificate_details("ada@acme.test")
        .await
        .expect("details");
    assert_eq!(details.records.len(), 2);
    assert_eq!(details.endpoint.as_deref(), Some("https://payer.acme.test/fhir"));
}

#[tokio::test]
async fn verification_sends_the_payer_id_as_a_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/portal/directory/validateserver"))
        .and(query_param("payer_id", "P-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "data": { "status": 200, "msg": "Server certificate verified" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payer = PayerId::new("P-1").expect("payer id");
    let reply = adapter(&server)
        .verify_certificate(&payer, CertType::Server)
        .await
        .expect("reply");
    assert!(reply.passed);
    assert_eq!(reply.message, "Server certificate verified");
}

#[tokio::test]
async fn existing_connections_use_the_old_connect_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/portal/discovery/oconnectpayer"))
        .and(query_param("payer_id", "P-1"))
        .and(query_param("email", "ops@blueriver.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 200 })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ConnectRequest {
        kind: ConnectKind::Existing,
        payer_id: PayerId::new("P-1").expect("payer id"),
        target_email: "ops@blueriver.test".to_owned(),
    };
    adapter(&server)
        .connect_payer(&request)
        .await
        .expect("connected");
}

#[tokio::test]
async fn activation_reads_a_bare_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/portal/verify/verify"))
        .and(query_param("key", "k-1"))
        .and(query_param("actId", "a-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Payers activated" })))
        .mount(&server)
        .await;

    let message = adapter(&server)
        .verify_activation("k-1", "a-1")
        .await
        .expect("message");
    assert_eq!(message, "Payers activated");
}

#[test]
fn previews_are_compacted_and_truncated() {
    let long = "x ".repeat(200);
    let preview = body_preview(long.as_bytes());
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 163);
    assert_eq!(body_preview(b"  a \n b "), "a b");
}
