//! HTTP routes of the local portal.

pub mod auth;
pub mod dashboard;
pub mod directory;
pub mod discovery;
pub mod envelope;
pub mod error;
pub mod health;

use actix_web::web;

pub use error::{ApiError, ErrorCode};

/// Register every portal route and the extractor error handlers.
///
/// Expects `web::Data<PortalState>` to be registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error))
        .app_data(web::FormConfig::default().error_handler(error::form_error))
        .app_data(web::QueryConfig::default().error_handler(error::query_error))
        .service(auth::validate_login)
        .service(auth::verify_activation)
        .service(directory::fetch_all_payers)
        .service(directory::fetch_certificate_details)
        .service(directory::upload_certificate)
        .service(directory::generate_certificate)
        .service(directory::client_certificate)
        .service(directory::server_certificate)
        .service(directory::validate_client)
        .service(directory::validate_server)
        .service(directory::download_certificate)
        .service(discovery::connect_new)
        .service(discovery::connect_existing)
        .service(dashboard::dashboard_stats)
        .service(dashboard::connection_list)
        .service(dashboard::activity_list);
}


#[cfg(test)]
mod tests {
    use super::test_support::{call, portal};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};

    #[actix_web::test]
    async fn malformed_json_is_a_traced_bad_request() {
        let req = TestRequest::post()
            .uri("/directory/fetchcertificatedetails")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json");
        let res = call(portal(), req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let header = res
            .headers()
            .get(crate::middleware::TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .expect("trace header");
        let body: super::ApiError = test::read_body_json(res).await;
        assert_eq!(body.code(), super::ErrorCode::InvalidRequest);
        assert_eq!(body.trace_id(), Some(header.as_str()));
    }
}
