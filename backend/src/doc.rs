//! OpenAPI document served by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::api::{self, ApiError, ErrorCode};
use crate::state::{Activity, CertKind, Connection, Stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payer portal (local)",
        description = "Stand-in for the payer-to-payer portal API used by portal-console."
    ),
    servers((url = "/", description = "Relative to the bind address")),
    paths(
        api::auth::validate_login,
        api::auth::verify_activation,
        api::directory::fetch_all_payers,
        api::directory::fetch_certificate_details,
        api::directory::upload_certificate,
        api::directory::generate_certificate,
        api::directory::client_certificate,
        api::directory::server_certificate,
        api::directory::validate_client,
        api::directory::validate_server,
        api::directory::download_certificate,
        api::discovery::connect_new,
        api::discovery::connect_existing,
        api::dashboard::dashboard_stats,
        api::dashboard::connection_list,
        api::dashboard::activity_list,
        api::health::ready,
        api::health::live,
    ),
    components(schemas(
        api::envelope::EnvelopeSchema,
        api::directory::PayerRow,
        api::directory::CertificateRow,
        ApiError,
        ErrorCode,
        CertKind,
        Stats,
        Connection,
        Activity,
    )),
    tags(
        (name = "auth", description = "Login and activation"),
        (name = "directory", description = "Payer directory"),
        (name = "certificates", description = "Certificate lifecycle"),
        (name = "discovery", description = "Payer connections"),
        (name = "dashboard", description = "Dashboard feeds"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
