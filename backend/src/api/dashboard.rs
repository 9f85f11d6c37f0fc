//! Dashboard feeds. These answer plain camelCase JSON, not the envelope.

use actix_web::{HttpResponse, get, web};

use super::ApiError;
use crate::state::{Activity, Connection, PortalState, Stats};

fn plain<T: serde::Serialize>(result: Result<T, crate::state::PortalError>) -> Result<HttpResponse, ApiError> {
    result
        .map(|value| HttpResponse::Ok().json(value))
        .map_err(|error| ApiError::internal(error.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/dashboard-stats",
    tags = ["dashboard"],
    responses((status = 200, description = "Headline counters", body = Stats))
)]
#[get("/api/dashboard-stats")]
pub async fn dashboard_stats(state: web::Data<PortalState>) -> Result<HttpResponse, ApiError> {
    plain(state.stats())
}

#[utoipa::path(
    get,
    path = "/api/connection-list",
    tags = ["dashboard"],
    responses((status = 200, description = "Established and pending connections", body = [Connection]))
)]
#[get("/api/connection-list")]
pub async fn connection_list(state: web::Data<PortalState>) -> Result<HttpResponse, ApiError> {
    plain(state.connections())
}

/// Activity feed, newest first.
#[utoipa::path(
    get,
    path = "/api/activity-list",
    tags = ["dashboard"],
    responses((status = 200, description = "Recent activity", body = [Activity]))
)]
#[get("/api/activity-list")]
pub async fn activity_list(state: web::Data<PortalState>) -> Result<HttpResponse, ApiError> {
    plain(state.activity())
}
