//! Payer-to-payer connection requests.

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use super::envelope::{self, EnvelopeSchema};
use crate::state::{ConnectMode, PortalState};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConnectQuery {
    /// Requesting payer.
    payer_id: String,
    /// Administrator email of the payer to connect to.
    email: String,
}

fn connect(state: &PortalState, query: &ConnectQuery, mode: ConnectMode) -> HttpResponse {
    envelope::respond(state.connect(&query.payer_id, &query.email, mode), |()| {
        info!(payer_id = %query.payer_id, target = %query.email, ?mode, "payers connected");
        envelope::message("Connection established")
    })
}

/// Connect to a payer for the first time.
#[utoipa::path(
    get,
    path = "/discovery/nconnectpayer",
    tags = ["discovery"],
    params(ConnectQuery),
    responses((status = 200, description = "Acknowledgement, or status 412 when either side is unverified", body = EnvelopeSchema))
)]
#[get("/discovery/nconnectpayer")]
pub async fn connect_new(
    state: web::Data<PortalState>,
    query: web::Query<ConnectQuery>,
) -> HttpResponse {
    connect(&state, &query, ConnectMode::New)
}

/// Re-establish a connection made before.
#[utoipa::path(
    get,
    path = "/discovery/oconnectpayer",
    tags = ["discovery"],
    params(ConnectQuery),
    responses((status = 200, description = "Acknowledgement", body = EnvelopeSchema))
)]
#[get("/discovery/oconnectpayer")]
pub async fn connect_existing(
    state: web::Data<PortalState>,
    query: web::Query<ConnectQuery>,
) -> HttpResponse {
    connect(&state, &query, ConnectMode::Existing)
}
