//! Login and account activation.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use super::envelope::{self, EnvelopeSchema};
use crate::state::PortalState;

/// Text the console treats as a successful activation.
pub const ACTIVATED_MESSAGE: &str = "Payers activated";
pub const ACTIVATION_REFUSED: &str = "Activation link is invalid or has already been used";

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    #[schema(example = "ada@acme.test")]
    username: String,
    password: String,
}

/// Identity returned on a successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginIdentity {
    adm_name: String,
    adm_email: String,
    #[schema(example = "P-1001")]
    payer_id: String,
}

/// Check administrator credentials.
#[utoipa::path(
    post,
    path = "/validatelogin",
    tags = ["auth"],
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Identity in `message`, or status 401", body = EnvelopeSchema),
        (status = 400, description = "Form could not be parsed", body = super::ApiError)
    )
)]
#[post("/validatelogin")]
pub async fn validate_login(
    state: web::Data<PortalState>,
    form: web::Form<LoginForm>,
) -> HttpResponse {
    let LoginForm { username, password } = form.into_inner();
    envelope::respond(state.login(&username, &password), |account| {
        info!(payer_id = %account.payer_id, "administrator signed in");
        envelope::message(LoginIdentity {
            adm_name: account.display_name,
            adm_email: account.email,
            payer_id: account.payer_id,
        })
    })
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivationQuery {
    key: String,
    #[serde(rename = "actId")]
    act_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivationReply {
    #[schema(value_type = String, example = "Payers activated")]
    message: &'static str,
}

/// Consume an activation link. Answers a bare `{message}` body.
#[utoipa::path(
    get,
    path = "/verify/verify",
    tags = ["auth"],
    params(ActivationQuery),
    responses((status = 200, description = "Outcome text", body = ActivationReply))
)]
#[get("/verify/verify")]
pub async fn verify_activation(
    state: web::Data<PortalState>,
    query: web::Query<ActivationQuery>,
) -> HttpResponse {
    match state.activate(&query.key, &query.act_id) {
        Ok(true) => {
            info!(act_id = %query.act_id, "activation consumed");
            HttpResponse::Ok().json(ActivationReply {
                message: ACTIVATED_MESSAGE,
            })
        }
        Ok(false) => HttpResponse::Ok().json(ActivationReply {
            message: ACTIVATION_REFUSED,
        }),
        Err(error) => envelope::rejected(&error),
    }
}
