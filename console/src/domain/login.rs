//! Login and logout.

use tracing::{info, warn};

use super::Error;
use super::auth::LoginForm;
use super::context::ConsoleContext;
use super::ports::PortalApiError;
use super::session::Session;
use super::validation::FieldErrors;

/// Result of submitting the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The form failed validation; nothing was sent.
    Invalid(FieldErrors),
    /// The portal accepted the credentials and the session was stored.
    SignedIn(Session),
}

/// Drives the login view.
pub struct LoginFlow {
    context: ConsoleContext,
}

impl LoginFlow {
    /// Create the flow; login is reachable without a session.
    pub fn new(context: ConsoleContext) -> Self {
        Self { context }
    }

    /// Validate the form, check credentials with the portal and store the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::unauthorized`] with the portal's message when the
    /// credentials are refused; the stored session is left untouched.
    pub async fn login(&self, form: &LoginForm) -> Result<LoginOutcome, Error> {
        let credentials = match form.credentials() {
            Ok(credentials) => credentials,
            Err(errors) => return Ok(LoginOutcome::Invalid(errors)),
        };

        let identity = match self.context.api.validate_login(&credentials).await {
            Ok(identity) => identity,
            Err(PortalApiError::Rejected { message, .. }) => {
                warn!(username = credentials.username(), "login refused");
                return Err(Error::unauthorized(message));
            }
            Err(error) => return Err(error.into()),
        };

        let session =
            Session::try_from_parts(&identity.display_name, &identity.email, &identity.payer_id)
                .map_err(|error| Error::internal(format!("portal returned an incomplete identity: {error}")))?;
        self.context.sessions.set(&session)?;
        info!(payer_id = %session.payer_id(), "signed in");
        Ok(LoginOutcome::SignedIn(session))
    }

    /// Clear every session key.
    pub fn logout(&self) -> Result<(), Error> {
        self.context.sessions.clear()?;
        info!("signed out");
        Ok(())
    }
}
