//! Account activation from an emailed link.
//!
//! Activation runs before the administrator has signed in, so it is not
//! guarded.

use tracing::info;

use super::Error;
use super::context::ConsoleContext;

/// Message the portal returns once both payers are active.
pub const ACTIVATED_MESSAGE: &str = "Payers activated";

/// Result of confirming an activation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The portal activated the account.
    Activated,
    /// The portal answered with any other message.
    NotActivated(String),
}

/// Confirms activation links.
pub struct ActivationFlow {
    context: ConsoleContext,
}

impl ActivationFlow {
    /// Create the flow.
    pub fn new(context: ConsoleContext) -> Self {
        Self { context }
    }

    /// Confirm the `key` and `act_id` pair from an activation link.
    ///
    /// # Errors
    ///
    /// Returns [`Error::invalid_request`] when either value is blank and the
    /// converted port error when the portal cannot be reached.
    pub async fn activate(&self, key: &str, act_id: &str) -> Result<ActivationOutcome, Error> {
        let (key, act_id) = (key.trim(), act_id.trim());
        if key.is_empty() || act_id.is_empty() {
            return Err(Error::invalid_request("activation key and id are required"));
        }
        let message = self.context.api.verify_activation(key, act_id).await?;
        info!(act_id, "activation answered");
        if message.trim() == ACTIVATED_MESSAGE {
            Ok(ActivationOutcome::Activated)
        } else {
            Ok(ActivationOutcome::NotActivated(message))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Activation message handling.
    use std::sync::Arc;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{InMemorySessionStore, MockDownloadSink, MockPortalApi};
    use mockable::DefaultClock;
    use rstest::rstest;

    fn flow(api: MockPortalApi) -> ActivationFlow {
        ActivationFlow::new(ConsoleContext::new(
            Arc::new(api),
            Arc::new(InMemorySessionStore::default()),
            Arc::new(MockDownloadSink::new()),
            Arc::new(DefaultClock),
        ))
    }

    #[rstest]
    #[case("Payers activated", ActivationOutcome::Activated)]
    #[case(
        "Activation link expired",
        ActivationOutcome::NotActivated("Activation link expired".to_owned())
    )]
    #[tokio::test]
    async fn maps_the_portal_message(#[case] message: &'static str, #[case] expected: ActivationOutcome) {
        let mut api = MockPortalApi::new();
        api.expect_verify_activation()
            .withf(|key, act_id| key == "k-1" && act_id == "a-1")
            .returning(move |_, _| Ok(message.to_owned()));
        assert_eq!(flow(api).activate(" k-1 ", "a-1").await, Ok(expected));
    }

    #[tokio::test]
    async fn blank_inputs_send_nothing() {
        let mut api = MockPortalApi::new();
        api.expect_verify_activation().never();
        let err = flow(api).activate("", "a-1").await.expect_err("blank key");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
