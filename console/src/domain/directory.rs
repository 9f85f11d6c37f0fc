//! Payer directory view with search, paging and connect.

use tracing::{debug, info, warn};

use super::context::ConsoleContext;
use super::generation::{GenerationToken, RefreshOutcome, RequestGeneration};
use super::guard::{Navigation, NavigationGuard};
use super::list::{ListPage, ListState};
use super::payer::PayerRecord;
use super::ports::{ConnectKind, ConnectRequest, PortalApiError};
use super::session::Session;
use super::status::{StatusBoard, StatusTone};

/// Progress shown while the connect request is sent.
pub const CONNECTING: &str = "Connecting...";
/// Progress shown once the portal accepts the request.
pub const EXCHANGING_CERTIFICATES: &str = "Exchanging certificates...";
/// Final progress step.
pub const CONNECTED: &str = "Connected";
/// Reason given when either side lacks verified certificates.
pub const UNVERIFIED_REASON: &str =
    "Both payers must have verified client and server certificates before connecting";

/// Result of asking to connect to another payer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A precondition failed; nothing was sent.
    Blocked {
        /// Explanation shown to the operator.
        reason: String,
    },
    /// The portal accepted the connection.
    Connected {
        /// Status messages in the order they were shown.
        progress: Vec<String>,
    },
    /// The request failed.
    Failed {
        /// Status messages shown before the failure.
        progress: Vec<String>,
        /// Failure text.
        message: String,
    },
}

/// Directory view state.
pub struct DirectoryView {
    context: ConsoleContext,
    session: Session,
    list: ListState<PayerRecord>,
    generation: RequestGeneration,
    status: StatusBoard,
}

impl DirectoryView {
    /// Build the view if a session exists. The list is empty until
    /// [`Self::refresh`] runs.
    pub fn open(context: ConsoleContext) -> Navigation<Self> {
        let sessions = context.sessions.clone();
        NavigationGuard::enter(sessions.as_ref(), |session| {
            let status =
                StatusBoard::new(context.clock.clone(), context.options.status_clear_after);
            let list = ListState::new(context.options.page_size);
            Self {
                context,
                session,
                list,
                generation: RequestGeneration::default(),
                status,
            }
        })
    }

    /// Every payer, unfiltered.
    pub fn payers(&self) -> &[PayerRecord] {
        self.list.items()
    }

    /// Status line.
    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Change the search text and return to page 1.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.list.set_search(text);
    }

    /// Jump to a page.
    pub fn set_page(&mut self, page: usize) {
        self.list.set_page(page);
    }

    /// Payers matching the search.
    pub fn filtered(&self) -> Vec<PayerRecord> {
        self.list.filtered()
    }

    /// The visible page.
    pub fn page(&self) -> ListPage<PayerRecord> {
        self.list.page()
    }

    /// The signed-in administrator's own payer row.
    pub fn own_payer(&self) -> Option<&PayerRecord> {
        self.list
            .items()
            .iter()
            .find(|payer| &payer.payer_id == self.session.payer_id())
    }

    /// Start a directory fetch, superseding any fetch still in flight.
    pub fn begin_refresh(&mut self) -> GenerationToken {
        self.generation.begin()
    }

    /// Apply a fetch result if `token` is still current.
    pub fn apply_refresh(
        &mut self,
        token: GenerationToken,
        result: Result<Vec<PayerRecord>, PortalApiError>,
    ) -> RefreshOutcome {
        if !self.generation.is_current(token) {
            debug!("discarding superseded directory fetch");
            return RefreshOutcome::Stale;
        }
        match result {
            Ok(payers) => {
                debug!(count = payers.len(), "directory loaded");
                self.list.replace(payers);
                RefreshOutcome::Applied
            }
            Err(error) => {
                warn!(error = %error, kind = error.kind(), "directory fetch failed; keeping previous rows");
                self.status
                    .show(StatusTone::Error, format!("Could not load directory: {error}"));
                RefreshOutcome::Failed
            }
        }
    }

    /// Fetch every payer.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        let token = self.begin_refresh();
        let result = self.context.api.fetch_all_payers().await;
        self.apply_refresh(token, result)
    }

    /// Check both sides are fully verified and return the target row.
    fn connect_target(&self, target_email: &str) -> Result<&PayerRecord, String> {
        let own = self
            .own_payer()
            .ok_or_else(|| "Your payer is not listed in the directory".to_owned())?;
        let target = self
            .list
            .items()
            .iter()
            .find(|payer| payer.has_admin_email(target_email))
            .ok_or_else(|| format!("No payer found for '{}'", target_email.trim()))?;
        if target.payer_id == own.payer_id {
            return Err("A payer cannot connect to itself".to_owned());
        }
        if !(own.is_fully_verified() && target.is_fully_verified()) {
            return Err(UNVERIFIED_REASON.to_owned());
        }
        Ok(target)
    }

    /// Connect to the payer whose administrator is `target_email`.
    pub async fn connect(&mut self, target_email: &str, kind: ConnectKind) -> ConnectOutcome {
        let checked = self
            .connect_target(target_email)
            .map(|target| target.admin_email.clone());
        let target = match checked {
            Ok(target) => target,
            Err(reason) => {
                self.status.show(StatusTone::Error, reason.clone());
                return ConnectOutcome::Blocked { reason };
            }
        };

        let mut progress = vec![CONNECTING.to_owned()];
        self.status.show(StatusTone::Info, CONNECTING);
        let request = ConnectRequest {
            kind,
            payer_id: self.session.payer_id().clone(),
            target_email: target,
        };
        match self.context.api.connect_payer(&request).await {
            Ok(()) => {
                progress.push(EXCHANGING_CERTIFICATES.to_owned());
                self.status.show(StatusTone::Info, EXCHANGING_CERTIFICATES);
                info!(
                    payer_id = %request.payer_id,
                    target = %request.target_email,
                    "payer connection accepted"
                );
                self.refresh().await;
                progress.push(CONNECTED.to_owned());
                self.status.flash(StatusTone::Success, CONNECTED);
                ConnectOutcome::Connected { progress }
            }
            Err(error) => {
                warn!(error = %error, target = %request.target_email, "payer connection failed");
                let message = error.to_string();
                self.status.show(StatusTone::Error, message.clone());
                ConnectOutcome::Failed { progress, message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Directory loading and connect preconditions against a mocked portal.
    use std::sync::Arc;

    use super::*;
    use crate::domain::payer::PayerId;
    use crate::domain::ports::{InMemorySessionStore, MockDownloadSink, MockPortalApi};
    use crate::domain::status::test_clock::MutableClock;
    use rstest::rstest;

    fn payer(id: &str, email: &str, verified_count: u32) -> PayerRecord {
        PayerRecord {
            payer_id: PayerId::new(id).expect("payer id"),
            payer_name: format!("Payer {id}"),
            admin_name: "Admin".to_owned(),
            admin_email: email.to_owned(),
            admin_phone: String::new(),
            address_line1: "1 Main St".to_owned(),
            address_line2: String::new(),
            city: "Springfield".to_owned(),
            state: "IL".to_owned(),
            zip: "62701".to_owned(),
            certificate_uploaded: verified_count > 0,
            certificate_verified: verified_count == 2,
            verified_count,
        }
    }

    fn view(api: MockPortalApi) -> DirectoryView {
        let session = Session::try_from_parts("Ada", "ada@acme.test", "P-1").expect("session");
        let context = ConsoleContext::new(
            Arc::new(api),
            Arc::new(InMemorySessionStore::with_session(&session)),
            Arc::new(MockDownloadSink::new()),
            Arc::new(MutableClock::new()),
        );
        DirectoryView::open(context).into_view().expect("session present")
    }

    fn api_with(payers: Vec<PayerRecord>) -> MockPortalApi {
        let mut api = MockPortalApi::new();
        api.expect_fetch_all_payers()
            .returning(move || Ok(payers.clone()));
        api
    }

    #[tokio::test]
    async fn refresh_stores_every_payer() {
        let mut directory = view(api_with(vec![
            payer("P-1", "ada@acme.test", 2),
            payer("P-2", "bob@blue.test", 2),
        ]));
        assert_eq!(directory.refresh().await, RefreshOutcome::Applied);
        assert_eq!(directory.payers().len(), 2);
        assert_eq!(
            directory.own_payer().map(|p| p.payer_id.as_ref()),
            Some("P-1")
        );
    }

    #[tokio::test]
    async fn an_empty_directory_shows_the_quoted_empty_row() {
        let mut directory = view(api_with(Vec::new()));
        assert_eq!(directory.refresh().await, RefreshOutcome::Applied);
        let page = directory.page();
        assert!(page.rows.is_empty());
        assert_eq!(page.empty_message.as_deref(), Some("No results found for ''"));
        assert!(!page.show_controls);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_stale_rows() {
        let mut api = MockPortalApi::new();
        let mut first = true;
        api.expect_fetch_all_payers().returning(move || {
            if std::mem::take(&mut first) {
                Ok(vec![payer("P-1", "ada@acme.test", 2)])
            } else {
                Err(PortalApiError::timeout("10s"))
            }
        });
        let mut directory = view(api);
        directory.refresh().await;
        assert_eq!(directory.refresh().await, RefreshOutcome::Failed);
        assert_eq!(directory.payers().len(), 1);
        assert!(directory.status().text().is_some_and(|t| t.contains("timed out")));
    }

    #[rstest]
    #[case(2, 1)]
    #[case(1, 2)]
    #[case(0, 0)]
    #[tokio::test]
    async fn connect_is_blocked_unless_both_sides_are_verified(
        #[case] own_count: u32,
        #[case] target_count: u32,
    ) {
        let mut api = api_with(vec![
            payer("P-1", "ada@acme.test", own_count),
            payer("P-2", "bob@blue.test", target_count),
        ]);
        api.expect_connect_payer().never();
        let mut directory = view(api);
        directory.refresh().await;

        let outcome = directory.connect("bob@blue.test", ConnectKind::New).await;
        assert_eq!(
            outcome,
            ConnectOutcome::Blocked {
                reason: UNVERIFIED_REASON.to_owned()
            }
        );
        assert_eq!(directory.status().text(), Some(UNVERIFIED_REASON));
    }

    #[tokio::test]
    async fn connect_reports_progress_and_refetches() {
        let mut api = MockPortalApi::new();
        api.expect_fetch_all_payers().times(2).returning(|| {
            Ok(vec![
                payer("P-1", "ada@acme.test", 2),
                payer("P-2", "bob@blue.test", 2),
            ])
        });
        api.expect_connect_payer()
            .withf(|request| {
                request.kind == ConnectKind::Existing
                    && request.payer_id.as_ref() == "P-1"
                    && request.target_email == "bob@blue.test"
            })
            .times(1)
            .returning(|_| Ok(()));
        let mut directory = view(api);
        directory.refresh().await;

        let outcome = directory.connect(" BOB@blue.test ", ConnectKind::Existing).await;
        assert_eq!(
            outcome,
            ConnectOutcome::Connected {
                progress: vec![
                    CONNECTING.to_owned(),
                    EXCHANGING_CERTIFICATES.to_owned(),
                    CONNECTED.to_owned(),
                ]
            }
        );
        assert_eq!(directory.status().text(), Some(CONNECTED));
    }

    #[tokio::test]
    async fn unknown_targets_are_blocked() {
        let mut api = api_with(vec![payer("P-1", "ada@acme.test", 2)]);
        api.expect_connect_payer().never();
        let mut directory = view(api);
        directory.refresh().await;

        assert!(matches!(
            directory.connect("ghost@nowhere.test", ConnectKind::New).await,
            ConnectOutcome::Blocked { .. }
        ));
        assert!(matches!(
            directory.connect("ada@acme.test", ConnectKind::New).await,
            ConnectOutcome::Blocked { .. }
        ));
    }

    #[tokio::test]
    async fn search_drives_the_visible_page() {
        let mut directory = view(api_with(vec![
            payer("P-1", "ada@acme.test", 2),
            payer("P-2", "bob@blue.test", 2),
        ]));
        directory.refresh().await;
        directory.set_search("BLUE");
        assert_eq!(directory.page().rows.len(), 1);
        directory.set_search("zzz");
        assert_eq!(
            directory.page().empty_message.as_deref(),
            Some("No results found for 'zzz'")
        );
    }
}
