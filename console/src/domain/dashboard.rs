//! Dashboard view: headline counters, connection list and activity feed.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::context::ConsoleContext;
use super::guard::{Navigation, NavigationGuard};
use super::list::{ListPage, ListState};
use super::search::Searchable;
use super::session::Session;
use super::status::{StatusBoard, StatusTone};

/// Headline counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Payers registered in the directory.
    pub total_payers: u32,
    /// Established connections.
    pub active_connections: u32,
    /// Connection requests awaiting the other side.
    pub pending_requests: u32,
    /// Certificates verified across all payers.
    pub verified_certificates: u32,
}

/// Static assurance label shown beside a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustFrameworkLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl fmt::Display for TrustFrameworkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        })
    }
}

/// One established or pending connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEntry {
    pub payer_id: String,
    pub payer_name: String,
    pub status: String,
    pub trust_framework: TrustFrameworkLevel,
    pub connected_on: NaiveDate,
}

impl Searchable for ConnectionEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.payer_id.as_str(),
            self.payer_name.as_str(),
            self.status.as_str(),
        ]
    }
}

/// One entry of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: u32,
    pub description: String,
    pub actor: String,
    pub occurred_at: DateTime<Utc>,
}

/// Dashboard view state.
pub struct DashboardView {
    context: ConsoleContext,
    session: Session,
    stats: Option<DashboardStats>,
    connections: ListState<ConnectionEntry>,
    activity: Vec<ActivityEntry>,
    status: StatusBoard,
}

impl DashboardView {
    /// Build the view if a session exists.
    pub fn open(context: ConsoleContext) -> Navigation<Self> {
        let sessions = context.sessions.clone();
        NavigationGuard::enter(sessions.as_ref(), |session| {
            let status =
                StatusBoard::new(context.clock.clone(), context.options.status_clear_after);
            let connections = ListState::new(context.options.page_size);
            Self {
                context,
                session,
                stats: None,
                connections,
                activity: Vec::new(),
                status,
            }
        })
    }

    /// Fetch all three panels concurrently; a failed panel keeps its old
    /// contents and adds to the status line.
    pub async fn load(&mut self) {
        let api = self.context.api.clone();
        let (stats, connections, activity) = tokio::join!(
            api.dashboard_stats(),
            api.connection_list(),
            api.activity_list()
        );

        let mut failures = Vec::new();
        match stats {
            Ok(stats) => self.stats = Some(stats),
            Err(error) => failures.push(("stats", error)),
        }
        match connections {
            Ok(connections) => self.connections.replace(connections),
            Err(error) => failures.push(("connections", error)),
        }
        match activity {
            Ok(activity) => self.activity = activity,
            Err(error) => failures.push(("activity", error)),
        }

        if failures.is_empty() {
            return;
        }
        for (panel, error) in &failures {
            warn!(panel = *panel, error = %error, "dashboard panel failed to load");
        }
        let panels: Vec<&str> = failures.iter().map(|(panel, _)| *panel).collect();
        self.status.show(
            StatusTone::Error,
            format!("Could not load {}", panels.join(", ")),
        );
    }

    /// Signed-in administrator.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Headline counters, once loaded.
    pub fn stats(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    /// Activity feed in portal order.
    pub fn activity(&self) -> &[ActivityEntry] {
        &self.activity
    }

    /// Change the connection search text.
    pub fn set_connection_search(&mut self, text: impl Into<String>) {
        self.connections.set_search(text);
    }

    /// Jump to a connection page.
    pub fn set_connection_page(&mut self, page: usize) {
        self.connections.set_page(page);
    }

    /// The visible page of connections.
    pub fn connection_page(&self) -> ListPage<ConnectionEntry> {
        self.connections.page()
    }

    /// Status line.
    pub fn status(&self) -> &StatusBoard {
        &self.status
    }
}
