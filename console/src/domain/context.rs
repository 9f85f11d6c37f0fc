//! Dependency bundle handed to every view constructor.
//!
//! Views depend only on domain ports, so tests substitute doubles and the
//! CLI wires the HTTP and file adapters.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use pagination::PageSize;

use super::ports::{DownloadSink, PortalApi, SessionStore};

/// Default delay before a transient status message clears.
pub const DEFAULT_STATUS_CLEAR_AFTER: Duration = Duration::from_millis(2500);

/// Presentation knobs shared by every view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    /// Rows per list page.
    pub page_size: PageSize,
    /// How long transient status messages stay visible.
    pub status_clear_after: Duration,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            status_clear_after: DEFAULT_STATUS_CLEAR_AFTER,
        }
    }
}

/// Ports and options for the console views.
#[derive(Clone)]
pub struct ConsoleContext {
    pub api: Arc<dyn PortalApi>,
    pub sessions: Arc<dyn SessionStore>,
    pub downloads: Arc<dyn DownloadSink>,
    pub clock: Arc<dyn Clock>,
    pub options: ViewOptions,
}

impl ConsoleContext {
    /// Bundle ports with default view options.
    pub fn new(
        api: Arc<dyn PortalApi>,
        sessions: Arc<dyn SessionStore>,
        downloads: Arc<dyn DownloadSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            sessions,
            downloads,
            clock,
            options: ViewOptions::default(),
        }
    }

    /// Replace the view options.
    #[must_use]
    pub fn with_options(mut self, options: ViewOptions) -> Self {
        self.options = options;
        self
    }
}
