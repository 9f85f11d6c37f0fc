//! Status line shown beneath a view, with optional auto-clear.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

/// Visual weight of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    /// Progress or neutral information.
    Info,
    /// A completed action.
    Success,
    /// A failed action.
    Error,
}

/// One message on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Message text.
    pub text: String,
    /// Visual weight.
    pub tone: StatusTone,
    expires_at: Option<DateTime<Utc>>,
}

impl StatusMessage {
    /// Whether the message disappears on its own.
    pub fn is_transient(&self) -> bool {
        self.expires_at.is_some()
    }
}

/// Holds the current status message and clears transient ones after a delay.
///
/// Expiry is evaluated against the injected clock when the message is read,
/// so no timer task outlives the view.
pub struct StatusBoard {
    clock: Arc<dyn Clock>,
    clear_after: TimeDelta,
    current: Option<StatusMessage>,
}

impl StatusBoard {
    /// Create an empty board whose transient messages last `clear_after`.
    pub fn new(clock: Arc<dyn Clock>, clear_after: Duration) -> Self {
        let clear_after = TimeDelta::from_std(clear_after).unwrap_or(TimeDelta::MAX);
        Self {
            clock,
            clear_after,
            current: None,
        }
    }

    /// Show a message that clears after the configured delay.
    pub fn flash(&mut self, tone: StatusTone, text: impl Into<String>) {
        let expires_at = self.clock.utc().checked_add_signed(self.clear_after);
        self.current = Some(StatusMessage {
            text: text.into(),
            tone,
            expires_at,
        });
    }

    /// Show a message that stays until replaced or cleared.
    pub fn show(&mut self, tone: StatusTone, text: impl Into<String>) {
        self.current = Some(StatusMessage {
            text: text.into(),
            tone,
            expires_at: None,
        });
    }

    /// Current message, if one is set and has not expired.
    pub fn current(&self) -> Option<&StatusMessage> {
        let now = self.clock.utc();
        self.current
            .as_ref()
            .filter(|message| message.expires_at.is_none_or(|expiry| now < expiry))
    }

    /// Text of the current message.
    pub fn text(&self) -> Option<&str> {
        self.current().map(|message| message.text.as_str())
    }

    /// Remove any message.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl std::fmt::Debug for StatusBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusBoard")
            .field("clear_after", &self.clear_after)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
