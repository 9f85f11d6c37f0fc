//! Request-generation tokens for discarding superseded responses.
//!
//! A view bumps its generation whenever it starts a fetch and applies the
//! response only when the token it captured is still the latest, so a slow
//! older response can never overwrite newer state.

/// What happened to a list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New rows replaced the old ones.
    Applied,
    /// A newer fetch had started; the response was dropped.
    Stale,
    /// The fetch failed; previous rows were kept.
    Failed,
    /// No signed-in session, so nothing was fetched.
    Skipped,
}

/// Monotonic counter owned by one view.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    current: u64,
}

/// Token captured when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationToken(u64);

impl RequestGeneration {
    /// Start a new generation, superseding every earlier token.
    pub fn begin(&mut self) -> GenerationToken {
        self.current = self.current.wrapping_add(1);
        GenerationToken(self.current)
    }

    /// Whether `token` belongs to the latest generation.
    pub fn is_current(&self, token: GenerationToken) -> bool {
        token.0 == self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_tokens_supersede_earlier_ones() {
        let mut generation = RequestGeneration::default();
        let first = generation.begin();
        assert!(generation.is_current(first));
        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }
}
