use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Holds the latest search input until it has been quiet for `delay`.
///
/// Each new input replaces the pending one, so at most one value is released
/// per quiet period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now + self.delay));
    }

    /// Releases the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(text, _)| text),
            _ => None,
        }
    }

    /// Time left until the pending value is due, if any.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, deadline)| deadline.saturating_duration_since(now))
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
