use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Suppresses a code that was successfully processed within the last
/// `window`.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_seen: HashMap<String, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: HashMap::new(),
        }
    }

    /// `true` when `code` must be skipped at `now`.
    pub fn is_quiet(&self, code: &str, now: Instant) -> bool {
        self.last_seen
            .get(code)
            .is_some_and(|last| now.saturating_duration_since(*last) < self.window)
    }

    /// Remember a successful processing of `code`.
    pub fn record(&mut self, code: &str, now: Instant) {
        self.last_seen
            .retain(|_, last| now.saturating_duration_since(*last) < self.window);
        self.last_seen.insert(code.to_string(), now);
    }
}
