// src/search/debounce.rs

//! Trailing-edge debounce driven by explicit timestamps.

use std::time::Duration;

use tokio::time::Instant;

/// Holds the latest value until it has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value if the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, pushed_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*pushed_at) < self.delay {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Abandon the pending value.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn test_quiet_period_restarts_on_push() {
        let start = Instant::now();
        let mut debounce = Debounce::new(DELAY);

        debounce.push("a", start);
        debounce.push("ab", start + Duration::from_millis(300));

        assert_eq!(debounce.poll(start + Duration::from_millis(600)), None);
        assert_eq!(debounce.poll(start + Duration::from_millis(800)), Some("ab"));
        assert_eq!(debounce.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let start = Instant::now();
        let mut debounce = Debounce::new(DELAY);
        debounce.push(1, start);

        assert_eq!(debounce.deadline(), Some(start + DELAY));
        assert_eq!(debounce.cancel(), Some(1));
        assert!(!debounce.is_pending());
        assert_eq!(debounce.poll(start + DELAY), None);
    }
}
