use std::time::{Duration, Instant};

/// Tick interval in milliseconds
pub const TICK_MS: u64 = 1000;

/// Get tick duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(TICK_MS)
}

/// Cancellable periodic tick source
///
/// Fires at most once per poll. Missed intervals (a suspended host, a slow
/// loop) are dropped, not replayed: after a late tick the next one is
/// scheduled a full interval from the moment it fired.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    next_at: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_at: Some(now + interval),
        }
    }

    /// Ticker with the default one second interval, starting now
    pub fn every_second() -> Self {
        Self::new(tick_duration(), Instant::now())
    }

    pub fn is_active(&self) -> bool {
        self.next_at.is_some()
    }

    /// Returns true if a tick is due at `now`, and schedules the next one
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.next_at {
            Some(next) if now >= next => {
                self.next_at = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time left until the next tick, zero if overdue or cancelled
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.next_at
            .map(|next| next.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    pub fn remaining(&self) -> Duration {
        self.remaining_at(Instant::now())
    }

    /// Stop ticking for good. Returns false if already cancelled.
    pub fn cancel(&mut self) -> bool {
        self.next_at.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_duration() {
        assert_eq!(tick_duration(), Duration::from_millis(1000));
    }

    #[test]
    fn test_ticker_fires_once_per_interval() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_secs(1), start);

        assert!(!ticker.poll_at(start));
        assert!(!ticker.poll_at(start + Duration::from_millis(999)));
        assert!(ticker.poll_at(start + Duration::from_secs(1)));
        assert!(!ticker.poll_at(start + Duration::from_millis(1500)));
        assert!(ticker.poll_at(start + Duration::from_secs(2)));
    }

    #[test]
    fn test_ticker_does_not_catch_up() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_secs(1), start);

        // Host asleep for ten seconds: one tick, not ten
        let late = start + Duration::from_secs(10);
        assert!(ticker.poll_at(late));
        assert!(!ticker.poll_at(late));
        assert!(!ticker.poll_at(late + Duration::from_millis(500)));
        assert!(ticker.poll_at(late + Duration::from_secs(1)));
    }

    #[test]
    fn test_ticker_remaining() {
        let start = Instant::now();
        let ticker = Ticker::new(Duration::from_secs(1), start);
        assert_eq!(ticker.remaining_at(start), Duration::from_secs(1));
        assert_eq!(ticker.remaining_at(start + Duration::from_secs(5)), Duration::ZERO);
    }

    #[test]
    fn test_ticker_cancel_is_final() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_secs(1), start);

        assert!(ticker.cancel());
        assert!(!ticker.is_active());
        assert!(!ticker.cancel());
        assert!(!ticker.poll_at(start + Duration::from_secs(5)));
        assert_eq!(ticker.remaining_at(start), Duration::ZERO);
    }
}
