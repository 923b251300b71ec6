use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Sliding-window surge detector configuration.
///
/// Events older than the retention window are discarded entirely; the surge
/// decision counts only events inside the shorter recent window. The
/// defaults are the flight-booking rules: 10-minute retention, 5-minute
/// recent window, surge at 3 events, +10%.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub retention_seconds: i64,
    pub recent_seconds: i64,
    pub surge_threshold: usize,
    pub surge_percentage: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            retention_seconds: 600,
            recent_seconds: 300,
            surge_threshold: 3,
            surge_percentage: 10,
        }
    }
}

/// The window's verdict for a single instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
    /// Events inside the recent window.
    pub recent_count: usize,
    pub surge_active: bool,
    /// How long until the oldest recent event leaves the retention window.
    /// Present only while surge is active and the duration is positive.
    pub time_until_reset: Option<Duration>,
}

/// A rate-limiter-style window over raw event timestamps.
///
/// Working from raw timestamps rather than a decaying counter makes the
/// reset time directly computable and makes pruning idempotent: evaluating
/// twice at the same instant yields the same state.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindow {
    config: WindowConfig,
}

impl SlidingWindow {
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Timestamps strictly before this instant no longer influence pricing
    /// and can be deleted from storage. An event exactly at the cutoff is
    /// retained but already invisible to `evaluate`.
    pub fn retention_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::seconds(self.config.retention_seconds)
    }

    pub fn evaluate(&self, events: &[DateTime<Utc>], now: DateTime<Utc>) -> WindowState {
        let retention_cutoff = self.retention_cutoff(now);
        let recent_cutoff = now - Duration::seconds(self.config.recent_seconds);

        let recent: Vec<DateTime<Utc>> = events
            .iter()
            .copied()
            .filter(|at| *at > retention_cutoff && *at > recent_cutoff)
            .collect();

        let surge_active = recent.len() >= self.config.surge_threshold;

        // The reset deliberately tracks the oldest event of the *recent*
        // window (the one that tripped the threshold), not the oldest
        // retained event.
        let time_until_reset = if surge_active {
            recent
                .iter()
                .min()
                .map(|oldest| *oldest + Duration::seconds(self.config.retention_seconds) - now)
                .filter(|remaining| *remaining > Duration::zero())
        } else {
            None
        };

        WindowState {
            recent_count: recent.len(),
            surge_active,
            time_until_reset,
        }
    }

    /// Base price with the surge percentage applied, rounded half-up to the
    /// nearest whole unit.
    pub fn surged_price(&self, base_price: i64) -> i64 {
        let multiplier = 1.0 + f64::from(self.config.surge_percentage) / 100.0;
        (base_price as f64 * multiplier).round() as i64
    }

    pub fn price(&self, base_price: i64, surge_active: bool) -> i64 {
        if surge_active {
            self.surged_price(base_price)
        } else {
            base_price
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(now: DateTime<Utc>, seconds_ago: i64) -> DateTime<Utc> {
        now - Duration::seconds(seconds_ago)
    }

    #[test]
    fn test_no_events_no_surge() {
        let window = SlidingWindow::default();
        let now = Utc::now();
        let state = window.evaluate(&[], now);
        assert_eq!(state.recent_count, 0);
        assert!(!state.surge_active);
        assert!(state.time_until_reset.is_none());
    }

    #[test]
    fn test_surge_requires_threshold_in_recent_window() {
        let window = SlidingWindow::default();
        let now = Utc::now();

        // Two recent plus one older than the recent window: no surge.
        let events = vec![at(now, 60), at(now, 120), at(now, 360)];
        let state = window.evaluate(&events, now);
        assert_eq!(state.recent_count, 2);
        assert!(!state.surge_active);

        // Third event inside the recent window flips surge on.
        let events = vec![at(now, 60), at(now, 120), at(now, 240)];
        let state = window.evaluate(&events, now);
        assert_eq!(state.recent_count, 3);
        assert!(state.surge_active);
    }

    #[test]
    fn test_reset_tracks_oldest_recent_event() {
        let window = SlidingWindow::default();
        let now = Utc::now();
        let events = vec![at(now, 240), at(now, 120), at(now, 60)];
        let state = window.evaluate(&events, now);
        // Oldest recent event was 240s ago; it exits retention in 360s.
        assert_eq!(state.time_until_reset, Some(Duration::seconds(360)));
    }

    #[test]
    fn test_reset_decreases_as_time_advances() {
        let window = SlidingWindow::default();
        let now = Utc::now();
        let events = vec![at(now, 240), at(now, 120), at(now, 60)];

        let first = window.evaluate(&events, now).time_until_reset.unwrap();
        let second = window.evaluate(&events, now + Duration::seconds(30)).time_until_reset.unwrap();
        assert!(second < first);
    }

    #[test]
    fn test_events_expire_out_of_the_window() {
        let window = SlidingWindow::default();
        let now = Utc::now();
        let events = vec![at(now, 240), at(now, 120), at(now, 60)];
        assert!(window.evaluate(&events, now).surge_active);

        // After eleven minutes everything has aged out.
        let later = now + Duration::seconds(660);
        let state = window.evaluate(&events, later);
        assert_eq!(state.recent_count, 0);
        assert!(!state.surge_active);
        assert!(state.time_until_reset.is_none());
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let window = SlidingWindow::default();
        let now = Utc::now();
        let events = vec![at(now, 500), at(now, 240), at(now, 120), at(now, 60)];
        assert_eq!(window.evaluate(&events, now), window.evaluate(&events, now));
    }

    #[test]
    fn test_surged_price_rounds_half_up() {
        let window = SlidingWindow::default();
        assert_eq!(window.surged_price(2500), 2750);
        assert_eq!(window.surged_price(2000), 2200);
        // 2345 * 1.1 = 2579.5, rounds up.
        assert_eq!(window.surged_price(2345), 2580);
    }

    #[test]
    fn test_price_without_surge_is_base() {
        let window = SlidingWindow::default();
        assert_eq!(window.price(2500, false), 2500);
        assert_eq!(window.price(2500, true), 2750);
    }

    #[test]
    fn test_custom_threshold() {
        let window = SlidingWindow::new(WindowConfig {
            surge_threshold: 1,
            ..WindowConfig::default()
        });
        let now = Utc::now();
        assert!(window.evaluate(&[at(now, 10)], now).surge_active);
    }
}
