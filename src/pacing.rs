//! Randomized pacing between requests
//!
//! Every pause is drawn uniformly from a configured range so the crawl has
//! no fixed, fingerprintable cadence. Sleeps go through `tokio::time`, so
//! tests running on a paused clock complete instantly.

use crate::config::{CrawlerConfig, DelayRange, MAX_DELAY_SECS};
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Draws a random duration from `range`
///
/// A degenerate range (`min == max`) always yields `min`. Bounds are
/// clamped to `0..=MAX_DELAY_SECS`.
pub fn jitter(range: DelayRange) -> Duration {
    let clamp = |secs: f64| secs.max(0.0).min(MAX_DELAY_SECS);
    let (min, max) = (clamp(range.min()), clamp(range.max()));
    if max <= min {
        return Duration::from_secs_f64(min);
    }
    let secs = rand::rng().random_range(min..=max);
    Duration::from_secs_f64(secs)
}

/// Sleeps for a random duration drawn from `range` and returns it
pub async fn pause(range: DelayRange) -> Duration {
    let delay = jitter(range);
    sleep(delay).await;
    delay
}

/// Timing policy for one crawl
#[derive(Debug, Clone)]
pub struct RateGovernor {
    detail_delay: DelayRange,
    page_delay: DelayRange,
    cooldown_every: u32,
    cooldown: DelayRange,
}

impl RateGovernor {
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            detail_delay: config.detail_delay_secs,
            page_delay: config.page_delay_secs,
            cooldown_every: config.cooldown_every,
            cooldown: config.cooldown_secs,
        }
    }

    /// Pause after each processed detail page
    pub async fn delay_after_detail(&self) -> Duration {
        pause(self.detail_delay).await
    }

    /// Pause after each completed results page
    pub async fn delay_after_page(&self) -> Duration {
        pause(self.page_delay).await
    }

    /// Returns true if a cooldown is due after `details_processed` details
    pub fn cooldown_due(&self, details_processed: u64) -> bool {
        self.cooldown_every > 0
            && details_processed > 0
            && details_processed % u64::from(self.cooldown_every) == 0
    }

    /// Sleeps for a long cooldown every `cooldown-every` details
    ///
    /// # Returns
    ///
    /// The cooldown length, or `None` when no cooldown was due
    pub async fn maybe_cooldown(&self, details_processed: u64) -> Option<Duration> {
        if !self.cooldown_due(details_processed) {
            return None;
        }
        Some(pause(self.cooldown).await)
    }
}
