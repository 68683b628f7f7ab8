use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::time::Duration;

/// Minimum spacing between outbound remote-analysis requests
///
/// Backed by a single-cell GCRA limiter: the first `wait` passes
/// immediately, each later one waits until `min_interval` has elapsed since
/// the previous one was released. A zero interval disables spacing.
pub struct RateLimiter {
    limiter: Option<DefaultDirectRateLimiter>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        let limiter = Quota::with_period(min_interval)
            .map(|quota| quota.allow_burst(NonZeroU32::MIN))
            .map(governor::RateLimiter::direct);

        Self {
            limiter,
            min_interval,
        }
    }

    /// Suspend until the next request may be issued
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
