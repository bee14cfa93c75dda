//! Inter-request pacing.
//!
//! The remote service enforces a requests-per-minute budget. Requests are
//! issued strictly sequentially, so staying under the budget only needs a
//! fixed pause between consecutive requests, not a token bucket. The pacer
//! is its own type, invoked between acquisitions, so the delay is testable
//! under paused time.

use std::time::Duration;

/// Fixed delay honoring a requests-per-minute budget.
#[derive(Debug, Clone, Copy)]
pub struct RequestPacer {
    delay: Duration,
}

impl RequestPacer {
    /// Pacer for a budget of `requests_per_minute`, with 5% headroom so
    /// clock jitter never lands a request over the limit.
    pub fn from_rate_limit(requests_per_minute: u32) -> Self {
        let effective = requests_per_minute.max(1) as f64 * 0.95;
        Self {
            delay: Duration::from_secs_f64(60.0 / effective),
        }
    }

    /// An explicit delay, mainly for tests.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Suspend until the budget allows the next request.
    pub async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_from_budget() {
        // 300 rpm with 5% headroom -> 60 / 285 seconds between requests
        let pacer = RequestPacer::from_rate_limit(300);
        let expected = 60.0 / (300.0 * 0.95);
        assert!((pacer.delay().as_secs_f64() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_one_request_per_minute() {
        let pacer = RequestPacer::from_rate_limit(1);
        assert!(pacer.delay() > Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_waits_the_full_delay() {
        let pacer = RequestPacer::with_delay(Duration::from_secs(12));
        let started = tokio::time::Instant::now();
        pacer.pause().await;
        assert_eq!(started.elapsed(), Duration::from_secs(12));
    }
}
