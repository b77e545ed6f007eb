//! Retry backoff and rate-limit pacing
//!
//! The backoff delay is `min(base * 2^retries, max)` plus a uniform jitter in
//! `[0, delay/2]`, so concurrent workers retrying against the same target do
//! not synchronize. The rate-limit pause is an independent uniform draw
//! applied between successfully completed cards, composed with (not replacing)
//! the backoff.

use std::time::Duration;

/// The deterministic part of the backoff: exponential growth capped at `max_ms`
pub fn capped_delay_ms(retries: u32, base_ms: u64, max_ms: u64) -> u64 {
    let factor = 1u64.checked_shl(retries).unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor).min(max_ms)
}

/// Computes the backoff delay for a retry, jitter included
///
/// Non-decreasing in expectation as `retries` grows; never exceeds
/// `1.5 * max_ms`.
pub fn backoff_delay(retries: u32, base_ms: u64, max_ms: u64) -> Duration {
    let delay_ms = capped_delay_ms(retries, base_ms, max_ms);
    let jitter_ms = fastrand::u64(0..=delay_ms / 2);
    Duration::from_millis(delay_ms + jitter_ms)
}

/// Draws the random pause inserted between completed cards
pub fn rate_limit_delay(min_ms: u64, max_ms: u64) -> Duration {
    let ms = fastrand::u64(min_ms..=max_ms);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capped_delay_grows_exponentially() {
        assert_eq!(capped_delay_ms(0, 2_000, 120_000), 2_000);
        assert_eq!(capped_delay_ms(1, 2_000, 120_000), 4_000);
        assert_eq!(capped_delay_ms(2, 2_000, 120_000), 8_000);
        assert_eq!(capped_delay_ms(5, 2_000, 120_000), 64_000);
    }

    #[test]
    fn test_capped_delay_respects_cap() {
        assert_eq!(capped_delay_ms(6, 2_000, 120_000), 120_000);
        assert_eq!(capped_delay_ms(63, 2_000, 120_000), 120_000);
        // Shift overflow saturates rather than wrapping
        assert_eq!(capped_delay_ms(200, 2_000, 120_000), 120_000);
    }

    #[test]
    fn test_capped_delay_is_monotone() {
        let mut previous = 0;
        for retries in 0..70 {
            let delay = capped_delay_ms(retries, 2_000, 120_000);
            assert!(delay >= previous);
            previous = delay;
        }
    }

    #[test]
    fn test_backoff_delay_within_jitter_bound() {
        for retries in 0..10 {
            let base = capped_delay_ms(retries, 2_000, 120_000);
            for _ in 0..50 {
                let delay = backoff_delay(retries, 2_000, 120_000).as_millis() as u64;
                assert!(delay >= base);
                assert!(delay <= base + base / 2);
                assert!(delay <= 120_000 * 3 / 2);
            }
        }
    }

    #[test]
    fn test_rate_limit_delay_within_range() {
        for _ in 0..100 {
            let delay = rate_limit_delay(2_000, 5_000).as_millis() as u64;
            assert!((2_000..=5_000).contains(&delay));
        }
    }

    #[test]
    fn test_rate_limit_delay_degenerate_range() {
        assert_eq!(rate_limit_delay(10, 10), Duration::from_millis(10));
    }

    #[test]
    fn test_zero_base_stays_zero() {
        assert_eq!(capped_delay_ms(4, 0, 120_000), 0);
        assert_eq!(backoff_delay(4, 0, 120_000), Duration::ZERO);
    }
}
