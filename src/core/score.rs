//! Dynamic priority scoring.
//!
//! `score = base(tier) + 0.5 * seconds_waited`. Scores are always computed from the
//! current instant and never cached, so a waiting request's score only grows.

use crate::core::request::{OrderRequest, Tier};

/// Score points gained per second of queue time.
pub const WAIT_WEIGHT: f64 = 0.5;

/// Seconds between `enqueued_at_ms` and `now_ms`, clamped at zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn wait_secs(enqueued_at_ms: u128, now_ms: u128) -> f64 {
    now_ms.saturating_sub(enqueued_at_ms) as f64 / 1000.0
}

/// Score of a request with the given tier and enqueue time, evaluated at `now_ms`.
#[must_use]
pub fn score_at(tier: Tier, enqueued_at_ms: u128, now_ms: u128) -> f64 {
    WAIT_WEIGHT.mul_add(wait_secs(enqueued_at_ms, now_ms), tier.base_priority())
}

/// Score of `request` evaluated at `now_ms`.
#[must_use]
pub fn score(request: &OrderRequest, now_ms: u128) -> f64 {
    score_at(request.customer_tier(), request.enqueued_at_ms(), now_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_scores() {
        assert!((score_at(Tier::Premium, 1_000, 1_000) - 20.0).abs() < f64::EPSILON);
        assert!((score_at(Tier::Standard, 1_000, 1_000) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wait_adds_half_point_per_second() {
        let s = score_at(Tier::Standard, 0, 25_000);
        assert!((s - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_clock_skew_never_reduces_score() {
        // "now" before enqueue time clamps to zero wait
        let s = score_at(Tier::Premium, 10_000, 5_000);
        assert!((s - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_is_non_decreasing_over_time() {
        let mut last = f64::MIN;
        for now in (0..60_000u128).step_by(250) {
            let s = score_at(Tier::Standard, 0, now);
            assert!(s >= last);
            last = s;
        }
    }

    #[test]
    fn test_twenty_seconds_closes_tier_gap() {
        let premium = score_at(Tier::Premium, 20_000, 40_000);
        let standard = score_at(Tier::Standard, 0, 40_000);
        assert!((premium - standard).abs() < 1e-9);
    }
}
