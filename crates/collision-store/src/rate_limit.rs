//! Sliding-window rate limiting over a Redis sorted set.
//!
//! One set per principal per window size. Members are request nanosecond
//! timestamps scored by epoch seconds, so concurrent checks for the same
//! principal linearize through Redis.

use chrono::Utc;
use collision_core::{CollisionError, PrincipalId, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::cache::{rate_limit_key, RedisCache};

/// Outcome of one gate check, carrying everything the rate-limit headers need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Epoch seconds at which the oldest counted request leaves the window.
    pub reset_at: i64,
}

pub struct SlidingWindowLimiter {
    conn: ConnectionManager,
}

fn cache_err(e: redis::RedisError) -> CollisionError {
    CollisionError::Cache(e.to_string())
}

/// Pure decision arithmetic, split out from the Redis round trips.
fn decide(count: u32, limit: u32, oldest_score: Option<i64>, now: i64, window: i64) -> RateDecision {
    let reset_at = oldest_score.map_or(now + window, |oldest| (oldest + window).max(now));
    if count >= limit {
        RateDecision {
            allowed: false,
            limit,
            remaining: 0,
            reset_at,
        }
    } else {
        RateDecision {
            allowed: true,
            limit,
            remaining: limit.saturating_sub(count + 1),
            reset_at,
        }
    }
}

impl SlidingWindowLimiter {
    pub fn new(cache: &RedisCache) -> Self {
        Self {
            conn: cache.connection(),
        }
    }

    /// Evict expired members, count the window, and either deny or admit the
    /// request by recording its timestamp. A cache error propagates so the
    /// caller can fail open.
    pub async fn check(
        &self,
        principal_id: PrincipalId,
        window_seconds: u64,
        limit: u32,
    ) -> Result<RateDecision> {
        let mut conn = self.conn.clone();
        let key = rate_limit_key(principal_id, window_seconds);
        let now = Utc::now();
        let now_secs = now.timestamp();
        let cutoff = now_secs - window_seconds as i64;

        conn.zrembyscore::<_, _, _, ()>(&key, 0, cutoff)
            .await
            .map_err(cache_err)?;

        let count: u32 = conn.zcard(&key).await.map_err(cache_err)?;

        let oldest: Vec<(String, i64)> = conn
            .zrange_withscores(&key, 0, 0)
            .await
            .map_err(cache_err)?;
        let oldest_score = oldest.first().map(|(_, score)| *score);

        let decision = decide(count, limit, oldest_score, now_secs, window_seconds as i64);
        if !decision.allowed {
            return Ok(decision);
        }

        let member = now.timestamp_nanos_opt().unwrap_or(now_secs * 1_000_000_000);
        conn.zadd::<_, _, _, ()>(&key, member, now_secs)
            .await
            .map_err(cache_err)?;
        conn.expire::<_, ()>(&key, window_seconds as i64)
            .await
            .map_err(cache_err)?;

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denies_at_limit_with_zero_remaining() {
        let d = decide(10, 10, Some(1_000), 1_030, 60);
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
        assert_eq!(d.reset_at, 1_060);
    }

    #[test]
    fn admits_under_limit_and_counts_current_request() {
        let d = decide(3, 10, Some(1_000), 1_030, 60);
        assert!(d.allowed);
        assert_eq!(d.remaining, 6);
    }

    #[test]
    fn empty_window_resets_a_full_window_ahead() {
        let d = decide(0, 10, None, 2_000, 60);
        assert!(d.allowed);
        assert_eq!(d.remaining, 9);
        assert_eq!(d.reset_at, 2_060);
    }

    #[test]
    fn reset_never_lies_in_the_past() {
        let d = decide(10, 10, Some(100), 1_000, 60);
        assert_eq!(d.reset_at, 1_000);
    }

    #[test]
    fn last_slot_leaves_zero_remaining() {
        let d = decide(9, 10, Some(1_000), 1_010, 60);
        assert!(d.allowed);
        assert_eq!(d.remaining, 0);
    }
}
