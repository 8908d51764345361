//! Fixed-window rate limiting keyed by `(operation, subject)`.
//!
//! The decision contract (allow/deny + remaining + retry-after) is fixed; the
//! backing store is behind [`RateLimitStore`] so a shared external store can
//! replace the in-process map without touching call sites. Counters are
//! per-instance and ephemeral; they are not expected to survive restart.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A per-call-site quota: at most `max_requests` per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    /// Ceiling for one window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Quota {
    /// Convenience constructor with the window in seconds.
    #[must_use]
    pub const fn per_seconds(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Time until the window resets. Zero when allowed.
    pub retry_after: Duration,
}

/// Backing store for window counters.
pub trait RateLimitStore: Send + Sync {
    /// Records one hit against `key` and returns the decision.
    fn hit(&self, key: &str, quota: Quota) -> RateLimitDecision;
}

struct Window {
    started_at: Instant,
    count: u32,
}

/// In-process window store backed by a concurrent map.
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    windows: DashMap<String, Window>,
}

impl InMemoryRateLimitStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn hit_at(&self, key: &str, quota: Quota, now: Instant) -> RateLimitDecision {
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        let elapsed = now.duration_since(entry.started_at);
        if elapsed >= quota.window {
            entry.started_at = now;
            entry.count = 0;
        }

        if entry.count >= quota.max_requests {
            let elapsed = now.duration_since(entry.started_at);
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after: quota.window.saturating_sub(elapsed),
            };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: quota.max_requests - entry.count,
            retry_after: Duration::ZERO,
        }
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn hit(&self, key: &str, quota: Quota) -> RateLimitDecision {
        self.hit_at(key, quota, Instant::now())
    }
}

/// Rate limiter guarding named operations per subject.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    /// Creates a limiter over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    /// Creates a limiter with the in-process store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRateLimitStore::new()))
    }

    /// Records one hit for `subject` against `operation`'s quota.
    ///
    /// The subject is a user id when authenticated, otherwise a derived
    /// client address.
    #[must_use]
    pub fn check(&self, operation: &str, subject: &str, quota: Quota) -> RateLimitDecision {
        self.store.hit(&format!("{operation}:{subject}"), quota)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_ceiling_then_denies() {
        let store = InMemoryRateLimitStore::new();
        let quota = Quota::per_seconds(3, 60);
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let decision = store.hit_at("op:user", quota, now);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = store.hit_at("op:user", quota, now);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert!(denied.retry_after > Duration::ZERO);
        assert!(denied.retry_after <= Duration::from_secs(60));
    }

    #[test]
    fn test_window_expiry_resets_counter() {
        let store = InMemoryRateLimitStore::new();
        let quota = Quota::per_seconds(1, 60);
        let now = Instant::now();

        assert!(store.hit_at("op:user", quota, now).allowed);
        assert!(!store.hit_at("op:user", quota, now).allowed);

        let later = now + Duration::from_secs(61);
        assert!(store.hit_at("op:user", quota, later).allowed);
    }

    #[test]
    fn test_keys_are_isolated() {
        let store = InMemoryRateLimitStore::new();
        let quota = Quota::per_seconds(1, 60);
        let now = Instant::now();

        assert!(store.hit_at("op:alice", quota, now).allowed);
        assert!(store.hit_at("op:bob", quota, now).allowed);
        assert!(!store.hit_at("op:alice", quota, now).allowed);
    }

    #[test]
    fn test_operations_are_isolated_per_subject() {
        let limiter = RateLimiter::in_memory();
        let quota = Quota::per_seconds(1, 60);

        assert!(limiter.check("check_feature", "u1", quota).allowed);
        assert!(limiter.check("track_usage", "u1", quota).allowed);
        assert!(!limiter.check("check_feature", "u1", quota).allowed);
    }

    #[test]
    fn test_retry_after_counts_down_remaining_window() {
        let store = InMemoryRateLimitStore::new();
        let quota = Quota::per_seconds(1, 60);
        let now = Instant::now();

        let _ = store.hit_at("op:user", quota, now);
        let denied = store.hit_at("op:user", quota, now + Duration::from_secs(45));
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after, Duration::from_secs(15));
    }
}
