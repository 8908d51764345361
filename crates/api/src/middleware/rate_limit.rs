//! Per-operation rate limiting at the handler edge.
//!
//! Each sensitive call site names its operation and quota; the subject is
//! the authenticated user (or the bridge service). Denials are 429 with a
//! retry hint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use vantage_core::{Quota, RateLimiter};

/// Feature and export checks are chatty; the IDE polls them.
pub const CHECK_QUOTA: Quota = Quota::per_seconds(100, 60);
/// Usage tracking events.
pub const USAGE_QUOTA: Quota = Quota::per_seconds(60, 60);
/// Token issuance and redemption.
pub const TOKEN_QUOTA: Quota = Quota::per_seconds(20, 60);
/// Account deletion attempts.
pub const DELETION_QUOTA: Quota = Quota::per_seconds(3, 60);

/// Enforces `quota` for one hit of `operation` by `subject`.
///
/// # Errors
///
/// Returns a ready-to-send 429 response when the quota is exhausted.
pub fn enforce(
    limiter: &RateLimiter,
    operation: &str,
    subject: &str,
    quota: Quota,
) -> Result<(), Response> {
    let decision = limiter.check(operation, subject, quota);
    if decision.allowed {
        return Ok(());
    }

    let retry_after_secs = decision.retry_after.as_secs().max(1);
    Err((
        StatusCode::TOO_MANY_REQUESTS,
        [("retry-after", retry_after_secs.to_string())],
        Json(json!({
            "error": "rate_limited",
            "message": "Too many requests, slow down",
            "retry_after_secs": retry_after_secs
        })),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enforce_denies_past_quota() {
        let limiter = RateLimiter::in_memory();
        let quota = Quota::per_seconds(2, 60);

        assert!(enforce(&limiter, "op", "u1", quota).is_ok());
        assert!(enforce(&limiter, "op", "u1", quota).is_ok());
        let denied = enforce(&limiter, "op", "u1", quota);
        assert!(denied.is_err());
        // Another subject is unaffected.
        assert!(enforce(&limiter, "op", "u2", quota).is_ok());
    }
}
