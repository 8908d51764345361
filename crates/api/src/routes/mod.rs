//! API route definitions.

use axum::{Router, middleware};
use serde_json::{Value, json};

use crate::{
    AppState,
    middleware::auth::{auth_middleware, bridge_auth_middleware, ide_auth_middleware},
};
use vantage_core::UsageLimits;

pub mod account;
pub mod auth;
pub mod bridge;
pub mod health;
pub mod ide;
pub mod usage;

/// Creates the API router with routes grouped by auth flavor.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Desktop routes authenticated by IDE device token
    let ide_routes = Router::new()
        .merge(ide::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            ide_auth_middleware,
        ));

    // Web routes authenticated by session JWT
    let session_routes = Router::new()
        .merge(usage::routes())
        .merge(bridge::session_routes())
        .merge(account::routes())
        .merge(ide::session_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // The bridge consumer authenticated by shared secret
    let bridge_routes = Router::new()
        .merge(bridge::consumer_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            bridge_auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(ide_routes)
        .merge(session_routes)
        .merge(bridge_routes)
}

/// Wire form of a limits row.
///
/// The raw row may carry the `-1` sentinel or NULL; both mean "no ceiling"
/// and must reach clients as `null`, never as a number.
pub(crate) fn limits_json(limits: &UsageLimits) -> Value {
    json!({
        "max_projects": limits.project_cap(),
        "max_exports_per_month": limits.export_cap(),
        "max_training_runs_per_month": limits.training_run_cap(),
        "max_datasets": limits.dataset_cap(),
        "max_gpu_hours_per_month": limits.gpu_hours_cap(),
        "max_model_size_mb": limits.model_size_cap(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_json_never_leaks_the_sentinel() {
        let unlimited = UsageLimits {
            max_projects: Some(-1),
            max_exports_per_month: Some(-1),
            max_training_runs_per_month: Some(-1),
            max_datasets: None,
            max_gpu_hours_per_month: Some(-1.0),
            max_model_size_mb: Some(-1),
        };
        let payload = limits_json(&unlimited);
        for (key, value) in payload.as_object().expect("limits payload is an object") {
            assert!(value.is_null(), "{key} must surface as null, got {value}");
        }
    }

    #[test]
    fn test_limits_json_passes_real_ceilings_through() {
        let capped = UsageLimits {
            max_projects: Some(3),
            max_exports_per_month: Some(5),
            max_training_runs_per_month: Some(2),
            max_datasets: Some(5),
            max_gpu_hours_per_month: Some(1.0),
            max_model_size_mb: Some(100),
        };
        let payload = limits_json(&capped);
        assert_eq!(payload["max_exports_per_month"], 5);
        assert_eq!(payload["max_gpu_hours_per_month"], 1.0);
        assert_eq!(payload["max_model_size_mb"], 100);
    }
}
