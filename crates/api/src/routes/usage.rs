//! Usage tracking route.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use crate::AppState;
use crate::middleware::auth::AuthUser;
use crate::middleware::rate_limit::{USAGE_QUOTA, enforce};
use vantage_core::UsageType;
use vantage_db::AccessEngine;

/// Creates the usage routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/usage/track", post(track))
}

#[derive(Debug, Deserialize)]
struct TrackRequest {
    /// Closed enum; unknown values are rejected at deserialization, before
    /// any counter moves.
    usage_type: UsageType,
    amount: Option<f64>,
    #[serde(default)]
    details: Value,
}

/// POST /usage/track - Record one unit of metered usage.
///
/// The request that lands a counter exactly on its cap is still accepted;
/// `limit_reached` in the response tells the client to stop.
async fn track(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TrackRequest>,
) -> impl IntoResponse {
    let subject = user.user_id().to_string();
    if let Err(denied) = enforce(&state.rate_limiter, "track_usage", &subject, USAGE_QUOTA) {
        return denied;
    }

    let amount = payload.amount.unwrap_or(1.0);
    if !amount.is_finite() || amount < 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "amount must be a non-negative number"
            })),
        )
            .into_response();
    }

    let engine = AccessEngine::new((*state.db).clone());
    match engine
        .track_usage(user.user_id(), payload.usage_type, amount, &payload.details)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            error!(error = %e, usage_type = ?payload.usage_type, "usage tracking failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "A storage error occurred"
                })),
            )
                .into_response()
        }
    }
}
