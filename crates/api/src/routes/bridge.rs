//! Browser-to-IDE handoff routes.
//!
//! A logged-in web session requests an exchange token; the desktop bridge
//! redeems it once with the shared bridge secret and receives the long-lived
//! IDE device token minted at issue time.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::AppState;
use crate::middleware::auth::AuthUser;
use crate::middleware::rate_limit::{TOKEN_QUOTA, enforce};
use vantage_db::repositories::{ExchangeRepository, IdeTokenRepository, TierResolver};

/// Creates the session-authenticated bridge routes.
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/bridge/exchange", post(create_exchange))
}

/// Creates the secret-authenticated bridge routes.
pub fn consumer_routes() -> Router<AppState> {
    Router::new().route("/bridge/consume", post(consume_exchange))
}

#[derive(Debug, Deserialize)]
struct CreateExchangeRequest {
    #[serde(default = "default_platform")]
    platform: String,
    #[serde(default = "default_ide_version")]
    ide_version: String,
}

fn default_platform() -> String {
    "unknown".to_string()
}

fn default_ide_version() -> String {
    "unknown".to_string()
}

/// POST /bridge/exchange - Issue a single-use exchange token.
///
/// The IDE device token is minted here, up front; redemption later only
/// flips the exchange row to used.
async fn create_exchange(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateExchangeRequest>,
) -> impl IntoResponse {
    let subject = user.user_id().to_string();
    if let Err(denied) = enforce(&state.rate_limiter, "bridge_exchange", &subject, TOKEN_QUOTA) {
        return denied;
    }

    let ide_tokens = IdeTokenRepository::new((*state.db).clone());
    let ide_token = match ide_tokens
        .mint(
            user.user_id(),
            &payload.platform,
            &payload.ide_version,
            u64::from(state.config.bridge.ide_token_ttl_days),
        )
        .await
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "failed to mint ide token");
            return storage_error();
        }
    };

    let exchanges = ExchangeRepository::new((*state.db).clone());

    // Expired rows can never be redeemed; issuing is the purge point.
    if let Err(e) = exchanges.cleanup_expired().await {
        warn!(error = %e, "expired exchange cleanup failed");
    }

    let ttl_secs = state.config.bridge.exchange_token_ttl_secs;
    match exchanges.create(user.user_id(), &ide_token, ttl_secs).await {
        Ok(token) => {
            info!(user_id = %user.user_id(), "exchange token issued");
            (
                StatusCode::CREATED,
                Json(json!({
                    "exchange_token": token,
                    "expires_in_secs": ttl_secs
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to create exchange token");
            storage_error()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConsumeRequest {
    token: String,
}

/// POST /bridge/consume - Redeem an exchange token, at most once.
///
/// Used, expired, and never-existed tokens all get the same generic
/// rejection.
async fn consume_exchange(
    State(state): State<AppState>,
    Json(payload): Json<ConsumeRequest>,
) -> impl IntoResponse {
    // The bridge is one service; its quota is shared.
    if let Err(denied) = enforce(&state.rate_limiter, "bridge_consume", "bridge", TOKEN_QUOTA) {
        return denied;
    }

    if !ExchangeRepository::is_well_formed(&payload.token) {
        return invalid_token_response();
    }

    let exchanges = ExchangeRepository::new((*state.db).clone());
    let row = match exchanges.consume(&payload.token).await {
        Ok(Some(row)) => row,
        Ok(None) => return invalid_token_response(),
        Err(e) => {
            error!(error = %e, "exchange consume failed");
            return storage_error();
        }
    };

    // Tier metadata is best-effort; the redemption already succeeded.
    let tier = match TierResolver::new((*state.db).clone())
        .resolve(row.user_id)
        .await
    {
        Ok(tier) => Some(tier),
        Err(e) => {
            warn!(error = %e, user_id = %row.user_id, "tier lookup failed during consume");
            None
        }
    };

    info!(user_id = %row.user_id, "exchange token redeemed");
    (
        StatusCode::OK,
        Json(json!({
            "user_id": row.user_id,
            "ide_token": row.ide_token,
            "tier": tier
        })),
    )
        .into_response()
}

fn invalid_token_response() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_token",
            "message": "Invalid or expired exchange token"
        })),
    )
        .into_response()
}

fn storage_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "A storage error occurred"
        })),
    )
        .into_response()
}
