//! Account-level routes: entitlements summary and account deletion.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::middleware::auth::AuthUser;
use crate::middleware::rate_limit::{DELETION_QUOTA, enforce};
use vantage_db::repositories::{
    AccessEngine, AuditRepository, IdeTokenRepository, LimitsRepository, UsageRepository,
    UserRepository,
};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entitlements", get(entitlements))
        .route("/account", delete(delete_account))
}

/// GET /entitlements - The billing UI's summary view.
///
/// Limits are surfaced normalized: unlimited and not-applicable both come
/// back as `null`, never a sentinel value.
async fn entitlements(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    let engine = AccessEngine::new((*state.db).clone());
    let tier = match engine.current_tier(user.user_id()).await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "tier resolution failed");
            return storage_error();
        }
    };
    let limits = match LimitsRepository::new((*state.db).clone()).for_tier(tier).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, "limits lookup failed");
            return storage_error();
        }
    };
    let usage = match UsageRepository::new((*state.db).clone())
        .snapshot(user.user_id())
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "usage snapshot failed");
            return storage_error();
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "tier": tier,
            "tier_display_name": tier.display_name(),
            "limits": super::limits_json(&limits),
            "usage": usage,
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct DeleteAccountRequest {
    confirm: String,
}

/// DELETE /account - Delete the authenticated user's account.
///
/// Requires the literal confirmation string "DELETE" (case-sensitive). The
/// audit row is written and awaited before anything is destroyed.
async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<DeleteAccountRequest>,
) -> impl IntoResponse {
    let subject = user.user_id().to_string();
    if let Err(denied) = enforce(&state.rate_limiter, "delete_account", &subject, DELETION_QUOTA) {
        return denied;
    }

    if payload.confirm != "DELETE" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "confirmation_required",
                "message": "Account deletion requires confirm to be exactly \"DELETE\""
            })),
        )
            .into_response();
    }

    let user_repo = UserRepository::new((*state.db).clone());
    let account = match user_repo.find_by_id(user.user_id()).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Account no longer exists"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "account lookup failed");
            return storage_error();
        }
    };

    // The audit trail must record intent before the destructive step; this
    // write is awaited, not spawned.
    let audit = AuditRepository::new((*state.db).clone());
    if let Err(e) = audit
        .log_admin_action(
            user.user_id(),
            "account_deleted",
            Some(user.user_id()),
            json!({ "email": account.email, "self_service": true }),
        )
        .await
    {
        error!(error = %e, "failed to write deletion audit row");
        return storage_error();
    }

    // Device tokens are revoked explicitly so the revocation count is on
    // record before the user row (and its cascades) disappears.
    let revoked = match IdeTokenRepository::new((*state.db).clone())
        .delete_for_user(user.user_id())
        .await
    {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "device token revocation failed");
            return storage_error();
        }
    };

    match user_repo.delete(user.user_id()).await {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Account no longer exists"
            })),
        )
            .into_response(),
        Ok(_) => {
            info!(user_id = %user.user_id(), revoked, "account deleted");
            (
                StatusCode::OK,
                Json(json!({ "message": "Account deleted" })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "account deletion failed");
            storage_error()
        }
    }
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
