//! Desktop IDE routes: authenticate, feature checks, export validation,
//! and project sync.
//!
//! Tier and quota denials are successful responses with `has_access` or
//! `allowed` set to false; error statuses are reserved for auth, rate
//! limiting, and storage failures.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::error;

use crate::AppState;
use crate::middleware::auth::{AuthUser, IdeDevice};
use crate::middleware::rate_limit::{CHECK_QUOTA, TOKEN_QUOTA, enforce};
use vantage_core::entitlements::features_for_tier;
use vantage_db::repositories::{AccessEngine, AuditRepository, LimitsRepository, UsageRepository};
use vantage_db::repositories::project::{ProjectRepository, SyncProjectInput};

/// Creates the IDE device-token routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ide/auth", post(authenticate))
        .route("/ide/check-feature", post(check_feature))
        .route("/ide/validate-export", post(validate_export))
}

/// Creates the IDE routes that use a web session instead.
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/ide/sync-project", post(sync_project))
}

#[derive(Debug, Deserialize)]
struct IdeAuthRequest {
    ide_version: String,
    platform: String,
}

/// POST /ide/auth - Resolve the device's entitlements in one shot.
///
/// The desktop client calls this at startup and caches the result; the
/// response carries the tier, the full features map, limits, and current
/// usage so no follow-up round trips are needed.
async fn authenticate(
    State(state): State<AppState>,
    device: IdeDevice,
    Json(payload): Json<IdeAuthRequest>,
) -> impl IntoResponse {
    let subject = device.user_id.to_string();
    if let Err(denied) = enforce(&state.rate_limiter, "ide_auth", &subject, TOKEN_QUOTA) {
        return denied;
    }

    let engine = AccessEngine::new((*state.db).clone());
    let tier = match engine.current_tier(device.user_id).await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, user_id = %device.user_id, "tier resolution failed");
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
        .snapshot(device.user_id)
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "usage snapshot failed");
            return storage_error();
        }
    };

    let features: Map<String, Value> = features_for_tier(tier)
        .into_iter()
        .map(|(key, unlocked)| (key.to_string(), Value::Bool(unlocked)))
        .collect();

    AuditRepository::new((*state.db).clone()).spawn_log_sync_event(
        device.user_id,
        "ide_auth".to_string(),
        json!({
            "platform": payload.platform,
            "ide_version": payload.ide_version,
            "registered_platform": device.platform,
            "registered_ide_version": device.ide_version,
        }),
    );

    (
        StatusCode::OK,
        Json(json!({
            "user_id": device.user_id,
            "tier": tier,
            "features": features,
            "limits": super::limits_json(&limits),
            "usage": usage,
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct CheckFeatureRequest {
    feature_key: String,
    #[serde(default)]
    context: Value,
}

/// POST /ide/check-feature - Gate one feature key.
async fn check_feature(
    State(state): State<AppState>,
    device: IdeDevice,
    Json(payload): Json<CheckFeatureRequest>,
) -> impl IntoResponse {
    let subject = device.user_id.to_string();
    if let Err(denied) = enforce(&state.rate_limiter, "check_feature", &subject, CHECK_QUOTA) {
        return denied;
    }

    let engine = AccessEngine::new((*state.db).clone());
    match engine
        .check_feature(device.user_id, &payload.feature_key, payload.context)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            error!(error = %e, feature_key = %payload.feature_key, "feature check failed");
            storage_error()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValidateExportRequest {
    export_format: String,
    model_size_mb: Option<f64>,
    #[allow(dead_code)]
    project_id: Option<String>,
}

/// POST /ide/validate-export - Gate a model export before it starts.
async fn validate_export(
    State(state): State<AppState>,
    device: IdeDevice,
    Json(payload): Json<ValidateExportRequest>,
) -> impl IntoResponse {
    let subject = device.user_id.to_string();
    if let Err(denied) = enforce(&state.rate_limiter, "validate_export", &subject, CHECK_QUOTA) {
        return denied;
    }

    let engine = AccessEngine::new((*state.db).clone());
    match engine
        .validate_export(device.user_id, &payload.export_format, payload.model_size_mb)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            error!(error = %e, format = %payload.export_format, "export validation failed");
            storage_error()
        }
    }
}

/// POST /ide/sync-project - Upsert a project snapshot pushed by the IDE.
async fn sync_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SyncProjectInput>,
) -> impl IntoResponse {
    let repo = ProjectRepository::new((*state.db).clone());
    match repo.sync(user.user_id(), &payload).await {
        Ok((project, created)) => {
            let projects_count = match repo.count_for_user(user.user_id()).await {
                Ok(count) => count,
                Err(e) => {
                    error!(error = %e, "project count failed");
                    return storage_error();
                }
            };
            AuditRepository::new((*state.db).clone()).spawn_log_sync_event(
                user.user_id(),
                "project_synced".to_string(),
                json!({
                    "ide_project_id": project.ide_project_id,
                    "created": created,
                    "models": payload.models.len(),
                }),
            );
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(json!({
                    "project": project,
                    "created": created,
                    "projects_count": projects_count,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "project sync failed");
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
