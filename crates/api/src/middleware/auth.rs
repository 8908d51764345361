//! Authentication middleware for the three auth flavors.
//!
//! Session JWTs protect the web routes, IDE device tokens protect the
//! desktop routes, and a fixed shared secret authenticates the bridge
//! service. Each route accepts exactly one flavor.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use vantage_db::IdeTokenRepository;
use vantage_shared::Claims;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

fn bearer_from_request(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
}

fn missing_token_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "missing_token",
            "message": "Authorization header with Bearer token is required"
        })),
    )
        .into_response()
}

/// Session authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_from_request(&request) else {
        return missing_token_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let (error, message) = match e {
                vantage_shared::JwtError::Expired => ("token_expired", "Token has expired"),
                _ => ("invalid_token", "Invalid or malformed token"),
            };
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response()
        }
    }
}

/// The desktop IDE identity resolved from a device token.
#[derive(Debug, Clone)]
pub struct IdeDevice {
    /// Owning user.
    pub user_id: Uuid,
    /// Platform recorded when the token was minted.
    pub platform: String,
    /// IDE version recorded when the token was minted.
    pub ide_version: String,
}

/// IDE device token middleware.
///
/// Resolves the bearer token against stored token hashes. Unknown and
/// expired tokens get the same generic rejection.
pub async fn ide_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_from_request(&request) else {
        return missing_token_response();
    };
    let token = token.to_string();

    let repo = IdeTokenRepository::new((*state.db).clone());
    match repo.validate(&token).await {
        Ok(Some(row)) => {
            request.extensions_mut().insert(IdeDevice {
                user_id: row.user_id,
                platform: row.platform.unwrap_or_else(|| "unknown".to_string()),
                ide_version: row.ide_version.unwrap_or_else(|| "unknown".to_string()),
            });
            next.run(request).await
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_token",
                "message": "Invalid or expired IDE token"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "ide token lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred during authentication"
                })),
            )
                .into_response()
        }
    }
}

/// Bridge secret middleware for the exchange consumer.
///
/// The bridge is a service, not a user: the bearer value must equal the
/// configured shared secret.
pub async fn bridge_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_from_request(&request) else {
        return missing_token_response();
    };

    if token == state.config.bridge.secret {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_bridge_secret",
                "message": "Bridge authentication failed"
            })),
        )
            .into_response()
    }
}

/// Extractor for authenticated user claims.
///
/// Use this in handlers to get the authenticated user's claims:
///
/// ```ignore
/// async fn handler(claims: AuthUser) -> impl IntoResponse {
///     let user_id = claims.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.0.user_id()
    }

    /// Returns the inner claims.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "unauthorized",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}

impl<S> FromRequestParts<S> for IdeDevice
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "unauthorized",
                    "message": "IDE authentication required"
                })),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("abc"), None);
    }
}
