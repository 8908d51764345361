//! Long-lived IDE device tokens.
//!
//! The raw token is surfaced exactly once during the bridge handoff; only a
//! SHA-256 hash is stored, so a database leak does not leak credentials.

use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::ide_tokens;

/// Repository for IDE device token lifecycle.
#[derive(Debug, Clone)]
pub struct IdeTokenRepository {
    db: DatabaseConnection,
}

impl IdeTokenRepository {
    /// Creates a new IDE token repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn hash_token(raw: &str) -> String {
        let digest = Sha256::digest(raw.as_bytes());
        base64_url::encode(&digest)
    }

    /// Mints a device token for `user_id` and stores its hash.
    ///
    /// Returns the raw token; it cannot be recovered afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn mint(
        &self,
        user_id: Uuid,
        platform: &str,
        ide_version: &str,
        ttl_days: u64,
    ) -> Result<String, DbErr> {
        let bytes: [u8; 32] = rand::random();
        let raw = base64_url::encode(&bytes);
        let now = Utc::now();
        #[allow(clippy::cast_possible_wrap)]
        let expires_at = now + Duration::days(ttl_days as i64);

        let row = ide_tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token_hash: Set(Self::hash_token(&raw)),
            platform: Set(Some(platform.to_string())),
            ide_version: Set(Some(ide_version.to_string())),
            expires_at: Set(expires_at.into()),
            last_used_at: Set(None),
            created_at: Set(now.into()),
        };
        row.insert(&self.db).await?;

        Ok(raw)
    }

    /// Resolves a raw device token to its owning user.
    ///
    /// Returns `None` for unknown or expired tokens. A successful lookup
    /// also stamps `last_used_at`; that write is best-effort and a failure
    /// there does not fail validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup query fails.
    pub async fn validate(&self, raw: &str) -> Result<Option<ide_tokens::Model>, DbErr> {
        let now = Utc::now();
        let found = ide_tokens::Entity::find()
            .filter(ide_tokens::Column::TokenHash.eq(Self::hash_token(raw)))
            .filter(ide_tokens::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await?;

        if let Some(ref token) = found {
            let touch = ide_tokens::Entity::update_many()
                .col_expr(
                    ide_tokens::Column::LastUsedAt,
                    Expr::value(Some(sea_orm::prelude::DateTimeWithTimeZone::from(now))),
                )
                .filter(ide_tokens::Column::Id.eq(token.id))
                .exec(&self.db)
                .await;
            if let Err(err) = touch {
                tracing::warn!(error = %err, "failed to stamp last_used_at on ide token");
            }
        }

        Ok(found)
    }

    /// Revokes every device token belonging to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_for_user(&self, user_id: Uuid) -> Result<u64, DbErr> {
        let result = ide_tokens::Entity::delete_many()
            .filter(ide_tokens::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_distinct() {
        let a = IdeTokenRepository::hash_token("token-a");
        let b = IdeTokenRepository::hash_token("token-b");
        assert_eq!(a, IdeTokenRepository::hash_token("token-a"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_does_not_echo_input() {
        let raw = "super-secret-device-token";
        assert!(!IdeTokenRepository::hash_token(raw).contains(raw));
    }
}
