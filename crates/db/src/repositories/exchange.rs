//! Browser-to-IDE exchange tokens.
//!
//! A logged-in web session mints a short-lived, single-use token (and the
//! IDE device token it will hand over). The desktop bridge redeems it once;
//! redemption is a single conditional UPDATE so two concurrent redeemers
//! cannot both win.

use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::auth_exchanges;

/// Fixed literal prefix for exchange tokens.
pub const EXCHANGE_TOKEN_PREFIX: &str = "bt_ex_";

/// Repository for exchange token issue and redemption.
#[derive(Debug, Clone)]
pub struct ExchangeRepository {
    db: DatabaseConnection,
}

impl ExchangeRepository {
    /// Creates a new exchange repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Generates a fresh exchange token string.
    #[must_use]
    pub fn generate_token() -> String {
        let bytes: [u8; 32] = rand::random();
        format!("{EXCHANGE_TOKEN_PREFIX}{}", base64_url::encode(&bytes))
    }

    /// Returns whether a presented token has a plausible shape.
    ///
    /// Checked before touching storage so malformed requests never reach the
    /// database.
    #[must_use]
    pub fn is_well_formed(token: &str) -> bool {
        token.len() > EXCHANGE_TOKEN_PREFIX.len() && token.starts_with(EXCHANGE_TOKEN_PREFIX)
    }

    /// Creates an exchange token carrying `ide_token` for handoff.
    ///
    /// Returns the raw exchange token to show the browser.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        ide_token: &str,
        ttl_secs: u64,
    ) -> Result<String, DbErr> {
        let token = Self::generate_token();
        let now = Utc::now();
        #[allow(clippy::cast_possible_wrap)]
        let expires_at = now + Duration::seconds(ttl_secs as i64);

        let row = auth_exchanges::ActiveModel {
            id: Set(Uuid::new_v4()),
            token: Set(token.clone()),
            user_id: Set(user_id),
            ide_token: Set(ide_token.to_string()),
            used: Set(false),
            expires_at: Set(expires_at.into()),
            created_at: Set(now.into()),
        };
        row.insert(&self.db).await?;

        Ok(token)
    }

    /// Atomically consumes a token.
    ///
    /// One conditional UPDATE flips `used` only while the token is unused and
    /// unexpired; `rows_affected` decides the winner. Used, expired, and
    /// never-existed tokens all return `None` — callers must not distinguish
    /// them.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn consume(&self, token: &str) -> Result<Option<auth_exchanges::Model>, DbErr> {
        let now = Utc::now();

        let result = auth_exchanges::Entity::update_many()
            .col_expr(auth_exchanges::Column::Used, Expr::value(true))
            .filter(auth_exchanges::Column::Token.eq(token))
            .filter(auth_exchanges::Column::Used.eq(false))
            .filter(auth_exchanges::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        auth_exchanges::Entity::find()
            .filter(auth_exchanges::Column::Token.eq(token))
            .one(&self.db)
            .await
    }

    /// Deletes expired exchange rows (for maintenance).
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn cleanup_expired(&self) -> Result<u64, DbErr> {
        let result = auth_exchanges::Entity::delete_many()
            .filter(auth_exchanges::Column::ExpiresAt.lt(Utc::now()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = ExchangeRepository::generate_token();
        assert!(token.starts_with(EXCHANGE_TOKEN_PREFIX));
        assert!(ExchangeRepository::is_well_formed(&token));
    }

    #[test]
    fn test_well_formedness() {
        assert!(!ExchangeRepository::is_well_formed(""));
        assert!(!ExchangeRepository::is_well_formed("bt_ex_"));
        assert!(!ExchangeRepository::is_well_formed("session_abc123"));
        assert!(ExchangeRepository::is_well_formed("bt_ex_abc123"));
    }
}
