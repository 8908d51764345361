//! Tier resolution.
//!
//! Every entry point that needs a tier goes through [`TierResolver`] so the
//! subscription-then-license fallback order lives (and is tested) in exactly
//! one place.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use vantage_core::Tier;

use crate::entities::{
    licenses,
    sea_orm_active_enums::SubscriptionStatus,
    subscriptions,
};

/// Resolves a user's effective entitlement tier.
#[derive(Debug, Clone)]
pub struct TierResolver {
    db: DatabaseConnection,
}

impl TierResolver {
    /// Creates a new tier resolver.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves the effective tier for a user.
    ///
    /// The most recent active or trialing subscription wins; otherwise the
    /// most recently issued active, unexpired legacy license (remapped to the
    /// current vocabulary); otherwise `free`. Missing records are not an
    /// error — storage failures are, and the caller must fail closed.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn resolve(&self, user_id: Uuid) -> Result<Tier, DbErr> {
        let subscription = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(
                subscriptions::Column::Status.is_in([
                    SubscriptionStatus::Active,
                    SubscriptionStatus::Trialing,
                ]),
            )
            .order_by_desc(subscriptions::Column::CreatedAt)
            .one(&self.db)
            .await?;

        if let Some(subscription) = subscription {
            let tier = Tier::from_plan_type(&subscription.plan_type);
            if tier != Tier::Free {
                return Ok(tier);
            }
        }

        // No (paid) subscription: fall back to the newest active legacy
        // license that has not expired.
        let license = licenses::Entity::find()
            .filter(licenses::Column::UserId.eq(user_id))
            .filter(licenses::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(licenses::Column::ExpiresAt.is_null())
                    .add(licenses::Column::ExpiresAt.gt(Utc::now())),
            )
            .order_by_desc(licenses::Column::IssuedAt)
            .one(&self.db)
            .await?;

        Ok(license
            .map(|l| Tier::from_legacy_license(&l.license_type))
            .unwrap_or(Tier::Free))
    }
}
