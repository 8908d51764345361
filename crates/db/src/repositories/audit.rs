//! Audit trail writers.
//!
//! Feature checks, IDE sync events, and administrative actions are recorded
//! for later inspection. Writers come in two flavors: awaited, for paths
//! where the audit row must land before a destructive action, and spawned,
//! where the caller must not block on bookkeeping.

use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};
use serde_json::Value;
use uuid::Uuid;

use vantage_core::Tier;

use crate::entities::{admin_actions, feature_access_log, ide_sync_events};

/// Repository for audit log writes.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records the outcome of a feature access check.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn log_feature_access(
        &self,
        user_id: Uuid,
        feature_key: &str,
        has_access: bool,
        current_tier: Tier,
        required_tier: Option<Tier>,
        context: Value,
    ) -> Result<(), DbErr> {
        let row = feature_access_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            feature_key: Set(feature_key.to_string()),
            has_access: Set(has_access),
            current_tier: Set(current_tier.as_str().to_string()),
            required_tier: Set(required_tier.map(|t| t.as_str().to_string())),
            context: Set(Some(context)),
            created_at: Set(chrono::Utc::now().into()),
        };
        row.insert(&self.db).await?;
        Ok(())
    }

    /// Records an IDE sync event.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn log_sync_event(
        &self,
        user_id: Uuid,
        event_type: &str,
        payload: Value,
    ) -> Result<(), DbErr> {
        let row = ide_sync_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            event_type: Set(event_type.to_string()),
            payload: Set(Some(payload)),
            created_at: Set(chrono::Utc::now().into()),
        };
        row.insert(&self.db).await?;
        Ok(())
    }

    /// Records an administrative or account-level action.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn log_admin_action(
        &self,
        admin_user_id: Uuid,
        action_type: &str,
        target_user_id: Option<Uuid>,
        details: Value,
    ) -> Result<(), DbErr> {
        let row = admin_actions::ActiveModel {
            id: Set(Uuid::new_v4()),
            admin_user_id: Set(admin_user_id),
            action_type: Set(action_type.to_string()),
            target_user_id: Set(target_user_id),
            details: Set(Some(details)),
            created_at: Set(chrono::Utc::now().into()),
        };
        row.insert(&self.db).await?;
        Ok(())
    }

    /// Fire-and-forget variant of [`Self::log_feature_access`].
    ///
    /// The write runs on a spawned task; a failure is logged, never surfaced.
    pub fn spawn_log_feature_access(
        &self,
        user_id: Uuid,
        feature_key: String,
        has_access: bool,
        current_tier: Tier,
        required_tier: Option<Tier>,
        context: Value,
    ) {
        let repo = self.clone();
        tokio::spawn(async move {
            if let Err(err) = repo
                .log_feature_access(
                    user_id,
                    &feature_key,
                    has_access,
                    current_tier,
                    required_tier,
                    context,
                )
                .await
            {
                tracing::warn!(error = %err, %user_id, feature_key, "failed to write feature access log");
            }
        });
    }

    /// Fire-and-forget variant of [`Self::log_sync_event`].
    pub fn spawn_log_sync_event(&self, user_id: Uuid, event_type: String, payload: Value) {
        let repo = self.clone();
        tokio::spawn(async move {
            if let Err(err) = repo.log_sync_event(user_id, &event_type, payload).await {
                tracing::warn!(error = %err, %user_id, event_type, "failed to write ide sync event");
            }
        });
    }
}
