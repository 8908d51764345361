//! Per-tier usage limits lookup.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

use vantage_core::Tier;
use vantage_core::limits::UsageLimits;

use crate::entities::usage_limits;

/// Reads the static `usage_limits` table (one row per tier).
#[derive(Debug, Clone)]
pub struct LimitsRepository {
    db: DatabaseConnection,
}

impl LimitsRepository {
    /// Creates a new limits repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Looks up the limits row for a tier by its exact wire string.
    ///
    /// A missing row yields the default (no ceilings apply); the seeder is
    /// expected to keep one row per tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn for_tier(&self, tier: Tier) -> Result<UsageLimits, DbErr> {
        let row = usage_limits::Entity::find_by_id(tier.as_str())
            .one(&self.db)
            .await?;

        Ok(row.map(into_limits).unwrap_or_default())
    }
}

fn into_limits(row: usage_limits::Model) -> UsageLimits {
    UsageLimits {
        max_projects: row.max_projects,
        max_exports_per_month: row.max_exports_per_month,
        max_training_runs_per_month: row.max_training_runs_per_month,
        max_datasets: row.max_datasets,
        max_gpu_hours_per_month: row.max_gpu_hours_per_month,
        max_model_size_mb: row.max_model_size_mb,
    }
}
