//! Per-period usage ledger.
//!
//! One row per `(user, calendar month)`, created lazily on first use.
//! Counter updates go through a single `UPDATE ... SET c = c + delta` so
//! concurrent increments from the same user cannot undercount; a read-then-
//! write round trip would lose updates under load.

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use vantage_core::limits::UsageSnapshot;
use vantage_core::usage::{UsageType, period_start};

use crate::entities::usage_tracking;

/// Repository for the usage ledger.
#[derive(Debug, Clone)]
pub struct UsageRepository {
    db: DatabaseConnection,
}

impl UsageRepository {
    /// Creates a new usage repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets or lazily creates the ledger row for the current period.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn get_or_create_current(&self, user_id: Uuid) -> Result<usage_tracking::Model, DbErr> {
        let period = period_start(Utc::now());

        if let Some(row) = self.find_current(user_id).await? {
            return Ok(row);
        }

        let now = Utc::now();
        let row = usage_tracking::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            period_start: Set(period.into()),
            projects_count: Set(0),
            exports_count: Set(0),
            training_runs_count: Set(0),
            datasets_count: Set(0),
            models_count: Set(0),
            gpu_hours_used: Set(0.0),
            export_formats_used: Set(serde_json::json!([])),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        // Two racing first-uses may both insert; the unique (user, period)
        // index lets exactly one win and the loser re-reads.
        usage_tracking::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    usage_tracking::Column::UserId,
                    usage_tracking::Column::PeriodStart,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await?;

        self.find_current(user_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("usage row missing after insert".to_string()))
    }

    /// Finds the current period's ledger row without creating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_current(&self, user_id: Uuid) -> Result<Option<usage_tracking::Model>, DbErr> {
        let period = period_start(Utc::now());
        usage_tracking::Entity::find()
            .filter(usage_tracking::Column::UserId.eq(user_id))
            .filter(usage_tracking::Column::PeriodStart.eq(period))
            .one(&self.db)
            .await
    }

    /// Returns the current period's counters, zeros when no row exists yet.
    ///
    /// Reading never creates a row; rows appear on first mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn snapshot(&self, user_id: Uuid) -> Result<UsageSnapshot, DbErr> {
        Ok(self
            .find_current(user_id)
            .await?
            .map(into_snapshot)
            .unwrap_or_default())
    }

    /// Atomically adds `amount` to the counter for `usage_type` and returns
    /// the post-increment value.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn increment(
        &self,
        user_id: Uuid,
        usage_type: UsageType,
        amount: f64,
    ) -> Result<f64, DbErr> {
        // Counters are integral except GPU hours.
        let row = self.get_or_create_current(user_id).await?;
        let now = Utc::now();

        let update = usage_tracking::Entity::update_many()
            .filter(usage_tracking::Column::Id.eq(row.id))
            .col_expr(
                usage_tracking::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(now)),
            );

        let update = match usage_type {
            UsageType::GpuHours => update.col_expr(
                usage_tracking::Column::GpuHoursUsed,
                Expr::col(usage_tracking::Column::GpuHoursUsed).add(amount),
            ),
            UsageType::Export => update.col_expr(
                usage_tracking::Column::ExportsCount,
                Expr::col(usage_tracking::Column::ExportsCount).add(1i64),
            ),
            UsageType::TrainingRun => update.col_expr(
                usage_tracking::Column::TrainingRunsCount,
                Expr::col(usage_tracking::Column::TrainingRunsCount).add(1i64),
            ),
            UsageType::ProjectCreated => update.col_expr(
                usage_tracking::Column::ProjectsCount,
                Expr::col(usage_tracking::Column::ProjectsCount).add(1i64),
            ),
            UsageType::DatasetCreated => update.col_expr(
                usage_tracking::Column::DatasetsCount,
                Expr::col(usage_tracking::Column::DatasetsCount).add(1i64),
            ),
            UsageType::ModelCreated => update.col_expr(
                usage_tracking::Column::ModelsCount,
                Expr::col(usage_tracking::Column::ModelsCount).add(1i64),
            ),
        };

        update.exec(&self.db).await?;

        let updated = self
            .find_current(user_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("usage row vanished".to_string()))?;

        #[allow(clippy::cast_precision_loss)]
        Ok(match usage_type {
            UsageType::GpuHours => updated.gpu_hours_used,
            UsageType::Export => updated.exports_count as f64,
            UsageType::TrainingRun => updated.training_runs_count as f64,
            UsageType::ProjectCreated => updated.projects_count as f64,
            UsageType::DatasetCreated => updated.datasets_count as f64,
            UsageType::ModelCreated => updated.models_count as f64,
        })
    }

    /// Appends an export format to the period's format set if not present.
    ///
    /// Set semantics only; losing a duplicate append under a race is benign,
    /// unlike a lost counter increment.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn record_export_format(&self, user_id: Uuid, format: &str) -> Result<(), DbErr> {
        let row = self.get_or_create_current(user_id).await?;

        let mut formats: Vec<String> =
            serde_json::from_value(row.export_formats_used.clone()).unwrap_or_default();
        if formats.iter().any(|f| f == format) {
            return Ok(());
        }
        formats.push(format.to_string());

        let mut active: usage_tracking::ActiveModel = row.into();
        active.export_formats_used = Set(serde_json::json!(formats));
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        Ok(())
    }
}

fn into_snapshot(row: usage_tracking::Model) -> UsageSnapshot {
    UsageSnapshot {
        projects_count: row.projects_count,
        exports_count: row.exports_count,
        training_runs_count: row.training_runs_count,
        datasets_count: row.datasets_count,
        models_count: row.models_count,
        gpu_hours_used: row.gpu_hours_used,
        export_formats_used: serde_json::from_value(row.export_formats_used).unwrap_or_default(),
    }
}
