//! `SeaORM` Entity for per-tier usage limits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Static per-tier ceilings, one row per tier. `-1` means unlimited, `NULL`
/// means not applicable to the metric.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usage_limits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tier: String,
    pub max_projects: Option<i64>,
    pub max_exports_per_month: Option<i64>,
    pub max_training_runs_per_month: Option<i64>,
    pub max_datasets: Option<i64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub max_gpu_hours_per_month: Option<f64>,
    pub max_model_size_mb: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
