//! `SeaORM` Entity for per-period usage ledger rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per `(user, billing period)`. `period_start` is always the first
/// instant of a calendar month; counters only increase within a period.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usage_tracking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub period_start: DateTimeWithTimeZone,
    pub projects_count: i64,
    pub exports_count: i64,
    pub training_runs_count: i64,
    pub datasets_count: i64,
    pub models_count: i64,
    #[sea_orm(column_type = "Double")]
    pub gpu_hours_used: f64,
    /// JSON array of distinct export formats used this period.
    pub export_formats_used: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
