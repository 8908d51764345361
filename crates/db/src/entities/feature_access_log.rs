//! `SeaORM` Entity for the feature access audit log.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only: one row per access decision, never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "feature_access_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub feature_key: String,
    pub has_access: bool,
    pub current_tier: String,
    pub required_tier: Option<String>,
    pub context: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
