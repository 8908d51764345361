//! Database enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subscription lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and current.
    #[sea_orm(string_value = "active")]
    Active,
    /// In trial period.
    #[sea_orm(string_value = "trialing")]
    Trialing,
    /// Canceled by the user or by dunning.
    #[sea_orm(string_value = "canceled")]
    Canceled,
    /// Temporarily paused.
    #[sea_orm(string_value = "paused")]
    Paused,
}

/// Billing cadence.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    /// Billed monthly.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Billed yearly.
    #[sea_orm(string_value = "yearly")]
    Yearly,
}
