//! `SeaORM` entity definitions.

pub mod admin_actions;
pub mod auth_exchanges;
pub mod feature_access_log;
pub mod ide_sync_events;
pub mod ide_tokens;
pub mod licenses;
pub mod models;
pub mod projects;
pub mod sea_orm_active_enums;
pub mod subscriptions;
pub mod usage_limits;
pub mod usage_tracking;
pub mod users;
