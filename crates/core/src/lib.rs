//! Core business logic for Vantage.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, entitlement rules, and decisions live here.
//!
//! # Modules
//!
//! - `tier` - Entitlement tier vocabulary and legacy license remapping
//! - `entitlements` - Static feature and export-format tier tables
//! - `limits` - Per-tier usage ceilings and the unlimited sentinel
//! - `decision` - Access decisions composed from tier, tables, and usage
//! - `usage` - Usage metering types and billing-period bucketing
//! - `ratelimit` - Fixed-window rate limiting with a swappable store
//! - `auth` - Password hashing

pub mod auth;
pub mod decision;
pub mod entitlements;
pub mod limits;
pub mod ratelimit;
pub mod tier;
pub mod usage;

pub use limits::{UsageLimits, UsageSnapshot};
pub use ratelimit::{Quota, RateLimitDecision, RateLimiter};
pub use tier::Tier;
pub use usage::UsageType;
