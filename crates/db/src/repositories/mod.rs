//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod access;
pub mod audit;
pub mod exchange;
pub mod ide_token;
pub mod limits;
pub mod project;
pub mod tier;
pub mod usage;
pub mod user;

pub use access::{AccessEngine, ExportDenialCode, ExportOutcome, FeatureOutcome, TrackOutcome};
pub use audit::AuditRepository;
pub use exchange::{EXCHANGE_TOKEN_PREFIX, ExchangeRepository};
pub use ide_token::IdeTokenRepository;
pub use limits::LimitsRepository;
pub use project::{ProjectRepository, SyncModelInput, SyncProjectInput};
pub use tier::TierResolver;
pub use usage::UsageRepository;
pub use user::UserRepository;
