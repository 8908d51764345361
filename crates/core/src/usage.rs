//! Usage metering types and billing-period bucketing.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The kinds of usage the ledger meters.
///
/// This is a closed set: request payloads carrying anything else fail to
/// deserialize before any ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    /// Fractional GPU hours consumed by a training or inference job.
    GpuHours,
    /// A completed model export.
    Export,
    /// A started training run.
    TrainingRun,
    /// A newly created project.
    ProjectCreated,
    /// A newly created dataset.
    DatasetCreated,
    /// A newly created model.
    ModelCreated,
}

impl UsageType {
    /// Wire string for audit rows and sync events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GpuHours => "gpu_hours",
            Self::Export => "export",
            Self::TrainingRun => "training_run",
            Self::ProjectCreated => "project_created",
            Self::DatasetCreated => "dataset_created",
            Self::ModelCreated => "model_created",
        }
    }
}

/// Returns the first instant of the calendar month containing `now`.
///
/// Every usage ledger row is keyed by this bucket; rows for past periods are
/// never created retroactively.
#[must_use]
pub fn period_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_start_truncates_to_month() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 17, 45, 12).unwrap();
        let start = period_start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_period_start_is_idempotent() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(period_start(now), now);
    }

    #[test]
    fn test_adjacent_months_get_distinct_buckets() {
        let jan = period_start(Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap());
        let feb = period_start(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_ne!(jan, feb);
    }

    #[test]
    fn test_usage_type_wire_format() {
        let parsed: UsageType = serde_json::from_str("\"gpu_hours\"").unwrap();
        assert_eq!(parsed, UsageType::GpuHours);
        assert_eq!(parsed.as_str(), "gpu_hours");

        let invalid: Result<UsageType, _> = serde_json::from_str("\"disk_io\"");
        assert!(invalid.is_err());
    }
}
