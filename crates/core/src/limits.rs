//! Per-tier usage ceilings.
//!
//! Limits are stored with a `-1` sentinel meaning "unlimited" and `NULL`
//! meaning "not applicable to this metric". Neither may ever be used as a
//! numeric comparison target: [`effective_cap`] normalizes both to `None`
//! before any check, and API responses surface them as `null`.

use serde::{Deserialize, Serialize};

/// Sentinel limit value meaning "no ceiling".
pub const UNLIMITED: i64 = -1;

/// Usage ceilings for one tier, as stored in the `usage_limits` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageLimits {
    /// Maximum concurrent projects.
    pub max_projects: Option<i64>,
    /// Maximum model exports per billing period.
    pub max_exports_per_month: Option<i64>,
    /// Maximum training runs per billing period.
    pub max_training_runs_per_month: Option<i64>,
    /// Maximum datasets.
    pub max_datasets: Option<i64>,
    /// Maximum GPU hours per billing period.
    pub max_gpu_hours_per_month: Option<f64>,
    /// Maximum exportable model size in megabytes.
    pub max_model_size_mb: Option<i64>,
}

impl UsageLimits {
    /// Effective export ceiling, `None` when unlimited or not applicable.
    #[must_use]
    pub fn export_cap(&self) -> Option<i64> {
        effective_cap(self.max_exports_per_month)
    }

    /// Effective training-run ceiling.
    #[must_use]
    pub fn training_run_cap(&self) -> Option<i64> {
        effective_cap(self.max_training_runs_per_month)
    }

    /// Effective project ceiling.
    #[must_use]
    pub fn project_cap(&self) -> Option<i64> {
        effective_cap(self.max_projects)
    }

    /// Effective dataset ceiling.
    #[must_use]
    pub fn dataset_cap(&self) -> Option<i64> {
        effective_cap(self.max_datasets)
    }

    /// Effective GPU-hour ceiling.
    #[must_use]
    pub fn gpu_hours_cap(&self) -> Option<f64> {
        self.max_gpu_hours_per_month
            .filter(|cap| *cap >= 0.0)
    }

    /// Effective model-size ceiling in MB.
    #[must_use]
    pub fn model_size_cap(&self) -> Option<i64> {
        effective_cap(self.max_model_size_mb)
    }
}

/// Normalizes a raw limit: `None` and the `-1` sentinel both mean "no cap".
#[must_use]
pub fn effective_cap(raw: Option<i64>) -> Option<i64> {
    raw.filter(|limit| *limit != UNLIMITED)
}

/// Counter values for one `(user, period)` ledger row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageSnapshot {
    /// Projects created.
    pub projects_count: i64,
    /// Exports performed this period.
    pub exports_count: i64,
    /// Training runs started this period.
    pub training_runs_count: i64,
    /// Datasets created.
    pub datasets_count: i64,
    /// Models created.
    pub models_count: i64,
    /// GPU hours consumed this period.
    pub gpu_hours_used: f64,
    /// Distinct export formats used this period.
    pub export_formats_used: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_never_a_cap() {
        assert_eq!(effective_cap(Some(UNLIMITED)), None);
        assert_eq!(effective_cap(None), None);
        assert_eq!(effective_cap(Some(10)), Some(10));
        assert_eq!(effective_cap(Some(0)), Some(0));
    }

    #[test]
    fn test_gpu_hours_sentinel() {
        let limits = UsageLimits {
            max_gpu_hours_per_month: Some(-1.0),
            ..UsageLimits::default()
        };
        assert_eq!(limits.gpu_hours_cap(), None);

        let limits = UsageLimits {
            max_gpu_hours_per_month: Some(5.0),
            ..UsageLimits::default()
        };
        assert_eq!(limits.gpu_hours_cap(), Some(5.0));
    }

    #[test]
    fn test_caps_pass_through() {
        let limits = UsageLimits {
            max_projects: Some(3),
            max_exports_per_month: Some(-1),
            max_training_runs_per_month: None,
            max_datasets: Some(5),
            max_gpu_hours_per_month: Some(1.0),
            max_model_size_mb: Some(100),
        };
        assert_eq!(limits.project_cap(), Some(3));
        assert_eq!(limits.export_cap(), None);
        assert_eq!(limits.training_run_cap(), None);
        assert_eq!(limits.dataset_cap(), Some(5));
        assert_eq!(limits.model_size_cap(), Some(100));
    }
}
