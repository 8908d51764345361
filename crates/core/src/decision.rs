//! Access decisions composed from tier, entitlement tables, and usage.
//!
//! Everything here is pure: callers resolve the tier and load ledger counters
//! first, then ask for a decision. Tier-insufficient, quota, and size denials
//! are distinct outcomes, not message-text variations.

use crate::entitlements::{export_format_tiers, feature_tiers};
use crate::limits::UsageLimits;
use crate::tier::Tier;
use crate::usage::UsageType;

/// Outcome of a feature check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDecision {
    /// Whether the tier unlocks the feature.
    pub has_access: bool,
    /// Minimum tier that unlocks the feature. `None` for unknown keys.
    pub required_tier: Option<Tier>,
}

/// Checks a feature key against the static table.
///
/// Unknown keys deny with `required_tier = None`, distinct from a
/// present-but-insufficient-tier denial.
#[must_use]
pub fn check_feature(tier: Tier, feature_key: &str) -> FeatureDecision {
    match feature_tiers(feature_key) {
        Some(tiers) => FeatureDecision {
            has_access: tiers.contains(&tier),
            required_tier: tiers.first().copied(),
        },
        None => FeatureDecision {
            has_access: false,
            required_tier: None,
        },
    }
}

/// Why an export was denied.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDenial {
    /// The tier does not unlock the format. `None` for unknown formats.
    TierRequired(Option<Tier>),
    /// The monthly export ceiling has been reached.
    LimitReached {
        /// The ceiling that was hit.
        limit: i64,
        /// Exports already performed this period.
        used: i64,
    },
    /// The model exceeds the tier's size ceiling.
    SizeExceeded {
        /// The ceiling in MB.
        limit_mb: i64,
        /// The requested model size in MB.
        size_mb: f64,
    },
}

/// Outcome of an export validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecision {
    /// The export may proceed.
    Allowed {
        /// Exports left this period after this one, `None` when unlimited.
        exports_remaining: Option<i64>,
    },
    /// The export is denied.
    Denied(ExportDenial),
}

/// Checks only the format-tier gate.
///
/// This is the first step of [`validate_export`], split out because it needs
/// no ledger state: callers can reject an under-tier request before reading
/// or creating any usage row.
#[must_use]
pub fn check_export_format(tier: Tier, format: &str) -> Option<ExportDenial> {
    let tiers = export_format_tiers(format);
    if tiers.is_some_and(|t| t.contains(&tier)) {
        None
    } else {
        Some(ExportDenial::TierRequired(
            tiers.and_then(|t| t.first().copied()),
        ))
    }
}

/// Validates an export request, short-circuiting at the first failure.
///
/// Check order is load-bearing: format tier, then monthly count, then model
/// size. A caller who is both under-tier and over-quota must see the tier
/// denial.
#[must_use]
pub fn validate_export(
    tier: Tier,
    format: &str,
    exports_count: i64,
    limits: &UsageLimits,
    model_size_mb: Option<f64>,
) -> ExportDecision {
    if let Some(denial) = check_export_format(tier, format) {
        return ExportDecision::Denied(denial);
    }

    let cap = limits.export_cap();
    if let Some(limit) = cap {
        if exports_count >= limit {
            return ExportDecision::Denied(ExportDenial::LimitReached {
                limit,
                used: exports_count,
            });
        }
    }

    if let (Some(size_mb), Some(limit_mb)) = (model_size_mb, limits.model_size_cap()) {
        #[allow(clippy::cast_precision_loss)]
        if size_mb > limit_mb as f64 {
            return ExportDecision::Denied(ExportDenial::SizeExceeded { limit_mb, size_mb });
        }
    }

    ExportDecision::Allowed {
        exports_remaining: cap.map(|limit| (limit - exports_count).max(0)),
    }
}

/// Returns whether a post-increment counter value has reached its cap.
///
/// Evaluated strictly after the increment: the request that lands exactly on
/// the cap is accepted and reported as limit-reached, not rejected.
#[must_use]
pub fn limit_reached(new_value: f64, cap: Option<f64>) -> bool {
    cap.is_some_and(|limit| new_value >= limit)
}

/// The cap applying to a usage type, normalized (`None` = no ceiling).
#[must_use]
pub fn cap_for_usage_type(usage_type: UsageType, limits: &UsageLimits) -> Option<f64> {
    #[allow(clippy::cast_precision_loss)]
    match usage_type {
        UsageType::GpuHours => limits.gpu_hours_cap(),
        UsageType::Export => limits.export_cap().map(|v| v as f64),
        UsageType::TrainingRun => limits.training_run_cap().map(|v| v as f64),
        UsageType::ProjectCreated => limits.project_cap().map(|v| v as f64),
        UsageType::DatasetCreated => limits.dataset_cap().map(|v| v as f64),
        // Models have no per-tier ceiling today; metered for reporting only.
        UsageType::ModelCreated => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train_pro_limits() -> UsageLimits {
        UsageLimits {
            max_projects: Some(50),
            max_exports_per_month: Some(10),
            max_training_runs_per_month: Some(100),
            max_datasets: Some(-1),
            max_gpu_hours_per_month: Some(50.0),
            max_model_size_mb: Some(2000),
        }
    }

    #[test]
    fn test_check_feature_membership() {
        for tier in Tier::ALL {
            let decision = check_feature(tier, "export_tensorrt");
            let expected = matches!(tier, Tier::DeployPro | Tier::Enterprise);
            assert_eq!(decision.has_access, expected, "tier {tier}");
            assert_eq!(decision.required_tier, Some(Tier::DeployPro));
        }
    }

    #[test]
    fn test_check_feature_unknown_key() {
        let decision = check_feature(Tier::Enterprise, "time_travel");
        assert!(!decision.has_access);
        assert_eq!(decision.required_tier, None);
    }

    #[test]
    fn test_format_gate_agrees_with_full_validation() {
        for tier in Tier::ALL {
            for format in ["onnx", "coreml", "tensorrt", "gguf"] {
                let gate = check_export_format(tier, format);
                let full = validate_export(tier, format, 0, &train_pro_limits(), None);
                match gate {
                    Some(denial) => {
                        assert_eq!(full, ExportDecision::Denied(denial), "{tier}/{format}");
                    }
                    None => assert!(
                        matches!(full, ExportDecision::Allowed { .. }),
                        "{tier}/{format}"
                    ),
                }
            }
        }
    }

    #[test]
    fn test_free_tier_tensorrt_denied_with_required_tier() {
        let decision = validate_export(Tier::Free, "tensorrt", 0, &train_pro_limits(), None);
        assert_eq!(
            decision,
            ExportDecision::Denied(ExportDenial::TierRequired(Some(Tier::DeployPro)))
        );
    }

    #[test]
    fn test_unknown_format_denied_without_required_tier() {
        let decision = validate_export(Tier::Enterprise, "gguf", 0, &train_pro_limits(), None);
        assert_eq!(decision, ExportDecision::Denied(ExportDenial::TierRequired(None)));
    }

    #[test]
    fn test_tier_denial_wins_over_count_denial() {
        // Over quota AND under tier: the tier message must win.
        let decision = validate_export(Tier::Free, "tensorrt", 99, &train_pro_limits(), None);
        assert!(matches!(
            decision,
            ExportDecision::Denied(ExportDenial::TierRequired(Some(Tier::DeployPro)))
        ));
    }

    #[test]
    fn test_count_limit_reached() {
        let decision = validate_export(Tier::TrainPro, "onnx", 10, &train_pro_limits(), None);
        assert_eq!(
            decision,
            ExportDecision::Denied(ExportDenial::LimitReached { limit: 10, used: 10 })
        );
    }

    #[test]
    fn test_fresh_period_full_allowance() {
        let decision = validate_export(Tier::TrainPro, "onnx", 0, &train_pro_limits(), None);
        assert_eq!(
            decision,
            ExportDecision::Allowed {
                exports_remaining: Some(10)
            }
        );
    }

    #[test]
    fn test_size_check_after_count_check() {
        let decision =
            validate_export(Tier::TrainPro, "onnx", 0, &train_pro_limits(), Some(2500.0));
        assert_eq!(
            decision,
            ExportDecision::Denied(ExportDenial::SizeExceeded {
                limit_mb: 2000,
                size_mb: 2500.0
            })
        );
    }

    #[test]
    fn test_size_check_skipped_when_unlimited() {
        let limits = UsageLimits {
            max_model_size_mb: Some(-1),
            ..train_pro_limits()
        };
        let decision = validate_export(Tier::TrainPro, "onnx", 0, &limits, Some(90000.0));
        assert!(matches!(decision, ExportDecision::Allowed { .. }));
    }

    #[test]
    fn test_unlimited_exports_remaining_is_none() {
        let limits = UsageLimits {
            max_exports_per_month: Some(-1),
            ..train_pro_limits()
        };
        let decision = validate_export(Tier::Enterprise, "tensorrt", 500, &limits, None);
        assert_eq!(
            decision,
            ExportDecision::Allowed {
                exports_remaining: None
            }
        );
    }

    #[test]
    fn test_limit_reached_is_boundary_inclusive() {
        assert!(!limit_reached(1.0, Some(2.0)));
        assert!(limit_reached(2.0, Some(2.0)));
        assert!(limit_reached(3.0, Some(2.0)));
        assert!(!limit_reached(1_000_000.0, None));
    }

    #[test]
    fn test_cap_for_usage_type_uses_effective_caps() {
        let limits = train_pro_limits();
        assert_eq!(cap_for_usage_type(UsageType::Export, &limits), Some(10.0));
        assert_eq!(cap_for_usage_type(UsageType::GpuHours, &limits), Some(50.0));
        // -1 sentinel on datasets surfaces as no cap.
        assert_eq!(cap_for_usage_type(UsageType::DatasetCreated, &limits), None);
        assert_eq!(cap_for_usage_type(UsageType::ModelCreated, &limits), None);
    }

    mod properties {
        use super::*;
        use crate::entitlements::export_format_tiers;
        use proptest::prelude::*;

        fn arb_tier() -> impl Strategy<Value = Tier> {
            prop::sample::select(Tier::ALL.to_vec())
        }

        fn arb_format() -> impl Strategy<Value = String> {
            prop_oneof![
                prop::sample::select(vec![
                    "onnx",
                    "tensorflow",
                    "pytorch",
                    "tensorrt",
                    "coreml",
                    "openvino",
                ])
                .prop_map(str::to_string),
                "[a-z]{1,12}",
            ]
        }

        proptest! {
            #[test]
            fn allowed_implies_tier_membership_and_room(
                tier in arb_tier(),
                format in arb_format(),
                exports_count in 0i64..10_000,
                cap in prop::option::of(-1i64..10_000),
            ) {
                let limits = UsageLimits {
                    max_exports_per_month: cap,
                    ..UsageLimits::default()
                };
                let decision = validate_export(tier, &format, exports_count, &limits, None);
                if let ExportDecision::Allowed { exports_remaining } = decision {
                    let tiers = export_format_tiers(&format);
                    prop_assert!(tiers.is_some_and(|t| t.contains(&tier)));
                    match limits.export_cap() {
                        Some(limit) => {
                            prop_assert!(exports_count < limit);
                            prop_assert_eq!(exports_remaining, Some(limit - exports_count));
                        }
                        None => prop_assert_eq!(exports_remaining, None),
                    }
                }
            }

            #[test]
            fn limit_reached_is_monotone(value in 0.0f64..1e6, cap in 0.0f64..1e6) {
                if limit_reached(value, Some(cap)) {
                    prop_assert!(limit_reached(value + 1.0, Some(cap)));
                }
                prop_assert!(!limit_reached(value, None));
            }
        }
    }
}
