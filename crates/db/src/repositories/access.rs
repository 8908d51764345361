//! Entitlement checks wired to storage.
//!
//! [`AccessEngine`] composes the pure decision logic in `vantage_core` with
//! the tier resolver, limits table, usage ledger, and audit writers. Routes
//! call this, never the tables directly.

use sea_orm::{DatabaseConnection, DbErr};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use vantage_core::decision::{
    self, ExportDecision, ExportDenial, cap_for_usage_type, limit_reached,
};
use vantage_core::{Tier, UsageType};

use super::audit::AuditRepository;
use super::limits::LimitsRepository;
use super::tier::TierResolver;
use super::usage::UsageRepository;

/// Result of a feature check, shaped for the wire.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureOutcome {
    /// Whether the user's tier unlocks the feature.
    pub has_access: bool,
    /// The feature that was checked.
    pub feature_key: String,
    /// The user's resolved tier.
    pub current_tier: Tier,
    /// Minimum unlocking tier, absent for unknown keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_tier: Option<Tier>,
    /// Whether an upgrade would unlock the feature.
    pub upgrade_required: bool,
    /// Human-readable denial reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Machine-readable export denial kind.
///
/// Clients branch on this, never on the `reason` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportDenialCode {
    /// The format is not in the entitlement table at all.
    UnknownFormat,
    /// The tier does not unlock the format.
    TierRequired,
    /// The monthly export ceiling has been reached.
    LimitReached,
    /// The model exceeds the tier's size ceiling.
    SizeExceeded,
}

/// Result of an export validation, shaped for the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    /// Whether the export may proceed.
    pub allowed: bool,
    /// The requested format.
    pub format: String,
    /// The user's resolved tier.
    pub current_tier: Tier,
    /// Denial kind, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial: Option<ExportDenialCode>,
    /// Minimum unlocking tier when denied for tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_tier: Option<Tier>,
    /// Exports left this period; `null` when unlimited or when the denial
    /// kind makes the count irrelevant.
    pub exports_remaining: Option<i64>,
    /// Human-readable denial reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of a usage-tracking call, shaped for the wire.
#[derive(Debug, Clone, Serialize)]
pub struct TrackOutcome {
    /// The counter that was incremented.
    pub usage_type: UsageType,
    /// Post-increment counter value.
    pub new_value: f64,
    /// The cap for this counter; `null` when uncapped.
    pub limit: Option<f64>,
    /// Whether the counter has reached its cap. The triggering request is
    /// still accepted.
    pub limit_reached: bool,
}

/// Entitlement engine over the database.
#[derive(Debug, Clone)]
pub struct AccessEngine {
    tiers: TierResolver,
    limits: LimitsRepository,
    usage: UsageRepository,
    audit: AuditRepository,
}

impl AccessEngine {
    /// Creates an engine over `db`.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            tiers: TierResolver::new(db.clone()),
            limits: LimitsRepository::new(db.clone()),
            usage: UsageRepository::new(db.clone()),
            audit: AuditRepository::new(db),
        }
    }

    /// Resolves the user's current tier.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn current_tier(&self, user_id: Uuid) -> Result<Tier, DbErr> {
        self.tiers.resolve(user_id).await
    }

    /// Checks whether `user_id` may use `feature_key`.
    ///
    /// Every check is recorded, allowed or not.
    ///
    /// # Errors
    ///
    /// Returns an error if tier resolution fails. Audit failures never
    /// propagate.
    pub async fn check_feature(
        &self,
        user_id: Uuid,
        feature_key: &str,
        context: Value,
    ) -> Result<FeatureOutcome, DbErr> {
        let tier = self.tiers.resolve(user_id).await?;
        let decision = decision::check_feature(tier, feature_key);

        let reason = if decision.has_access {
            None
        } else {
            Some(match decision.required_tier {
                Some(required) => {
                    format!("{feature_key} requires the {} plan", required.display_name())
                }
                None => format!("unknown feature: {feature_key}"),
            })
        };

        self.audit.spawn_log_feature_access(
            user_id,
            feature_key.to_string(),
            decision.has_access,
            tier,
            decision.required_tier,
            context,
        );
        self.audit.spawn_log_sync_event(
            user_id,
            "feature_check".to_string(),
            json!({
                "feature_key": feature_key,
                "has_access": decision.has_access,
                "tier": tier,
            }),
        );

        Ok(FeatureOutcome {
            has_access: decision.has_access,
            feature_key: feature_key.to_string(),
            current_tier: tier,
            upgrade_required: !decision.has_access && decision.required_tier.is_some(),
            required_tier: decision.required_tier,
            reason,
        })
    }

    /// Validates an export of `format` for `user_id`.
    ///
    /// Denials are ordered: format tier first, then the monthly export count,
    /// then the model size.
    ///
    /// # Errors
    ///
    /// Returns an error if tier resolution or the ledger read fails.
    pub async fn validate_export(
        &self,
        user_id: Uuid,
        format: &str,
        model_size_mb: Option<f64>,
    ) -> Result<ExportOutcome, DbErr> {
        let tier = self.tiers.resolve(user_id).await?;
        let limits = self.limits.for_tier(tier).await?;

        // The format gate needs no ledger state; an under-tier caller must
        // not leave a zero-counter ledger row behind.
        let outcome = if let Some(denial) = decision::check_export_format(tier, format) {
            denied_outcome(format, tier, &denial, limits.export_cap(), 0)
        } else {
            let ledger = self.usage.get_or_create_current(user_id).await?;
            let decision = decision::validate_export(
                tier,
                format,
                ledger.exports_count,
                &limits,
                model_size_mb,
            );
            match decision {
                ExportDecision::Allowed { exports_remaining } => ExportOutcome {
                    allowed: true,
                    format: format.to_string(),
                    current_tier: tier,
                    denial: None,
                    required_tier: None,
                    exports_remaining,
                    reason: None,
                },
                ExportDecision::Denied(ref denial) => denied_outcome(
                    format,
                    tier,
                    denial,
                    limits.export_cap(),
                    ledger.exports_count,
                ),
            }
        };

        if !outcome.allowed {
            self.audit.spawn_log_feature_access(
                user_id,
                format!("export_{format}"),
                false,
                tier,
                outcome.required_tier,
                json!({
                    "format": format,
                    "model_size_mb": model_size_mb,
                    "denial": outcome.denial,
                    "reason": outcome.reason.clone(),
                }),
            );
        }

        Ok(outcome)
    }

    /// Records one unit of usage for `user_id`.
    ///
    /// Exactly one counter moves; `export` additionally records
    /// `details.export_format` in the period's format set. The counter that
    /// lands exactly on its cap is accepted and reported as limit-reached.
    ///
    /// # Errors
    ///
    /// Returns an error if any ledger write fails.
    pub async fn track_usage(
        &self,
        user_id: Uuid,
        usage_type: UsageType,
        amount: f64,
        details: &Value,
    ) -> Result<TrackOutcome, DbErr> {
        let tier = self.tiers.resolve(user_id).await?;
        let limits = self.limits.for_tier(tier).await?;

        let new_value = self.usage.increment(user_id, usage_type, amount).await?;

        if usage_type == UsageType::Export {
            if let Some(format) = details.get("export_format").and_then(Value::as_str) {
                self.usage.record_export_format(user_id, format).await?;
            }
        }

        let cap = cap_for_usage_type(usage_type, &limits);
        self.audit.spawn_log_sync_event(
            user_id,
            "usage_tracked".to_string(),
            json!({
                "usage_type": usage_type,
                "new_value": new_value,
                "details": details,
            }),
        );

        Ok(TrackOutcome {
            usage_type,
            new_value,
            limit: cap,
            limit_reached: limit_reached(new_value, cap),
        })
    }
}

/// Maps a pure denial onto the wire shape.
///
/// `exports_remaining` only reflects the counter where it is meaningful:
/// zero on the limit path, the true remainder on the size path, and `null`
/// on tier denials where no ledger was consulted.
fn denied_outcome(
    format: &str,
    tier: Tier,
    denial: &ExportDenial,
    export_cap: Option<i64>,
    exports_used: i64,
) -> ExportOutcome {
    let (code, required_tier, exports_remaining, reason) = match denial {
        ExportDenial::TierRequired(required) => match required {
            Some(required) => (
                ExportDenialCode::TierRequired,
                Some(*required),
                None,
                format!(
                    "Upgrade to {} to export {format} models",
                    required.display_name()
                ),
            ),
            None => (
                ExportDenialCode::UnknownFormat,
                None,
                None,
                format!("unknown export format: {format}"),
            ),
        },
        ExportDenial::LimitReached { limit, used } => (
            ExportDenialCode::LimitReached,
            None,
            Some(0),
            format!("monthly export limit reached ({used} of {limit})"),
        ),
        ExportDenial::SizeExceeded { limit_mb, size_mb } => (
            ExportDenialCode::SizeExceeded,
            None,
            export_cap.map(|limit| (limit - exports_used).max(0)),
            format!("model size {size_mb} MB exceeds the {limit_mb} MB ceiling"),
        ),
    };

    ExportOutcome {
        allowed: false,
        format: format.to_string(),
        current_tier: tier,
        denial: Some(code),
        required_tier,
        exports_remaining,
        reason: Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn without_reason(outcome: &ExportOutcome) -> Value {
        let mut value = serde_json::to_value(outcome).expect("outcome serializes");
        value
            .as_object_mut()
            .expect("outcome is an object")
            .remove("reason");
        value
    }

    #[test]
    fn test_denial_kinds_stay_distinct_without_reason_text() {
        let limit = denied_outcome(
            "onnx",
            Tier::TrainPro,
            &ExportDenial::LimitReached { limit: 10, used: 10 },
            Some(10),
            10,
        );
        let size = denied_outcome(
            "onnx",
            Tier::TrainPro,
            &ExportDenial::SizeExceeded {
                limit_mb: 100,
                size_mb: 250.0,
            },
            Some(10),
            3,
        );
        let tier = denied_outcome(
            "tensorrt",
            Tier::TrainPro,
            &ExportDenial::TierRequired(Some(Tier::DeployPro)),
            Some(10),
            0,
        );
        let unknown = denied_outcome(
            "gguf",
            Tier::TrainPro,
            &ExportDenial::TierRequired(None),
            Some(10),
            0,
        );

        let shapes = [
            without_reason(&limit),
            without_reason(&size),
            without_reason(&tier),
            without_reason(&unknown),
        ];
        for (i, a) in shapes.iter().enumerate() {
            for b in shapes.iter().skip(i + 1) {
                assert_ne!(a, b, "denial shapes must differ beyond the message text");
            }
        }

        assert_eq!(limit.denial, Some(ExportDenialCode::LimitReached));
        assert_eq!(size.denial, Some(ExportDenialCode::SizeExceeded));
        assert_eq!(tier.denial, Some(ExportDenialCode::TierRequired));
        assert_eq!(unknown.denial, Some(ExportDenialCode::UnknownFormat));
    }

    #[test]
    fn test_size_denial_reports_true_remaining_quota() {
        let outcome = denied_outcome(
            "onnx",
            Tier::TrainPro,
            &ExportDenial::SizeExceeded {
                limit_mb: 100,
                size_mb: 250.0,
            },
            Some(10),
            3,
        );
        assert_eq!(outcome.exports_remaining, Some(7));

        let uncapped = denied_outcome(
            "onnx",
            Tier::Enterprise,
            &ExportDenial::SizeExceeded {
                limit_mb: 100,
                size_mb: 250.0,
            },
            None,
            3,
        );
        assert_eq!(uncapped.exports_remaining, None);
    }

    #[test]
    fn test_tier_denial_carries_no_counter_data() {
        let outcome = denied_outcome(
            "tensorrt",
            Tier::Free,
            &ExportDenial::TierRequired(Some(Tier::DeployPro)),
            Some(5),
            2,
        );
        assert_eq!(outcome.exports_remaining, None);
        assert_eq!(outcome.required_tier, Some(Tier::DeployPro));
    }
}
