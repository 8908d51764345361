//! Entitlement tier vocabulary.
//!
//! Tiers are ordered by capability superset, not numerically: `data_pro` and
//! `train_pro` sit in parallel above `free`, and individual features may skip
//! tiers. Membership checks always go through the per-feature tier lists in
//! [`crate::entitlements`], never through a numeric comparison.

use serde::{Deserialize, Serialize};

/// Entitlement tier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// No paid subscription.
    Free,
    /// Dataset tooling plan.
    DataPro,
    /// Training plan.
    TrainPro,
    /// Deployment plan.
    DeployPro,
    /// Enterprise plan.
    Enterprise,
}

impl Tier {
    /// All tiers, in capability order. The exact ordering is part of the
    /// entitlement contract and must be preserved when adding tiers.
    pub const ALL: [Self; 5] = [
        Self::Free,
        Self::DataPro,
        Self::TrainPro,
        Self::DeployPro,
        Self::Enterprise,
    ];

    /// Returns the wire string for this tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::DataPro => "data_pro",
            Self::TrainPro => "train_pro",
            Self::DeployPro => "deploy_pro",
            Self::Enterprise => "enterprise",
        }
    }

    /// Parses a tier from its wire string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "data_pro" => Some(Self::DataPro),
            "train_pro" => Some(Self::TrainPro),
            "deploy_pro" => Some(Self::DeployPro),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    /// Maps a subscription `plan_type` to a tier, defaulting to `free` for
    /// anything unrecognized.
    #[must_use]
    pub fn from_plan_type(plan_type: &str) -> Self {
        Self::parse(plan_type).unwrap_or(Self::Free)
    }

    /// Maps a legacy license type to the current tier vocabulary.
    ///
    /// Legacy desktop licenses predate the split into data/train/deploy
    /// plans: `pro` becomes `train_pro` and `enterprise` stays `enterprise`.
    /// Other values pass through when they are already valid tier names.
    #[must_use]
    pub fn from_legacy_license(license_type: &str) -> Self {
        match license_type {
            "pro" => Self::TrainPro,
            "enterprise" => Self::Enterprise,
            other => Self::parse(other).unwrap_or(Self::Free),
        }
    }

    /// Marketing-cased tier name for upgrade prompts ("Deploy Pro").
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::DataPro => "Data Pro",
            Self::TrainPro => "Train Pro",
            Self::DeployPro => "Deploy Pro",
            Self::Enterprise => "Enterprise",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Tier::Free, "free")]
    #[case(Tier::DataPro, "data_pro")]
    #[case(Tier::TrainPro, "train_pro")]
    #[case(Tier::DeployPro, "deploy_pro")]
    #[case(Tier::Enterprise, "enterprise")]
    fn test_round_trip(#[case] tier: Tier, #[case] s: &str) {
        assert_eq!(tier.as_str(), s);
        assert_eq!(Tier::parse(s), Some(tier));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Tier::parse("platinum"), None);
        assert_eq!(Tier::from_plan_type("platinum"), Tier::Free);
    }

    #[rstest]
    #[case("pro", Tier::TrainPro)]
    #[case("enterprise", Tier::Enterprise)]
    #[case("deploy_pro", Tier::DeployPro)]
    #[case("data_pro", Tier::DataPro)]
    #[case("perpetual", Tier::Free)]
    fn test_legacy_license_remap(#[case] license_type: &str, #[case] expected: Tier) {
        assert_eq!(Tier::from_legacy_license(license_type), expected);
    }

    #[test]
    fn test_display_name_title_case() {
        assert_eq!(Tier::DeployPro.display_name(), "Deploy Pro");
        assert_eq!(Tier::TrainPro.display_name(), "Train Pro");
    }

    #[test]
    fn test_serde_wire_format() {
        let json = serde_json::to_string(&Tier::DeployPro).unwrap();
        assert_eq!(json, "\"deploy_pro\"");
        let tier: Tier = serde_json::from_str("\"train_pro\"").unwrap();
        assert_eq!(tier, Tier::TrainPro);
    }
}
