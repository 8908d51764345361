//! Static entitlement tables.
//!
//! Two mappings gate product functionality: feature keys and model export
//! formats, each mapping to the list of tiers that unlock them. The first
//! element of every list is the minimum required tier and drives upgrade
//! messaging. Lists may skip tiers; the per-feature list is authoritative,
//! not any global tier ordering.

use crate::tier::Tier;

use Tier::{DataPro, DeployPro, Enterprise, Free, TrainPro};

/// Feature key to unlocking tiers. First entry is the minimum required tier.
const FEATURE_TIERS: &[(&str, &[Tier])] = &[
    ("model_zoo", &[Free, DataPro, TrainPro, DeployPro, Enterprise]),
    ("dataset_manager", &[DataPro, TrainPro, DeployPro, Enterprise]),
    ("annotation_studio", &[DataPro, TrainPro, DeployPro, Enterprise]),
    ("model_training", &[TrainPro, DeployPro, Enterprise]),
    // Skips deploy_pro: custom loops are a training-plan differentiator.
    ("custom_training_loops", &[TrainPro, Enterprise]),
    ("export_onnx", &[Free, DataPro, TrainPro, DeployPro, Enterprise]),
    ("export_tensorflow", &[TrainPro, DeployPro, Enterprise]),
    ("export_pytorch", &[TrainPro, DeployPro, Enterprise]),
    ("export_tensorrt", &[DeployPro, Enterprise]),
    ("export_coreml", &[DeployPro, Enterprise]),
    ("export_openvino", &[DeployPro, Enterprise]),
    ("cloud_deployment", &[DeployPro, Enterprise]),
    ("edge_deployment", &[DeployPro, Enterprise]),
    ("priority_gpu_scheduling", &[DeployPro, Enterprise]),
    ("full_audit_logs", &[Enterprise]),
    ("team_collaboration", &[Enterprise]),
];

/// Export format to unlocking tiers. Same convention as `FEATURE_TIERS`.
const EXPORT_FORMAT_TIERS: &[(&str, &[Tier])] = &[
    ("onnx", &[Free, DataPro, TrainPro, DeployPro, Enterprise]),
    ("tensorflow", &[TrainPro, DeployPro, Enterprise]),
    ("pytorch", &[TrainPro, DeployPro, Enterprise]),
    ("tensorrt", &[DeployPro, Enterprise]),
    ("coreml", &[DeployPro, Enterprise]),
    ("openvino", &[DeployPro, Enterprise]),
];

/// Looks up the tier list for a feature key.
#[must_use]
pub fn feature_tiers(feature_key: &str) -> Option<&'static [Tier]> {
    FEATURE_TIERS
        .iter()
        .find(|(key, _)| *key == feature_key)
        .map(|(_, tiers)| *tiers)
}

/// Looks up the tier list for an export format.
#[must_use]
pub fn export_format_tiers(format: &str) -> Option<&'static [Tier]> {
    EXPORT_FORMAT_TIERS
        .iter()
        .find(|(key, _)| *key == format)
        .map(|(_, tiers)| *tiers)
}

/// All feature keys with whether the given tier unlocks them.
///
/// Used by the IDE authenticate handler to push a full features map to the
/// desktop client in one response.
#[must_use]
pub fn features_for_tier(tier: Tier) -> Vec<(&'static str, bool)> {
    FEATURE_TIERS
        .iter()
        .map(|(key, tiers)| (*key, tiers.contains(&tier)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_membership() {
        for (key, tiers) in FEATURE_TIERS {
            for tier in Tier::ALL {
                let unlocked = feature_tiers(key).is_some_and(|t| t.contains(&tier));
                assert_eq!(
                    unlocked,
                    tiers.contains(&tier),
                    "membership mismatch for {key}/{tier}"
                );
            }
        }
    }

    #[test]
    fn test_unknown_feature_is_absent() {
        assert!(feature_tiers("quantum_upscaling").is_none());
        assert!(export_format_tiers("gguf").is_none());
    }

    #[test]
    fn test_minimum_tier_is_first() {
        assert_eq!(feature_tiers("export_tensorrt").unwrap()[0], Tier::DeployPro);
        assert_eq!(feature_tiers("model_training").unwrap()[0], Tier::TrainPro);
        assert_eq!(export_format_tiers("tensorrt").unwrap()[0], Tier::DeployPro);
        assert_eq!(export_format_tiers("onnx").unwrap()[0], Tier::Free);
    }

    #[test]
    fn test_feature_may_skip_tiers() {
        let tiers = feature_tiers("custom_training_loops").unwrap();
        assert!(tiers.contains(&Tier::TrainPro));
        assert!(!tiers.contains(&Tier::DeployPro));
        assert!(tiers.contains(&Tier::Enterprise));
    }

    #[test]
    fn test_all_export_formats_present() {
        for format in ["onnx", "tensorflow", "pytorch", "tensorrt", "coreml", "openvino"] {
            assert!(export_format_tiers(format).is_some(), "missing {format}");
        }
    }

    #[test]
    fn test_features_map_covers_every_key() {
        let map = features_for_tier(Tier::Free);
        assert_eq!(map.len(), FEATURE_TIERS.len());
        let unlocked: Vec<_> = map.iter().filter(|(_, on)| *on).map(|(k, _)| *k).collect();
        assert_eq!(unlocked, vec!["model_zoo", "export_onnx"]);
    }
}
