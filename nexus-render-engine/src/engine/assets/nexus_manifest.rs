use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::state::analysis_mode::AnalysisMode;

/// Scene manifest as a Bevy asset. Mirrors the JSON structure exactly.
#[derive(Asset, Resource, Debug, Clone, PartialEq, Serialize, Deserialize, TypePath)]
#[serde(rename_all = "camelCase")]
pub struct NexusManifest {
    /// Dataset snapshot path, relative to the asset root.
    pub datasets: String,
    #[serde(default)]
    pub initial_analysis_mode: AnalysisMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses_camel_case_json() {
        let manifest: NexusManifest = serde_json::from_str(
            r#"{ "datasets": "nexus/dhaka.datasets.json", "initialAnalysisMode": "transportation" }"#,
        )
        .expect("valid manifest");

        assert_eq!(manifest.datasets, "nexus/dhaka.datasets.json");
        assert_eq!(manifest.initial_analysis_mode, AnalysisMode::Transportation);
    }

    #[test]
    fn analysis_mode_defaults_to_food() {
        let manifest: NexusManifest =
            serde_json::from_str(r#"{ "datasets": "a.datasets.json" }"#).expect("valid manifest");
        assert_eq!(manifest.initial_analysis_mode, AnalysisMode::Food);
    }
}
