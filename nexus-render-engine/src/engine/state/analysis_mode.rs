use serde::{Deserialize, Serialize};

use crate::engine::data::records::ResourceCategory;

/// Lens through which the city is viewed. Selects which resource categories
/// are shown as wells and searched by the matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Food,
    Housing,
    Transportation,
    All,
}

impl AnalysisMode {
    pub const ALL_MODES: [AnalysisMode; 4] =
        [Self::Food, Self::Housing, Self::Transportation, Self::All];

    /// Convert string identifier to a mode for RPC compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "food" => Some(Self::Food),
            "housing" => Some(Self::Housing),
            "transportation" => Some(Self::Transportation),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Housing => "housing",
            Self::Transportation => "transportation",
            Self::All => "all",
        }
    }

    /// Mode to candidate collections dispatch table.
    pub fn candidate_categories(&self) -> &'static [ResourceCategory] {
        match self {
            Self::Food => &[ResourceCategory::Food],
            Self::Housing => &[ResourceCategory::Health],
            Self::Transportation => &[ResourceCategory::Transit],
            Self::All => &[
                ResourceCategory::Food,
                ResourceCategory::Health,
                ResourceCategory::Transit,
            ],
        }
    }

    pub fn includes(&self, category: ResourceCategory) -> bool {
        self.candidate_categories().contains(&category)
    }

    /// Cores render with the glitch program while housing stress is analysed.
    pub fn glitches_cores(&self) -> bool {
        *self == Self::Housing
    }
}
