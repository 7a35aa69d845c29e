use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    #[default]
    Easy,
    Expert,
}

impl ComparisonMode {
    pub fn max_comparisons(&self) -> u32 {
        match self {
            ComparisonMode::Easy => 5,
            ComparisonMode::Expert => 15,
        }
    }

    /// Comparisons required before the user may settle on the current choice.
    pub fn min_before_choice(&self) -> u32 {
        match self {
            ComparisonMode::Easy => 3,
            ComparisonMode::Expert => 10,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ComparisonMode::Easy => ComparisonMode::Expert,
            ComparisonMode::Expert => ComparisonMode::Easy,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComparisonMode::Easy => "Easy",
            ComparisonMode::Expert => "Expert",
        }
    }
}

/// Stored under `userPreferences`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub mode: ComparisonMode,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}
