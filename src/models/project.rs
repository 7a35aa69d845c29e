use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    UnderReview,
    Approved,
    Rejected,
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "Draft",
            ProjectStatus::UnderReview => "Under review",
            ProjectStatus::Approved => "Approved",
            ProjectStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    // Évry town hall
    fn default() -> Self {
        Self {
            latitude: 48.6304,
            longitude: 2.4507,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub budget: u32,
    pub location: Location,
    pub themes: Vec<String>,
    pub images: Vec<String>,
    pub submitted_by: String,
    pub submission_date: DateTime<Utc>,
    pub status: ProjectStatus,
    pub votes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn has_any_theme(&self, theme_ids: &[String]) -> bool {
        self.themes.iter().any(|t| theme_ids.contains(t))
    }
}

/// Submission form payload. Id, date, status and votes are assigned on create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub budget: u32,
    pub location: Location,
    pub themes: Vec<String>,
    pub images: Vec<String>,
    pub submitted_by: String,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub budget: Option<u32>,
    pub location: Option<Location>,
    pub themes: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub status: Option<ProjectStatus>,
}
