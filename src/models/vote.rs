use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Project;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub date: DateTime<Utc>,
}

/// The current user's vote joined with the project it points to.
#[derive(Debug, Clone)]
pub struct MyVote {
    pub vote: Vote,
    pub project: Option<Project>,
}
