//! Dashboard aggregates computed from the current project list.

use crate::models::{Project, Theme};
use crate::seed::THEMES;

#[derive(Debug, Clone, PartialEq)]
pub struct ThemePopularity {
    pub theme: Theme,
    pub votes: u64,
}

#[derive(Debug, Clone)]
pub struct DashboardStats {
    projects: Vec<Project>,
    pub themes: Vec<ThemePopularity>,
}

impl DashboardStats {
    pub fn from_projects(mut projects: Vec<Project>) -> Self {
        projects.sort_by(|a, b| b.votes.cmp(&a.votes));
        let themes = theme_popularity(&projects);
        Self { projects, themes }
    }

    /// Most voted first.
    pub fn projects_by_votes(&self) -> &[Project] {
        &self.projects
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn total_votes(&self) -> u64 {
        self.projects.iter().map(|p| u64::from(p.votes)).sum()
    }

    pub fn total_budget(&self) -> u64 {
        self.projects.iter().map(|p| u64::from(p.budget)).sum()
    }
}

/// Votes collected by the projects of each theme. Stable sort, so ties keep
/// the taxonomy order.
pub fn theme_popularity(projects: &[Project]) -> Vec<ThemePopularity> {
    let mut ranking: Vec<ThemePopularity> = THEMES
        .iter()
        .map(|theme| ThemePopularity {
            theme: theme.clone(),
            votes: projects
                .iter()
                .filter(|p| p.themes.iter().any(|t| t == theme.id))
                .map(|p| u64::from(p.votes))
                .sum(),
        })
        .collect();
    ranking.sort_by(|a, b| b.votes.cmp(&a.votes));
    ranking
}

/// `12345` → `12 345` (fr-FR grouping).
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('\u{202f}');
        }
        out.push(c);
    }
    out
}

pub fn format_budget(value: u64) -> String {
    format!("{} €", format_number(value))
}

/// Chart labels: at most 25 characters, then an ellipsis.
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() > 25 {
        let head: String = name.chars().take(25).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn totals_over_seed_projects() {
        let stats = DashboardStats::from_projects(seed::projects());

        assert_eq!(stats.project_count(), 5);
        assert_eq!(stats.total_votes(), 87 + 64 + 53 + 41 + 38);
        assert_eq!(stats.total_budget(), 78_000);
        let order: Vec<&str> = stats.projects_by_votes().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn themes_rank_by_votes_of_their_projects() {
        let ranking = theme_popularity(&seed::projects());

        assert_eq!(ranking.len(), 12);
        // Environment: garden 87 + bikes 53 + air 38
        assert_eq!(ranking[0].theme.name, "Environment");
        assert_eq!(ranking[0].votes, 178);
        assert_eq!(ranking[1].theme.name, "Living environment");
        assert_eq!(ranking[1].votes, 87);
        assert_eq!(ranking.last().unwrap().votes, 0);
    }

    #[test]
    fn numbers_use_french_grouping() {
        assert_eq!(format_number(7), "7");
        assert_eq!(format_number(1_000), "1\u{202f}000");
        assert_eq!(format_number(1_234_567), "1\u{202f}234\u{202f}567");
        assert_eq!(format_budget(25_000), "25\u{202f}000 €");
    }

    #[test]
    fn long_names_are_truncated_for_charts() {
        assert_eq!(truncate_name("Air quality sensors"), "Air quality sensors");
        assert_eq!(
            truncate_name("Shared garden in the Épinettes district"),
            "Shared garden in the Épin..."
        );
    }
}
