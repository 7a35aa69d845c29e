use tracing::warn;

use crate::api::MockApi;
use crate::models::Theme;
use crate::seed::THEMES;

use super::{ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub struct ThemeService {
    api: MockApi,
}

impl ThemeService {
    pub fn new(api: MockApi) -> Self {
        Self { api }
    }

    pub async fn get_themes(&self) -> Vec<Theme> {
        self.api.get("/themes").await;
        initial_themes().to_vec()
    }

    pub async fn get_theme(&self, id: &str) -> ServiceResult<Theme> {
        self.api.get(&format!("/themes/{id}")).await;
        find_theme(id).cloned().ok_or_else(|| {
            warn!(theme_id = id, "theme not found");
            ServiceError::ThemeNotFound(id.to_string())
        })
    }
}

/// The static taxonomy, no simulated round trip.
pub fn initial_themes() -> &'static [Theme] {
    &THEMES
}

pub fn find_theme(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

/// Names for the given ids; unknown ids are skipped.
pub fn theme_names(ids: &[String]) -> Vec<&'static str> {
    ids.iter()
        .filter_map(|id| find_theme(id))
        .map(|t| t.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn lists_and_finds_themes() {
        let service = ThemeService::new(MockApi::new(Duration::ZERO));

        assert_eq!(service.get_themes().await.len(), 12);
        assert_eq!(service.get_theme("6").await.unwrap().name, "Mobility");
        assert!(matches!(
            service.get_theme("42").await,
            Err(ServiceError::ThemeNotFound(id)) if id == "42"
        ));
    }

    #[test]
    fn theme_names_skip_unknown_ids() {
        let ids = vec!["5".to_string(), "99".to_string(), "1".to_string()];
        assert_eq!(theme_names(&ids), vec!["Sport", "Environment"]);
    }
}
