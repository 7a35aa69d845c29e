use tracing::{debug, warn};

use crate::models::{ComparisonMode, Preferences};
use crate::store::{LocalStore, PREFERENCES_KEY};

use super::ServiceResult;

pub const MAX_SELECTED_THEMES: usize = 5;

/// Theme selection and comparison mode, written through on every change.
#[derive(Debug)]
pub struct PreferencesService {
    store: LocalStore,
    prefs: Preferences,
}

impl PreferencesService {
    pub fn new(store: LocalStore) -> Self {
        let prefs = store.get_item(PREFERENCES_KEY).unwrap_or_default();
        Self { store, prefs }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn selected_themes(&self) -> &[String] {
        &self.prefs.themes
    }

    pub fn mode(&self) -> ComparisonMode {
        self.prefs.mode
    }

    fn save(&self) -> ServiceResult<()> {
        self.store.set_item(PREFERENCES_KEY, &self.prefs)?;
        debug!(themes = ?self.prefs.themes, mode = ?self.prefs.mode, "preferences saved");
        Ok(())
    }

    /// Replaces the selection. Lists longer than the cap are ignored.
    pub fn update_selected_themes(&mut self, themes: Vec<String>) -> ServiceResult<bool> {
        if themes.len() > MAX_SELECTED_THEMES {
            warn!(count = themes.len(), "too many themes selected");
            return Ok(false);
        }
        self.prefs.themes = themes;
        self.save()?;
        Ok(true)
    }

    /// Deselects a selected theme, or appends it while there is room.
    pub fn toggle_theme(&mut self, theme_id: &str) -> ServiceResult<bool> {
        let mut themes = self.prefs.themes.clone();
        if let Some(pos) = themes.iter().position(|t| t == theme_id) {
            themes.remove(pos);
        } else if themes.len() < MAX_SELECTED_THEMES {
            themes.push(theme_id.to_string());
        } else {
            return Ok(false);
        }
        self.update_selected_themes(themes)
    }

    pub fn toggle_mode(&mut self) -> ServiceResult<ComparisonMode> {
        self.prefs.mode = self.prefs.mode.toggled();
        self.save()?;
        Ok(self.prefs.mode)
    }

    pub fn set_session_id(&mut self, session_id: Option<String>) -> ServiceResult<()> {
        self.prefs.session_id = session_id;
        self.save()
    }

    pub fn reset(&mut self) -> ServiceResult<()> {
        self.prefs = Preferences::default();
        self.store.remove_item(PREFERENCES_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (tempfile::TempDir, LocalStore, PreferencesService) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let service = PreferencesService::new(store.clone());
        (dir, store, service)
    }

    #[test]
    fn defaults_to_easy_mode_without_themes() {
        let (_dir, _store, prefs) = service();
        assert!(prefs.selected_themes().is_empty());
        assert_eq!(prefs.mode(), ComparisonMode::Easy);
        assert_eq!(prefs.preferences().session_id, None);
    }

    #[test]
    fn toggling_keeps_selection_order_and_cap() {
        let (_dir, _store, mut prefs) = service();
        for id in ["3", "1", "7", "2", "9"] {
            assert!(prefs.toggle_theme(id).unwrap());
        }

        assert!(!prefs.toggle_theme("12").unwrap());
        assert_eq!(prefs.selected_themes(), ["3", "1", "7", "2", "9"]);

        assert!(prefs.toggle_theme("7").unwrap());
        assert_eq!(prefs.selected_themes(), ["3", "1", "2", "9"]);
    }

    #[test]
    fn oversized_update_is_ignored() {
        let (_dir, _store, mut prefs) = service();
        let six: Vec<String> = (1..=6).map(|i| i.to_string()).collect();

        assert!(!prefs.update_selected_themes(six).unwrap());
        assert!(prefs.selected_themes().is_empty());
    }

    #[test]
    fn changes_survive_reload_and_reset_clears_them() {
        let (_dir, store, mut prefs) = service();
        prefs.toggle_theme("4").unwrap();
        assert_eq!(prefs.toggle_mode().unwrap(), ComparisonMode::Expert);
        prefs.set_session_id(Some("abc".to_string())).unwrap();

        let reloaded = PreferencesService::new(store.clone());
        assert_eq!(reloaded.selected_themes(), ["4"]);
        assert_eq!(reloaded.mode(), ComparisonMode::Expert);
        assert_eq!(reloaded.preferences().session_id.as_deref(), Some("abc"));

        prefs.reset().unwrap();
        assert_eq!(prefs.preferences(), &Preferences::default());
        assert!(store.get_item::<Preferences>(PREFERENCES_KEY).is_none());
    }

    #[test]
    fn stored_document_uses_browser_field_names() {
        let (_dir, store, mut prefs) = service();
        prefs.set_session_id(Some("s1".to_string())).unwrap();

        let raw = std::fs::read_to_string(store.dir().join("userPreferences.json")).unwrap();
        assert!(raw.contains("\"sessionId\""));
        assert!(raw.contains("\"easy\""));
    }
}
