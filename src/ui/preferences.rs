use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::models::{ComparisonMode, Preferences, Theme};
use crate::services::preferences::MAX_SELECTED_THEMES;
use crate::ui::components::popup::{hex_color, step_label};
use crate::ui::read_key;

pub struct PreferencesState {
    themes: Vec<Theme>,
    selected: Vec<String>,
    mode: ComparisonMode,
    list_state: ListState,
    message: Option<String>,
    matching: usize,
}

impl PreferencesState {
    pub fn new(themes: Vec<Theme>, prefs: &Preferences) -> Self {
        let mut list_state = ListState::default();
        if !themes.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            themes,
            selected: prefs.themes.clone(),
            mode: prefs.mode,
            list_state,
            message: None,
            matching: 0,
        }
    }

    /// Number of projects sharing a theme with the current selection.
    pub fn set_matching(&mut self, count: usize) {
        self.matching = count;
    }

    fn matching_label(&self) -> String {
        match self.matching {
            0 if self.selected.is_empty() => "no theme selected yet".to_string(),
            0 => "no project matches these themes".to_string(),
            1 => "1 matching project".to_string(),
            n => format!("{n} matching projects"),
        }
    }

    /// Mirror the stored preferences after the service applied a change.
    pub fn sync(&mut self, prefs: &Preferences) {
        self.selected = prefs.themes.clone();
        self.mode = prefs.mode;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    #[cfg(test)]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[cfg(test)]
    pub fn matching(&self) -> usize {
        self.matching
    }

    pub fn next(&mut self) {
        if self.themes.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.themes.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.themes.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.themes.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_theme(&self) -> Option<&Theme> {
        self.list_state.selected().and_then(|i| self.themes.get(i))
    }

    /// 1-based position in the selection, shown as a badge.
    pub fn badge(&self, theme_id: &str) -> Option<usize> {
        self.selected.iter().position(|t| t == theme_id).map(|i| i + 1)
    }
}

pub enum PreferencesAction {
    Back,
    ToggleTheme(String),
    ToggleMode,
    Reset,
    Continue,
}

pub fn render_preferences<B: Backend>(f: &mut Frame<B>, state: &mut PreferencesState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let header = Paragraph::new(vec![
        Spans::from(Span::styled(
            step_label(1, 4, "Your themes"),
            Style::default().fg(Color::Cyan),
        )),
        Spans::from(format!(
            "Choose up to {MAX_SELECTED_THEMES} themes, in order of importance \
             ({}/{MAX_SELECTED_THEMES} selected).",
            state.selected.len()
        )),
    ])
    .block(Block::default().borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    f.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = state
        .themes
        .iter()
        .map(|theme| {
            let badge = match state.badge(theme.id) {
                Some(n) => Span::styled(
                    format!("[{n}] "),
                    Style::default().fg(Color::Black).bg(Color::Yellow),
                ),
                None => Span::raw("[ ] "),
            };
            ListItem::new(Spans::from(vec![
                badge,
                Span::styled(
                    theme.name,
                    Style::default()
                        .fg(hex_color(theme.color))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", theme.description), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().title("Themes").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    f.render_stateful_widget(list, chunks[1], &mut state.list_state);

    let mode_text = match state.mode {
        ComparisonMode::Easy => "Easy: 5 quick comparisons",
        ComparisonMode::Expert => "Expert: up to 15 comparisons for a finer choice",
    };
    let status = match &state.message {
        Some(message) => {
            Spans::from(Span::styled(message.clone(), Style::default().fg(Color::Red)))
        }
        None => Spans::from(vec![
            Span::raw("Mode: "),
            Span::styled(mode_text, Style::default().fg(Color::Green)),
            Span::raw(format!(" | {}", state.matching_label())),
        ]),
    };
    f.render_widget(
        Paragraph::new(status).block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );

    let help = Paragraph::new(
        "<Space> Select theme | <M> Switch mode | <R> Reset | <Enter> Continue | <Esc> Back",
    )
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, chunks[3]);
}

pub fn handle_input(state: &mut PreferencesState) -> Result<Option<PreferencesAction>> {
    Ok(read_key()?.and_then(|key| handle_key(state, key)))
}

pub fn handle_key(state: &mut PreferencesState, key: KeyCode) -> Option<PreferencesAction> {
    state.message = None;

    match key {
        KeyCode::Esc | KeyCode::Char('q') => Some(PreferencesAction::Back),
        KeyCode::Down => {
            state.next();
            None
        }
        KeyCode::Up => {
            state.previous();
            None
        }
        KeyCode::Char(' ') => {
            let theme = state.selected_theme()?;
            let id = theme.id.to_string();
            if state.badge(&id).is_none() && state.selected.len() >= MAX_SELECTED_THEMES {
                state.set_message(format!(
                    "You can select at most {MAX_SELECTED_THEMES} themes. Deselect one first."
                ));
                return None;
            }
            Some(PreferencesAction::ToggleTheme(id))
        }
        KeyCode::Char('m') => Some(PreferencesAction::ToggleMode),
        KeyCode::Char('r') => Some(PreferencesAction::Reset),
        KeyCode::Enter => {
            if state.selected.is_empty() {
                state.set_message("Select at least one theme to continue.");
                None
            } else {
                Some(PreferencesAction::Continue)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::themes::initial_themes;

    fn state_with(selected: &[&str]) -> PreferencesState {
        let prefs = Preferences {
            themes: selected.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        PreferencesState::new(initial_themes().to_vec(), &prefs)
    }

    #[test]
    fn space_toggles_highlighted_theme() {
        let mut state = state_with(&[]);
        state.next();

        match handle_key(&mut state, KeyCode::Char(' ')) {
            Some(PreferencesAction::ToggleTheme(id)) => assert_eq!(id, "2"),
            _ => panic!("expected ToggleTheme"),
        }
    }

    #[test]
    fn sixth_theme_shows_limit_message() {
        let mut state = state_with(&["2", "3", "4", "5", "6"]);

        assert!(handle_key(&mut state, KeyCode::Char(' ')).is_none());
        assert!(state.message.is_some());

        // deselecting is still allowed at the cap
        state.next();
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char(' ')),
            Some(PreferencesAction::ToggleTheme(_))
        ));
        assert!(state.message.is_none());
    }

    #[test]
    fn continue_needs_a_theme() {
        let mut empty = state_with(&[]);
        assert!(handle_key(&mut empty, KeyCode::Enter).is_none());
        assert!(empty.message.is_some());

        let mut ready = state_with(&["7"]);
        assert!(matches!(
            handle_key(&mut ready, KeyCode::Enter),
            Some(PreferencesAction::Continue)
        ));
    }

    #[test]
    fn badges_follow_selection_order() {
        let mut state = state_with(&["9", "1"]);
        assert_eq!(state.badge("9"), Some(1));
        assert_eq!(state.badge("1"), Some(2));
        assert_eq!(state.badge("5"), None);

        state.sync(&Preferences {
            themes: vec!["1".to_string()],
            mode: ComparisonMode::Expert,
            session_id: None,
        });
        assert_eq!(state.badge("1"), Some(1));
        assert_eq!(state.mode, ComparisonMode::Expert);
    }

    #[test]
    fn matching_label_follows_selection() {
        let mut state = state_with(&[]);
        assert_eq!(state.matching_label(), "no theme selected yet");

        state = state_with(&["12"]);
        assert_eq!(state.matching_label(), "no project matches these themes");

        state.set_matching(1);
        assert_eq!(state.matching_label(), "1 matching project");
        state.set_matching(3);
        assert_eq!(state.matching_label(), "3 matching projects");
    }
}
