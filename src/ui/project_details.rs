use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::{Project, ProjectStatus};
use crate::services::stats::format_budget;
use crate::ui::components::markdown::render_markdown;
use crate::ui::read_key;

pub struct ProjectDetailsState {
    project_id: String,
    project: Option<Project>,
    submitter: String,
    authenticated: bool,
    show_vote_success: bool,
    themes: Vec<String>,
    scroll: u16,
    description_lines: u16,
}

impl ProjectDetailsState {
    pub fn new(
        project_id: &str,
        project: Option<Project>,
        submitter: String,
        authenticated: bool,
    ) -> Self {
        let description_lines = project
            .as_ref()
            .map(|p| render_markdown(&p.full_description).len())
            .unwrap_or(0);

        Self {
            project_id: project_id.to_string(),
            project,
            submitter,
            authenticated,
            show_vote_success: false,
            themes: Vec::new(),
            scroll: 0,
            description_lines: u16::try_from(description_lines).unwrap_or(u16::MAX),
        }
    }

    /// Theme names resolved by the caller, in the project's order.
    pub fn with_themes(mut self, themes: Vec<String>) -> Self {
        self.themes = themes;
        self
    }

    /// Shown when arriving straight from a confirmed vote.
    pub fn with_vote_success(mut self) -> Self {
        self.show_vote_success = true;
        self
    }

    #[cfg(test)]
    pub fn shows_vote_success(&self) -> bool {
        self.show_vote_success
    }

    #[cfg(test)]
    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn can_vote(&self) -> bool {
        matches!(&self.project, Some(p) if p.status == ProjectStatus::Approved)
    }

    // The last description line stays on screen.
    fn scroll_down(&mut self) {
        let max = self.description_lines.saturating_sub(1);
        self.scroll = self.scroll.saturating_add(1).min(max);
    }
}

pub enum ProjectDetailsAction {
    Back,
    StartVoting,
}

fn status_color(status: ProjectStatus) -> Color {
    match status {
        ProjectStatus::Draft => Color::Gray,
        ProjectStatus::UnderReview => Color::Yellow,
        ProjectStatus::Approved => Color::Green,
        ProjectStatus::Rejected => Color::Red,
    }
}

pub fn render_project_details<B: Backend>(f: &mut Frame<B>, state: &mut ProjectDetailsState) {
    let Some(project) = &state.project else {
        let not_found = Paragraph::new(vec![
            Spans::from(""),
            Spans::from(Span::styled(
                "Project not found",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Spans::from(""),
            Spans::from(format!("No project has the id \"{}\".", state.project_id)),
            Spans::from(""),
            Spans::from("<Esc> Back to home"),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(not_found, f.size());
        return;
    };

    let banner_height = if state.show_vote_success { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(banner_height),
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    if state.show_vote_success {
        let banner = Paragraph::new("Thank you! Your vote for this project has been recorded.")
            .style(Style::default().fg(Color::Black).bg(Color::Green))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(banner, chunks[0]);
    }

    let header = Paragraph::new(vec![
        Spans::from(Span::styled(
            project.title.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Spans::from(vec![
            Span::styled(
                format!("[{}]", project.status.label()),
                Style::default().fg(status_color(project.status)),
            ),
            Span::raw(format!("  {}", project.short_description)),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    f.render_widget(header, chunks[1]);

    let description = Paragraph::new(render_markdown(&project.full_description))
        .block(Block::default().title("Description").borders(Borders::ALL))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0));
    f.render_widget(description, chunks[2]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[3]);

    let facts = Paragraph::new(vec![
        Spans::from(format!("Budget: {}", format_budget(u64::from(project.budget)))),
        Spans::from(format!("Votes: {}", project.votes)),
        Spans::from(format!("Submitted by: {}", state.submitter)),
        Spans::from(format!("Submitted on: {}", project.submission_date.format("%d/%m/%Y"))),
        Spans::from(format!("Themes: {}", state.themes.join(", "))),
    ])
    .block(Block::default().title("Information").borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    f.render_widget(facts, columns[0]);

    let location = Paragraph::new(vec![
        Spans::from("Map not available in the terminal."),
        Spans::from(format!(
            "Coordinates: {:.4}, {:.4}",
            project.location.latitude, project.location.longitude
        )),
    ])
    .block(Block::default().title("Location").borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    f.render_widget(location, columns[1]);

    let help = if state.can_vote() {
        let hint = if state.authenticated {
            "start the comparison to vote for this project"
        } else {
            "login required to vote"
        };
        format!("<V> Vote for this project ({hint}) | <Up/Down> Scroll | <Esc> Back")
    } else {
        "<Up/Down> Scroll | <Esc> Back".to_string()
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, chunks[4]);
}

pub fn handle_input(state: &mut ProjectDetailsState) -> Result<Option<ProjectDetailsAction>> {
    Ok(read_key()?.and_then(|key| handle_key(state, key)))
}

pub fn handle_key(state: &mut ProjectDetailsState, key: KeyCode) -> Option<ProjectDetailsAction> {
    match key {
        KeyCode::Esc | KeyCode::Char('q') => Some(ProjectDetailsAction::Back),
        KeyCode::Char('x') => {
            state.show_vote_success = false;
            None
        }
        KeyCode::Down => {
            state.scroll_down();
            None
        }
        KeyCode::Up => {
            state.scroll = state.scroll.saturating_sub(1);
            None
        }
        KeyCode::Char('v') if state.can_vote() => Some(ProjectDetailsAction::StartVoting),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn project(id: &str) -> Option<Project> {
        seed::projects().into_iter().find(|p| p.id == id)
    }

    #[test]
    fn only_approved_projects_offer_a_vote() {
        let mut approved = ProjectDetailsState::new("1", project("1"), "Jean Dupont".into(), false);
        assert!(matches!(
            handle_key(&mut approved, KeyCode::Char('v')),
            Some(ProjectDetailsAction::StartVoting)
        ));

        let mut review = ProjectDetailsState::new("4", project("4"), "Jean Dupont".into(), true);
        assert!(handle_key(&mut review, KeyCode::Char('v')).is_none());
    }

    #[test]
    fn unknown_project_can_only_go_back() {
        let mut state = ProjectDetailsState::new("999", None, String::new(), true);
        assert!(!state.can_vote());
        assert!(matches!(handle_key(&mut state, KeyCode::Esc), Some(ProjectDetailsAction::Back)));
    }

    #[test]
    fn banner_dismiss_and_scroll() {
        let mut state = ProjectDetailsState::new("1", project("1"), "Jean Dupont".into(), true)
            .with_vote_success();
        assert!(state.show_vote_success);
        handle_key(&mut state, KeyCode::Char('x'));
        assert!(!state.show_vote_success);

        handle_key(&mut state, KeyCode::Up);
        assert_eq!(state.scroll, 0);
        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Down);
        assert_eq!(state.scroll, 2);
    }

    #[test]
    fn scroll_stops_at_the_last_description_line() {
        let project = project("1");
        let lines = render_markdown(&project.as_ref().unwrap().full_description).len() as u16;
        let mut state = ProjectDetailsState::new("1", project, "Jean Dupont".into(), true);

        for _ in 0..lines + 10 {
            handle_key(&mut state, KeyCode::Down);
        }
        assert_eq!(state.scroll, lines - 1);

        handle_key(&mut state, KeyCode::Up);
        assert_eq!(state.scroll, lines - 2);
    }

    #[test]
    fn missing_project_does_not_scroll() {
        let mut state = ProjectDetailsState::new("999", None, String::new(), false);
        handle_key(&mut state, KeyCode::Down);
        assert_eq!(state.scroll, 0);
    }
}
