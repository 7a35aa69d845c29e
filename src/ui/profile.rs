use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::models::{MyVote, Project, ProjectStatus, SessionUser};
use crate::services::stats::format_budget;
use crate::ui::components::text_input::TextInput;
use crate::ui::read_key;
use crate::validation::{validate_profile, ValidationError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileTab {
    Info,
    MyProjects,
    MyVote,
}

impl ProfileTab {
    const ALL: [ProfileTab; 3] = [ProfileTab::Info, ProfileTab::MyProjects, ProfileTab::MyVote];

    fn title(&self) -> &'static str {
        match self {
            ProfileTab::Info => "My information",
            ProfileTab::MyProjects => "My projects",
            ProfileTab::MyVote => "My vote",
        }
    }

    fn index(&self) -> usize {
        match self {
            ProfileTab::Info => 0,
            ProfileTab::MyProjects => 1,
            ProfileTab::MyVote => 2,
        }
    }

    fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InfoField {
    FirstName,
    LastName,
    Email,
}

pub enum ProfileAction {
    Back,
    Logout,
    Save {
        first_name: String,
        last_name: String,
        email: String,
    },
    OpenProject(String),
    Withdraw(String),
    Submit,
    ChangeVote,
}

pub struct ProfileState {
    tab: ProfileTab,
    field: InfoField,
    first_name: TextInput,
    last_name: TextInput,
    email: TextInput,
    errors: Vec<ValidationError>,
    notice: Option<String>,
    projects: Vec<Project>,
    project_list: ListState,
    my_vote: Option<MyVote>,
}

impl ProfileState {
    pub fn new(user: &SessionUser, projects: Vec<Project>, my_vote: Option<MyVote>) -> Self {
        let mut project_list = ListState::default();
        if !projects.is_empty() {
            project_list.select(Some(0));
        }

        Self {
            tab: ProfileTab::Info,
            field: InfoField::FirstName,
            first_name: TextInput::new(user.first_name.clone()),
            last_name: TextInput::new(user.last_name.clone()),
            email: TextInput::new(user.email.clone()),
            errors: Vec::new(),
            notice: None,
            projects,
            project_list,
            my_vote,
        }
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    fn input_mut(&mut self) -> &mut TextInput {
        match self.field {
            InfoField::FirstName => &mut self.first_name,
            InfoField::LastName => &mut self.last_name,
            InfoField::Email => &mut self.email,
        }
    }

    fn editing(&self) -> bool {
        self.first_name.editing || self.last_name.editing || self.email.editing
    }

    fn move_field(&mut self, down: bool) {
        self.field = match (self.field, down) {
            (InfoField::FirstName, true) | (InfoField::Email, false) => InfoField::LastName,
            (InfoField::LastName, true) | (InfoField::FirstName, false) => InfoField::Email,
            (InfoField::Email, true) | (InfoField::LastName, false) => InfoField::FirstName,
        };
    }

    fn move_project(&mut self, down: bool) {
        let count = self.projects.len();
        if count == 0 {
            return;
        }
        let i = self.project_list.selected().unwrap_or(0);
        let i = if down { (i + 1) % count } else { (i + count - 1) % count };
        self.project_list.select(Some(i));
    }

    fn selected_project(&self) -> Option<&Project> {
        self.project_list.selected().and_then(|i| self.projects.get(i))
    }

    /// Swap in the saved copy of one of the listed projects.
    pub fn replace_project(&mut self, updated: Project) {
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == updated.id) {
            *project = updated;
        }
    }
}

pub fn render_profile<B: Backend>(f: &mut Frame<B>, state: &mut ProfileState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let titles = ProfileTab::ALL
        .iter()
        .map(|t| Spans::from(t.title()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.tab.index())
        .block(Block::default().title("My account").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    let help = match state.tab {
        ProfileTab::Info if state.editing() => "Type text | Enter - Done | Esc - Done",
        ProfileTab::Info => {
            "Enter - Edit field | Up/Down - Navigate | S - Save | L - Logout | Tab - Next tab \
             | Esc - Back"
        }
        ProfileTab::MyProjects => {
            "Enter - View project | W - Withdraw | N - New project | Up/Down - Navigate \
             | Tab - Next tab | Esc - Back"
        }
        ProfileTab::MyVote => {
            "Enter - View project | C - Change my vote | Tab - Next tab | Esc - Back"
        }
    };

    match state.tab {
        ProfileTab::Info => render_info(f, state, chunks[1]),
        ProfileTab::MyProjects => render_projects(f, state, chunks[1]),
        ProfileTab::MyVote => render_vote(f, state, chunks[1]),
    }

    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, chunks[2]);
}

fn render_info<B: Backend>(f: &mut Frame<B>, state: &ProfileState, area: Rect) {
    let fields = [
        (InfoField::FirstName, "First name", &state.first_name),
        (InfoField::LastName, "Last name", &state.last_name),
        (InfoField::Email, "Email", &state.email),
    ];
    let mut lines = Vec::new();
    for (field, label, input) in fields {
        let style = if field == state.field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Spans::from(Span::styled(label, style)));
        lines.push(Spans::from(format!("  {}", input.get_display_string())));
        lines.push(Spans::from(""));
    }
    for error in &state.errors {
        lines.push(Spans::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))));
    }
    if let Some(notice) = &state.notice {
        lines.push(Spans::from(Span::styled(notice.clone(), Style::default().fg(Color::Green))));
    }

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_projects<B: Backend>(f: &mut Frame<B>, state: &mut ProfileState, area: Rect) {
    if state.projects.is_empty() {
        let empty = Paragraph::new(vec![
            Spans::from(""),
            Spans::from("You have not proposed any project yet."),
            Spans::from("Press N to propose one."),
        ])
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .projects
        .iter()
        .map(|project| {
            ListItem::new(vec![
                Spans::from(vec![
                    Span::styled(
                        project.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  [{}]", project.status.label()),
                        Style::default().fg(Color::Yellow),
                    ),
                ]),
                Spans::from(format!(
                    "  Submitted on {} | {}",
                    project.submission_date.format("%d/%m/%Y"),
                    format_budget(u64::from(project.budget))
                )),
            ])
        })
        .collect();
    let block = match &state.notice {
        Some(notice) => Block::default()
            .title(Span::styled(notice.clone(), Style::default().fg(Color::Green)))
            .borders(Borders::ALL),
        None => Block::default().borders(Borders::ALL),
    };
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    f.render_stateful_widget(list, area, &mut state.project_list);
}

fn render_vote<B: Backend>(f: &mut Frame<B>, state: &ProfileState, area: Rect) {
    let lines = match state.my_vote.as_ref().and_then(|v| v.project.as_ref().map(|p| (v, p))) {
        None => vec![
            Spans::from(""),
            Spans::from("You have not voted yet."),
            Spans::from("Press C to discover projects and vote."),
        ],
        Some((vote, project)) => vec![
            Spans::from(Span::styled(
                project.title.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Spans::from(project.short_description.clone()),
            Spans::from(format!("Budget: {}", format_budget(u64::from(project.budget)))),
            Spans::from(format!("Voted on {}", vote.vote.date.format("%d/%m/%Y"))),
            Spans::from(""),
            Spans::from("You can change your vote until the ballot closes."),
        ],
    };
    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true }),
        area,
    );
}

pub fn handle_input(state: &mut ProfileState) -> Result<Option<ProfileAction>> {
    Ok(read_key()?.and_then(|key| handle_key(state, key)))
}

pub fn handle_key(state: &mut ProfileState, key: KeyCode) -> Option<ProfileAction> {
    if state.editing() {
        state.input_mut().handle_input(key);
        return None;
    }

    match (state.tab, key) {
        (_, KeyCode::Esc) => return Some(ProfileAction::Back),
        (_, KeyCode::Tab) => {
            state.tab = state.tab.next();
            state.notice = None;
        }
        (ProfileTab::Info, KeyCode::Up) => state.move_field(false),
        (ProfileTab::Info, KeyCode::Down) => state.move_field(true),
        (ProfileTab::Info, KeyCode::Enter) => {
            state.notice = None;
            state.input_mut().toggle_editing();
        }
        (ProfileTab::Info, KeyCode::Char('l')) => return Some(ProfileAction::Logout),
        (ProfileTab::Info, KeyCode::Char('s')) => {
            state.errors = validate_profile(
                &state.first_name.value,
                &state.last_name.value,
                &state.email.value,
            );
            if state.errors.is_empty() {
                return Some(ProfileAction::Save {
                    first_name: state.first_name.value.trim().to_string(),
                    last_name: state.last_name.value.trim().to_string(),
                    email: state.email.value.trim().to_string(),
                });
            }
        }
        (ProfileTab::MyProjects, KeyCode::Up) => state.move_project(false),
        (ProfileTab::MyProjects, KeyCode::Down) => state.move_project(true),
        (ProfileTab::MyProjects, KeyCode::Enter) => {
            return state
                .selected_project()
                .map(|p| ProfileAction::OpenProject(p.id.clone()));
        }
        (ProfileTab::MyProjects, KeyCode::Char('w')) => {
            // only a project still waiting for review can be taken back
            return state
                .selected_project()
                .filter(|p| p.status == ProjectStatus::UnderReview)
                .map(|p| ProfileAction::Withdraw(p.id.clone()));
        }
        (ProfileTab::MyProjects, KeyCode::Char('n')) => return Some(ProfileAction::Submit),
        (ProfileTab::MyVote, KeyCode::Enter) => {
            return state
                .my_vote
                .as_ref()
                .map(|v| ProfileAction::OpenProject(v.vote.project_id.clone()));
        }
        (ProfileTab::MyVote, KeyCode::Char('c')) => return Some(ProfileAction::ChangeVote),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vote;
    use crate::seed;

    fn user() -> SessionUser {
        SessionUser::from(&seed::users()[0])
    }

    #[test]
    fn save_validates_the_form() {
        let mut state = ProfileState::new(&user(), Vec::new(), None);
        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Enter);
        for _ in 0..3 {
            handle_key(&mut state, KeyCode::Backspace);
        }
        handle_key(&mut state, KeyCode::Enter);

        // "demo@evry" no longer has a top-level domain
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.errors, [ValidationError::InvalidEmail]);
    }

    #[test]
    fn save_emits_trimmed_values() {
        let mut state = ProfileState::new(&user(), Vec::new(), None);
        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Char(' '));
        handle_key(&mut state, KeyCode::Esc);

        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(ProfileAction::Save { first_name, email, .. }) => {
                assert_eq!(first_name, "Jean");
                assert_eq!(email, "demo@evry.fr");
            }
            _ => panic!("expected Save"),
        }
    }

    #[test]
    fn tabs_cycle_and_route() {
        let projects = seed::projects().into_iter().take(2).collect();
        let my_vote = MyVote {
            vote: Vote {
                id: "v".to_string(),
                user_id: "1".to_string(),
                project_id: "1".to_string(),
                date: chrono::Utc::now(),
            },
            project: seed::projects().into_iter().next(),
        };
        let mut state = ProfileState::new(&user(), projects, Some(my_vote));

        handle_key(&mut state, KeyCode::Tab);
        assert_eq!(state.tab, ProfileTab::MyProjects);
        handle_key(&mut state, KeyCode::Down);
        assert!(matches!(
            handle_key(&mut state, KeyCode::Enter),
            Some(ProfileAction::OpenProject(id)) if id == "2"
        ));

        handle_key(&mut state, KeyCode::Tab);
        assert!(matches!(
            handle_key(&mut state, KeyCode::Enter),
            Some(ProfileAction::OpenProject(id)) if id == "1"
        ));
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('c')),
            Some(ProfileAction::ChangeVote)
        ));

        handle_key(&mut state, KeyCode::Tab);
        assert_eq!(state.tab, ProfileTab::Info);
    }

    #[test]
    fn only_projects_under_review_can_be_withdrawn() {
        // seed projects "1" (approved) and "4" (under review) belong to the demo user
        let projects = seed::projects()
            .into_iter()
            .filter(|p| p.id == "1" || p.id == "4")
            .collect();
        let mut state = ProfileState::new(&user(), projects, None);
        handle_key(&mut state, KeyCode::Tab);

        assert!(handle_key(&mut state, KeyCode::Char('w')).is_none());
        handle_key(&mut state, KeyCode::Down);
        let id = match handle_key(&mut state, KeyCode::Char('w')) {
            Some(ProfileAction::Withdraw(id)) => id,
            _ => panic!("expected Withdraw"),
        };
        assert_eq!(id, "4");

        let mut updated = state.projects[1].clone();
        updated.status = ProjectStatus::Draft;
        state.replace_project(updated);
        assert_eq!(state.projects[1].status, ProjectStatus::Draft);
        assert!(handle_key(&mut state, KeyCode::Char('w')).is_none());
    }
}
