use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::models::{Project, SessionUser};
use crate::services::stats::format_budget;
use crate::services::themes::theme_names;
use crate::services::Page;
use crate::ui::components::popup::render_message;
use crate::ui::read_key;
use crate::validation::MAX_BUDGET;

pub const FEATURED_PAGE_SIZE: usize = 3;

const CALENDAR: [(&str, &str); 4] = [
    ("January - March", "Call for projects and idea submission"),
    ("April - May", "Feasibility study of the projects"),
    ("June - August", "Residents vote"),
    ("September - December", "Winning projects are built"),
];

const PREVIOUS_EDITION: [(&str, &str); 4] = [
    ("150", "projects submitted"),
    ("5\u{202f}238", "residents took part"),
    ("12", "projects completed"),
    ("500\u{202f}000 €", "total budget"),
];

pub struct HomeState {
    user: Option<SessionUser>,
    page: Page<Project>,
    list_state: ListState,
    message: Option<String>,
}

impl HomeState {
    pub fn new(user: Option<SessionUser>, page: Page<Project>) -> Self {
        let mut list_state = ListState::default();
        if !page.data.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            user,
            page,
            list_state,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn next(&mut self) {
        if self.page.data.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.page.data.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.page.data.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.page.data.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.list_state.selected().and_then(|i| self.page.data.get(i))
    }
}

/// Static side panel: how it works, the 2025 calendar and the previous edition.
fn about_lines() -> Vec<Spans<'static>> {
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let steps = [
        (
            "Propose",
            format!(
                "Submit an idea for your district, up to {} per project.",
                format_budget(u64::from(MAX_BUDGET))
            ),
        ),
        (
            "Vote",
            "Discover the residents' projects and vote for your favourite.".to_string(),
        ),
        (
            "Build",
            "The city carries out the selected projects with you.".to_string(),
        ),
    ];

    let mut lines = vec![Spans::from(Span::styled("How it works", heading))];
    for (n, (title, text)) in steps.into_iter().enumerate() {
        lines.push(Spans::from(vec![
            Span::styled(
                format!("{}. {title}: ", n + 1),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(text),
        ]));
    }

    lines.push(Spans::from(""));
    lines.push(Spans::from(Span::styled("2025 calendar", heading)));
    for (period, step) in CALENDAR {
        lines.push(Spans::from(vec![
            Span::styled(format!("{period}: "), Style::default().fg(Color::Yellow)),
            Span::raw(step),
        ]));
    }

    lines.push(Spans::from(""));
    lines.push(Spans::from(Span::styled("Previous edition in figures", heading)));
    for (figure, label) in PREVIOUS_EDITION {
        lines.push(Spans::from(vec![
            Span::styled(figure, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(format!(" {label}")),
        ]));
    }
    lines
}

pub enum HomeAction {
    Quit,
    OpenProject(String),
    ChangePage(usize),
    Preferences,
    Compare,
    Submit,
    Dashboard,
    Profile,
    Login,
    Logout,
}

pub fn render_home<B: Backend>(f: &mut Frame<B>, state: &mut HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(6),
                Constraint::Min(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let greeting = match &state.user {
        Some(user) => format!("Signed in as {}", user.full_name()),
        None => "Not signed in".to_string(),
    };
    let hero = Paragraph::new(vec![
        Spans::from(Span::styled(
            "Your city, your projects",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Spans::from(
            "Pick the themes you care about, compare proposals two by two and vote for the one \
             you prefer.",
        ),
        Spans::from(Span::styled(greeting, Style::default().fg(Color::Gray))),
    ])
    .block(Block::default().title("Participatory budget").borders(Borders::ALL))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(hero, chunks[0]);

    let items: Vec<ListItem> = state
        .page
        .data
        .iter()
        .map(|project| {
            let themes = theme_names(&project.themes).join(", ");
            ListItem::new(vec![
                Spans::from(vec![
                    Span::styled(
                        project.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        format_budget(u64::from(project.budget)),
                        Style::default().fg(Color::Green),
                    ),
                    Span::raw(format!("  {} votes", project.votes)),
                ]),
                Spans::from(Span::styled(
                    format!("  {}", project.short_description),
                    Style::default().fg(Color::Gray),
                )),
                Spans::from(Span::styled(
                    format!("  {themes}"),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let title = format!(
        "Featured projects (page {}/{})",
        state.page.current_page,
        state.page.total_pages.max(1)
    );
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(chunks[1]);
    f.render_stateful_widget(list, body[0], &mut state.list_state);

    let about = Paragraph::new(about_lines())
        .block(Block::default().title("Participate").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(about, body[1]);

    let account = if state.user.is_some() { "<L> Logout" } else { "<L> Login" };
    let help = Paragraph::new(format!(
        "<Enter> Details | <Left/Right> Page | <P> Vote | <S> Submit | <D> Dashboard \
         | <U> Profile | {account} | <Q> Quit"
    ))
    .block(Block::default().borders(Borders::TOP))
    .style(Style::default().fg(Color::White));
    f.render_widget(help, chunks[2]);

    if let Some(message) = &state.message {
        render_message(
            f,
            "Info",
            vec![
                Spans::from(""),
                Spans::from(message.clone()),
                Spans::from(""),
                Spans::from("Press any key to continue"),
            ],
            Color::Yellow,
        );
    }
}

pub fn handle_input(state: &mut HomeState) -> Result<Option<HomeAction>> {
    Ok(read_key()?.and_then(|key| handle_key(state, key)))
}

pub fn handle_key(state: &mut HomeState, key: KeyCode) -> Option<HomeAction> {
    if state.message.take().is_some() {
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(HomeAction::Quit),
        KeyCode::Down => {
            state.next();
            None
        }
        KeyCode::Up => {
            state.previous();
            None
        }
        KeyCode::Enter => state
            .selected_project()
            .map(|p| HomeAction::OpenProject(p.id.clone())),
        KeyCode::Right if state.page.current_page < state.page.total_pages => {
            Some(HomeAction::ChangePage(state.page.current_page + 1))
        }
        KeyCode::Left if state.page.current_page > 1 => {
            Some(HomeAction::ChangePage(state.page.current_page - 1))
        }
        KeyCode::Char('p') => Some(HomeAction::Preferences),
        KeyCode::Char('c') => Some(HomeAction::Compare),
        KeyCode::Char('s') => Some(HomeAction::Submit),
        KeyCode::Char('d') => Some(HomeAction::Dashboard),
        KeyCode::Char('u') => Some(HomeAction::Profile),
        KeyCode::Char('l') if state.user.is_some() => Some(HomeAction::Logout),
        KeyCode::Char('l') => Some(HomeAction::Login),
        _ => None,
    }
}
