use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::comparison::{ComparisonError, ComparisonSession, Phase, Side};
use crate::models::Project;
use crate::services::stats::format_budget;
use crate::services::themes::theme_names;
use crate::ui::components::popup::{render_message, step_label};
use crate::ui::read_key;

pub struct CompareState {
    session: Result<ComparisonSession, ComparisonError>,
    show_info: bool,
    message: Option<String>,
}

impl CompareState {
    pub fn new(session: Result<ComparisonSession, ComparisonError>) -> Self {
        Self {
            session,
            show_info: false,
            message: None,
        }
    }

    fn report(&mut self, result: Result<(), ComparisonError>) {
        if let Err(err) = result {
            self.message = Some(err.to_string());
        }
    }
}

pub enum CompareAction {
    Back,
    ChangeThemes,
    Vote(String),
    Home,
}

pub fn render_compare<B: Backend>(f: &mut Frame<B>, state: &mut CompareState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let session = match &state.session {
        Ok(session) => session,
        Err(err) => {
            render_empty(f, chunks[1], err);
            let help = Paragraph::new("<T> Change themes | <Esc> Home")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::TOP));
            f.render_widget(help, chunks[2]);
            return;
        }
    };

    let (step, help) = match session.phase() {
        Phase::Comparing => {
            let finalize = if session.can_finalize() { " | <F> Choose current" } else { "" };
            (
                step_label(2, 4, "Comparison"),
                format!(
                    "<A> Prefer proposal | <R> Keep current | <S> Super like proposal \
                     | <C> Super like current{finalize} | <I> Info | <Esc> Back"
                ),
            )
        }
        Phase::FinalChoice => {
            let more = if session.can_continue() { " | <C> Keep comparing" } else { "" };
            (
                step_label(3, 4, "Your choice"),
                format!("<Enter> Confirm my vote{more} | <Esc> Back"),
            )
        }
    };

    let header = Paragraph::new(Spans::from(vec![
        Span::styled(step, Style::default().fg(Color::Cyan)),
        Span::raw(format!("    {}", progress_line(session))),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    match session.phase() {
        Phase::Comparing => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
                .split(chunks[1]);
            if let Some(proposal) = session.proposal() {
                render_card(f, columns[0], "New proposal", proposal, Color::Yellow);
            }
            render_card(f, columns[1], "Current choice", session.current(), Color::Green);
        }
        Phase::FinalChoice => {
            if let Some(choice) = session.final_choice() {
                render_card(f, chunks[1], "Your final choice", choice, Color::Green);
            }
        }
    }

    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP))
        .wrap(Wrap { trim: true });
    f.render_widget(help, chunks[2]);

    if state.show_info {
        let min = session.mode().min_before_choice();
        render_message(
            f,
            "How it works",
            vec![
                Spans::from("Each round shows a new proposal next to your current choice."),
                Spans::from("Prefer the proposal and it becomes your current choice."),
                Spans::from("Keep yours and it stays."),
                Spans::from("A super like jumps straight to the confirmation."),
                Spans::from(format!(
                    "After {min} comparisons you may settle on your current choice."
                )),
                Spans::from(""),
                Spans::from("Press any key to continue"),
            ],
            Color::White,
        );
    } else if let Some(message) = &state.message {
        render_message(f, "Notice", vec![Spans::from(message.clone())], Color::Red);
    }
}

fn progress_line(session: &ComparisonSession) -> String {
    format!(
        "{} mode | comparisons left {}/{} | liked {} | set aside {}",
        session.mode().label(),
        session.remaining(),
        session.mode().max_comparisons(),
        session.liked().len(),
        session.disliked().len()
    )
}

fn render_card<B: Backend>(
    f: &mut Frame<B>,
    area: Rect,
    title: &str,
    project: &Project,
    color: Color,
) {
    let text = vec![
        Spans::from(Span::styled(
            project.title.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Spans::from(""),
        Spans::from(project.short_description.clone()),
        Spans::from(""),
        Spans::from(format!("Budget: {}", format_budget(u64::from(project.budget)))),
        Spans::from(format!("Votes: {}", project.votes)),
        Spans::from(format!("Themes: {}", theme_names(&project.themes).join(", "))),
    ];
    let card = Paragraph::new(text)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

fn render_empty<B: Backend>(f: &mut Frame<B>, area: Rect, err: &ComparisonError) {
    let body = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(Span::styled(
            "Nothing to compare",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(""),
        Spans::from(err.to_string()),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, area);
}

pub fn handle_input(state: &mut CompareState) -> Result<Option<CompareAction>> {
    Ok(read_key()?.and_then(|key| handle_key(state, key)))
}

pub fn handle_key(state: &mut CompareState, key: KeyCode) -> Option<CompareAction> {
    if state.show_info {
        state.show_info = false;
        return None;
    }
    if state.message.take().is_some() {
        return None;
    }

    let session = match &mut state.session {
        Ok(session) => session,
        Err(_) => {
            return match key {
                KeyCode::Char('t') => Some(CompareAction::ChangeThemes),
                KeyCode::Esc | KeyCode::Char('q') => Some(CompareAction::Home),
                _ => None,
            };
        }
    };

    let result = match (session.phase(), key) {
        (_, KeyCode::Esc) => return Some(CompareAction::Back),
        (Phase::Comparing, KeyCode::Char('a')) => session.accept().map(|_| ()),
        (Phase::Comparing, KeyCode::Char('r')) => session.reject().map(|_| ()),
        (Phase::Comparing, KeyCode::Char('s')) => session.super_like(Side::Proposal),
        (Phase::Comparing, KeyCode::Char('c')) => session.super_like(Side::Current),
        (Phase::Comparing, KeyCode::Char('f')) => session.finalize(),
        (Phase::Comparing, KeyCode::Char('i')) => {
            state.show_info = true;
            return None;
        }
        (Phase::FinalChoice, KeyCode::Enter) => {
            return session
                .final_choice()
                .map(|p| CompareAction::Vote(p.id.clone()));
        }
        (Phase::FinalChoice, KeyCode::Char('c')) => session.continue_comparing(),
        _ => return None,
    };

    state.report(result);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComparisonMode;
    use crate::seed;

    fn state() -> CompareState {
        let session = ComparisonSession::start(
            ComparisonMode::Easy,
            &["1".to_string()],
            seed::projects(),
        );
        CompareState::new(session)
    }

    #[test]
    fn super_like_then_confirm_votes_for_proposal() {
        let mut state = state();
        let proposal = state.session.as_ref().unwrap().proposal().unwrap().id.clone();

        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.session.as_ref().unwrap().phase(), Phase::FinalChoice);

        match handle_key(&mut state, KeyCode::Enter) {
            Some(CompareAction::Vote(id)) => assert_eq!(id, proposal),
            _ => panic!("expected Vote"),
        }
    }

    #[test]
    fn early_finalize_is_reported_not_applied() {
        let mut state = state();

        assert!(handle_key(&mut state, KeyCode::Char('f')).is_none());
        assert!(state.message.is_some());
        assert_eq!(state.session.as_ref().unwrap().phase(), Phase::Comparing);

        // the message swallows the next key
        assert!(handle_key(&mut state, KeyCode::Char('a')).is_none());
        assert_eq!(state.session.as_ref().unwrap().comparisons_made(), 0);
    }

    #[test]
    fn accept_spends_a_comparison() {
        let mut state = state();
        handle_key(&mut state, KeyCode::Char('a'));
        handle_key(&mut state, KeyCode::Char('r'));

        let session = state.session.as_ref().unwrap();
        assert_eq!(session.comparisons_made(), 2);
        assert_eq!(session.current().id, "2");
    }

    #[test]
    fn progress_counts_liked_and_set_aside_projects() {
        let mut state = state();
        handle_key(&mut state, KeyCode::Char('a'));
        handle_key(&mut state, KeyCode::Char('r'));
        handle_key(&mut state, KeyCode::Char('r'));

        let line = progress_line(state.session.as_ref().unwrap());
        assert!(line.contains("comparisons left 2/5"));
        assert!(line.ends_with("liked 1 | set aside 2"));
    }

    #[test]
    fn empty_state_offers_theme_change() {
        let mut state = CompareState::new(Err(ComparisonError::NotEnoughCandidates));

        assert!(handle_key(&mut state, KeyCode::Char('a')).is_none());
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('t')),
            Some(CompareAction::ChangeThemes)
        ));
        assert!(matches!(handle_key(&mut state, KeyCode::Esc), Some(CompareAction::Home)));
    }
}
