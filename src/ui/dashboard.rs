use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{BarChart, Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::services::stats::{
    format_budget, format_number, truncate_name, DashboardStats, ThemePopularity,
};
use crate::ui::components::popup::hex_color;
use crate::ui::read_key;

pub const TOP_THEMES: usize = 6;

pub struct DashboardState {
    stats: DashboardStats,
}

impl DashboardState {
    pub fn new(stats: DashboardStats) -> Self {
        Self { stats }
    }

    /// Leading themes with each gauge relative to the most voted one.
    pub fn top_themes(&self) -> Vec<(&ThemePopularity, f64)> {
        let max = self.stats.themes.first().map(|t| t.votes).unwrap_or(0);
        self.stats
            .themes
            .iter()
            .take(TOP_THEMES)
            .map(|t| {
                let ratio = if max == 0 { 0.0 } else { t.votes as f64 / max as f64 };
                (t, ratio)
            })
            .collect()
    }
}

pub enum DashboardAction {
    Back,
    Refresh,
}

pub fn render_dashboard<B: Backend>(f: &mut Frame<B>, state: &mut DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let stats = &state.stats;
    let totals = Paragraph::new(Spans::from(vec![
        Span::raw("Projects: "),
        Span::styled(
            format_number(stats.project_count() as u64),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("    Votes: "),
        Span::styled(
            format_number(stats.total_votes()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("    Total budget: "),
        Span::styled(
            format_budget(stats.total_budget()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(Block::default().title("Dashboard").borders(Borders::ALL));
    f.render_widget(totals, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(chunks[1]);

    render_votes_chart(f, state, columns[0]);
    render_theme_ranking(f, state, columns[1]);

    let help = Paragraph::new("<R> Refresh | <Esc> Back")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, chunks[2]);
}

fn render_votes_chart<B: Backend>(f: &mut Frame<B>, state: &DashboardState, area: Rect) {
    let projects = state.stats.projects_by_votes();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(6),
                Constraint::Length(projects.len() as u16 + 2),
            ]
            .as_ref(),
        )
        .split(area);

    // Bars are numbered; full names go in the legend below
    let labels: Vec<String> = (1..=projects.len()).map(|i| i.to_string()).collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(projects)
        .map(|(label, p)| (label.as_str(), u64::from(p.votes)))
        .collect();

    let inner_width = rows[0].width.saturating_sub(2) as usize;
    let bar_width = (inner_width / projects.len().max(1)).saturating_sub(1).clamp(3, 12) as u16;
    let chart = BarChart::default()
        .block(Block::default().title("Votes per project").borders(Borders::ALL))
        .data(&data)
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(chart, rows[0]);

    let legend: Vec<Spans> = projects
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Spans::from(format!("{}. {} ({} votes)", i + 1, truncate_name(&p.title), p.votes))
        })
        .collect();
    f.render_widget(
        Paragraph::new(legend).block(Block::default().borders(Borders::ALL)),
        rows[1],
    );
}

fn render_theme_ranking<B: Backend>(f: &mut Frame<B>, state: &DashboardState, area: Rect) {
    let block = Block::default().title("Most popular themes").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let top = state.top_themes();
    let constraints: Vec<Constraint> = top.iter().map(|_| Constraint::Length(3)).collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for ((entry, ratio), row) in top.iter().zip(rows.iter()) {
        let gauge = Gauge::default()
            .block(Block::default().title(format!("{} {}", entry.theme.icon, entry.theme.name)))
            .gauge_style(Style::default().fg(hex_color(entry.theme.color)))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(format!("{} votes", format_number(entry.votes)));
        f.render_widget(gauge, *row);
    }
}

pub fn handle_input(state: &mut DashboardState) -> Result<Option<DashboardAction>> {
    Ok(read_key()?.and_then(|key| handle_key(state, key)))
}

pub fn handle_key(_state: &mut DashboardState, key: KeyCode) -> Option<DashboardAction> {
    match key {
        KeyCode::Esc | KeyCode::Char('q') => Some(DashboardAction::Back),
        KeyCode::Char('r') => Some(DashboardAction::Refresh),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn top_themes_are_relative_to_the_leader() {
        let state = DashboardState::new(DashboardStats::from_projects(seed::projects()));
        let top = state.top_themes();

        assert_eq!(top.len(), TOP_THEMES);
        assert_eq!(top[0].0.theme.name, "Environment");
        assert_eq!(top[0].1, 1.0);
        assert!((top[1].1 - 87.0 / 178.0).abs() < 1e-9);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn no_votes_gives_empty_gauges() {
        let mut projects = seed::projects();
        for p in &mut projects {
            p.votes = 0;
        }
        let state = DashboardState::new(DashboardStats::from_projects(projects));
        assert!(state.top_themes().iter().all(|(_, ratio)| *ratio == 0.0));
    }

    #[test]
    fn keys() {
        let mut state = DashboardState::new(DashboardStats::from_projects(Vec::new()));
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('r')),
            Some(DashboardAction::Refresh)
        ));
        assert!(matches!(handle_key(&mut state, KeyCode::Esc), Some(DashboardAction::Back)));
        assert!(handle_key(&mut state, KeyCode::Enter).is_none());
    }
}
