use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn render_message<B: Backend>(
    frame: &mut Frame<B>,
    title: &str,
    lines: Vec<Spans>,
    color: Color,
) {
    let area = centered_rect(60, 30, frame.size());
    let popup = Paragraph::new(lines)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .style(Style::default().fg(color).bg(Color::Black))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// `#4CAF50` → RGB; anything else falls back to white.
pub fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return Color::White;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::White,
    }
}

/// One-line progress indicator for multi-step flows.
pub fn step_label(step: usize, total: usize, name: &str) -> String {
    let filled = "■".repeat(step);
    let empty = "□".repeat(total.saturating_sub(step));
    format!("Step {step}/{total}  {filled}{empty}  {name}")
}
