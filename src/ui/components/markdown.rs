use tui::{
    style::{Color, Modifier, Style},
    text::{Span, Spans},
};

/// Renders the subset of markdown used in project descriptions: `## `
/// headings and `- ` bullets. Leading indentation is dropped.
pub fn render_markdown(text: &str) -> Vec<Spans<'static>> {
    text.lines()
        .map(str::trim)
        .map(|line| {
            if let Some(heading) = line.strip_prefix("## ") {
                Spans::from(Span::styled(
                    heading.to_string(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
            } else if let Some(item) = line.strip_prefix("- ") {
                Spans::from(format!("  • {item}"))
            } else {
                Spans::from(line.to_string())
            }
        })
        .collect()
}
