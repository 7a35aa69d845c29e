use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::models::{Location, NewProject, Project};
use crate::services::stats::format_budget;
use crate::services::themes::{initial_themes, theme_names};
use crate::ui::components::popup::{hex_color, step_label};
use crate::ui::components::text_input::TextInput;
use crate::ui::read_key;
use crate::validation::{self, ValidationError};

pub const STEP_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardStep {
    BasicInfo,
    Description,
    Themes,
    BudgetLocation,
    ImagesReview,
}

impl WizardStep {
    pub fn number(&self) -> usize {
        match self {
            WizardStep::BasicInfo => 1,
            WizardStep::Description => 2,
            WizardStep::Themes => 3,
            WizardStep::BudgetLocation => 4,
            WizardStep::ImagesReview => 5,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Basic information",
            WizardStep::Description => "Full description",
            WizardStep::Themes => "Themes",
            WizardStep::BudgetLocation => "Budget and location",
            WizardStep::ImagesReview => "Images and review",
        }
    }

    fn next(&self) -> Option<Self> {
        match self {
            WizardStep::BasicInfo => Some(WizardStep::Description),
            WizardStep::Description => Some(WizardStep::Themes),
            WizardStep::Themes => Some(WizardStep::BudgetLocation),
            WizardStep::BudgetLocation => Some(WizardStep::ImagesReview),
            WizardStep::ImagesReview => None,
        }
    }

    fn previous(&self) -> Option<Self> {
        match self {
            WizardStep::BasicInfo => None,
            WizardStep::Description => Some(WizardStep::BasicInfo),
            WizardStep::Themes => Some(WizardStep::Description),
            WizardStep::BudgetLocation => Some(WizardStep::Themes),
            WizardStep::ImagesReview => Some(WizardStep::BudgetLocation),
        }
    }

    fn fields(&self) -> &'static [WizardField] {
        match self {
            WizardStep::BasicInfo => &[WizardField::Title, WizardField::ShortDescription],
            WizardStep::Description => &[WizardField::FullDescription],
            WizardStep::Themes => &[],
            WizardStep::BudgetLocation => &[
                WizardField::Budget,
                WizardField::Latitude,
                WizardField::Longitude,
            ],
            WizardStep::ImagesReview => &[WizardField::ImagePath],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardField {
    Title,
    ShortDescription,
    FullDescription,
    Budget,
    Latitude,
    Longitude,
    ImagePath,
}

impl WizardField {
    fn label(&self) -> &'static str {
        match self {
            WizardField::Title => "Title",
            WizardField::ShortDescription => "Summary",
            WizardField::FullDescription => "Full description",
            WizardField::Budget => "Budget (€)",
            WizardField::Latitude => "Latitude",
            WizardField::Longitude => "Longitude",
            WizardField::ImagePath => "Image path or URL",
        }
    }
}

pub enum ProjectWizardAction {
    Cancel,
    Submit(NewProject),
    ViewProject(String),
    Done,
}

pub struct ProjectWizardState {
    submitted_by: String,
    step: WizardStep,
    field_index: usize,
    title: TextInput,
    short_description: TextInput,
    full_description: TextInput,
    budget: TextInput,
    latitude: TextInput,
    longitude: TextInput,
    image_path: TextInput,
    images: Vec<String>,
    themes: Vec<String>,
    theme_list: ListState,
    errors: Vec<ValidationError>,
    submitted: Option<Project>,
}

impl ProjectWizardState {
    pub fn new(submitted_by: &str) -> Self {
        let location = Location::default();
        let mut theme_list = ListState::default();
        theme_list.select(Some(0));

        Self {
            submitted_by: submitted_by.to_string(),
            step: WizardStep::BasicInfo,
            field_index: 0,
            title: TextInput::new(""),
            short_description: TextInput::new("").multiline(),
            full_description: TextInput::new("").multiline(),
            budget: TextInput::new("").numeric(),
            latitude: TextInput::new(location.latitude.to_string()).numeric(),
            longitude: TextInput::new(location.longitude.to_string()).numeric(),
            image_path: TextInput::new(""),
            images: Vec::new(),
            themes: Vec::new(),
            theme_list,
            errors: Vec::new(),
            submitted: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Switch to the success screen.
    pub fn mark_submitted(&mut self, project: Project) {
        self.submitted = Some(project);
    }

    fn current_field(&self) -> Option<WizardField> {
        self.step.fields().get(self.field_index).copied()
    }

    fn input(&self, field: WizardField) -> &TextInput {
        match field {
            WizardField::Title => &self.title,
            WizardField::ShortDescription => &self.short_description,
            WizardField::FullDescription => &self.full_description,
            WizardField::Budget => &self.budget,
            WizardField::Latitude => &self.latitude,
            WizardField::Longitude => &self.longitude,
            WizardField::ImagePath => &self.image_path,
        }
    }

    fn input_mut(&mut self, field: WizardField) -> &mut TextInput {
        match field {
            WizardField::Title => &mut self.title,
            WizardField::ShortDescription => &mut self.short_description,
            WizardField::FullDescription => &mut self.full_description,
            WizardField::Budget => &mut self.budget,
            WizardField::Latitude => &mut self.latitude,
            WizardField::Longitude => &mut self.longitude,
            WizardField::ImagePath => &mut self.image_path,
        }
    }

    fn is_editing(&self) -> bool {
        self.current_field()
            .map(|field| self.input(field).editing)
            .unwrap_or(false)
    }

    pub fn toggle_theme(&mut self, theme_id: &str) {
        if let Some(pos) = self.themes.iter().position(|t| t == theme_id) {
            self.themes.remove(pos);
        } else {
            self.themes.push(theme_id.to_string());
        }
    }

    fn move_cursor(&mut self, down: bool) {
        if self.step == WizardStep::Themes {
            let count = initial_themes().len();
            let i = self.theme_list.selected().unwrap_or(0);
            let i = if down { (i + 1) % count } else { (i + count - 1) % count };
            self.theme_list.select(Some(i));
            return;
        }
        let count = self.step.fields().len();
        if count == 0 {
            return;
        }
        self.field_index = if down {
            (self.field_index + 1) % count
        } else {
            (self.field_index + count - 1) % count
        };
    }

    fn validate_step(&self, step: WizardStep) -> Vec<ValidationError> {
        let checks = match step {
            WizardStep::BasicInfo => vec![
                validation::check_title(&self.title.value),
                validation::check_short_description(&self.short_description.value),
            ],
            WizardStep::Description => {
                vec![validation::check_full_description(&self.full_description.value)]
            }
            WizardStep::Themes => vec![validation::check_themes(&self.themes)],
            WizardStep::BudgetLocation => vec![
                validation::parse_budget(&self.budget.value).map(|_| ()),
                validation::parse_latitude(&self.latitude.value).map(|_| ()),
                validation::parse_longitude(&self.longitude.value).map(|_| ()),
            ],
            WizardStep::ImagesReview => Vec::new(),
        };
        checks.into_iter().filter_map(Result::err).collect()
    }

    /// Validates the current step before moving on.
    pub fn next_step(&mut self) -> bool {
        self.errors = self.validate_step(self.step);
        if !self.errors.is_empty() {
            return false;
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                self.field_index = 0;
                true
            }
            None => false,
        }
    }

    pub fn previous_step(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.errors.clear();
            self.step = previous;
            self.field_index = 0;
        }
    }

    /// Builds the payload once every step validates.
    pub fn to_new_project(&self) -> Result<NewProject, Vec<ValidationError>> {
        let errors: Vec<ValidationError> = [
            WizardStep::BasicInfo,
            WizardStep::Description,
            WizardStep::Themes,
            WizardStep::BudgetLocation,
        ]
        .into_iter()
        .flat_map(|step| self.validate_step(step))
        .collect();

        let parsed = (
            validation::parse_budget(&self.budget.value),
            validation::parse_latitude(&self.latitude.value),
            validation::parse_longitude(&self.longitude.value),
        );
        match (errors.is_empty(), parsed) {
            (true, (Ok(budget), Ok(latitude), Ok(longitude))) => Ok(NewProject {
                title: self.title.value.trim().to_string(),
                short_description: self.short_description.value.trim().to_string(),
                full_description: self.full_description.value.trim().to_string(),
                budget,
                location: Location { latitude, longitude },
                themes: self.themes.clone(),
                images: self.images.clone(),
                submitted_by: self.submitted_by.clone(),
            }),
            _ => Err(errors),
        }
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    if let Some(project) = &state.submitted {
        render_success(f, project);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(4),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new(step_label(state.step.number(), STEP_COUNT, state.step.title()))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().title("Submit a project").borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    match state.step {
        WizardStep::Themes => render_themes(f, state, chunks[1]),
        WizardStep::ImagesReview => render_review(f, state, chunks[1]),
        _ => render_fields(f, state, chunks[1]),
    }

    let errors: Vec<Spans> = state
        .errors
        .iter()
        .map(|e| Spans::from(Span::styled(e.to_string(), Style::default().fg(Color::Red))))
        .collect();
    let errors = Paragraph::new(errors)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(errors, chunks[2]);

    let help_text = if state.is_editing() {
        match state.current_field() {
            Some(WizardField::ShortDescription) | Some(WizardField::FullDescription) => {
                "Type text | Enter - New line | Esc - Done"
            }
            _ => "Type text | Enter - Done | Esc - Done",
        }
    } else {
        match state.step {
            WizardStep::Themes => {
                "Space - Toggle theme | Up/Down - Navigate | Right - Next | Left - Previous \
                 | Esc - Cancel"
            }
            WizardStep::ImagesReview => {
                "Enter - Add image | X - Remove last image | S - Submit | Left - Previous \
                 | Esc - Cancel"
            }
            _ => {
                "Enter - Edit field | Up/Down - Navigate fields | Right - Next | Left - Previous \
                 | Esc - Cancel"
            }
        }
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, chunks[3]);
}

fn render_fields<B: Backend>(f: &mut Frame<B>, state: &ProjectWizardState, area: Rect) {
    let fields = state.step.fields();
    let mut lines = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        let input = state.input(*field);
        let style = if i == state.field_index {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let counter = match field {
            WizardField::Title => format!(" ({}/100)", input.char_count()),
            WizardField::ShortDescription => format!(" ({}/500)", input.char_count()),
            WizardField::FullDescription => format!(" ({} chars, 100 minimum)", input.char_count()),
            _ => String::new(),
        };
        lines.push(Spans::from(Span::styled(format!("{}{counter}", field.label()), style)));
        for line in input.get_display_string().split('\n') {
            lines.push(Spans::from(format!("  {line}")));
        }
        lines.push(Spans::from(""));
    }
    if state.step == WizardStep::Description {
        lines.push(Spans::from(Span::styled(
            "Markdown headings (## ) and bullets (- ) are supported.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(form, area);
}

fn render_themes<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState, area: Rect) {
    let items: Vec<ListItem> = initial_themes()
        .iter()
        .map(|theme| {
            let mark = if state.themes.iter().any(|t| t == theme.id) { "[x] " } else { "[ ] " };
            ListItem::new(Spans::from(vec![
                Span::raw(mark),
                Span::styled(theme.name, Style::default().fg(hex_color(theme.color))),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title("Themes related to your project (at least one)")
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    f.render_stateful_widget(list, area, &mut state.theme_list);
}

fn render_review<B: Backend>(f: &mut Frame<B>, state: &ProjectWizardState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let mut images = vec![
        Spans::from(Span::styled(
            WizardField::ImagePath.label(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Spans::from(format!("  {}", state.image_path.get_display_string())),
        Spans::from(""),
    ];
    if state.images.is_empty() {
        images.push(Spans::from("No image added."));
    }
    images.extend(
        state
            .images
            .iter()
            .enumerate()
            .map(|(i, path)| Spans::from(format!("{}. {path}", i + 1))),
    );
    f.render_widget(
        Paragraph::new(images)
            .block(Block::default().title("Images").borders(Borders::ALL))
            .wrap(Wrap { trim: true }),
        columns[0],
    );

    let budget = validation::parse_budget(&state.budget.value)
        .map(|b| format_budget(u64::from(b)))
        .unwrap_or_else(|_| state.budget.value.clone());
    let review = vec![
        Spans::from(Span::styled(
            state.title.value.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(state.short_description.value.clone()),
        Spans::from(""),
        Spans::from(format!("Budget: {budget}")),
        Spans::from(format!(
            "Location: {}, {}",
            state.latitude.value, state.longitude.value
        )),
        Spans::from(format!("Themes: {}", theme_names(&state.themes).join(", "))),
    ];
    f.render_widget(
        Paragraph::new(review)
            .block(Block::default().title("Review").borders(Borders::ALL))
            .wrap(Wrap { trim: true }),
        columns[1],
    );
}

fn render_success<B: Backend>(f: &mut Frame<B>, project: &Project) {
    let body = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(Span::styled(
            "Project submitted!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Spans::from(""),
        Spans::from(format!("\"{}\" has been sent for review.", project.title)),
        Spans::from("You will be notified once it has been reviewed."),
        Spans::from(""),
        Spans::from("<Enter> View project | <Esc> Back to home"),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    f.render_widget(body, f.size());
}

pub fn handle_input(state: &mut ProjectWizardState) -> Result<Option<ProjectWizardAction>> {
    Ok(read_key()?.and_then(|key| handle_key(state, key)))
}

pub fn handle_key(state: &mut ProjectWizardState, key: KeyCode) -> Option<ProjectWizardAction> {
    if let Some(project) = &state.submitted {
        return match key {
            KeyCode::Enter => Some(ProjectWizardAction::ViewProject(project.id.clone())),
            _ => Some(ProjectWizardAction::Done),
        };
    }

    if let Some(field) = state.current_field() {
        if state.input(field).editing {
            let finished = state.input_mut(field).handle_input(key);
            if finished && field == WizardField::ImagePath {
                let path = state.image_path.value.trim().to_string();
                if !path.is_empty() {
                    state.images.push(path);
                }
                state.image_path.value.clear();
            }
            return None;
        }
    }

    match key {
        KeyCode::Esc => return Some(ProjectWizardAction::Cancel),
        KeyCode::Up => state.move_cursor(false),
        KeyCode::Down | KeyCode::Tab => state.move_cursor(true),
        KeyCode::Right => {
            state.next_step();
        }
        KeyCode::Left => state.previous_step(),
        KeyCode::Char(' ') if state.step == WizardStep::Themes => {
            let theme = state
                .theme_list
                .selected()
                .and_then(|i| initial_themes().get(i));
            if let Some(theme) = theme {
                state.toggle_theme(theme.id);
            }
        }
        KeyCode::Enter => {
            if let Some(field) = state.current_field() {
                state.input_mut(field).toggle_editing();
            }
        }
        KeyCode::Char('x') if state.step == WizardStep::ImagesReview => {
            state.images.pop();
        }
        KeyCode::Char('s') if state.step == WizardStep::ImagesReview => {
            match state.to_new_project() {
                Ok(project) => return Some(ProjectWizardAction::Submit(project)),
                Err(errors) => state.errors = errors,
            }
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(state: &mut ProjectWizardState, text: &str) {
        handle_key(state, KeyCode::Enter);
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
        handle_key(state, KeyCode::Esc);
    }

    fn filled() -> ProjectWizardState {
        let mut state = ProjectWizardState::new("1");
        type_into(&mut state, "Community orchard");
        handle_key(&mut state, KeyCode::Down);
        type_into(&mut state, "Fruit trees for every neighbourhood");
        assert!(state.next_step());

        type_into(&mut state, &"Planting and caring for fruit trees. ".repeat(4));
        assert!(state.next_step());

        handle_key(&mut state, KeyCode::Char(' '));
        assert!(state.next_step());

        type_into(&mut state, "12000");
        assert!(state.next_step());
        state
    }

    #[test]
    fn step_validation_blocks_progress() {
        let mut state = ProjectWizardState::new("1");
        type_into(&mut state, "Park");

        handle_key(&mut state, KeyCode::Right);
        assert_eq!(state.step(), WizardStep::BasicInfo);
        assert_eq!(
            state.errors(),
            [
                ValidationError::TooShort { field: "Title", min: 5 },
                ValidationError::Required("Summary"),
            ]
        );
    }

    #[test]
    fn themes_step_needs_a_selection() {
        let mut state = filled();
        state.previous_step();
        state.previous_step();
        assert_eq!(state.step(), WizardStep::Themes);

        handle_key(&mut state, KeyCode::Char(' '));
        assert!(!state.next_step());
        assert_eq!(state.errors(), [ValidationError::NoTheme]);
    }

    #[test]
    fn budget_over_cap_is_refused() {
        let mut state = filled();
        state.previous_step();
        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Char('0'));
        handle_key(&mut state, KeyCode::Esc);

        assert!(!state.next_step());
        assert_eq!(state.errors(), [ValidationError::BudgetTooHigh]);
    }

    #[test]
    fn images_are_added_and_removed() {
        let mut state = filled();
        assert_eq!(state.step(), WizardStep::ImagesReview);

        handle_key(&mut state, KeyCode::Enter);
        for c in "orchard.jpg".chars() {
            handle_key(&mut state, KeyCode::Char(c));
        }
        handle_key(&mut state, KeyCode::Enter);
        type_into(&mut state, "map.png");
        assert_eq!(state.images, ["orchard.jpg", "map.png"]);

        handle_key(&mut state, KeyCode::Char('x'));
        assert_eq!(state.images, ["orchard.jpg"]);
    }

    #[test]
    fn submit_builds_the_payload_then_shows_success() {
        let mut state = filled();

        let new = match handle_key(&mut state, KeyCode::Char('s')) {
            Some(ProjectWizardAction::Submit(new)) => new,
            _ => panic!("expected Submit"),
        };
        assert_eq!(new.title, "Community orchard");
        assert_eq!(new.budget, 12_000);
        assert_eq!(new.themes, ["1"]);
        assert_eq!(new.submitted_by, "1");
        assert_eq!(new.location, Location::default());

        let mut project = crate::seed::projects().remove(0);
        project.id = "new".to_string();
        state.mark_submitted(project);
        assert!(matches!(
            handle_key(&mut state, KeyCode::Enter),
            Some(ProjectWizardAction::ViewProject(id)) if id == "new"
        ));
    }
}
