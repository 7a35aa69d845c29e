use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::models::NewUser;
use crate::ui::components::popup::centered_rect;
use crate::ui::components::text_input::TextInput;
use crate::ui::read_key;
use crate::validation::{validate_login, validate_registration, RegistrationForm, ValidationError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginTab {
    Login,
    Register,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoginField {
    FirstName,
    LastName,
    Email,
    Password,
    ConfirmPassword,
    AcceptTerms,
}

const LOGIN_FIELDS: [LoginField; 2] = [LoginField::Email, LoginField::Password];
const REGISTER_FIELDS: [LoginField; 6] = [
    LoginField::FirstName,
    LoginField::LastName,
    LoginField::Email,
    LoginField::Password,
    LoginField::ConfirmPassword,
    LoginField::AcceptTerms,
];

impl LoginField {
    fn label(&self) -> &'static str {
        match self {
            LoginField::FirstName => "First name",
            LoginField::LastName => "Last name",
            LoginField::Email => "Email",
            LoginField::Password => "Password",
            LoginField::ConfirmPassword => "Confirm password",
            LoginField::AcceptTerms => "I accept the terms of use",
        }
    }
}

pub enum LoginAction {
    Cancel,
    Login { email: String, password: String },
    Register(NewUser),
}

pub struct LoginState {
    tab: LoginTab,
    field_index: usize,
    first_name: TextInput,
    last_name: TextInput,
    email: TextInput,
    password: TextInput,
    confirm_password: TextInput,
    accept_terms: bool,
    errors: Vec<String>,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            tab: LoginTab::Login,
            field_index: 0,
            first_name: TextInput::new(""),
            last_name: TextInput::new(""),
            email: TextInput::new(""),
            password: TextInput::new("").masked(),
            confirm_password: TextInput::new("").masked(),
            accept_terms: false,
            errors: Vec::new(),
        }
    }

    /// Shown under the form, e.g. after refused credentials.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.errors = vec![message.into()];
    }

    fn fields(&self) -> &'static [LoginField] {
        match self.tab {
            LoginTab::Login => &LOGIN_FIELDS,
            LoginTab::Register => &REGISTER_FIELDS,
        }
    }

    fn current_field(&self) -> LoginField {
        let fields = self.fields();
        fields[self.field_index.min(fields.len() - 1)]
    }

    fn input(&self, field: LoginField) -> Option<&TextInput> {
        match field {
            LoginField::FirstName => Some(&self.first_name),
            LoginField::LastName => Some(&self.last_name),
            LoginField::Email => Some(&self.email),
            LoginField::Password => Some(&self.password),
            LoginField::ConfirmPassword => Some(&self.confirm_password),
            LoginField::AcceptTerms => None,
        }
    }

    fn input_mut(&mut self, field: LoginField) -> Option<&mut TextInput> {
        match field {
            LoginField::FirstName => Some(&mut self.first_name),
            LoginField::LastName => Some(&mut self.last_name),
            LoginField::Email => Some(&mut self.email),
            LoginField::Password => Some(&mut self.password),
            LoginField::ConfirmPassword => Some(&mut self.confirm_password),
            LoginField::AcceptTerms => None,
        }
    }

    fn editing(&self) -> bool {
        self.input(self.current_field())
            .map(|input| input.editing)
            .unwrap_or(false)
    }

    fn switch_tab(&mut self) {
        self.tab = match self.tab {
            LoginTab::Login => LoginTab::Register,
            LoginTab::Register => LoginTab::Login,
        };
        self.field_index = 0;
        self.errors.clear();
    }

    fn move_field(&mut self, down: bool) {
        let count = self.fields().len();
        self.field_index = if down {
            (self.field_index + 1) % count
        } else {
            (self.field_index + count - 1) % count
        };
    }

    fn submit(&mut self) -> Option<LoginAction> {
        let errors: Vec<ValidationError> = match self.tab {
            LoginTab::Login => validate_login(&self.email.value, &self.password.value),
            LoginTab::Register => validate_registration(&RegistrationForm {
                first_name: &self.first_name.value,
                last_name: &self.last_name.value,
                email: &self.email.value,
                password: &self.password.value,
                confirm_password: &self.confirm_password.value,
                accept_terms: self.accept_terms,
            }),
        };
        self.errors = errors.iter().map(ToString::to_string).collect();
        if !self.errors.is_empty() {
            return None;
        }

        let email = self.email.value.trim().to_string();
        Some(match self.tab {
            LoginTab::Login => LoginAction::Login {
                email,
                password: self.password.value.clone(),
            },
            LoginTab::Register => LoginAction::Register(NewUser {
                first_name: self.first_name.value.trim().to_string(),
                last_name: self.last_name.value.trim().to_string(),
                email,
                password: self.password.value.clone(),
            }),
        })
    }
}

impl Default for LoginState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_login<B: Backend>(f: &mut Frame<B>, state: &mut LoginState) {
    let area = centered_rect(60, 80, f.size());
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let selected = match state.tab {
        LoginTab::Login => 0,
        LoginTab::Register => 1,
    };
    let tabs = Tabs::new(vec![Spans::from("Login"), Spans::from("Register")])
        .select(selected)
        .block(Block::default().title("Account").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    let current = state.current_field();
    let mut lines = Vec::new();
    for field in state.fields() {
        let style = if *field == current {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        match state.input(*field) {
            Some(input) => {
                lines.push(Spans::from(Span::styled(field.label(), style)));
                lines.push(Spans::from(format!("  {}", input.get_display_string())));
            }
            None => {
                let mark = if state.accept_terms { "[x]" } else { "[ ]" };
                lines.push(Spans::from(Span::styled(format!("{mark} {}", field.label()), style)));
            }
        }
    }
    if state.tab == LoginTab::Login {
        lines.push(Spans::from(""));
        lines.push(Spans::from(Span::styled(
            "Demo accounts: demo@evry.fr / demo, admin@evry.fr / admin",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Spans::from(""));
    for error in &state.errors {
        lines.push(Spans::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }
    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().bg(Color::Black))
        .wrap(Wrap { trim: false });
    f.render_widget(form, chunks[1]);

    let help = if state.editing() {
        "Type text | Enter - Done"
    } else {
        "Enter - Edit / toggle | Up/Down - Navigate | S - Submit | Tab - Switch tab | Esc - Close"
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray).bg(Color::Black))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut LoginState) -> Result<Option<LoginAction>> {
    Ok(read_key()?.and_then(|key| handle_key(state, key)))
}

pub fn handle_key(state: &mut LoginState, key: KeyCode) -> Option<LoginAction> {
    let field = state.current_field();
    if state.editing() {
        if let Some(input) = state.input_mut(field) {
            input.handle_input(key);
        }
        return None;
    }

    match key {
        KeyCode::Esc => return Some(LoginAction::Cancel),
        KeyCode::Tab => state.switch_tab(),
        KeyCode::Up => state.move_field(false),
        KeyCode::Down => state.move_field(true),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if field == LoginField::AcceptTerms {
                state.accept_terms = !state.accept_terms;
            } else if let Some(input) = state.input_mut(field) {
                input.toggle_editing();
            }
        }
        KeyCode::Char('s') => return state.submit(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(state: &mut LoginState, text: &str) {
        handle_key(state, KeyCode::Enter);
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
        handle_key(state, KeyCode::Enter);
    }

    #[test]
    fn login_submits_credentials() {
        let mut state = LoginState::new();
        type_into(&mut state, " demo@evry.fr");
        handle_key(&mut state, KeyCode::Down);
        type_into(&mut state, "demo");

        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(LoginAction::Login { email, password }) => {
                assert_eq!(email, "demo@evry.fr");
                assert_eq!(password, "demo");
            }
            _ => panic!("expected Login"),
        }
    }

    #[test]
    fn empty_login_lists_errors() {
        let mut state = LoginState::new();
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.errors, ["Email is required", "Password is required"]);
    }

    #[test]
    fn registration_needs_terms() {
        let mut state = LoginState::new();
        handle_key(&mut state, KeyCode::Tab);
        assert_eq!(state.tab, LoginTab::Register);

        for value in ["Marie", "Curie", "marie@evry.fr", "radium123", "radium123"] {
            type_into(&mut state, value);
            handle_key(&mut state, KeyCode::Down);
        }
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.errors, ["You must accept the terms of use"]);

        handle_key(&mut state, KeyCode::Char(' '));
        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(LoginAction::Register(user)) => {
                assert_eq!(user.first_name, "Marie");
                assert_eq!(user.email, "marie@evry.fr");
            }
            _ => panic!("expected Register"),
        }
    }

    #[test]
    fn typing_while_editing_does_not_trigger_shortcuts() {
        let mut state = LoginState::new();
        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Char('s'));
        handle_key(&mut state, KeyCode::Tab);

        assert_eq!(state.email.value, "s");
        assert_eq!(state.tab, LoginTab::Login);
    }
}
