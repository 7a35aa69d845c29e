use crossterm::event::KeyCode;

/// Single form field. Keys only reach the value while `editing` is on.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub value: String,
    pub editing: bool,
    multiline: bool,
    masked: bool,
    numeric: bool,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    /// Enter inserts a line break; only Esc ends editing.
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Accepts digits, sign and decimal point only.
    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    /// Returns `true` when this key ended the edit.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        if !self.editing {
            return false;
        }

        match key {
            KeyCode::Esc => {
                self.editing = false;
                return true;
            }
            KeyCode::Enter if self.multiline => {
                self.value.push('\n');
            }
            KeyCode::Enter => {
                self.editing = false;
                return true;
            }
            KeyCode::Char(c) if self.numeric => {
                if c.is_ascii_digit() || c == '.' || c == '-' {
                    self.value.push(c);
                }
            }
            KeyCode::Char(c) => {
                self.value.push(c);
            }
            KeyCode::Backspace => {
                self.value.pop();
            }
            _ => {}
        }
        false
    }

    pub fn get_display_string(&self) -> String {
        let shown = if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };
        if self.editing {
            format!("{shown}|")
        } else {
            shown
        }
    }

    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_keys_until_editing() {
        let mut input = TextInput::new("ab");
        assert!(!input.handle_input(KeyCode::Char('c')));
        assert_eq!(input.value, "ab");

        input.toggle_editing();
        input.handle_input(KeyCode::Char('c'));
        input.handle_input(KeyCode::Backspace);
        input.handle_input(KeyCode::Char('d'));
        assert_eq!(input.value, "abd");
        assert!(input.handle_input(KeyCode::Enter));
        assert!(!input.editing);
    }

    #[test]
    fn multiline_keeps_enter_as_newline() {
        let mut input = TextInput::new("").multiline();
        input.toggle_editing();
        input.handle_input(KeyCode::Char('a'));
        assert!(!input.handle_input(KeyCode::Enter));
        input.handle_input(KeyCode::Char('b'));

        assert_eq!(input.value, "a\nb");
        assert!(input.handle_input(KeyCode::Esc));
    }

    #[test]
    fn numeric_filters_letters_and_masked_hides_value() {
        let mut budget = TextInput::new("").numeric();
        budget.toggle_editing();
        for c in "12a5".chars() {
            budget.handle_input(KeyCode::Char(c));
        }
        assert_eq!(budget.value, "125");

        let password = TextInput::new("sésame").masked();
        assert_eq!(password.get_display_string(), "******");
    }
}
