//! Form rules for project submission, login, registration and profile.
//!
//! Lengths are counted in characters. Every check returns the first
//! failing rule for its field; `validate_*` collect one error per field.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MAX_BUDGET: u32 = 50_000;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("valid email regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Budget must be a whole number of euros")]
    BudgetNotANumber,
    #[error("Budget cannot be negative")]
    NegativeBudget,
    #[error("The maximum budget is 50 000 €")]
    BudgetTooHigh,
    #[error("Select at least one theme")]
    NoTheme,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("You must accept the terms of use")]
    TermsNotAccepted,
}

fn length(
    field: &'static str,
    value: &str,
    min: usize,
    max: Option<usize>,
) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    let count = trimmed.chars().count();
    if count < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if let Some(max) = max {
        if count > max {
            return Err(ValidationError::TooLong { field, max });
        }
    }
    Ok(())
}

pub fn check_title(title: &str) -> Result<(), ValidationError> {
    length("Title", title, 5, Some(100))
}

pub fn check_short_description(text: &str) -> Result<(), ValidationError> {
    length("Summary", text, 20, Some(500))
}

pub fn check_full_description(text: &str) -> Result<(), ValidationError> {
    length("Full description", text, 100, None)
}

pub fn check_themes(themes: &[String]) -> Result<(), ValidationError> {
    if themes.is_empty() {
        Err(ValidationError::NoTheme)
    } else {
        Ok(())
    }
}

/// Parses the raw budget field.
pub fn parse_budget(raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Required("Budget"));
    }
    let value: i64 = raw.parse().map_err(|_| ValidationError::BudgetNotANumber)?;
    if value < 0 {
        return Err(ValidationError::NegativeBudget);
    }
    if value > i64::from(MAX_BUDGET) {
        return Err(ValidationError::BudgetTooHigh);
    }
    Ok(value as u32)
}

pub fn parse_coordinate(
    field: &'static str,
    raw: &str,
    limit: f64,
) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Required(field));
    }
    let value: f64 = raw.parse().map_err(|_| ValidationError::OutOfRange(field))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(ValidationError::OutOfRange(field));
    }
    Ok(value)
}

pub fn parse_latitude(raw: &str) -> Result<f64, ValidationError> {
    parse_coordinate("Latitude", raw, 90.0)
}

pub fn parse_longitude(raw: &str) -> Result<f64, ValidationError> {
    parse_coordinate("Longitude", raw, 180.0)
}

pub fn check_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required("Email"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

fn collect(checks: impl IntoIterator<Item = Result<(), ValidationError>>) -> Vec<ValidationError> {
    checks.into_iter().filter_map(Result::err).collect()
}

pub fn validate_login(email: &str, password: &str) -> Vec<ValidationError> {
    // Password is not trimmed: spaces are legitimate characters.
    let password_check = if password.is_empty() {
        Err(ValidationError::Required("Password"))
    } else {
        Ok(())
    };
    collect([check_email(email), password_check])
}

pub struct RegistrationForm<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub accept_terms: bool,
}

pub fn validate_registration(form: &RegistrationForm<'_>) -> Vec<ValidationError> {
    let password = if form.password.is_empty() {
        Err(ValidationError::Required("Password"))
    } else if form.password.chars().count() < 8 {
        Err(ValidationError::TooShort { field: "Password", min: 8 })
    } else {
        Ok(())
    };
    let confirm = if form.confirm_password.is_empty() {
        Err(ValidationError::Required("Password confirmation"))
    } else if form.confirm_password != form.password {
        Err(ValidationError::PasswordMismatch)
    } else {
        Ok(())
    };
    let terms = if form.accept_terms {
        Ok(())
    } else {
        Err(ValidationError::TermsNotAccepted)
    };

    collect([
        required("First name", form.first_name),
        required("Last name", form.last_name),
        check_email(form.email),
        password,
        confirm,
        terms,
    ])
}

pub fn validate_profile(first_name: &str, last_name: &str, email: &str) -> Vec<ValidationError> {
    collect([
        required("First name", first_name),
        required("Last name", last_name),
        check_email(email),
    ])
}
