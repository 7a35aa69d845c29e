pub mod compare;
pub mod components;
pub mod dashboard;
pub mod home;
pub mod login;
pub mod preferences;
pub mod profile;
pub mod project_details;
pub mod project_wizard;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};

/// Blocks for the next key press. Other events (resize, mouse, key release)
/// yield `None` so the caller simply redraws.
pub fn read_key() -> Result<Option<KeyCode>> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            return Ok(Some(key.code));
        }
    }
    Ok(None)
}
