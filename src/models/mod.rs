mod user;
mod project;
mod theme;
mod vote;
mod preferences;

pub use user::{NewUser, Role, SessionUser, User};
pub use project::{Location, NewProject, Project, ProjectPatch, ProjectStatus};
pub use theme::Theme;
pub use vote::{MyVote, Vote};
pub use preferences::{ComparisonMode, Preferences};

/// Generate an opaque id for records created at runtime.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
