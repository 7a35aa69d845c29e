pub mod auth;
pub mod preferences;
pub mod projects;
pub mod stats;
pub mod themes;

use thiserror::Error;

use crate::store::StoreError;

pub use auth::AuthService;
pub use preferences::PreferencesService;
pub use projects::{Page, ProjectService};
pub use themes::ThemeService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("theme not found: {0}")]
    ThemeNotFound(String),
    #[error("user not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
