mod api;
mod comparison;
mod config;
mod logging;
mod models;
mod seed;
mod services;
mod store;
mod ui;
mod validation;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::api::MockApi;
use crate::comparison::ComparisonSession;
use crate::config::Args;
use crate::models::{generate_id, ProjectPatch, ProjectStatus};
use crate::services::stats::DashboardStats;
use crate::services::{
    AuthService, PreferencesService, ProjectService, ServiceError, ThemeService,
};
use crate::store::LocalStore;
use crate::ui::{
    compare::{
        handle_input as handle_compare_input, render_compare, CompareAction, CompareState,
    },
    dashboard::{
        handle_input as handle_dashboard_input, render_dashboard, DashboardAction,
        DashboardState,
    },
    home::{
        handle_input as handle_home_input, render_home, HomeAction, HomeState,
        FEATURED_PAGE_SIZE,
    },
    login::{handle_input as handle_login_input, render_login, LoginAction, LoginState},
    preferences::{
        handle_input as handle_preferences_input, render_preferences, PreferencesAction,
        PreferencesState,
    },
    profile::{handle_input as handle_profile_input, render_profile, ProfileAction, ProfileState},
    project_details::{
        handle_input as handle_details_input, render_project_details, ProjectDetailsAction,
        ProjectDetailsState,
    },
    project_wizard::{
        handle_input as handle_wizard_input, render_project_wizard, ProjectWizardAction,
        ProjectWizardState,
    },
};

// Represents the current screen in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppScreen {
    Home,
    Preferences,
    Compare,
    ProjectDetails,
    Submit,     // protected
    Profile,    // protected
    Dashboard,  // protected
    Login,      // drawn over Home
}

impl AppScreen {
    fn is_protected(&self) -> bool {
        matches!(self, AppScreen::Submit | AppScreen::Profile | AppScreen::Dashboard)
    }
}

// Main application state
struct AppState {
    auth: AuthService,
    preferences: PreferencesService,
    projects: ProjectService,
    themes: ThemeService,
    screen: AppScreen,
    // Where to go once the login dialog succeeds
    pending: Option<AppScreen>,
    home_page: usize,
    home_state: Option<HomeState>,
    preferences_state: Option<PreferencesState>,
    compare_state: Option<CompareState>,
    details_state: Option<ProjectDetailsState>,
    wizard_state: Option<ProjectWizardState>,
    profile_state: Option<ProfileState>,
    dashboard_state: Option<DashboardState>,
    login_state: Option<LoginState>,
}

impl AppState {
    fn new(store: LocalStore, api: MockApi) -> Self {
        Self {
            auth: AuthService::new(store.clone(), api.clone()),
            preferences: PreferencesService::new(store.clone()),
            projects: ProjectService::new(store, api.clone()),
            themes: ThemeService::new(api),
            screen: AppScreen::Home,
            pending: None,
            home_page: 1,
            home_state: None,
            preferences_state: None,
            compare_state: None,
            details_state: None,
            wizard_state: None,
            profile_state: None,
            dashboard_state: None,
            login_state: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::init(&args)?;
    logging::init(&config)?;
    println!("Starting civic budget...");

    let store = LocalStore::open(config.data_dir())?;
    if args.reset {
        store.clear()?;
        info!("stored state cleared");
    }
    let api = MockApi::new(Duration::from_millis(config.api_delay_ms));

    // Create app state
    let mut app_state = AppState::new(store, api);
    open_home(&mut app_state, None).await?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        error!(error = %err, "application stopped");
        println!("Error: {}", err);
    }

    println!("Thanks for taking part in your city's budget!");

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Home => {
                if let Some(state) = &mut app_state.home_state {
                    render_home(f, state);
                }
            }
            AppScreen::Preferences => {
                if let Some(state) = &mut app_state.preferences_state {
                    render_preferences(f, state);
                }
            }
            AppScreen::Compare => {
                if let Some(state) = &mut app_state.compare_state {
                    render_compare(f, state);
                }
            }
            AppScreen::ProjectDetails => {
                if let Some(state) = &mut app_state.details_state {
                    render_project_details(f, state);
                }
            }
            AppScreen::Submit => {
                if let Some(state) = &mut app_state.wizard_state {
                    render_project_wizard(f, state);
                }
            }
            AppScreen::Profile => {
                if let Some(state) = &mut app_state.profile_state {
                    render_profile(f, state);
                }
            }
            AppScreen::Dashboard => {
                if let Some(state) = &mut app_state.dashboard_state {
                    render_dashboard(f, state);
                }
            }
            AppScreen::Login => {
                if let Some(state) = &mut app_state.home_state {
                    render_home(f, state);
                }
                if let Some(state) = &mut app_state.login_state {
                    render_login(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Home => handle_home_screen(app_state).await?,
            AppScreen::Preferences => handle_preferences_screen(app_state).await?,
            AppScreen::Compare => handle_compare_screen(app_state).await?,
            AppScreen::ProjectDetails => handle_details_screen(app_state).await?,
            AppScreen::Submit => handle_wizard_screen(app_state).await?,
            AppScreen::Profile => handle_profile_screen(app_state).await?,
            AppScreen::Dashboard => handle_dashboard_screen(app_state).await?,
            AppScreen::Login => handle_login_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn open_home(app_state: &mut AppState, message: Option<&str>) -> Result<()> {
    let page = app_state
        .projects
        .get_projects(app_state.home_page, FEATURED_PAGE_SIZE)
        .await;

    let mut state = HomeState::new(app_state.auth.user().cloned(), page);
    if let Some(message) = message {
        state = state.with_message(message);
    }
    app_state.home_state = Some(state);
    app_state.screen = AppScreen::Home;

    Ok(())
}

async fn open_preferences(app_state: &mut AppState) -> Result<()> {
    let themes = app_state.themes.get_themes().await;
    let mut state = PreferencesState::new(themes, app_state.preferences.preferences());
    state.set_matching(matching_projects(app_state).await);
    app_state.preferences_state = Some(state);
    app_state.screen = AppScreen::Preferences;

    Ok(())
}

async fn matching_projects(app_state: &AppState) -> usize {
    app_state
        .projects
        .get_projects_by_themes(app_state.preferences.selected_themes())
        .await
        .len()
}

// Mirror the stored preferences after a change made on the preferences screen
async fn refresh_preferences(app_state: &mut AppState) {
    let matching = matching_projects(app_state).await;
    if let Some(state) = &mut app_state.preferences_state {
        state.sync(app_state.preferences.preferences());
        state.set_matching(matching);
    }
}

async fn open_compare(app_state: &mut AppState) -> Result<()> {
    let themes = app_state.preferences.selected_themes().to_vec();
    if themes.is_empty() {
        open_preferences(app_state).await?;
        if let Some(state) = &mut app_state.preferences_state {
            state.set_message("Select at least one theme before comparing projects.");
        }
        return Ok(());
    }

    let candidates = app_state
        .projects
        .get_recommended_projects(&themes, &[])
        .await;

    let session = ComparisonSession::start(app_state.preferences.mode(), &themes, candidates);
    if session.is_ok() {
        app_state.preferences.set_session_id(Some(generate_id()))?;
    }
    app_state.compare_state = Some(CompareState::new(session));
    app_state.screen = AppScreen::Compare;

    Ok(())
}

async fn open_project(
    app_state: &mut AppState,
    project_id: &str,
    vote_success: bool,
) -> Result<()> {
    let project = match app_state.projects.get_project(project_id).await {
        Ok(project) => Some(project),
        Err(ServiceError::ProjectNotFound(_)) => None,
        Err(err) => return Err(err.into()),
    };
    let submitter = project
        .as_ref()
        .map(|p| app_state.auth.display_name(&p.submitted_by))
        .unwrap_or_default();

    let mut themes = Vec::new();
    for theme_id in project.iter().flat_map(|p| p.themes.iter()) {
        match app_state.themes.get_theme(theme_id).await {
            Ok(theme) => themes.push(theme.name.to_string()),
            Err(ServiceError::ThemeNotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }
    }

    let authenticated = app_state.auth.is_authenticated();
    let mut state =
        ProjectDetailsState::new(project_id, project, submitter, authenticated).with_themes(themes);
    if vote_success {
        state = state.with_vote_success();
    }
    app_state.details_state = Some(state);
    app_state.screen = AppScreen::ProjectDetails;

    Ok(())
}

async fn open_submit(app_state: &mut AppState) -> Result<()> {
    let Some(user_id) = app_state.auth.user().map(|u| u.id.clone()) else {
        require_login(app_state, Some(AppScreen::Submit));
        return Ok(());
    };
    app_state.wizard_state = Some(ProjectWizardState::new(&user_id));
    app_state.screen = AppScreen::Submit;

    Ok(())
}

async fn open_profile(app_state: &mut AppState) -> Result<()> {
    let Some(user) = app_state.auth.user().cloned() else {
        require_login(app_state, Some(AppScreen::Profile));
        return Ok(());
    };
    let projects = app_state.projects.get_projects_by_user(&user.id).await;
    let my_vote = app_state.projects.get_my_vote().await;

    app_state.profile_state = Some(ProfileState::new(&user, projects, my_vote));
    app_state.screen = AppScreen::Profile;

    Ok(())
}

async fn open_dashboard(app_state: &mut AppState) -> Result<()> {
    let projects = app_state.projects.all_projects().await;
    app_state.dashboard_state = Some(DashboardState::new(DashboardStats::from_projects(projects)));
    app_state.screen = AppScreen::Dashboard;

    Ok(())
}

/// Cast the vote confirmed on the comparison screen and route on the outcome.
async fn confirm_vote(app_state: &mut AppState, project_id: &str) -> Result<()> {
    match app_state.projects.vote_for_project(project_id).await {
        Ok(()) => {
            app_state.compare_state = None;
            app_state.preferences.set_session_id(None)?;
            open_project(app_state, project_id, true).await?;
        }
        Err(ServiceError::NotAuthenticated) => {
            // keep the session so the vote can be confirmed after login
            open_home(app_state, None).await?;
            require_login(app_state, Some(AppScreen::Compare));
        }
        Err(ServiceError::ProjectNotFound(_)) => {
            app_state.compare_state = None;
            open_project(app_state, project_id, false).await?;
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

/// Send one of my projects back to draft and update the profile list.
async fn withdraw_project(app_state: &mut AppState, project_id: &str) -> Result<()> {
    let patch = ProjectPatch {
        status: Some(ProjectStatus::Draft),
        ..Default::default()
    };
    let project = app_state.projects.update_project(project_id, patch).await?;
    info!(project_id, "project withdrawn");

    if let Some(state) = &mut app_state.profile_state {
        state.replace_project(project);
        state.set_notice("Project withdrawn, it is back to draft.");
    }

    Ok(())
}

fn require_login(app_state: &mut AppState, then: Option<AppScreen>) {
    info!(pending = ?then, "login required");
    app_state.pending = then;
    app_state.login_state = Some(LoginState::new());
    app_state.screen = AppScreen::Login;
}

async fn open_route(app_state: &mut AppState, screen: AppScreen) -> Result<()> {
    if screen.is_protected() && !app_state.auth.is_authenticated() {
        require_login(app_state, Some(screen));
        return Ok(());
    }

    match screen {
        AppScreen::Home | AppScreen::Login => open_home(app_state, None).await,
        AppScreen::Preferences => open_preferences(app_state).await,
        AppScreen::Compare if app_state.compare_state.is_some() => {
            app_state.screen = AppScreen::Compare;
            Ok(())
        }
        AppScreen::Compare => open_compare(app_state).await,
        AppScreen::ProjectDetails if app_state.details_state.is_some() => {
            app_state.screen = AppScreen::ProjectDetails;
            Ok(())
        }
        AppScreen::ProjectDetails => open_home(app_state, None).await,
        AppScreen::Submit => open_submit(app_state).await,
        AppScreen::Profile => open_profile(app_state).await,
        AppScreen::Dashboard => open_dashboard(app_state).await,
    }
}

async fn handle_home_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.home_state {
        match handle_home_input(state)? {
            Some(HomeAction::Quit) => {
                return Ok(true);
            }
            Some(HomeAction::OpenProject(id)) => {
                open_project(app_state, &id, false).await?;
            }
            Some(HomeAction::ChangePage(page)) => {
                app_state.home_page = page;
                open_home(app_state, None).await?;
            }
            Some(HomeAction::Preferences) => {
                open_preferences(app_state).await?;
            }
            Some(HomeAction::Compare) => {
                open_compare(app_state).await?;
            }
            Some(HomeAction::Submit) => {
                open_route(app_state, AppScreen::Submit).await?;
            }
            Some(HomeAction::Dashboard) => {
                open_route(app_state, AppScreen::Dashboard).await?;
            }
            Some(HomeAction::Profile) => {
                open_route(app_state, AppScreen::Profile).await?;
            }
            Some(HomeAction::Login) => {
                require_login(app_state, None);
            }
            Some(HomeAction::Logout) => {
                app_state.auth.logout()?;
                open_home(app_state, Some("You have been logged out.")).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_preferences_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.preferences_state {
        match handle_preferences_input(state)? {
            Some(PreferencesAction::Back) => {
                open_home(app_state, None).await?;
            }
            Some(PreferencesAction::ToggleTheme(id)) => {
                if !app_state.preferences.toggle_theme(&id)? {
                    state.set_message("You can select at most 5 themes.");
                }
                refresh_preferences(app_state).await;
            }
            Some(PreferencesAction::ToggleMode) => {
                app_state.preferences.toggle_mode()?;
                refresh_preferences(app_state).await;
            }
            Some(PreferencesAction::Reset) => {
                app_state.preferences.reset()?;
                refresh_preferences(app_state).await;
            }
            Some(PreferencesAction::Continue) => {
                open_compare(app_state).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_compare_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.compare_state {
        match handle_compare_input(state)? {
            Some(CompareAction::Back) | Some(CompareAction::ChangeThemes) => {
                app_state.compare_state = None;
                open_preferences(app_state).await?;
            }
            Some(CompareAction::Home) => {
                app_state.compare_state = None;
                open_home(app_state, None).await?;
            }
            Some(CompareAction::Vote(project_id)) => {
                confirm_vote(app_state, &project_id).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_details_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.details_state {
        match handle_details_input(state)? {
            Some(ProjectDetailsAction::Back) => {
                open_home(app_state, None).await?;
            }
            Some(ProjectDetailsAction::StartVoting) => {
                open_preferences(app_state).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.wizard_state {
        match handle_wizard_input(state)? {
            Some(ProjectWizardAction::Cancel) | Some(ProjectWizardAction::Done) => {
                app_state.wizard_state = None;
                open_home(app_state, None).await?;
            }
            Some(ProjectWizardAction::Submit(new_project)) => {
                let project = app_state.projects.create_project(new_project).await?;
                state.mark_submitted(project);
            }
            Some(ProjectWizardAction::ViewProject(id)) => {
                app_state.wizard_state = None;
                open_project(app_state, &id, false).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_profile_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.profile_state {
        match handle_profile_input(state)? {
            Some(ProfileAction::Back) => {
                open_home(app_state, None).await?;
            }
            Some(ProfileAction::Logout) => {
                app_state.auth.logout()?;
                app_state.profile_state = None;
                open_home(app_state, Some("You have been logged out.")).await?;
            }
            Some(ProfileAction::Save {
                first_name,
                last_name,
                email,
            }) => {
                if app_state.auth.update_profile(&first_name, &last_name, &email).await? {
                    state.set_notice("Profile updated.");
                }
            }
            Some(ProfileAction::OpenProject(id)) => {
                open_project(app_state, &id, false).await?;
            }
            Some(ProfileAction::Withdraw(id)) => {
                withdraw_project(app_state, &id).await?;
            }
            Some(ProfileAction::Submit) => {
                open_route(app_state, AppScreen::Submit).await?;
            }
            Some(ProfileAction::ChangeVote) => {
                open_preferences(app_state).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.dashboard_state {
        match handle_dashboard_input(state)? {
            Some(DashboardAction::Back) => {
                open_home(app_state, None).await?;
            }
            Some(DashboardAction::Refresh) => {
                open_dashboard(app_state).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_login_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.login_state {
        let signed_in = match handle_login_input(state)? {
            Some(LoginAction::Cancel) => {
                app_state.pending = None;
                app_state.login_state = None;
                open_home(app_state, None).await?;
                return Ok(false);
            }
            Some(LoginAction::Login { email, password }) => {
                let ok = app_state.auth.login(&email, &password).await?;
                if !ok {
                    state.set_error("Invalid email or password.");
                }
                ok
            }
            Some(LoginAction::Register(new_user)) => {
                let ok = app_state.auth.register(&new_user).await?;
                if !ok {
                    state.set_error("An account already exists with this email.");
                }
                ok
            }
            None => false,
        };

        if signed_in {
            app_state.login_state = None;
            let next = app_state.pending.take().unwrap_or(AppScreen::Home);
            open_route(app_state, next).await?;
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        (dir, AppState::new(store, MockApi::new(Duration::ZERO)))
    }

    #[tokio::test]
    async fn protected_route_asks_for_login_first() {
        let (_dir, mut app) = app();

        open_route(&mut app, AppScreen::Dashboard).await.unwrap();

        assert_eq!(app.screen, AppScreen::Login);
        assert_eq!(app.pending, Some(AppScreen::Dashboard));
        assert!(app.login_state.is_some());
        assert!(app.dashboard_state.is_none());

        app.auth.login("demo@evry.fr", "demo").await.unwrap();
        let next = app.pending.take().unwrap();
        open_route(&mut app, next).await.unwrap();
        assert_eq!(app.screen, AppScreen::Dashboard);
        assert!(app.dashboard_state.is_some());
    }

    #[tokio::test]
    async fn compare_without_themes_opens_preferences() {
        let (_dir, mut app) = app();

        open_compare(&mut app).await.unwrap();

        assert_eq!(app.screen, AppScreen::Preferences);
        assert!(app.compare_state.is_none());
        let state = app.preferences_state.as_ref().unwrap();
        assert_eq!(
            state.message(),
            Some("Select at least one theme before comparing projects.")
        );
    }

    #[tokio::test]
    async fn vote_without_session_resumes_the_comparison_after_login() {
        let (_dir, mut app) = app();
        app.preferences.toggle_theme("1").unwrap();
        open_compare(&mut app).await.unwrap();
        assert_eq!(app.screen, AppScreen::Compare);

        confirm_vote(&mut app, "1").await.unwrap();

        assert_eq!(app.screen, AppScreen::Login);
        assert_eq!(app.pending, Some(AppScreen::Compare));
        assert!(app.home_state.is_some());
        assert!(app.compare_state.is_some());

        assert!(app.auth.login("demo@evry.fr", "demo").await.unwrap());
        let next = app.pending.take().unwrap();
        open_route(&mut app, next).await.unwrap();

        assert_eq!(app.screen, AppScreen::Compare);
        assert!(app.compare_state.is_some());
    }

    #[tokio::test]
    async fn confirmed_vote_opens_the_project_with_a_banner() {
        let (_dir, mut app) = app();
        app.auth.login("demo@evry.fr", "demo").await.unwrap();
        app.preferences.toggle_theme("1").unwrap();
        open_compare(&mut app).await.unwrap();
        assert!(app.preferences.preferences().session_id.is_some());

        confirm_vote(&mut app, "3").await.unwrap();

        assert_eq!(app.screen, AppScreen::ProjectDetails);
        assert!(app.compare_state.is_none());
        assert!(app.preferences.preferences().session_id.is_none());
        let details = app.details_state.as_ref().unwrap();
        assert!(details.shows_vote_success());
        assert_eq!(details.themes(), ["Mobility", "Environment"]);
        // the demo user's seed vote moves from project 1 to project 3
        assert_eq!(app.projects.get_project("3").await.unwrap().votes, 54);
        assert_eq!(app.projects.get_project("1").await.unwrap().votes, 86);
    }

    #[tokio::test]
    async fn vote_for_a_vanished_project_shows_not_found() {
        let (_dir, mut app) = app();
        app.auth.login("demo@evry.fr", "demo").await.unwrap();

        confirm_vote(&mut app, "999").await.unwrap();

        assert_eq!(app.screen, AppScreen::ProjectDetails);
        let details = app.details_state.as_ref().unwrap();
        assert!(!details.can_vote());
        assert!(!details.shows_vote_success());
    }

    #[tokio::test]
    async fn preferences_report_matching_projects() {
        let (_dir, mut app) = app();
        open_preferences(&mut app).await.unwrap();
        assert_eq!(app.preferences_state.as_ref().unwrap().matching(), 0);

        // projects 1, 3 and 5 are tagged Environment
        app.preferences.toggle_theme("1").unwrap();
        refresh_preferences(&mut app).await;
        assert_eq!(app.preferences_state.as_ref().unwrap().matching(), 3);

        app.preferences.toggle_theme("12").unwrap();
        refresh_preferences(&mut app).await;
        assert_eq!(app.preferences_state.as_ref().unwrap().matching(), 3);
    }

    #[tokio::test]
    async fn withdrawing_sends_a_project_back_to_draft() {
        let (_dir, mut app) = app();
        app.auth.login("demo@evry.fr", "demo").await.unwrap();
        open_route(&mut app, AppScreen::Profile).await.unwrap();
        assert_eq!(app.screen, AppScreen::Profile);

        withdraw_project(&mut app, "4").await.unwrap();

        let project = app.projects.get_project("4").await.unwrap();
        assert_eq!(project.status, ProjectStatus::Draft);
        assert!(project.updated_at.is_some());
        assert!(withdraw_project(&mut app, "999").await.is_err());
    }
}
