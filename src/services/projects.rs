use chrono::Utc;
use tracing::{info, warn};

use crate::api::MockApi;
use crate::models::{
    generate_id, MyVote, NewProject, Project, ProjectPatch, ProjectStatus, SessionUser, Vote,
};
use crate::seed;
use crate::store::{LocalStore, PROJECTS_KEY, USER_KEY, VOTES_KEY};

use super::{ServiceError, ServiceResult};

/// One page of results; `current_page` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_pages: usize,
    pub current_page: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone)]
pub struct ProjectService {
    store: LocalStore,
    api: MockApi,
}

impl ProjectService {
    pub fn new(store: LocalStore, api: MockApi) -> Self {
        Self { store, api }
    }

    // Stored list when present, seed data otherwise
    fn local_projects(&self) -> Vec<Project> {
        self.store
            .get_item(PROJECTS_KEY)
            .unwrap_or_else(seed::projects)
    }

    fn local_votes(&self) -> Vec<Vote> {
        self.store.get_item(VOTES_KEY).unwrap_or_else(seed::votes)
    }

    pub async fn all_projects(&self) -> Vec<Project> {
        self.api.get("/projects?all=true").await;
        self.local_projects()
    }

    pub async fn get_projects(&self, page: usize, limit: usize) -> Page<Project> {
        let page = page.max(1);
        let limit = limit.max(1);
        self.api
            .get(&format!("/projects?page={page}&limit={limit}"))
            .await;

        let all = self.local_projects();
        let total_count = all.len();
        let data = all
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        Page {
            data,
            total_pages: total_count.div_ceil(limit),
            current_page: page,
            total_count,
        }
    }

    pub async fn get_project(&self, id: &str) -> ServiceResult<Project> {
        self.api.get(&format!("/projects/{id}")).await;

        self.local_projects()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| {
                warn!(project_id = id, "project not found");
                ServiceError::ProjectNotFound(id.to_string())
            })
    }

    /// Projects sharing at least one theme with `theme_ids` (any project when
    /// no theme is given), minus `excluded_ids`. Source order is kept.
    pub async fn get_recommended_projects(
        &self,
        theme_ids: &[String],
        excluded_ids: &[String],
    ) -> Vec<Project> {
        let query: Vec<String> = theme_ids
            .iter()
            .map(|id| format!("themeId={id}"))
            .chain(excluded_ids.iter().map(|id| format!("excludeId={id}")))
            .collect();
        self.api
            .get(&format!("/projects/recommended?{}", query.join("&")))
            .await;

        self.local_projects()
            .into_iter()
            .filter(|p| theme_ids.is_empty() || p.has_any_theme(theme_ids))
            .filter(|p| !excluded_ids.contains(&p.id))
            .collect()
    }

    pub async fn get_projects_by_themes(&self, theme_ids: &[String]) -> Vec<Project> {
        self.api.get("/projects/by-themes").await;
        self.local_projects()
            .into_iter()
            .filter(|p| p.has_any_theme(theme_ids))
            .collect()
    }

    pub async fn get_projects_by_user(&self, user_id: &str) -> Vec<Project> {
        self.api.get(&format!("/users/{user_id}/projects")).await;
        self.local_projects()
            .into_iter()
            .filter(|p| p.submitted_by == user_id)
            .collect()
    }

    pub async fn create_project(&self, new: NewProject) -> ServiceResult<Project> {
        self.api.post("/projects").await;

        let project = Project {
            id: generate_id(),
            title: new.title,
            short_description: new.short_description,
            full_description: new.full_description,
            budget: new.budget,
            location: new.location,
            themes: new.themes,
            images: new.images,
            submitted_by: new.submitted_by,
            submission_date: Utc::now(),
            status: ProjectStatus::UnderReview,
            votes: 0,
            updated_at: None,
        };

        let mut all = self.local_projects();
        all.push(project.clone());
        self.store.set_item(PROJECTS_KEY, &all)?;

        info!(project_id = %project.id, title = %project.title, "project submitted");
        Ok(project)
    }

    pub async fn update_project(&self, id: &str, patch: ProjectPatch) -> ServiceResult<Project> {
        self.api.patch(&format!("/projects/{id}")).await;

        let mut all = self.local_projects();
        let project = all
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ServiceError::ProjectNotFound(id.to_string()))?;

        if let Some(title) = patch.title {
            project.title = title;
        }
        if let Some(short) = patch.short_description {
            project.short_description = short;
        }
        if let Some(full) = patch.full_description {
            project.full_description = full;
        }
        if let Some(budget) = patch.budget {
            project.budget = budget;
        }
        if let Some(location) = patch.location {
            project.location = location;
        }
        if let Some(themes) = patch.themes {
            project.themes = themes;
        }
        if let Some(images) = patch.images {
            project.images = images;
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        project.updated_at = Some(Utc::now());

        let updated = project.clone();
        self.store.set_item(PROJECTS_KEY, &all)?;
        Ok(updated)
    }

    /// Cast or move the signed-in user's single vote.
    pub async fn vote_for_project(&self, project_id: &str) -> ServiceResult<()> {
        self.api.post("/votes").await;

        let user: SessionUser = self
            .store
            .get_item(USER_KEY)
            .ok_or(ServiceError::NotAuthenticated)?;

        let mut projects = self.local_projects();
        let mut votes = self.local_votes();

        if !projects.iter().any(|p| p.id == project_id) {
            return Err(ServiceError::ProjectNotFound(project_id.to_string()));
        }

        match votes.iter_mut().find(|v| v.user_id == user.id) {
            Some(existing) if existing.project_id == project_id => {
                info!(user_id = %user.id, project_id, "vote unchanged");
                return Ok(());
            }
            Some(existing) => {
                if let Some(previous) = projects.iter_mut().find(|p| p.id == existing.project_id) {
                    previous.votes = previous.votes.saturating_sub(1);
                }
                if let Some(next) = projects.iter_mut().find(|p| p.id == project_id) {
                    next.votes += 1;
                }
                info!(
                    user_id = %user.id,
                    from = %existing.project_id,
                    to = project_id,
                    "vote moved"
                );
                existing.project_id = project_id.to_string();
                existing.date = Utc::now();
            }
            None => {
                votes.push(Vote {
                    id: generate_id(),
                    user_id: user.id.clone(),
                    project_id: project_id.to_string(),
                    date: Utc::now(),
                });
                if let Some(project) = projects.iter_mut().find(|p| p.id == project_id) {
                    project.votes += 1;
                }
                info!(user_id = %user.id, project_id, "vote cast");
            }
        }

        self.store.set_item(PROJECTS_KEY, &projects)?;
        self.store.set_item(VOTES_KEY, &votes)?;
        Ok(())
    }

    pub async fn get_my_vote(&self) -> Option<MyVote> {
        self.api.get("/votes/me").await;

        let user: SessionUser = self.store.get_item(USER_KEY)?;
        let vote = self
            .local_votes()
            .into_iter()
            .find(|v| v.user_id == user.id)?;
        let project = self
            .local_projects()
            .into_iter()
            .find(|p| p.id == vote.project_id);

        Some(MyVote { vote, project })
    }
}
