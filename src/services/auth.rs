use tracing::{error, info};

use crate::api::{MockApi, DEMO_TOKEN};
use crate::models::{generate_id, NewUser, Role, SessionUser, User};
use crate::seed;
use crate::store::{LocalStore, USER_KEY};

use super::ServiceResult;

/// Session holder: restores the stored user on start and keeps the mock
/// API's authorization header in step with it.
#[derive(Debug)]
pub struct AuthService {
    store: LocalStore,
    api: MockApi,
    users: Vec<User>,
    user: Option<SessionUser>,
}

impl AuthService {
    pub fn new(store: LocalStore, api: MockApi) -> Self {
        let user: Option<SessionUser> = store.get_item(USER_KEY);
        if let Some(user) = &user {
            info!(user_id = %user.id, "session restored");
            api.set_authorization(Some(DEMO_TOKEN));
        }

        Self {
            store,
            api,
            users: seed::users(),
            user,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Full name for a submitter id, falling back to the raw id.
    pub fn display_name(&self, user_id: &str) -> String {
        if let Some(user) = self.user.as_ref().filter(|u| u.id == user_id) {
            return user.full_name();
        }
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| format!("{} {}", u.first_name, u.last_name))
            .unwrap_or_else(|| user_id.to_string())
    }

    fn start_session(&mut self, user: SessionUser) -> ServiceResult<()> {
        self.store.set_item(USER_KEY, &user)?;
        self.api.set_authorization(Some(DEMO_TOKEN));
        self.user = Some(user);
        Ok(())
    }

    /// `Ok(false)` on bad credentials; store failures are real errors.
    pub async fn login(&mut self, email: &str, password: &str) -> ServiceResult<bool> {
        self.api.post("/users/login").await;

        let found = self
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email) && u.password == password)
            .map(SessionUser::from);

        let Some(user) = found else {
            error!(email, "invalid credentials");
            return Ok(false);
        };

        info!(user_id = %user.id, "logged in");
        self.start_session(user)?;
        Ok(true)
    }

    /// Registered accounts join the in-memory user list, so they can log in
    /// again until the app exits. Nothing is written besides the session.
    pub async fn register(&mut self, form: &NewUser) -> ServiceResult<bool> {
        self.api.post("/users/register").await;

        if self
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&form.email))
        {
            error!(email = %form.email, "email already in use");
            return Ok(false);
        }

        let account = User {
            id: generate_id(),
            email: form.email.clone(),
            password: form.password.clone(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            role: Role::User,
        };
        let user = SessionUser::from(&account);
        self.users.push(account);

        info!(user_id = %user.id, "registered");
        self.start_session(user)?;
        Ok(true)
    }

    pub fn logout(&mut self) -> ServiceResult<()> {
        self.store.remove_item(USER_KEY)?;
        self.api.set_authorization(None);
        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "logged out");
        }
        Ok(())
    }

    /// Profile form save. No-op without a session.
    pub async fn update_profile(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> ServiceResult<bool> {
        let Some(mut user) = self.user.clone() else {
            return Ok(false);
        };
        self.api.patch("/users/me").await;

        user.first_name = first_name.to_string();
        user.last_name = last_name.to_string();
        user.email = email.to_string();
        self.store.set_item(USER_KEY, &user)?;
        self.user = Some(user);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn auth() -> (tempfile::TempDir, LocalStore, MockApi, AuthService) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let api = MockApi::new(Duration::ZERO);
        let auth = AuthService::new(store.clone(), api.clone());
        (dir, store, api, auth)
    }

    #[tokio::test]
    async fn login_matches_email_case_insensitively() {
        let (_dir, store, api, mut auth) = auth();

        assert!(auth.login("DEMO@evry.fr", "demo").await.unwrap());

        let user = auth.user().unwrap();
        assert_eq!(user.first_name, "Jean");
        assert!(api.is_authorized());
        let stored: SessionUser = store.get_item(USER_KEY).unwrap();
        assert_eq!(&stored, user);
    }

    #[tokio::test]
    async fn stored_session_never_contains_the_password() {
        let (_dir, store, _api, mut auth) = auth();
        auth.login("admin@evry.fr", "admin").await.unwrap();

        let raw = std::fs::read_to_string(store.dir().join("demo_user.json")).unwrap();
        assert!(!raw.contains("password"));
        assert!(raw.contains("\"firstName\""));
    }

    #[tokio::test]
    async fn wrong_password_is_refused() {
        let (_dir, _store, api, mut auth) = auth();

        assert!(!auth.login("demo@evry.fr", "Demo").await.unwrap());
        assert!(!auth.is_authenticated());
        assert!(!api.is_authorized());
    }

    #[tokio::test]
    async fn register_rejects_existing_email() {
        let (_dir, _store, _api, mut auth) = auth();
        let form = NewUser {
            first_name: "Marie".to_string(),
            last_name: "Curie".to_string(),
            email: "Admin@Evry.fr".to_string(),
            password: "radium123".to_string(),
        };

        assert!(!auth.register(&form).await.unwrap());
        assert!(auth.user().is_none());
    }

    #[tokio::test]
    async fn register_starts_a_user_session() {
        let (_dir, _store, _api, mut auth) = auth();
        let form = NewUser {
            first_name: "Marie".to_string(),
            last_name: "Curie".to_string(),
            email: "marie@evry.fr".to_string(),
            password: "radium123".to_string(),
        };

        assert!(auth.register(&form).await.unwrap());
        let user = auth.user().unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.full_name(), "Marie Curie");
    }

    #[tokio::test]
    async fn registered_account_can_log_back_in() {
        let (_dir, _store, _api, mut auth) = auth();
        let form = NewUser {
            first_name: "Marie".to_string(),
            last_name: "Curie".to_string(),
            email: "marie@evry.fr".to_string(),
            password: "radium123".to_string(),
        };
        auth.register(&form).await.unwrap();
        let id = auth.user().unwrap().id.clone();
        auth.logout().unwrap();

        assert!(!auth.login("marie@evry.fr", "wrong").await.unwrap());
        assert!(auth.login("Marie@Evry.fr", "radium123").await.unwrap());
        assert_eq!(auth.user().unwrap().id, id);
        assert!(!auth.register(&form).await.unwrap());
    }

    #[tokio::test]
    async fn session_survives_restart_until_logout() {
        let (_dir, store, api, mut auth) = auth();
        auth.login("demo@evry.fr", "demo").await.unwrap();

        let restored = AuthService::new(store.clone(), MockApi::new(Duration::ZERO));
        assert!(restored.is_authenticated());

        auth.logout().unwrap();
        assert!(!api.is_authorized());
        assert!(store.get_item::<SessionUser>(USER_KEY).is_none());
        assert!(!AuthService::new(store, api).is_authenticated());
    }

    #[tokio::test]
    async fn display_name_prefers_the_session_user() {
        let (_dir, _store, _api, mut auth) = auth();
        assert_eq!(auth.display_name("2"), "Admin Système");
        assert_eq!(auth.display_name("42"), "42");

        let form = NewUser {
            first_name: "Marie".to_string(),
            last_name: "Curie".to_string(),
            email: "marie@evry.fr".to_string(),
            password: "radium123".to_string(),
        };
        auth.register(&form).await.unwrap();
        let id = auth.user().unwrap().id.clone();
        assert_eq!(auth.display_name(&id), "Marie Curie");
    }

    #[tokio::test]
    async fn profile_update_needs_a_session() {
        let (_dir, store, _api, mut auth) = auth();
        assert!(!auth.update_profile("A", "B", "a@b.fr").await.unwrap());

        auth.login("demo@evry.fr", "demo").await.unwrap();
        assert!(auth.update_profile("Jeanne", "Dupont", "jeanne@evry.fr").await.unwrap());

        let stored: SessionUser = store.get_item(USER_KEY).unwrap();
        assert_eq!(stored.first_name, "Jeanne");
        assert_eq!(stored.email, "jeanne@evry.fr");
    }
}
