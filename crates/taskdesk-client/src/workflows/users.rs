//! Employee management (admin only).

use tracing::{info, warn};

use taskdesk_shared::roles::Role;
use taskdesk_shared::schemas::{CreateUserRequest, UpdateUserRequest, User};

use super::Saved;
use crate::api::Backend;
use crate::error::{ClientResult, ValidationError};
use crate::navigation::AdminRoute;
use crate::persistence::{KEY_USERS, Storage};
use crate::reconcile::{Refreshed, refresh_collection, remove_cached, upsert_cached};
use crate::validation::validate_user_fields;

/// The create/edit user form.
#[derive(Debug, Clone)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    /// Required on create. On update `None` or empty keeps the current one.
    pub password: Option<String>,
    pub role: Role,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: None,
            role: Role::Employee,
        }
    }
}

impl UserForm {
    /// Prefill for editing; the password is never prefilled.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            password: None,
            role: user.role,
        }
    }

    fn new_password(&self) -> Option<String> {
        self.password.clone().filter(|p| !p.is_empty())
    }
}

pub struct EmployeeManager<'s, B: Backend + ?Sized> {
    route: AdminRoute<'s>,
    backend: &'s B,
}

impl<'s, B: Backend + ?Sized> EmployeeManager<'s, B> {
    pub fn open(route: AdminRoute<'s>, backend: &'s B) -> Self {
        Self { route, backend }
    }

    pub fn storage(&self) -> &'s Storage {
        self.route.storage()
    }

    /// All users, reconciled with the cached snapshot.
    pub async fn list(&self) -> Refreshed<User> {
        refresh_collection(
            self.route.storage(),
            KEY_USERS,
            self.backend.list_users(self.route.token()),
        )
        .await
    }

    pub async fn show(&self, id: i64) -> ClientResult<User> {
        Ok(self.backend.get_user(self.route.token(), id).await?)
    }

    pub async fn create(&self, form: &UserForm) -> ClientResult<Saved<User>> {
        validate_user_fields(&form.name, &form.email, form.password.as_deref(), true)?;

        let body = CreateUserRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.new_password().unwrap_or_default(),
            role: form.role,
        };
        let created = self.backend.create_user(self.route.token(), &body).await?;
        info!(id = created.id, email = %created.email, "user created");

        self.remember(&created);
        Ok(Saved {
            record: created,
            refreshed: self.list().await,
        })
    }

    pub async fn update(&self, id: i64, form: &UserForm) -> ClientResult<Saved<User>> {
        validate_user_fields(&form.name, &form.email, form.password.as_deref(), false)?;

        let body = UpdateUserRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            role: form.role,
            password: form.new_password(),
        };
        let updated = self.backend.update_user(self.route.token(), id, &body).await?;
        info!(id, "user updated");

        self.remember(&updated);
        Ok(Saved {
            record: updated,
            refreshed: self.list().await,
        })
    }

    /// Delete a listed user. The signed-in account cannot delete itself.
    pub async fn delete(&self, target: &User) -> ClientResult<Refreshed<User>> {
        if target
            .email
            .trim()
            .eq_ignore_ascii_case(&self.route.identity().subject)
        {
            return Err(ValidationError::form(
                "You cannot delete the account you are signed in with",
            )
            .into());
        }

        self.backend.delete_user(self.route.token(), target.id).await?;
        info!(id = target.id, "user deleted");

        if let Err(e) = remove_cached::<User>(self.route.storage(), KEY_USERS, target.id) {
            warn!(error = %e, "failed to drop deleted user from cache");
        }
        Ok(self.list().await)
    }

    fn remember(&self, user: &User) {
        if let Err(e) = upsert_cached(self.route.storage(), KEY_USERS, user.clone()) {
            warn!(error = %e, "failed to cache saved user");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ClientError, FormField};
    use crate::navigation::{NavEvent, Navigator, Route};
    use crate::reconcile::{Source, load_cached, store_cached};
    use crate::session::SessionStore;
    use crate::testing::{FakeBackend, LoginBehavior, mint_token, temp_storage, user};

    const ADMIN: &str = "alice@gmail.com";

    async fn admin_session(backend: &FakeBackend) -> (tempfile::TempDir, SessionStore, Navigator) {
        let (dir, storage) = temp_storage();
        backend.set_login(LoginBehavior::Token(mint_token(Role::Admin, ADMIN)));
        let mut session = SessionStore::new(storage);
        let identity = session.login(backend, ADMIN, "pw").await.unwrap();
        let mut nav = Navigator::new();
        nav.apply(NavEvent::LoginSucceeded(identity.role)).unwrap();
        (dir, session, nav)
    }

    fn admin<'s>(nav: &Navigator, session: &'s SessionStore) -> AdminRoute<'s> {
        match nav.route(session) {
            Route::Admin(route) => route,
            _ => panic!("expected admin route"),
        }
    }

    fn form(name: &str, email: &str, password: Option<&str>) -> UserForm {
        UserForm {
            name: name.into(),
            email: email.into(),
            password: password.map(Into::into),
            role: Role::Employee,
        }
    }

    #[tokio::test]
    async fn list_merges_cache_and_server() {
        let backend = FakeBackend::new().with_users(vec![user(1, "alice"), user(2, "bobby")]);
        let (_dir, session, nav) = admin_session(&backend).await;
        let route = admin(&nav, &session);
        store_cached(route.storage(), KEY_USERS, &[user(9, "local")]).unwrap();

        let manager = EmployeeManager::open(route, &backend);
        let listed = manager.list().await;
        let ids: Vec<_> = listed.items.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![9, 1, 2]);
    }

    #[tokio::test]
    async fn create_validates_before_sending() {
        let backend = FakeBackend::new();
        let (_dir, session, nav) = admin_session(&backend).await;
        let manager = EmployeeManager::open(admin(&nav, &session), &backend);

        let err = manager
            .create(&form("Carol Jones", "carol@yahoo.com", Some("pw")))
            .await
            .unwrap_err();
        assert_eq!(err.as_validation().unwrap().field, Some(FormField::Email));

        let err = manager
            .create(&form("Carl", "carl@gmail.com", Some("pw")))
            .await
            .unwrap_err();
        assert_eq!(err.as_validation().unwrap().field, Some(FormField::Name));

        let err = manager
            .create(&form("Carol Jones", "carol@gmail.com", None))
            .await
            .unwrap_err();
        assert!(err.as_validation().is_some());

        assert!(backend.mutation_calls().iter().all(|c| c.starts_with("POST /auth")));
    }

    #[tokio::test]
    async fn create_then_converge() {
        let backend = FakeBackend::new().with_users(vec![user(1, "alice")]);
        let (_dir, session, nav) = admin_session(&backend).await;
        let manager = EmployeeManager::open(admin(&nav, &session), &backend);

        let saved = manager
            .create(&form("Carol Jones", "carol@gmail.com", Some("pw")))
            .await
            .unwrap();
        assert_eq!(saved.refreshed.source, Source::Server);
        assert!(saved.refreshed.items.iter().any(|u| u.id == saved.record.id));
        assert_eq!(
            backend.calls().last().map(String::as_str),
            Some("GET /users/get-user")
        );
    }

    #[tokio::test]
    async fn update_replaces_cached_record() {
        let backend = FakeBackend::new().with_users(vec![user(1, "alice"), user(2, "bobby")]);
        let (_dir, session, nav) = admin_session(&backend).await;
        let route = admin(&nav, &session);
        let manager = EmployeeManager::open(route, &backend);
        manager.list().await;

        let mut edit = UserForm::from_user(&user(2, "bobby"));
        edit.name = "Robert Brown".into();
        let saved = manager.update(2, &edit).await.unwrap();

        let shown = saved.refreshed.items.iter().find(|u| u.id == 2).unwrap();
        assert_eq!(shown.name, "Robert Brown");
        let cached: Vec<User> = load_cached(route.storage(), KEY_USERS);
        assert_eq!(cached.iter().find(|u| u.id == 2).unwrap().name, "Robert Brown");
        assert!(backend.calls().contains(&"PUT /users/update-user/2".to_string()));
    }

    #[tokio::test]
    async fn cannot_delete_self() {
        let me = User {
            id: 1,
            name: "Alice Admin".into(),
            email: ADMIN.into(),
            role: Role::Admin,
        };
        let backend = FakeBackend::new().with_users(vec![me.clone()]);
        let (_dir, session, nav) = admin_session(&backend).await;
        let manager = EmployeeManager::open(admin(&nav, &session), &backend);

        let err = manager.delete(&me).await.unwrap_err();
        assert!(err.as_validation().is_some());
        assert!(!backend.calls().iter().any(|c| c.starts_with("DELETE")));
    }

    #[tokio::test]
    async fn delete_removes_from_cache() {
        let backend = FakeBackend::new().with_users(vec![user(1, "alice"), user(2, "bobby")]);
        let (_dir, session, nav) = admin_session(&backend).await;
        let manager = EmployeeManager::open(admin(&nav, &session), &backend);
        manager.list().await;

        let refreshed = manager.delete(&user(2, "bobby")).await.unwrap();
        let ids: Vec<_> = refreshed.items.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_cache_untouched() {
        let backend = FakeBackend::new().with_users(vec![user(1, "alice")]);
        let (_dir, session, nav) = admin_session(&backend).await;
        let route = admin(&nav, &session);
        let manager = EmployeeManager::open(route, &backend);
        manager.list().await;

        backend.set_reject_mutations(true);
        let err = manager
            .create(&form("Carol Jones", "carol@gmail.com", Some("pw")))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api(ApiError::Http { status: 400, .. })));

        let cached: Vec<User> = load_cached(route.storage(), KEY_USERS);
        assert_eq!(cached.len(), 1);
    }
}
