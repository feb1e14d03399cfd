//! Task management (admin only).

use tracing::{info, warn};

use taskdesk_shared::roles::TaskStatus;
use taskdesk_shared::schemas::{Task, TaskRequest, User};

use super::{Saved, check_status_edit};
use crate::api::Backend;
use crate::error::ClientResult;
use crate::navigation::AdminRoute;
use crate::persistence::{KEY_USERS, Storage, tasks_key};
use crate::reconcile::{Refreshed, load_cached, refresh_collection, remove_cached, upsert_cached};
use crate::validation::validate_assignee;

/// The create/edit task form. Everything but the assignee is free text.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assigned_to: Option<i64>,
    pub comment: Option<String>,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.clone(),
            assigned_to: task.assigned_to,
            comment: task.comment.clone(),
        }
    }

    fn to_request(&self) -> ClientResult<TaskRequest> {
        Ok(TaskRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            assigned_to: validate_assignee(self.assigned_to)?,
            comment: self.comment.clone(),
        })
    }
}

pub struct TaskManager<'s, B: Backend + ?Sized> {
    route: AdminRoute<'s>,
    backend: &'s B,
    cache_key: String,
}

impl<'s, B: Backend + ?Sized> TaskManager<'s, B> {
    pub fn open(route: AdminRoute<'s>, backend: &'s B) -> Self {
        Self {
            cache_key: tasks_key(&route.identity().subject),
            route,
            backend,
        }
    }

    pub fn storage(&self) -> &'s Storage {
        self.route.storage()
    }

    /// Snapshot key for the signed-in admin's task list.
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub async fn list(&self) -> Refreshed<Task> {
        refresh_collection(
            self.route.storage(),
            &self.cache_key,
            self.backend.list_tasks(self.route.token()),
        )
        .await
    }

    /// Candidate assignees for the form.
    pub async fn assignees(&self) -> Refreshed<User> {
        refresh_collection(
            self.route.storage(),
            KEY_USERS,
            self.backend.list_users(self.route.token()),
        )
        .await
    }

    pub async fn show(&self, id: i64) -> ClientResult<Task> {
        let mut task = self.backend.get_task(self.route.token(), id).await?;
        task.locked = task.status.is_completed();
        Ok(task)
    }

    pub async fn create(&self, form: &TaskForm) -> ClientResult<Saved<Task>> {
        let body = form.to_request()?;
        let mut created = self.backend.create_task(self.route.token(), &body).await?;
        created.locked = created.status.is_completed();
        info!(id = created.id, assigned_to = body.assigned_to, "task created");

        self.remember(&created);
        Ok(Saved {
            record: created,
            refreshed: self.list().await,
        })
    }

    pub async fn update(&self, id: i64, form: &TaskForm) -> ClientResult<Saved<Task>> {
        let body = form.to_request()?;
        let existing = self.current(id).await?;
        check_status_edit(&existing, &body.status)?;

        let mut updated = self.backend.update_task(self.route.token(), id, &body).await?;
        updated.locked = updated.status.is_completed();
        info!(id, status = %updated.status, "task updated");

        self.remember(&updated);
        Ok(Saved {
            record: updated,
            refreshed: self.list().await,
        })
    }

    pub async fn delete(&self, id: i64) -> ClientResult<Refreshed<Task>> {
        self.backend.delete_task(self.route.token(), id).await?;
        info!(id, "task deleted");

        if let Err(e) = remove_cached::<Task>(self.route.storage(), &self.cache_key, id) {
            warn!(error = %e, "failed to drop deleted task from cache");
        }
        Ok(self.list().await)
    }

    /// The task as last seen: the cached copy, or the server's when the
    /// snapshot does not have it.
    async fn current(&self, id: i64) -> ClientResult<Task> {
        let cached: Vec<Task> = load_cached(self.route.storage(), &self.cache_key);
        match cached.into_iter().find(|t| t.id == id) {
            Some(task) => Ok(task),
            None => self.show(id).await,
        }
    }

    fn remember(&self, task: &Task) {
        if let Err(e) = upsert_cached(self.route.storage(), &self.cache_key, task.clone()) {
            warn!(error = %e, "failed to cache saved task");
        }
    }
}
