//! The employee dashboard: own tasks, comments, completion.

use tracing::{info, warn};

use taskdesk_shared::roles::TaskStatus;
use taskdesk_shared::schemas::{Task, TaskRequest};

use super::{Saved, task_request};
use crate::api::Backend;
use crate::error::{ClientResult, FormField, ValidationError};
use crate::navigation::EmployeeRoute;
use crate::persistence::tasks_key;
use crate::reconcile::{Refreshed, refresh_collection, upsert_cached};

pub struct EmployeeDashboard<'s, B: Backend + ?Sized> {
    route: EmployeeRoute<'s>,
    backend: &'s B,
    cache_key: String,
}

impl<'s, B: Backend + ?Sized> EmployeeDashboard<'s, B> {
    pub fn open(route: EmployeeRoute<'s>, backend: &'s B) -> Self {
        Self {
            cache_key: tasks_key(&route.identity().subject),
            route,
            backend,
        }
    }

    /// Tasks assigned to the signed-in employee. The server does the
    /// filtering.
    pub async fn tasks(&self) -> Refreshed<Task> {
        refresh_collection(
            self.route.storage(),
            &self.cache_key,
            self.backend.list_tasks(self.route.token()),
        )
        .await
    }

    pub async fn submit_comment(&self, task: &Task, comment: &str) -> ClientResult<Saved<Task>> {
        let mut body = task_request(task)?;
        body.comment = Some(comment.to_string());
        self.save(task.id, body, "comment submitted").await
    }

    pub async fn mark_complete(&self, task: &Task) -> ClientResult<Saved<Task>> {
        if task.locked || task.status.is_completed() {
            return Err(ValidationError::field(FormField::Status, "Task is already completed").into());
        }

        let mut body = task_request(task)?;
        body.status = TaskStatus::Completed;
        self.save(task.id, body, "task marked completed").await
    }

    async fn save(
        &self,
        id: i64,
        body: TaskRequest,
        what: &'static str,
    ) -> ClientResult<Saved<Task>> {
        let mut updated = self.backend.update_task(self.route.token(), id, &body).await?;
        updated.locked = updated.status.is_completed();
        info!(id, "{what}");

        if let Err(e) = upsert_cached(self.route.storage(), &self.cache_key, updated.clone()) {
            warn!(error = %e, "failed to cache updated task");
        }
        Ok(Saved {
            record: updated,
            refreshed: self.tasks().await,
        })
    }
}
