//! Screen workflows: list, validate, mutate, then converge with the server.
//!
//! Mutations are never applied locally before the server confirms them. On
//! success the confirmed record is written into the cached snapshot and the
//! list is fetched and reconciled again.

pub mod dashboard;
pub mod tasks;
pub mod users;

use taskdesk_shared::roles::TaskStatus;
use taskdesk_shared::schemas::{Task, TaskRequest};

use crate::error::{FormField, ValidationError};
use crate::reconcile::Refreshed;
use crate::validation::validate_assignee;

/// A confirmed mutation and the list re-fetched after it.
#[derive(Debug, Clone)]
pub struct Saved<T, L = T> {
    pub record: T,
    pub refreshed: Refreshed<L>,
}

/// Completed tasks are locked: their status can no longer change.
pub(crate) fn check_status_edit(existing: &Task, status: &TaskStatus) -> Result<(), ValidationError> {
    let locked = existing.locked || existing.status.is_completed();
    if locked && status != &existing.status {
        return Err(ValidationError::field(
            FormField::Status,
            "Task is completed and its status can no longer change",
        ));
    }
    Ok(())
}

/// Full update payload for an existing task, as the dashboard sends it.
pub(crate) fn task_request(task: &Task) -> Result<TaskRequest, ValidationError> {
    Ok(TaskRequest {
        title: task.title.clone(),
        description: task.description.clone(),
        status: task.status.clone(),
        assigned_to: validate_assignee(task.assigned_to)?,
        comment: task.comment.clone(),
    })
}
