//! Tasks as served by `/tasks/*`.

use serde::{Deserialize, Serialize};

use crate::ids::{deserialize_id, deserialize_optional_id};
use crate::roles::TaskStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    /// Client-side flag: set for completed tasks, which reject status edits.
    #[serde(default, skip_deserializing)]
    pub locked: bool,
}

/// Body for both `POST /tasks/create-task` and `PUT /tasks/update-task/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assigned_to: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
