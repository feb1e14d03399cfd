use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// --- Roles ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Employee => "Employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// --- Task status ---

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_IN_PROCESS: &str = "In-Process";
pub const STATUS_COMPLETED: &str = "Completed";

/// Task status as the backend stores it. The column is free text, so values
/// outside the known set are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProcess,
    Completed,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => STATUS_PENDING,
            TaskStatus::InProcess => STATUS_IN_PROCESS,
            TaskStatus::Completed => STATUS_COMPLETED,
            TaskStatus::Other(s) => s,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            STATUS_PENDING => TaskStatus::Pending,
            STATUS_IN_PROCESS => TaskStatus::InProcess,
            STATUS_COMPLETED => TaskStatus::Completed,
            _ => TaskStatus::Other(value),
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(value: &str) -> Self {
        TaskStatus::from(value.to_string())
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" Employee ".parse::<Role>().unwrap(), Role::Employee);
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn status_keeps_unknown_values() {
        let status: TaskStatus = serde_json::from_str("\"Blocked\"").unwrap();
        assert_eq!(status, TaskStatus::Other("Blocked".into()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Blocked\"");
    }

    #[test]
    fn status_wire_names() {
        let status: TaskStatus = serde_json::from_str("\"In-Process\"").unwrap();
        assert_eq!(status, TaskStatus::InProcess);
        assert_eq!(
            serde_json::to_string(&TaskStatus::Completed).unwrap(),
            "\"Completed\""
        );
    }
}
