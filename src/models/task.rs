use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Collection holding every task document.
pub const TASK_COLLECTION: &str = "task";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    #[serde(rename = "none")]
    Never,
    Daily,
    Weekly,
    Monthly,
}

/// A task as submitted by clients and persisted in the `task` collection.
/// The store-assigned id is not part of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: String,
    pub customer: Option<String>,
    pub supplier: Option<String>,
    pub project: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    /// Free-form label such as "2025-11-05" or "Today".
    pub due_date: Option<String>,
    pub notes: Option<String>,
    /// An explicit `null` is kept as null; a missing field means "none".
    #[serde(default = "default_recurrence")]
    pub recurring: Option<Recurrence>,
}

fn default_recurrence() -> Option<Recurrence> {
    Some(Recurrence::Never)
}

impl Task {
    /// Checks the rules serde's typing cannot express.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.title.is_empty() {
            errors.push(FieldError::body("title", "title must not be empty"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
