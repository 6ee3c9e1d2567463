//! Task domain model.
//!
//! # Responsibility
//! - Define the checklist item shared by regular and suggested task lists.
//! - Provide list-level helpers for completion counting and id lookup.
//!
//! # Invariants
//! - `id` is assigned at creation and never changes.
//! - `completed` is the only field mutated after creation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task identifier.
///
/// Kept as a string because stored snapshots carry both generated UUIDs and
/// fixed catalog ids such as `tax-1` or `suggested-2`.
pub type TaskId = String;

/// Selects one of the two task lists in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskList {
    /// User-owned checklist (`tasks`).
    #[serde(rename = "tasks")]
    Regular,
    /// Seeded starter list (`suggested`).
    #[serde(rename = "suggested")]
    Suggested,
}

impl TaskList {
    /// Stable string id used by UI and CLI callers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "tasks",
            Self::Suggested => "suggested",
        }
    }

    /// Parses a list selector; accepts `tasks`/`task`/`regular` and `suggested`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tasks" | "task" | "regular" => Some(Self::Regular),
            "suggested" => Some(Self::Suggested),
            _ => None,
        }
    }
}

/// One checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable id, unique within its list.
    pub id: TaskId,
    /// Display title.
    pub title: String,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Optional info-topic id (`taxes`, `payslip`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_link: Option<String>,
}

impl Task {
    /// Creates an incomplete task with a caller-provided id.
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            info_link: None,
        }
    }

    /// Creates an incomplete task with a freshly generated UUID id.
    pub fn generated(title: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), title)
    }

    /// Sets the info-topic link.
    pub fn with_info_link(mut self, topic_id: impl Into<String>) -> Self {
        self.info_link = Some(topic_id.into());
        self
    }

    /// Sets the completion flag.
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Number of completed tasks in one list.
pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| task.completed).count()
}

/// Returns whether `tasks` contains an item with `id`.
pub fn contains_id(tasks: &[Task], id: &str) -> bool {
    tasks.iter().any(|task| task.id == id)
}
