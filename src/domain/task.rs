//! Task candidates inferred from spoken transcripts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A structured task inferred from free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCandidate {
    /// Display title, never empty
    pub title: String,

    /// Classified category
    pub category: Category,

    /// Inferred priority
    pub priority: Priority,

    /// Resolved due date (if a relative date phrase was present)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// Text following a labeled field such as `note:`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Task categories (controlled vocabulary shared by tasks and products)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Shopping,
    Work,
    Personal,
    Health,
    Finance,
    General,
}

impl Category {
    /// All categories in classification order
    pub const ALL: [Category; 6] = [
        Category::Shopping,
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Finance,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Shopping => "Shopping",
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Health => "Health",
            Category::Finance => "Finance",
            Category::General => "General",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a category label outside the vocabulary is parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl std::str::FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Parsed tasks together with a one-line summary for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTaskList {
    pub tasks: Vec<TaskCandidate>,
    pub summary: String,
}
