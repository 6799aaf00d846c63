use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Task;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub title: String,
    pub project_start: NaiveDate,
    /// Project end as reported, including any flexibility buffer.
    pub project_end: NaiveDate,
    /// Unbuffered project end: the last task's planned end.
    pub baseline_end: NaiveDate,
    pub flexibility_percent: u8,
    pub tasks: Vec<Task>,
    pub created_at: String,
    pub updated_at: String,
}

impl Milestone {
    /// An empty milestone whose end collapses onto its start.
    pub fn new(id: impl Into<String>, name: impl Into<String>, title: impl Into<String>, project_start: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: title.into(),
            project_start,
            project_end: project_start,
            baseline_end: project_start,
            flexibility_percent: 0,
            tasks: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn buffer_applied(&self) -> bool {
        self.project_end != self.baseline_end
    }
}
