use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    OnTrack,
    Delayed,
    LikelyDelay,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::OnTrack => "on_track",
            Self::Delayed => "delayed",
            Self::LikelyDelay => "likely_delay",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "on_track" => Some(Self::OnTrack),
            "delayed" => Some(Self::Delayed),
            "likely_delay" => Some(Self::LikelyDelay),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn all() -> [TaskStatus; 5] {
        [
            Self::NotStarted,
            Self::OnTrack,
            Self::Delayed,
            Self::LikelyDelay,
            Self::Completed,
        ]
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub phase: String,
    pub name: String,
    pub duration: u32,
    pub responsible_person: Option<String>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
    pub outlook_completion: Option<NaiveDate>,
    pub status: TaskStatus,
    pub completion_percent: u8,
}

impl Task {
    /// A fresh, unplanned task that has not started.
    pub fn new(id: impl Into<String>, phase: impl Into<String>, name: impl Into<String>, duration: u32) -> Self {
        Self {
            id: id.into(),
            phase: phase.into(),
            name: name.into(),
            duration,
            responsible_person: None,
            planned_start: None,
            planned_end: None,
            actual_start: None,
            actual_end: None,
            outlook_completion: None,
            status: TaskStatus::NotStarted,
            completion_percent: 0,
        }
    }

    pub fn is_planned(&self) -> bool {
        self.planned_start.is_some() && self.planned_end.is_some()
    }
}
