use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Milestone, Task, TaskStatus};

/// Days late at or under which a task is `LikelyDelay` rather than `Delayed`.
pub const DEFAULT_LIKELY_DELAY_THRESHOLD_DAYS: i64 = 15;

/// Completion reported for an on-track task whose progress cannot be measured.
pub const DEFAULT_ON_TRACK_COMPLETION: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyRules {
    pub likely_delay_threshold_days: i64,
    pub default_on_track_completion: u8,
}

impl Default for ClassifyRules {
    fn default() -> Self {
        Self {
            likely_delay_threshold_days: DEFAULT_LIKELY_DELAY_THRESHOLD_DAYS,
            default_on_track_completion: DEFAULT_ON_TRACK_COMPLETION,
        }
    }
}

impl ClassifyRules {
    fn delay_status(&self, delay_days: i64) -> TaskStatus {
        if delay_days <= self.likely_delay_threshold_days {
            TaskStatus::LikelyDelay
        } else {
            TaskStatus::Delayed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub status: TaskStatus,
    pub completion_percent: u8,
}

/// Infer status and completion for one task as of `today`.
/// First matching rule wins; sibling tasks are never consulted.
pub fn classify(task: &Task, today: NaiveDate, rules: &ClassifyRules) -> Classification {
    if let Some(actual_end) = task.actual_end {
        let status = match task.planned_end {
            Some(planned_end) if actual_end > planned_end => {
                rules.delay_status((actual_end - planned_end).num_days())
            }
            _ => TaskStatus::Completed,
        };
        return Classification { status, completion_percent: 100 };
    }

    let Some(actual_start) = task.actual_start else {
        return Classification {
            status: TaskStatus::NotStarted,
            completion_percent: 0,
        };
    };

    let completion_percent = elapsed_completion(actual_start, task.planned_end, today, rules);

    if let (Some(outlook), Some(planned_end)) = (task.outlook_completion, task.planned_end) {
        if outlook > planned_end {
            return Classification {
                status: rules.delay_status((outlook - planned_end).num_days()),
                completion_percent,
            };
        }
    }

    if let Some(planned_end) = task.planned_end {
        if today > planned_end {
            return Classification {
                status: rules.delay_status((today - planned_end).num_days()),
                completion_percent,
            };
        }
    }

    Classification {
        status: TaskStatus::OnTrack,
        completion_percent,
    }
}

/// Share of the planned window `[actual_start, planned_end]` elapsed by `today`.
pub fn elapsed_completion(
    actual_start: NaiveDate,
    planned_end: Option<NaiveDate>,
    today: NaiveDate,
    rules: &ClassifyRules,
) -> u8 {
    match planned_end {
        Some(planned_end) if planned_end > actual_start => {
            let window = (planned_end - actual_start).num_days() as f64;
            let elapsed = (today - actual_start).num_days() as f64;
            (elapsed / window * 100.0).round().clamp(0.0, 100.0) as u8
        }
        _ => rules.default_on_track_completion,
    }
}

/// Classify every task of the milestone and store the results on the tasks.
/// Returns how many tasks changed status or completion.
pub fn classify_all(milestone: &mut Milestone, today: NaiveDate, rules: &ClassifyRules) -> usize {
    let mut changed = 0;
    for task in milestone.tasks.iter_mut() {
        let c = classify(task, today, rules);
        if c.status != task.status || c.completion_percent != task.completion_percent {
            task.status = c.status;
            task.completion_percent = c.completion_percent;
            changed += 1;
        }
    }
    tracing::debug!(milestone = %milestone.name, changed, %today, "classified tasks");
    changed
}
