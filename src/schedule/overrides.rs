//! Side effects of editing a task's progress fields by hand.
//!
//! A person may set status, completion or dates directly; each edit drags the
//! related fields along so the record stays internally consistent. Edits are
//! modelled as a pure reducer over [`Task`].

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{Task, TaskStatus};

use super::calendar::WorkCalendar;
use super::classify::{elapsed_completion, ClassifyRules};

/// Floor applied to the completion of a task that has just started.
pub const MIN_STARTED_COMPLETION: u8 = 10;

#[derive(Debug, Clone, Copy)]
pub struct OverrideContext {
    pub today: NaiveDate,
    pub calendar: WorkCalendar,
    pub rules: ClassifyRules,
}

/// One hand edit. `None` dates clear the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    Status(TaskStatus),
    CompletionPercent(u8),
    ActualStart(Option<NaiveDate>),
    ActualEnd(Option<NaiveDate>),
    Duration(u32),
    OutlookCompletion(Option<NaiveDate>),
}

/// Several edits submitted together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub completion_percent: Option<u8>,
    pub actual_start: Option<Option<NaiveDate>>,
    pub actual_end: Option<Option<NaiveDate>>,
    pub duration: Option<u32>,
    pub outlook_completion: Option<Option<NaiveDate>>,
}

impl TaskUpdate {
    /// Edits in the order they are applied: status first, then completion,
    /// then dates, then duration, then an explicit outlook.
    pub fn changes(&self) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        if let Some(status) = self.status {
            changes.push(FieldChange::Status(status));
        }
        if let Some(percent) = self.completion_percent {
            changes.push(FieldChange::CompletionPercent(percent));
        }
        if let Some(start) = self.actual_start {
            changes.push(FieldChange::ActualStart(start));
        }
        if let Some(end) = self.actual_end {
            changes.push(FieldChange::ActualEnd(end));
        }
        if let Some(duration) = self.duration {
            changes.push(FieldChange::Duration(duration));
        }
        if let Some(outlook) = self.outlook_completion {
            changes.push(FieldChange::OutlookCompletion(outlook));
        }
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }
}

pub fn apply_update(task: &Task, update: &TaskUpdate, ctx: &OverrideContext) -> Task {
    update
        .changes()
        .into_iter()
        .fold(task.clone(), |acc, change| apply_override(&acc, change, ctx))
}

pub fn apply_override(task: &Task, change: FieldChange, ctx: &OverrideContext) -> Task {
    let mut next = task.clone();
    match change {
        FieldChange::Status(status) => set_status(&mut next, status, ctx),
        FieldChange::CompletionPercent(percent) => {
            next.completion_percent = percent;
            if percent == 100 {
                next.status = TaskStatus::Completed;
                next.actual_end.get_or_insert(ctx.today);
            }
        }
        FieldChange::ActualStart(start) => {
            let was_not_started = next.status == TaskStatus::NotStarted;
            next.actual_start = start;
            if start.is_some() {
                if was_not_started {
                    next.status = TaskStatus::OnTrack;
                    next.completion_percent = next.completion_percent.max(MIN_STARTED_COMPLETION);
                }
                refresh_outlook(&ctx.calendar, &mut next);
            }
        }
        FieldChange::ActualEnd(end) => {
            next.actual_end = end;
            if end.is_some() {
                next.status = TaskStatus::Completed;
                next.completion_percent = 100;
            }
        }
        FieldChange::Duration(duration) => {
            next.duration = duration;
            refresh_outlook(&ctx.calendar, &mut next);
        }
        FieldChange::OutlookCompletion(outlook) => next.outlook_completion = outlook,
    }
    debug!(task = %next.id, ?change, status = next.status.as_str(), completion = next.completion_percent, "applied override");
    next
}

fn set_status(task: &mut Task, status: TaskStatus, ctx: &OverrideContext) {
    task.status = status;
    match status {
        TaskStatus::Completed => {
            task.actual_end.get_or_insert(ctx.today);
            task.completion_percent = 100;
        }
        TaskStatus::NotStarted => {
            task.actual_start = None;
            task.actual_end = None;
            task.outlook_completion = None;
            task.completion_percent = 0;
        }
        TaskStatus::OnTrack => {
            let start = match task.actual_start {
                Some(start) => start,
                None => {
                    task.actual_start = Some(ctx.today);
                    refresh_outlook(&ctx.calendar, task);
                    ctx.today
                }
            };
            if task.completion_percent == 0 || task.completion_percent == 100 {
                let measured = elapsed_completion(start, task.planned_end, ctx.today, &ctx.rules);
                task.completion_percent = measured.max(MIN_STARTED_COMPLETION);
            }
        }
        TaskStatus::Delayed | TaskStatus::LikelyDelay => {}
    }
}

/// Project the finish date from the actual start and the duration.
/// A projection past the last representable date leaves no outlook.
pub fn refresh_outlook(calendar: &WorkCalendar, task: &mut Task) {
    if let Some(start) = task.actual_start {
        task.outlook_completion = calendar.add_working_days(start, i64::from(task.duration));
    }
}
