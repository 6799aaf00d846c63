use chrono::NaiveDate;
use tracing::debug;

use crate::error::FitplanError;
use crate::models::{Milestone, Task};

use super::calendar::WorkCalendar;
use super::overrides;

/// Assign planned dates to every task by sequential propagation from
/// `project_start`. Returns the unbuffered project end.
pub fn plan_tasks(
    calendar: &WorkCalendar,
    project_start: NaiveDate,
    tasks: &mut [Task],
) -> Result<NaiveDate, FitplanError> {
    replan_from(calendar, project_start, tasks, 0)
}

/// Recompute task `from` and every task after it. Tasks before `from` keep
/// their dates; the cursor resumes after the predecessor's planned end.
///
/// Fails with a validation error naming `duration` when a task would end past
/// the last representable date. Tasks already visited keep their new dates.
pub fn replan_from(
    calendar: &WorkCalendar,
    project_start: NaiveDate,
    tasks: &mut [Task],
    from: usize,
) -> Result<NaiveDate, FitplanError> {
    let from = from.min(tasks.len());
    let mut prev_end = match from.checked_sub(1) {
        None => None,
        Some(i) => match tasks[i].planned_end {
            Some(end) => Some(end),
            // Predecessor never planned: the chain is not trustworthy, start over.
            None => return replan_from(calendar, project_start, tasks, 0),
        },
    };

    for task in tasks[from..].iter_mut() {
        let start = match prev_end {
            Some(end) => calendar.next_working_day_after(end).ok_or_else(|| out_of_range(task))?,
            None => project_start,
        };
        let end = calendar
            .add_working_days(start, i64::from(task.duration))
            .ok_or_else(|| out_of_range(task))?;
        task.planned_start = Some(start);
        task.planned_end = Some(end);
        prev_end = Some(end);
    }

    debug!(from, count = tasks.len(), "replanned task chain");
    Ok(project_end_of(project_start, tasks))
}

fn out_of_range(task: &Task) -> FitplanError {
    FitplanError::invalid_field(
        "duration",
        format!("{} for task '{}' runs past the last supported date", task.duration, task.name),
    )
}

/// Last task's planned end, or `project_start` for an empty or unplanned list.
pub fn project_end_of(project_start: NaiveDate, tasks: &[Task]) -> NaiveDate {
    tasks
        .last()
        .and_then(|t| t.planned_end)
        .unwrap_or(project_start)
}

/// Plan the whole milestone and drop any flexibility buffer.
pub fn plan_milestone(calendar: &WorkCalendar, milestone: &mut Milestone) -> Result<(), FitplanError> {
    edit_chain(calendar, milestone, 0, |_| ())
}

/// Apply `edit` to a copy of the task list, replan from `from`, and only then
/// store the result. On error the milestone is left as it was.
fn edit_chain<T>(
    calendar: &WorkCalendar,
    milestone: &mut Milestone,
    from: usize,
    edit: impl FnOnce(&mut Vec<Task>) -> T,
) -> Result<T, FitplanError> {
    let mut tasks = milestone.tasks.clone();
    let out = edit(&mut tasks);
    let end = replan_from(calendar, milestone.project_start, &mut tasks, from)?;
    milestone.tasks = tasks;
    reset_flexibility(milestone, end);
    Ok(out)
}

fn reset_flexibility(milestone: &mut Milestone, baseline_end: NaiveDate) {
    if milestone.flexibility_percent != 0 {
        debug!(milestone = %milestone.name, "flexibility reset by structural change");
    }
    milestone.baseline_end = baseline_end;
    milestone.project_end = baseline_end;
    milestone.flexibility_percent = 0;
}

pub fn set_project_start(
    calendar: &WorkCalendar,
    milestone: &mut Milestone,
    start: NaiveDate,
) -> Result<(), FitplanError> {
    let mut tasks = milestone.tasks.clone();
    let end = plan_tasks(calendar, start, &mut tasks)?;
    milestone.project_start = start;
    milestone.tasks = tasks;
    reset_flexibility(milestone, end);
    Ok(())
}

pub fn set_duration(
    calendar: &WorkCalendar,
    milestone: &mut Milestone,
    index: usize,
    duration: u32,
) -> Result<(), FitplanError> {
    check_index(milestone, index)?;
    edit_chain(calendar, milestone, index, |tasks| {
        let task = &mut tasks[index];
        task.duration = duration;
        overrides::refresh_outlook(calendar, task);
    })
}

/// Append a task. It starts on the first working day after the current
/// baseline end; earlier tasks are not touched.
pub fn push_task(calendar: &WorkCalendar, milestone: &mut Milestone, task: Task) -> Result<(), FitplanError> {
    let index = milestone.tasks.len();
    edit_chain(calendar, milestone, index, |tasks| tasks.push(task))
}

pub fn insert_task(
    calendar: &WorkCalendar,
    milestone: &mut Milestone,
    index: usize,
    task: Task,
) -> Result<(), FitplanError> {
    if index > milestone.tasks.len() {
        return Err(FitplanError::invalid_field(
            "position",
            format!("{index} is beyond the end of a {}-task list", milestone.tasks.len()),
        ));
    }
    edit_chain(calendar, milestone, index, |tasks| tasks.insert(index, task))
}

pub fn remove_task(
    calendar: &WorkCalendar,
    milestone: &mut Milestone,
    index: usize,
) -> Result<Task, FitplanError> {
    check_index(milestone, index)?;
    edit_chain(calendar, milestone, index, |tasks| tasks.remove(index))
}

pub fn move_task(
    calendar: &WorkCalendar,
    milestone: &mut Milestone,
    from: usize,
    to: usize,
) -> Result<(), FitplanError> {
    check_index(milestone, from)?;
    check_index(milestone, to)?;
    if from == to {
        return Ok(());
    }
    edit_chain(calendar, milestone, from.min(to), |tasks| {
        let task = tasks.remove(from);
        tasks.insert(to, task);
    })
}

/// Stretch the project end by `percent` of the planned working days.
/// Task dates are left alone; the buffer is always computed from the
/// unbuffered baseline so repeated calls do not compound.
pub fn apply_flexibility(
    calendar: &WorkCalendar,
    milestone: &mut Milestone,
    percent: i64,
) -> Result<NaiveDate, FitplanError> {
    let percent = validate_percent("flexibility percent", percent)?;
    let baseline = planned_baseline(milestone)?;

    let buffer = flexibility_buffer_days(calendar, milestone.project_start, baseline, percent);
    let end = calendar.add_working_days(baseline, buffer).ok_or_else(|| {
        FitplanError::invalid_field("flexibility percent", format!("{percent}% runs past the last supported date"))
    })?;
    debug!(buffer, percent, %end, "applied flexibility");

    milestone.baseline_end = baseline;
    milestone.project_end = end;
    milestone.flexibility_percent = percent;
    Ok(end)
}

/// `ceil(working days of [project_start, baseline] * percent / 100)`.
pub fn flexibility_buffer_days(
    calendar: &WorkCalendar,
    project_start: NaiveDate,
    baseline: NaiveDate,
    percent: u8,
) -> i64 {
    if percent == 0 {
        return 0;
    }
    let total = calendar.count_working_days(project_start, baseline);
    (total * i64::from(percent) + 99) / 100
}

fn planned_baseline(milestone: &Milestone) -> Result<NaiveDate, FitplanError> {
    if milestone.tasks.is_empty() {
        return Err(FitplanError::inconsistent_state(
            "Cannot apply flexibility to a milestone without tasks",
        ));
    }
    if let Some(unplanned) = milestone.tasks.iter().find(|t| !t.is_planned()) {
        return Err(FitplanError::inconsistent_state(format!(
            "Task '{}' has no planned dates; plan the milestone before applying flexibility",
            unplanned.name
        )));
    }
    Ok(project_end_of(milestone.project_start, &milestone.tasks))
}

fn check_index(milestone: &Milestone, index: usize) -> Result<(), FitplanError> {
    if index >= milestone.tasks.len() {
        return Err(FitplanError::invalid_field(
            "position",
            format!("{index} is out of range for a {}-task list", milestone.tasks.len()),
        ));
    }
    Ok(())
}

pub fn validate_duration(duration: i64) -> Result<u32, FitplanError> {
    u32::try_from(duration)
        .map_err(|_| FitplanError::invalid_field("duration", format!("{duration} (must be a non-negative number of working days)")))
}

pub fn validate_percent(field: &str, value: i64) -> Result<u8, FitplanError> {
    if !(0..=100).contains(&value) {
        return Err(FitplanError::invalid_field(field, format!("{value} (must be between 0 and 100)")));
    }
    Ok(value as u8)
}

/// Parse an ISO `YYYY-MM-DD` date, naming `field` on failure.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, FitplanError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| FitplanError::invalid_field(field, format!("'{value}' is not a YYYY-MM-DD date")))
}
