use rusqlite::{params, Connection};

use crate::error::FitplanError;
use crate::models::{Task, TaskStatus};

const TASK_COLUMNS: &str = "id, phase, name, duration, responsible_person, planned_start, planned_end,
                actual_start, actual_end, outlook_completion, status, completion_percent";

pub fn list_tasks_by_milestone(conn: &Connection, milestone_id: &str) -> Result<Vec<Task>, FitplanError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE milestone_id = ?1 ORDER BY position ASC"
    ))?;
    let tasks = stmt
        .query_map(params![milestone_id], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

/// Replace the milestone's task list with `tasks`, positions following slice order.
/// Callers run this inside a transaction.
pub fn replace_tasks(conn: &Connection, milestone_id: &str, tasks: &[Task]) -> Result<(), FitplanError> {
    conn.execute("DELETE FROM tasks WHERE milestone_id = ?1", params![milestone_id])?;
    let mut stmt = conn.prepare(
        "INSERT INTO tasks (id, milestone_id, position, phase, name, duration, responsible_person,
                            planned_start, planned_end, actual_start, actual_end, outlook_completion,
                            status, completion_percent)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    )?;
    for (position, t) in tasks.iter().enumerate() {
        stmt.execute(params![
            t.id,
            milestone_id,
            position as i64,
            t.phase,
            t.name,
            t.duration,
            t.responsible_person,
            t.planned_start,
            t.planned_end,
            t.actual_start,
            t.actual_end,
            t.outlook_completion,
            t.status.as_str(),
            t.completion_percent,
        ])?;
    }
    Ok(())
}

/// Get task status counts for a milestone.
pub fn task_progress(conn: &Connection, milestone_id: &str) -> Result<TaskProgress, FitplanError> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*), COALESCE(SUM(completion_percent), 0)
         FROM tasks WHERE milestone_id = ?1 GROUP BY status",
    )?;
    let mut progress = TaskProgress::default();
    let mut completion_sum = 0i64;
    let rows = stmt.query_map(params![milestone_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
    })?;
    for row in rows {
        let (status, count, sum) = row?;
        completion_sum += sum;
        match TaskStatus::from_str(&status) {
            Some(TaskStatus::NotStarted) => progress.not_started = count,
            Some(TaskStatus::OnTrack) => progress.on_track = count,
            Some(TaskStatus::Delayed) => progress.delayed = count,
            Some(TaskStatus::LikelyDelay) => progress.likely_delay = count,
            Some(TaskStatus::Completed) => progress.completed = count,
            None => {}
        }
    }
    progress.total = progress.not_started + progress.on_track + progress.delayed
        + progress.likely_delay + progress.completed;
    progress.percentage = if progress.total > 0 {
        completion_sum as f64 / progress.total as f64
    } else {
        0.0
    };
    Ok(progress)
}

#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct TaskProgress {
    pub total: i64,
    pub not_started: i64,
    pub on_track: i64,
    pub delayed: i64,
    pub likely_delay: i64,
    pub completed: i64,
    /// Mean completion percent across all tasks.
    pub percentage: f64,
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        phase: row.get(1)?,
        name: row.get(2)?,
        duration: row.get(3)?,
        responsible_person: row.get(4)?,
        planned_start: row.get(5)?,
        planned_end: row.get(6)?,
        actual_start: row.get(7)?,
        actual_end: row.get(8)?,
        outlook_completion: row.get(9)?,
        status: TaskStatus::from_str(&row.get::<_, String>(10)?).unwrap_or_default(),
        completion_percent: row.get(11)?,
    })
}
