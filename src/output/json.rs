use serde_json::{json, Value};

use crate::db::task_repo::TaskProgress;
use crate::error::FitplanError;
use crate::models::{Milestone, Task};
use crate::schedule::Classification;

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &FitplanError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

pub fn progress_json(p: &TaskProgress) -> Value {
    json!({
        "total": p.total,
        "not_started": p.not_started,
        "on_track": p.on_track,
        "delayed": p.delayed,
        "likely_delay": p.likely_delay,
        "completed": p.completed,
        "percentage": (p.percentage * 10.0).round() / 10.0
    })
}

pub fn task_summary(t: &Task, position: usize) -> Value {
    json!({
        "id": t.id,
        "position": position,
        "phase": t.phase,
        "name": t.name,
        "duration": t.duration,
        "planned_start": t.planned_start,
        "planned_end": t.planned_end,
        "status": t.status.as_str(),
        "completion_percent": t.completion_percent
    })
}

pub fn task_detail(t: &Task, position: usize) -> Value {
    json!({
        "id": t.id,
        "position": position,
        "phase": t.phase,
        "name": t.name,
        "duration": t.duration,
        "responsible_person": t.responsible_person,
        "planned_start": t.planned_start,
        "planned_end": t.planned_end,
        "actual_start": t.actual_start,
        "actual_end": t.actual_end,
        "outlook_completion": t.outlook_completion,
        "status": t.status.as_str(),
        "completion_percent": t.completion_percent
    })
}

pub fn classification_json(c: &Classification) -> Value {
    json!({
        "status": c.status.as_str(),
        "completion_percent": c.completion_percent
    })
}

pub fn milestone_json(m: &Milestone) -> Value {
    json!({
        "id": m.id,
        "name": m.name,
        "title": m.title,
        "project_start": m.project_start,
        "project_end": m.project_end,
        "baseline_end": m.baseline_end,
        "flexibility_percent": m.flexibility_percent,
        "created_at": m.created_at,
        "updated_at": m.updated_at
    })
}

pub fn tasks_json(tasks: &[Task]) -> Value {
    json!(tasks
        .iter()
        .enumerate()
        .map(|(i, t)| task_summary(t, i + 1))
        .collect::<Vec<_>>())
}

pub fn print(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
