use chrono::NaiveDate;
use serde_json::json;

use crate::cli::commands::TaskCommands;
use crate::cli::milestone::{load_active, parse_status};
use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::db::{connection, milestone_repo};
use crate::error::FitplanError;
use crate::models::{Milestone, Task};
use crate::output;
use crate::schedule::{apply_update, classify, planner, OverrideContext, TaskUpdate};

pub fn run(cmd: TaskCommands, opts: &GlobalOpts) -> i32 {
    let result = match cmd {
        TaskCommands::List => run_list(opts),
        TaskCommands::Show { reference } => run_show(&reference, opts),
        TaskCommands::Add { name, duration, phase, responsible, at } => {
            run_add(&name, duration, &phase, responsible, at, opts)
        }
        TaskCommands::Remove { reference } => run_remove(&reference, opts),
        TaskCommands::Move { reference, position } => run_move(&reference, position, opts),
        TaskCommands::Update {
            reference,
            status,
            completion,
            actual_start,
            clear_actual_start,
            actual_end,
            clear_actual_end,
            duration,
            outlook,
            clear_outlook,
            phase,
            name,
            responsible,
        } => parse_update(
            status.as_deref(),
            completion,
            (actual_start.as_deref(), clear_actual_start),
            (actual_end.as_deref(), clear_actual_end),
            duration,
            (outlook.as_deref(), clear_outlook),
        )
        .and_then(|update| {
            let labels = LabelEdits { phase, name, responsible };
            run_update(&reference, update, labels, opts)
        }),
        TaskCommands::Classify { reference } => run_classify(&reference, opts),
    };
    super::finish(result, opts.json)
}

/// Resolve a task reference within a milestone: 1-based position → exact ID
/// → ID prefix → name substring (case-insensitive).
pub fn resolve_task_index(milestone: &Milestone, reference: &str) -> Result<usize, FitplanError> {
    if let Ok(position) = reference.parse::<usize>() {
        if (1..=milestone.tasks.len()).contains(&position) {
            return Ok(position - 1);
        }
    }
    if let Some(i) = milestone.tasks.iter().position(|t| t.id == reference) {
        return Ok(i);
    }

    let upper = reference.to_ascii_uppercase();
    let lower = reference.to_lowercase();
    let by_id_prefix = matching(milestone, |t| t.id.starts_with(&upper));
    let by_name = matching(milestone, |t| t.name.to_lowercase().contains(&lower));
    for found in [by_id_prefix, by_name] {
        match found.len() {
            0 => continue,
            1 => return Ok(found[0]),
            _ => {
                let candidates: Vec<String> = found
                    .iter()
                    .map(|&i| format!("#{} {} ({})", i + 1, milestone.tasks[i].name, milestone.tasks[i].id))
                    .collect();
                return Err(FitplanError::ambiguous_ref(reference, &candidates));
            }
        }
    }
    Err(FitplanError::task_not_found(reference))
}

fn matching(milestone: &Milestone, pred: impl Fn(&Task) -> bool) -> Vec<usize> {
    milestone
        .tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| pred(t))
        .map(|(i, _)| i)
        .collect()
}

fn run_list(opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let conn = connection::open_db()?;
    let milestone = load_active(&conn, opts)?;

    if opts.json {
        output::json::print(&output::json::success(json!({
            "milestone": { "id": milestone.id, "name": milestone.name },
            "tasks": output::json::tasks_json(&milestone.tasks)
        })));
    } else {
        output::text::print_task_list(&milestone.tasks);
    }
    Ok(0)
}

fn run_show(reference: &str, opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let conn = connection::open_db()?;
    let milestone = load_active(&conn, opts)?;
    let index = resolve_task_index(&milestone, reference)?;
    let task = &milestone.tasks[index];

    if opts.json {
        output::json::print(&output::json::success(json!({
            "task": output::json::task_detail(task, index + 1)
        })));
    } else {
        output::text::print_task(task, index + 1);
    }
    Ok(0)
}

fn run_add(
    name: &str,
    duration: i64,
    phase: &str,
    responsible: Option<String>,
    at: Option<usize>,
    opts: &GlobalOpts,
) -> Result<i32, FitplanError> {
    if name.trim().is_empty() {
        return Err(FitplanError::invalid_field("name", "must not be empty"));
    }
    let duration = planner::validate_duration(duration)?;
    let calendar = Config::load()?.calendar()?;
    let conn = connection::open_db()?;
    let mut milestone = load_active(&conn, opts)?;

    let mut task = Task::new(ulid::Ulid::new().to_string(), phase.trim(), name.trim(), duration);
    task.responsible_person = responsible;
    let task_id = task.id.clone();
    match at {
        Some(0) => return Err(FitplanError::invalid_field("position", "positions start at 1")),
        Some(position) => planner::insert_task(&calendar, &mut milestone, position - 1, task)?,
        None => planner::push_task(&calendar, &mut milestone, task)?,
    }

    let milestone = connection::with_transaction(&conn, |conn| milestone_repo::save_milestone(conn, &milestone))?;
    let index = resolve_task_index(&milestone, &task_id)?;
    let task = &milestone.tasks[index];

    if opts.json {
        output::json::print(&output::json::success(json!({
            "task": output::json::task_detail(task, index + 1),
            "project_end": milestone.project_end
        })));
    } else {
        println!(
            "Added task #{}: {} ({}) {} → {}",
            index + 1,
            task.name,
            task.id,
            task.planned_start.map(|d| d.to_string()).unwrap_or_default(),
            task.planned_end.map(|d| d.to_string()).unwrap_or_default()
        );
    }
    Ok(0)
}

fn run_remove(reference: &str, opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let calendar = Config::load()?.calendar()?;
    let conn = connection::open_db()?;
    let mut milestone = load_active(&conn, opts)?;
    let index = resolve_task_index(&milestone, reference)?;

    let removed = planner::remove_task(&calendar, &mut milestone, index)?;
    let milestone = connection::with_transaction(&conn, |conn| milestone_repo::save_milestone(conn, &milestone))?;

    if opts.json {
        output::json::print(&output::json::success(json!({
            "removed": { "id": removed.id, "name": removed.name },
            "tasks": output::json::tasks_json(&milestone.tasks),
            "project_end": milestone.project_end
        })));
    } else {
        println!("Removed task: {} ({})", removed.name, removed.id);
        println!("Project end: {}", milestone.project_end);
    }
    Ok(0)
}

fn run_move(reference: &str, position: usize, opts: &GlobalOpts) -> Result<i32, FitplanError> {
    if position == 0 {
        return Err(FitplanError::invalid_field("position", "positions start at 1"));
    }
    let calendar = Config::load()?.calendar()?;
    let conn = connection::open_db()?;
    let mut milestone = load_active(&conn, opts)?;
    let index = resolve_task_index(&milestone, reference)?;

    planner::move_task(&calendar, &mut milestone, index, position - 1)?;
    let milestone = connection::with_transaction(&conn, |conn| milestone_repo::save_milestone(conn, &milestone))?;

    if opts.json {
        output::json::print(&output::json::success(json!({
            "tasks": output::json::tasks_json(&milestone.tasks),
            "project_end": milestone.project_end
        })));
    } else {
        output::text::print_task_list(&milestone.tasks);
    }
    Ok(0)
}

struct LabelEdits {
    phase: Option<String>,
    name: Option<String>,
    responsible: Option<String>,
}

impl LabelEdits {
    fn is_empty(&self) -> bool {
        self.phase.is_none() && self.name.is_none() && self.responsible.is_none()
    }
}

fn parse_update(
    status: Option<&str>,
    completion: Option<i64>,
    actual_start: (Option<&str>, bool),
    actual_end: (Option<&str>, bool),
    duration: Option<i64>,
    outlook: (Option<&str>, bool),
) -> Result<TaskUpdate, FitplanError> {
    Ok(TaskUpdate {
        status: status.map(parse_status).transpose()?,
        completion_percent: completion
            .map(|p| planner::validate_percent("completion", p))
            .transpose()?,
        actual_start: date_edit("actualStart", actual_start)?,
        actual_end: date_edit("actualEnd", actual_end)?,
        duration: duration.map(planner::validate_duration).transpose()?,
        outlook_completion: date_edit("outlookCompletion", outlook)?,
    })
}

/// `Some(None)` clears the field, `Some(Some(d))` sets it, `None` leaves it.
fn date_edit(field: &str, (value, clear): (Option<&str>, bool)) -> Result<Option<Option<NaiveDate>>, FitplanError> {
    match (value, clear) {
        (Some(v), _) => Ok(Some(Some(planner::parse_date(field, v)?))),
        (None, true) => Ok(Some(None)),
        (None, false) => Ok(None),
    }
}

fn run_update(
    reference: &str,
    update: TaskUpdate,
    labels: LabelEdits,
    opts: &GlobalOpts,
) -> Result<i32, FitplanError> {
    if update.is_empty() && labels.is_empty() {
        return Err(FitplanError::validation("Nothing to update"));
    }
    if matches!(labels.name.as_deref(), Some(n) if n.trim().is_empty()) {
        return Err(FitplanError::invalid_field("name", "must not be empty"));
    }

    let config = Config::load()?;
    let ctx = OverrideContext {
        today: opts.today,
        calendar: config.calendar()?,
        rules: config.rules(),
    };
    let conn = connection::open_db()?;
    let mut milestone = load_active(&conn, opts)?;
    let index = resolve_task_index(&milestone, reference)?;
    let previous_flex = milestone.flexibility_percent;

    if let Some(duration) = update.duration {
        planner::set_duration(&ctx.calendar, &mut milestone, index, duration)?;
    }
    let mut task = apply_update(&milestone.tasks[index], &update, &ctx);
    if let Some(phase) = labels.phase {
        task.phase = phase.trim().to_string();
    }
    if let Some(name) = labels.name {
        task.name = name.trim().to_string();
    }
    if let Some(responsible) = labels.responsible {
        task.responsible_person = Some(responsible).filter(|r| !r.trim().is_empty());
    }
    milestone.tasks[index] = task;

    let milestone = connection::with_transaction(&conn, |conn| milestone_repo::save_milestone(conn, &milestone))?;
    let task = &milestone.tasks[index];
    let flexibility_reset = update.duration.is_some() && previous_flex != 0;

    if opts.json {
        output::json::print(&output::json::success(json!({
            "task": output::json::task_detail(task, index + 1),
            "project_end": milestone.project_end,
            "flexibility_reset": flexibility_reset
        })));
    } else {
        output::text::print_task(task, index + 1);
        if update.duration.is_some() {
            println!("Project end: {}", milestone.project_end);
        }
        if flexibility_reset {
            println!("Flexibility reset from {previous_flex}% to 0%.");
        }
    }
    Ok(0)
}

fn run_classify(reference: &str, opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let rules = Config::load()?.rules();
    let conn = connection::open_db()?;
    let milestone = load_active(&conn, opts)?;
    let index = resolve_task_index(&milestone, reference)?;
    let task = &milestone.tasks[index];
    let inferred = classify(task, opts.today, &rules);

    if opts.json {
        output::json::print(&output::json::success(json!({
            "task": { "id": task.id, "name": task.name },
            "today": opts.today,
            "stored": { "status": task.status.as_str(), "completion_percent": task.completion_percent },
            "inferred": output::json::classification_json(&inferred)
        })));
    } else {
        println!("Task #{}: {} as of {}", index + 1, task.name, opts.today);
        println!("  Stored:   {} ({}%)", task.status.as_str(), task.completion_percent);
        println!("  Inferred: {} ({}%)", inferred.status.as_str(), inferred.completion_percent);
    }
    Ok(0)
}
