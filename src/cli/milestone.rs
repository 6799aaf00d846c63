use std::io::{self, Read};

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::cli::commands::MilestoneCommands;
use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::db::{connection, milestone_repo, task_repo};
use crate::error::FitplanError;
use crate::models::{Milestone, Task, TaskStatus};
use crate::output;
use crate::schedule::classify::{classify, classify_all};
use crate::schedule::{apply_update, overrides, planner, template, OverrideContext, TaskUpdate};

pub fn run(cmd: MilestoneCommands, opts: &GlobalOpts) -> i32 {
    let result = match cmd {
        MilestoneCommands::Create { name, start, title, empty } => {
            run_create(&name, &start, title.as_deref(), empty, opts)
        }
        MilestoneCommands::List => run_list(opts),
        MilestoneCommands::Show { reference } => run_show(&reference, opts),
        MilestoneCommands::Activate { reference } => run_activate(&reference, opts),
        MilestoneCommands::Delete { reference } => run_delete(&reference, opts),
        MilestoneCommands::Load => run_load(opts),
        MilestoneCommands::StartDate { date } => run_start_date(&date, opts),
        MilestoneCommands::Flex { percent } => run_flex(percent, opts),
        MilestoneCommands::Refresh => run_refresh(opts),
    };
    super::finish(result, opts.json)
}

fn validate_milestone_name(name: &str) -> Result<(), FitplanError> {
    if !is_slug(name) {
        return Err(FitplanError::validation(
            "Milestone name must match ^[a-z0-9][a-z0-9-]*[a-z0-9]$ (or single char [a-z0-9])",
        ));
    }
    Ok(())
}

fn is_slug(name: &str) -> bool {
    let slug_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    match (name.chars().next(), name.chars().last()) {
        (Some(first), Some(last)) => {
            slug_char(first) && slug_char(last) && name.chars().all(|c| slug_char(c) || c == '-')
        }
        _ => false,
    }
}

fn run_create(
    name: &str,
    start: &str,
    title: Option<&str>,
    empty: bool,
    opts: &GlobalOpts,
) -> Result<i32, FitplanError> {
    validate_milestone_name(name)?;
    let project_start = planner::parse_date("projectStart", start)?;
    let config = Config::load()?;
    let calendar = config.calendar()?;
    let conn = connection::open_db()?;

    let mut milestone = Milestone::new(ulid::Ulid::new().to_string(), name, title.unwrap_or(name), project_start);
    if !empty {
        milestone.tasks = template::default_tasks();
    }
    planner::plan_milestone(&calendar, &mut milestone)?;

    let milestone = connection::with_transaction(&conn, |conn| milestone_repo::create_milestone(conn, &milestone))?;
    let activated = activate_if_unset(&conn, config, &milestone.id)?;

    if opts.json {
        output::json::print(&output::json::success(json!({
            "milestone": output::json::milestone_json(&milestone),
            "tasks": output::json::tasks_json(&milestone.tasks),
            "activated": activated
        })));
    } else {
        println!(
            "Created milestone: {} ({}) {} → {}",
            milestone.name, milestone.id, milestone.project_start, milestone.project_end
        );
    }
    Ok(0)
}

fn run_list(opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let conn = connection::open_db()?;
    let milestones = milestone_repo::list_milestones(&conn)?;
    let active_id = Config::load()?.active_milestone_id;

    if opts.json {
        let milestones_json: Vec<_> = milestones
            .iter()
            .map(|m| {
                let mut v = output::json::milestone_json(m);
                if Some(&m.id) == active_id.as_ref() {
                    v["active"] = json!(true);
                }
                v
            })
            .collect();
        output::json::print(&output::json::success(json!({ "milestones": milestones_json })));
    } else {
        output::text::print_milestone_list(&milestones, active_id.as_deref());
    }
    Ok(0)
}

fn run_show(reference: &str, opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let conn = connection::open_db()?;
    let milestone = milestone_repo::resolve_milestone(&conn, reference)?;
    let progress = task_repo::task_progress(&conn, &milestone.id)?;

    if opts.json {
        output::json::print(&output::json::success(json!({
            "milestone": output::json::milestone_json(&milestone),
            "tasks": output::json::tasks_json(&milestone.tasks),
            "progress": output::json::progress_json(&progress)
        })));
    } else {
        output::text::print_milestone(&milestone);
        println!();
        output::text::print_progress(&progress);
        println!("\nTasks:");
        output::text::print_task_list(&milestone.tasks);
    }
    Ok(0)
}

fn run_activate(reference: &str, opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let conn = connection::open_db()?;
    let milestone = milestone_repo::resolve_milestone(&conn, reference)?;

    let mut config = Config::load()?;
    config.active_milestone_id = Some(milestone.id.clone());
    config.save()?;

    if opts.json {
        output::json::print(&output::json::success(json!({
            "activated": { "id": milestone.id, "name": milestone.name }
        })));
    } else {
        println!("Activated milestone: {} ({})", milestone.name, milestone.id);
    }
    Ok(0)
}

fn run_delete(reference: &str, opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let conn = connection::open_db()?;
    let milestone = milestone_repo::resolve_milestone(&conn, reference)?;
    milestone_repo::delete_milestone(&conn, &milestone.id)?;

    // Clear active milestone if we just deleted it
    let mut config = Config::load()?;
    if config.active_milestone_id.as_deref() == Some(milestone.id.as_str()) {
        config.active_milestone_id = None;
        config.save()?;
    }

    if opts.json {
        output::json::print(&output::json::success(json!({
            "deleted": { "id": milestone.id, "name": milestone.name }
        })));
    } else {
        println!("Deleted milestone: {} ({})", milestone.name, milestone.id);
    }
    Ok(0)
}

// --- milestone load ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MilestoneLoadInput {
    name: String,
    title: Option<String>,
    project_start: Option<String>,
    #[serde(default)]
    flexibility_percent: i64,
    #[serde(default)]
    tasks: Vec<TaskLoadInput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskLoadInput {
    #[serde(default)]
    phase: String,
    #[serde(alias = "description")]
    name: String,
    duration: i64,
    responsible_person: Option<String>,
    actual_start: Option<String>,
    actual_end: Option<String>,
    outlook_completion: Option<String>,
    status: Option<String>,
    completion_percent: Option<i64>,
}

fn run_load(opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| FitplanError::validation(e.to_string()))?;

    let load: MilestoneLoadInput =
        serde_json::from_str(&input).map_err(|e| FitplanError::validation(format!("Invalid JSON: {e}")))?;

    let config = Config::load()?;
    let calendar = config.calendar()?;
    let rules = config.rules();

    // Everything is validated before any date computation.
    validate_milestone_name(&load.name)?;
    let project_start = match load.project_start.as_deref() {
        Some(s) => planner::parse_date("projectStart", s)?,
        None => return Err(FitplanError::invalid_field("projectStart", "missing")),
    };
    let flexibility = planner::validate_percent("flexibilityPercent", load.flexibility_percent)?;
    let mut tasks = Vec::with_capacity(load.tasks.len());
    let mut progress = Vec::with_capacity(load.tasks.len());
    for (i, t) in load.tasks.iter().enumerate() {
        let (task, given) = build_task(i, t)?;
        tasks.push(task);
        progress.push(given);
    }

    let conn = connection::open_db()?;
    let title = load.title.clone().unwrap_or_else(|| load.name.clone());
    let mut milestone = Milestone::new(ulid::Ulid::new().to_string(), &load.name, title, project_start);
    milestone.tasks = tasks;
    planner::plan_milestone(&calendar, &mut milestone)?;

    let ctx = OverrideContext { today: opts.today, calendar, rules };
    for (task, given) in milestone.tasks.iter_mut().zip(progress) {
        if task.outlook_completion.is_none() {
            overrides::refresh_outlook(&calendar, task);
        }
        match given {
            LoadedProgress::Status => {}
            // A bare completion is replayed as a hand edit together with the
            // actual dates so status follows the usual side effects.
            LoadedProgress::Completion(percent) => {
                let update = TaskUpdate {
                    completion_percent: Some(percent),
                    actual_start: task.actual_start.map(Some),
                    actual_end: task.actual_end.map(Some),
                    outlook_completion: task.outlook_completion.map(Some),
                    ..TaskUpdate::default()
                };
                *task = apply_update(task, &update, &ctx);
            }
            LoadedProgress::Inferred => {
                let c = classify(task, opts.today, &rules);
                task.status = c.status;
                task.completion_percent = c.completion_percent;
            }
        }
    }
    if flexibility > 0 {
        planner::apply_flexibility(&calendar, &mut milestone, i64::from(flexibility))?;
    }

    let milestone = connection::with_transaction(&conn, |conn| milestone_repo::create_milestone(conn, &milestone))?;
    let activated = activate_if_unset(&conn, config, &milestone.id)?;
    info!(milestone = %milestone.name, "loaded milestone");

    if opts.json {
        output::json::print(&output::json::success(json!({
            "milestone": output::json::milestone_json(&milestone),
            "tasks": output::json::tasks_json(&milestone.tasks),
            "tasks_created": milestone.tasks.len(),
            "activated": activated
        })));
    } else {
        println!(
            "Loaded milestone '{}' with {} tasks ({} → {}).",
            milestone.name,
            milestone.tasks.len(),
            milestone.project_start,
            milestone.project_end
        );
    }
    Ok(0)
}

/// What a loaded task said about its own progress.
enum LoadedProgress {
    /// An explicit status, kept as given.
    Status,
    /// Only a completion percent.
    Completion(u8),
    /// Nothing; classified as of today.
    Inferred,
}

/// Validate one loaded task.
fn build_task(index: usize, input: &TaskLoadInput) -> Result<(Task, LoadedProgress), FitplanError> {
    let field = |name: &str| format!("tasks[{index}].{name}");
    if input.name.trim().is_empty() {
        return Err(FitplanError::invalid_field(&field("name"), "must not be empty"));
    }
    let duration = planner::validate_duration(input.duration)
        .map_err(|e| FitplanError::validation(format!("{} ({})", e.message, field("duration"))))?;
    let date = |name: &str, value: &Option<String>| -> Result<Option<NaiveDate>, FitplanError> {
        value.as_deref().map(|v| planner::parse_date(&field(name), v)).transpose()
    };

    let mut task = Task::new(ulid::Ulid::new().to_string(), input.phase.trim(), input.name.trim(), duration);
    task.responsible_person = input.responsible_person.clone();
    task.actual_start = date("actualStart", &input.actual_start)?;
    task.actual_end = date("actualEnd", &input.actual_end)?;
    task.outlook_completion = date("outlookCompletion", &input.outlook_completion)?;

    let completion = input
        .completion_percent
        .map(|p| planner::validate_percent(&field("completionPercent"), p))
        .transpose()?;
    let progress = match (&input.status, completion) {
        (Some(status), _) => {
            task.status = parse_status(status)
                .map_err(|e| FitplanError::validation(format!("{} ({})", e.message, field("status"))))?;
            task.completion_percent = completion.unwrap_or_default();
            LoadedProgress::Status
        }
        (None, Some(percent)) => LoadedProgress::Completion(percent),
        (None, None) => LoadedProgress::Inferred,
    };
    Ok((task, progress))
}

pub fn parse_status(value: &str) -> Result<TaskStatus, FitplanError> {
    let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
    TaskStatus::from_str(&normalized).ok_or_else(|| {
        let names: Vec<&str> = TaskStatus::all().iter().map(|s| s.as_str()).collect();
        FitplanError::invalid_field("status", format!("'{value}' (expected one of {})", names.join(", ")))
    })
}

// --- schedule edits on the active milestone ---

fn run_start_date(date: &str, opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let start = planner::parse_date("projectStart", date)?;
    let calendar = Config::load()?.calendar()?;
    let conn = connection::open_db()?;
    let mut milestone = load_active(&conn, opts)?;
    let previous_flex = milestone.flexibility_percent;

    planner::set_project_start(&calendar, &mut milestone, start)?;
    let milestone = connection::with_transaction(&conn, |conn| milestone_repo::save_milestone(conn, &milestone))?;

    if opts.json {
        output::json::print(&output::json::success(json!({
            "milestone": output::json::milestone_json(&milestone),
            "tasks": output::json::tasks_json(&milestone.tasks),
            "flexibility_reset": previous_flex != 0
        })));
    } else {
        println!(
            "Rescheduled {}: {} → {}",
            milestone.name, milestone.project_start, milestone.project_end
        );
        if previous_flex != 0 {
            println!("Flexibility reset from {previous_flex}% to 0%.");
        }
    }
    Ok(0)
}

fn run_flex(percent: i64, opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let calendar = Config::load()?.calendar()?;
    let conn = connection::open_db()?;
    let mut milestone = load_active(&conn, opts)?;

    planner::apply_flexibility(&calendar, &mut milestone, percent)?;
    let milestone = connection::with_transaction(&conn, |conn| milestone_repo::save_milestone(conn, &milestone))?;

    if opts.json {
        output::json::print(&output::json::success(json!({
            "milestone": output::json::milestone_json(&milestone),
            "buffer_days": planner::flexibility_buffer_days(
                &calendar,
                milestone.project_start,
                milestone.baseline_end,
                milestone.flexibility_percent,
            )
        })));
    } else {
        println!(
            "{}: end {} (baseline {}, {}% flexibility)",
            milestone.name, milestone.project_end, milestone.baseline_end, milestone.flexibility_percent
        );
    }
    Ok(0)
}

fn run_refresh(opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let rules = Config::load()?.rules();
    let conn = connection::open_db()?;
    let mut milestone = load_active(&conn, opts)?;

    let changed = classify_all(&mut milestone, opts.today, &rules);
    let milestone = connection::with_transaction(&conn, |conn| milestone_repo::save_milestone(conn, &milestone))?;
    let progress = task_repo::task_progress(&conn, &milestone.id)?;

    if opts.json {
        output::json::print(&output::json::success(json!({
            "today": opts.today,
            "changed": changed,
            "tasks": output::json::tasks_json(&milestone.tasks),
            "progress": output::json::progress_json(&progress)
        })));
    } else {
        println!("Reclassified {} as of {}: {changed} task(s) changed.", milestone.name, opts.today);
        output::text::print_progress(&progress);
    }
    Ok(0)
}

fn activate_if_unset(conn: &Connection, mut config: Config, id: &str) -> Result<bool, FitplanError> {
    let should_activate = match config.active_milestone_id {
        None => true,
        Some(ref active) => milestone_repo::get_milestone_by_id(conn, active).is_err(),
    };
    if should_activate {
        config.active_milestone_id = Some(id.to_string());
        config.save()?;
    }
    Ok(should_activate)
}

pub fn resolve_milestone_id(conn: &Connection, milestone_flag: Option<&str>) -> Result<String, FitplanError> {
    if let Some(reference) = milestone_flag {
        let milestone = milestone_repo::resolve_milestone(conn, reference)?;
        return Ok(milestone.id);
    }
    let id = Config::load()?
        .active_milestone_id
        .ok_or_else(FitplanError::no_active_milestone)?;
    Ok(id)
}

/// The milestone selected by `--milestone` or the active one, with its tasks.
pub fn load_active(conn: &Connection, opts: &GlobalOpts) -> Result<Milestone, FitplanError> {
    let id = resolve_milestone_id(conn, opts.milestone.as_deref())?;
    milestone_repo::get_milestone_by_id(conn, &id)
}
