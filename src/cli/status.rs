use serde_json::json;

use crate::cli::milestone::load_active;
use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::db::{connection, task_repo};
use crate::error::FitplanError;
use crate::models::TaskStatus;
use crate::output;
use crate::schedule::classify;

pub fn run(opts: &GlobalOpts) -> i32 {
    super::finish(run_inner(opts), opts.json)
}

fn run_inner(opts: &GlobalOpts) -> Result<i32, FitplanError> {
    let rules = Config::load()?.rules();
    let conn = connection::open_db()?;
    let milestone = load_active(&conn, opts)?;
    let progress = task_repo::task_progress(&conn, &milestone.id)?;

    // Tasks that look late as of today, whatever their stored status says.
    let attention: Vec<_> = milestone
        .tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (i, t, classify(t, opts.today, &rules)))
        .filter(|(_, _, c)| matches!(c.status, TaskStatus::Delayed | TaskStatus::LikelyDelay))
        .collect();
    let milestone_completed = progress.total > 0 && progress.completed == progress.total;

    if opts.json {
        let attention_json: Vec<_> = attention
            .iter()
            .map(|(i, t, c)| {
                json!({
                    "id": t.id,
                    "position": i + 1,
                    "name": t.name,
                    "planned_end": t.planned_end,
                    "inferred": output::json::classification_json(c)
                })
            })
            .collect();
        output::json::print(&output::json::success(json!({
            "milestone": output::json::milestone_json(&milestone),
            "today": opts.today,
            "tasks": output::json::tasks_json(&milestone.tasks),
            "attention": attention_json,
            "progress": output::json::progress_json(&progress),
            "milestone_completed": milestone_completed
        })));
    } else {
        output::text::print_milestone(&milestone);
        println!();
        output::text::print_progress(&progress);
        if milestone_completed {
            println!("\nMilestone completed!");
        }
        if !attention.is_empty() {
            println!("\nNeeds attention as of {}:", opts.today);
            for (i, t, c) in &attention {
                println!("  #{} {} - {} ({}%)", i + 1, t.name, c.status.as_str(), c.completion_percent);
            }
        }
        println!("\nAll tasks:");
        output::text::print_task_list(&milestone.tasks);
    }
    Ok(0)
}
