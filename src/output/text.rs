use chrono::NaiveDate;

use crate::db::task_repo::TaskProgress;
use crate::models::{Milestone, Task};

fn date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn print_milestone(m: &Milestone) {
    println!("Milestone: {} ({})", m.name, m.id);
    println!("  Title: {}", m.title);
    println!("  Start: {}", m.project_start);
    if m.buffer_applied() {
        println!(
            "  End: {} (baseline {}, +{}% flexibility)",
            m.project_end, m.baseline_end, m.flexibility_percent
        );
    } else {
        println!("  End: {}", m.project_end);
    }
    println!("  Created: {}", m.created_at);
}

pub fn print_milestone_list(milestones: &[Milestone], active_id: Option<&str>) {
    if milestones.is_empty() {
        println!("No milestones found.");
        return;
    }
    for m in milestones {
        let marker = if Some(m.id.as_str()) == active_id { " *" } else { "" };
        println!(
            "  {} ({}) {} → {} - {}{}",
            m.name,
            &m.id[..std::cmp::min(8, m.id.len())],
            m.project_start,
            m.project_end,
            m.title,
            marker
        );
    }
}

pub fn print_task(t: &Task, position: usize) {
    println!("Task #{position}: {} ({})", t.name, t.id);
    println!("  Phase: {}", t.phase);
    println!("  Duration: {} working days", t.duration);
    if let Some(ref person) = t.responsible_person {
        println!("  Responsible: {person}");
    }
    println!("  Planned: {} → {}", date(t.planned_start), date(t.planned_end));
    println!("  Actual: {} → {}", date(t.actual_start), date(t.actual_end));
    if let Some(outlook) = t.outlook_completion {
        println!("  Outlook: {outlook}");
    }
    println!("  Status: {} ({}%)", t.status.as_str(), t.completion_percent);
}

pub fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for (i, t) in tasks.iter().enumerate() {
        println!(
            "  {:>2}. [{}] {} / {} ({}d) {} → {} {}%",
            i + 1,
            t.status.as_str(),
            t.phase,
            t.name,
            t.duration,
            date(t.planned_start),
            date(t.planned_end),
            t.completion_percent
        );
    }
}

pub fn print_progress(p: &TaskProgress) {
    println!("Progress: {:.1}% ({}/{} completed)", p.percentage, p.completed, p.total);
    println!(
        "  not_started={} on_track={} likely_delay={} delayed={} completed={}",
        p.not_started, p.on_track, p.likely_delay, p.delayed, p.completed
    );
}
