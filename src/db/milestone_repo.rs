use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::error::FitplanError;
use crate::models::Milestone;

use super::task_repo;

const MILESTONE_COLUMNS: &str =
    "id, name, title, project_start, project_end, baseline_end, flexibility_percent, created_at, updated_at";

/// Insert a new milestone together with its tasks.
/// Callers run this inside a transaction.
pub fn create_milestone(conn: &Connection, milestone: &Milestone) -> Result<Milestone, FitplanError> {
    if find_milestone_by_name(conn, &milestone.name)?.is_some() {
        return Err(FitplanError::milestone_name_conflict(&milestone.name));
    }

    conn.execute(
        "INSERT INTO milestones (id, name, title, project_start, project_end, baseline_end, flexibility_percent)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            milestone.id,
            milestone.name,
            milestone.title,
            milestone.project_start,
            milestone.project_end,
            milestone.baseline_end,
            milestone.flexibility_percent,
        ],
    )?;
    task_repo::replace_tasks(conn, &milestone.id, &milestone.tasks)?;
    info!(milestone = %milestone.name, tasks = milestone.tasks.len(), "created milestone");

    get_milestone_by_id(conn, &milestone.id)
}

/// Persist the milestone row and its whole task list.
/// Callers run this inside a transaction.
pub fn save_milestone(conn: &Connection, milestone: &Milestone) -> Result<Milestone, FitplanError> {
    let changed = conn.execute(
        "UPDATE milestones SET title = ?1, project_start = ?2, project_end = ?3, baseline_end = ?4,
                flexibility_percent = ?5, updated_at = datetime('now')
         WHERE id = ?6",
        params![
            milestone.title,
            milestone.project_start,
            milestone.project_end,
            milestone.baseline_end,
            milestone.flexibility_percent,
            milestone.id,
        ],
    )?;
    if changed == 0 {
        return Err(FitplanError::milestone_not_found(&milestone.id));
    }
    task_repo::replace_tasks(conn, &milestone.id, &milestone.tasks)?;
    info!(milestone = %milestone.name, tasks = milestone.tasks.len(), "saved milestone");

    get_milestone_by_id(conn, &milestone.id)
}

pub fn get_milestone_by_id(conn: &Connection, id: &str) -> Result<Milestone, FitplanError> {
    let mut milestone = conn
        .query_row(
            &format!("SELECT {MILESTONE_COLUMNS} FROM milestones WHERE id = ?1"),
            params![id],
            row_to_milestone,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => FitplanError::milestone_not_found(id),
            _ => FitplanError::from(e),
        })?;
    milestone.tasks = task_repo::list_tasks_by_milestone(conn, id)?;
    Ok(milestone)
}

pub fn find_milestone_by_name(conn: &Connection, name: &str) -> Result<Option<Milestone>, FitplanError> {
    let milestone = conn
        .query_row(
            &format!("SELECT {MILESTONE_COLUMNS} FROM milestones WHERE name = ?1"),
            params![name],
            row_to_milestone,
        )
        .optional()?;
    match milestone {
        Some(mut m) => {
            m.tasks = task_repo::list_tasks_by_milestone(conn, &m.id)?;
            Ok(Some(m))
        }
        None => Ok(None),
    }
}

/// Resolve a milestone reference: exact name → ULID prefix → name partial match.
pub fn resolve_milestone(conn: &Connection, reference: &str) -> Result<Milestone, FitplanError> {
    // 1. Exact name match
    if let Some(milestone) = find_milestone_by_name(conn, reference)? {
        return Ok(milestone);
    }

    // 2. ID prefix match, then 3. name partial match
    let lookups = [
        ("id LIKE ?1", format!("{reference}%")),
        ("name LIKE ?1", format!("%{reference}%")),
    ];
    for (clause, pattern) in lookups {
        let mut stmt = conn.prepare(&format!(
            "SELECT {MILESTONE_COLUMNS} FROM milestones WHERE {clause} ORDER BY created_at ASC"
        ))?;
        let mut found: Vec<Milestone> = stmt
            .query_map(params![pattern], row_to_milestone)?
            .collect::<Result<Vec<_>, _>>()?;

        match found.len() {
            0 => continue,
            1 => {
                let id = found.remove(0).id;
                return get_milestone_by_id(conn, &id);
            }
            _ => {
                let candidates: Vec<String> = found.iter().map(|m| format!("{} ({})", m.name, m.id)).collect();
                return Err(FitplanError::ambiguous_ref(reference, &candidates));
            }
        }
    }
    Err(FitplanError::milestone_not_found(reference))
}

/// All milestones, newest first, without their tasks.
pub fn list_milestones(conn: &Connection) -> Result<Vec<Milestone>, FitplanError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MILESTONE_COLUMNS} FROM milestones ORDER BY created_at DESC, id DESC"
    ))?;
    let milestones = stmt
        .query_map([], row_to_milestone)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(milestones)
}

pub fn delete_milestone(conn: &Connection, id: &str) -> Result<(), FitplanError> {
    let changed = conn.execute("DELETE FROM milestones WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(FitplanError::milestone_not_found(id));
    }
    info!(id, "deleted milestone");
    Ok(())
}

fn row_to_milestone(row: &Row) -> rusqlite::Result<Milestone> {
    Ok(Milestone {
        id: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
        project_start: row.get(3)?,
        project_end: row.get(4)?,
        baseline_end: row.get(5)?,
        flexibility_percent: row.get(6)?,
        tasks: Vec::new(),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
