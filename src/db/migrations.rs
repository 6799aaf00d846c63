use rusqlite::Connection;

use crate::error::FitplanError;

pub fn run_migrations(conn: &Connection) -> Result<(), FitplanError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS milestones (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            project_start TEXT NOT NULL,
            project_end TEXT NOT NULL,
            baseline_end TEXT NOT NULL,
            flexibility_percent INTEGER NOT NULL DEFAULT 0
                CHECK (flexibility_percent BETWEEN 0 AND 100),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            milestone_id TEXT NOT NULL REFERENCES milestones(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            phase TEXT NOT NULL,
            name TEXT NOT NULL,
            duration INTEGER NOT NULL CHECK (duration >= 0),
            responsible_person TEXT,
            planned_start TEXT,
            planned_end TEXT,
            actual_start TEXT,
            actual_end TEXT,
            outlook_completion TEXT,
            status TEXT NOT NULL DEFAULT 'not_started'
                CHECK (status IN ('not_started', 'on_track', 'delayed', 'likely_delay', 'completed')),
            completion_percent INTEGER NOT NULL DEFAULT 0
                CHECK (completion_percent BETWEEN 0 AND 100),
            UNIQUE (milestone_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_milestone_position ON tasks(milestone_id, position);
        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(milestone_id, status);
        ",
    )?;
    Ok(())
}
