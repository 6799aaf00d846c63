use crate::models::Task;

/// Phase, task name and working days of a standard interior fit-out job.
pub const DEFAULT_TEMPLATE: &[(&str, &str, u32)] = &[
    ("Design", "Site survey and measurements", 2),
    ("Design", "Design approval", 5),
    ("Procurement", "Material procurement", 7),
    ("Civil", "Demolition and civil works", 6),
    ("MEP", "Electrical and plumbing rough-in", 5),
    ("Carpentry", "False ceiling and partitions", 6),
    ("Carpentry", "Modular furniture installation", 5),
    ("Finishing", "Painting and polishing", 4),
    ("Finishing", "Deep cleaning", 1),
    ("Handover", "Snag list and handover", 2),
];

/// Unplanned tasks for the default template, each with a fresh id.
pub fn default_tasks() -> Vec<Task> {
    DEFAULT_TEMPLATE
        .iter()
        .map(|(phase, name, duration)| Task::new(ulid::Ulid::new().to_string(), *phase, *name, *duration))
        .collect()
}
