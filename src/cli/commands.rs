use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fitplan",
    version,
    about = "Milestone scheduling and progress tracking for interior fit-out projects",
    after_help = "\
NOTE:
  Data lives in the nearest .fitplan/ directory (or $FITPLAN_DIR).
  Run `fitplan init` before any other command.
  Dates are YYYY-MM-DD. Task positions are 1-based.

SCHEDULING RULES:
  One weekday is non-working (sunday unless configured otherwise).
  Each task starts on the first working day after its predecessor ends.
  Changing the start date or the task list resets flexibility to 0%.

EXIT CODES:
  0  Success
  1  Error (DB, validation, inconsistent state, etc.)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Specify milestone by name or ID
    #[arg(long, global = true)]
    pub milestone: Option<String>,

    /// Evaluate progress as of this date instead of the local date
    #[arg(long, global = true, env = "FITPLAN_TODAY")]
    pub today: Option<String>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize fitplan in this directory
    Init,

    /// Milestone management
    #[command(subcommand)]
    Milestone(MilestoneCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Show schedule and progress of the active milestone
    Status,
}

#[derive(Subcommand)]
pub enum MilestoneCommands {
    /// Create a milestone from the default fit-out template
    Create {
        /// Milestone name (slug: lowercase alphanumeric with hyphens)
        name: String,
        /// Project start date
        #[arg(long)]
        start: String,
        #[arg(long)]
        title: Option<String>,
        /// Start with no tasks instead of the default template
        #[arg(long)]
        empty: bool,
    },
    /// List all milestones
    List,
    /// Show milestone details
    Show {
        /// Milestone name or ID
        reference: String,
    },
    /// Set active milestone
    Activate {
        /// Milestone name or ID
        reference: String,
    },
    /// Delete a milestone
    Delete {
        /// Milestone name or ID
        reference: String,
    },
    /// Load a milestone from stdin JSON
    #[command(after_help = "\
STDIN FORMAT:
  {\"name\":\"slug\", \"title\":\"...\", \"projectStart\":\"2024-01-01\", \"flexibilityPercent\":0,
   \"tasks\":[{\"phase\":\"...\", \"name\":\"...\", \"duration\":3, \"responsiblePerson\":\"...\",
              \"actualStart\":\"...\", \"actualEnd\":\"...\", \"status\":\"on_track\", \"completionPercent\":40}]}

NOTE:
  Atomic: all-or-nothing. Planned dates are always recomputed.
  Tasks without an explicit status are classified as of --today.
  Auto-activates if no valid active milestone exists.")]
    Load,
    /// Move the project start date and replan every task
    StartDate {
        date: String,
    },
    /// Buffer the project end by a percentage of its working days
    Flex {
        /// 0-100
        #[arg(allow_negative_numbers = true)]
        percent: i64,
    },
    /// Reclassify every task's status and completion as of --today
    Refresh,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks in the active milestone
    List,
    /// Show task details
    Show {
        /// Position, task ID (or prefix), or part of the name
        reference: String,
    },
    /// Add a task (appended unless --at is given)
    Add {
        /// Task name
        name: String,
        /// Working days needed
        #[arg(long, allow_negative_numbers = true)]
        duration: i64,
        #[arg(long, default_value = "General")]
        phase: String,
        #[arg(long)]
        responsible: Option<String>,
        /// Insert at this 1-based position
        #[arg(long)]
        at: Option<usize>,
    },
    /// Remove a task and close the gap
    Remove {
        reference: String,
    },
    /// Move a task to another 1-based position
    Move {
        reference: String,
        position: usize,
    },
    /// Edit task fields; related fields follow along
    #[command(after_help = "\
SIDE EFFECTS (applied in this order):
  --status completed     sets actual end to today if missing, completion 100
  --status not_started   clears actual dates and outlook, completion 0
  --status on_track      sets actual start to today if missing; 0/100 completion is re-measured (min 10)
  --completion 100       marks the task completed
  --actual-start         starts a not-started task (on_track, min 10%) and re-projects the outlook
  --actual-end           marks the task completed
  --duration             replans this and later tasks, re-projects the outlook")]
    Update {
        reference: String,
        /// not_started | on_track | delayed | likely_delay | completed
        #[arg(long)]
        status: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        completion: Option<i64>,
        #[arg(long, conflicts_with = "clear_actual_start")]
        actual_start: Option<String>,
        #[arg(long)]
        clear_actual_start: bool,
        #[arg(long, conflicts_with = "clear_actual_end")]
        actual_end: Option<String>,
        #[arg(long)]
        clear_actual_end: bool,
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,
        #[arg(long, conflicts_with = "clear_outlook")]
        outlook: Option<String>,
        #[arg(long)]
        clear_outlook: bool,
        #[arg(long)]
        phase: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        responsible: Option<String>,
    },
    /// Show the inferred status of a task without saving it
    Classify {
        reference: String,
    },
}
