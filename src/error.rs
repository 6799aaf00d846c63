use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    NoActiveMilestone,
    MilestoneNotFound,
    TaskNotFound,
    AmbiguousRef,
    MilestoneNameConflict,
    ValidationError,
    InconsistentState,
    ConfigError,
    DatabaseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::NoActiveMilestone => "NO_ACTIVE_MILESTONE",
            Self::MilestoneNotFound => "MILESTONE_NOT_FOUND",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::AmbiguousRef => "AMBIGUOUS_REF",
            Self::MilestoneNameConflict => "MILESTONE_NAME_CONFLICT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InconsistentState => "INCONSISTENT_STATE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct FitplanError {
    pub code: ErrorCode,
    pub message: String,
}

impl FitplanError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "fitplan is not initialized. Run `fitplan init` first.",
        )
    }

    pub fn no_active_milestone() -> Self {
        Self::new(
            ErrorCode::NoActiveMilestone,
            "No active milestone. Use `fitplan milestone activate <name>` or `--milestone <name>`.",
        )
    }

    pub fn milestone_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::MilestoneNotFound,
            format!("Milestone not found: {reference}"),
        )
    }

    pub fn task_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {reference}"),
        )
    }

    pub fn ambiguous_ref(reference: &str, candidates: &[String]) -> Self {
        Self::new(
            ErrorCode::AmbiguousRef,
            format!(
                "Ambiguous reference '{}'. Candidates: {}",
                reference,
                candidates.join(", ")
            ),
        )
    }

    pub fn milestone_name_conflict(name: &str) -> Self {
        Self::new(
            ErrorCode::MilestoneNameConflict,
            format!("Milestone with name '{name}' already exists"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Validation failure attributed to a single input field.
    pub fn invalid_field(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(ErrorCode::ValidationError, format!("Invalid {field}: {reason}"))
    }

    pub fn inconsistent_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InconsistentState, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl From<rusqlite::Error> for FitplanError {
    fn from(e: rusqlite::Error) -> Self {
        Self::database(e.to_string())
    }
}
