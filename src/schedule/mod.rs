pub mod calendar;
pub mod classify;
pub mod overrides;
pub mod planner;
pub mod template;

pub use calendar::WorkCalendar;
pub use classify::{classify, ClassifyRules, Classification};
pub use overrides::{apply_override, apply_update, FieldChange, OverrideContext, TaskUpdate};
