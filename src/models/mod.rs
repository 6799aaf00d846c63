pub mod milestone;
pub mod task;

pub use milestone::*;
pub use task::*;
