pub mod connection;
pub mod migrations;
pub mod milestone_repo;
pub mod task_repo;

pub use connection::*;
