pub mod commands;
pub mod init;
pub mod milestone;
pub mod status;
pub mod task;

pub use commands::*;

use chrono::NaiveDate;

use crate::error::FitplanError;
use crate::output;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOpts {
    pub json: bool,
    pub milestone: Option<String>,
    pub today: NaiveDate,
}

/// Report a command result and turn it into a process exit code.
pub fn finish(result: Result<i32, FitplanError>, json_output: bool) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(code = e.code.as_str(), "command failed");
            if json_output {
                output::json::print(&output::json::error(&e));
            } else {
                eprintln!("Error: {}", e.message);
            }
            1
        }
    }
}
