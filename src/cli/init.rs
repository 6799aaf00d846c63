use serde_json::json;

use crate::config::Config;
use crate::db::connection;
use crate::error::FitplanError;
use crate::output;

pub fn run(json_output: bool) -> i32 {
    super::finish(run_inner(json_output), json_output)
}

fn run_inner(json_output: bool) -> Result<i32, FitplanError> {
    let path = connection::init_db()?;
    // Keep an existing config (and its active milestone) across re-inits.
    let config = Config::load()?;
    config.save()?;

    if json_output {
        output::json::print(&output::json::success(json!({
            "path": path.to_string_lossy(),
            "non_working_day": config.non_working_day
        })));
    } else {
        println!("Initialized fitplan at {}", path.display());
    }
    Ok(0)
}
