use std::env;
use std::fs;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::db::connection;
use crate::error::FitplanError;
use crate::schedule::calendar::DEFAULT_NON_WORKING_DAY;
use crate::schedule::classify::{DEFAULT_LIKELY_DELAY_THRESHOLD_DAYS, DEFAULT_ON_TRACK_COMPLETION};
use crate::schedule::{ClassifyRules, WorkCalendar};

pub const NON_WORKING_DAY_ENV: &str = "FITPLAN_NON_WORKING_DAY";

/// Contents of `.fitplan/config.json`. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_milestone_id: Option<String>,
    pub non_working_day: String,
    pub likely_delay_threshold_days: i64,
    pub default_on_track_completion: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active_milestone_id: None,
            non_working_day: weekday_name(DEFAULT_NON_WORKING_DAY).to_string(),
            likely_delay_threshold_days: DEFAULT_LIKELY_DELAY_THRESHOLD_DAYS,
            default_on_track_completion: DEFAULT_ON_TRACK_COMPLETION,
        }
    }
}

impl Config {
    /// Read the workspace config, falling back to defaults when absent.
    pub fn load() -> Result<Self, FitplanError> {
        let path = connection::config_path()?;
        let mut config = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| FitplanError::config(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(FitplanError::config(format!("{}: {e}", path.display()))),
        };
        if let Ok(day) = env::var(NON_WORKING_DAY_ENV) {
            config.non_working_day = day;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), FitplanError> {
        let path = connection::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| FitplanError::config(e.to_string()))?;
        }
        let body = serde_json::to_string_pretty(self).map_err(|e| FitplanError::config(e.to_string()))?;
        fs::write(&path, body).map_err(|e| FitplanError::config(e.to_string()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), FitplanError> {
        self.non_working_weekday()?;
        if self.likely_delay_threshold_days < 0 {
            return Err(FitplanError::config("likely_delay_threshold_days must not be negative"));
        }
        if self.default_on_track_completion > 100 {
            return Err(FitplanError::config("default_on_track_completion must be between 0 and 100"));
        }
        Ok(())
    }

    pub fn non_working_weekday(&self) -> Result<Weekday, FitplanError> {
        Weekday::from_str(self.non_working_day.trim())
            .map_err(|_| FitplanError::config(format!("Unknown weekday: {}", self.non_working_day)))
    }

    pub fn calendar(&self) -> Result<WorkCalendar, FitplanError> {
        Ok(WorkCalendar::new(self.non_working_weekday()?))
    }

    pub fn rules(&self) -> ClassifyRules {
        ClassifyRules {
            likely_delay_threshold_days: self.likely_delay_threshold_days,
            default_on_track_completion: self.default_on_track_completion,
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}
