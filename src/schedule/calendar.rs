use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Weekday on which no work happens unless configured otherwise.
pub const DEFAULT_NON_WORKING_DAY: Weekday = Weekday::Sun;

/// Working-day arithmetic over whole calendar days with one weekly day off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkCalendar {
    pub non_working_day: Weekday,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::new(DEFAULT_NON_WORKING_DAY)
    }
}

impl WorkCalendar {
    pub fn new(non_working_day: Weekday) -> Self {
        Self { non_working_day }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        date.weekday() != self.non_working_day
    }

    /// Date on which the `days`-th working day after `start` is reached.
    /// Zero or negative `days` yield `start` itself; `None` when the result
    /// would fall past the last representable date.
    pub fn add_working_days(&self, start: NaiveDate, days: i64) -> Option<NaiveDate> {
        if days <= 0 {
            return Some(start);
        }
        // Any seven consecutive days hold exactly six working days.
        let full_weeks = (days - 1) / 6;
        let mut current = start.checked_add_days(Days::new(u64::try_from(full_weeks.checked_mul(7)?).ok()?))?;
        let mut remaining = days - full_weeks * 6;
        while remaining > 0 {
            current = current.succ_opt()?;
            if self.is_working_day(current) {
                remaining -= 1;
            }
        }
        Some(current)
    }

    /// Working days in the inclusive range `[start, end]`; 0 when `end < start`.
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        if end < start {
            return 0;
        }
        let span = (end - start).num_days() + 1;
        let full_weeks = span / 7;
        let mut count = full_weeks * 6;
        let mut day = start + Days::new((full_weeks * 7) as u64);
        while day <= end {
            if self.is_working_day(day) {
                count += 1;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        count
    }

    /// First working day strictly after `date`.
    pub fn next_working_day_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut day = date.succ_opt()?;
        while !self.is_working_day(day) {
            day = day.succ_opt()?;
        }
        Some(day)
    }
}
