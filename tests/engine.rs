use chrono::{NaiveDate, Weekday};

use fitplan::error::ErrorCode;
use fitplan::models::{Milestone, Task, TaskStatus};
use fitplan::schedule::classify::classify_all;
use fitplan::schedule::overrides::refresh_outlook;
use fitplan::schedule::{
    apply_override, apply_update, classify, planner, template, ClassifyRules, FieldChange, OverrideContext,
    TaskUpdate, WorkCalendar,
};

// ─── helpers ───────────────────────────────────────────────────────

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
}

fn cal() -> WorkCalendar {
    WorkCalendar::default()
}

fn task(name: &str, duration: u32) -> Task {
    Task::new(format!("id-{name}"), "General", name, duration)
}

fn chain(durations: &[u32]) -> Vec<Task> {
    durations
        .iter()
        .enumerate()
        .map(|(i, &dur)| task(&format!("t{i}"), dur))
        .collect()
}

fn milestone(start: &str, durations: &[u32]) -> Milestone {
    let mut m = Milestone::new("m1", "office-fitout", "Office fit-out", d(start));
    m.tasks = chain(durations);
    planner::plan_milestone(&cal(), &mut m).unwrap();
    m
}

fn planned(t: &Task) -> (NaiveDate, NaiveDate) {
    (t.planned_start.expect("planned start"), t.planned_end.expect("planned end"))
}

fn started(actual_start: &str, planned_end: Option<&str>) -> Task {
    let mut t = task("work", 5);
    t.actual_start = Some(d(actual_start));
    t.planned_end = planned_end.map(d);
    t
}

fn ctx(today: &str) -> OverrideContext {
    OverrideContext {
        today: d(today),
        calendar: cal(),
        rules: ClassifyRules::default(),
    }
}

// ─── 1. business-day calculator ────────────────────────────────────

#[test]
fn test_add_working_days_skips_sunday() {
    // 2024-01-01 is a Monday; Jan 7 is a Sunday.
    assert_eq!(cal().add_working_days(d("2024-01-01"), 6), Some(d("2024-01-08")));
    assert_eq!(cal().add_working_days(d("2024-01-01"), 5), Some(d("2024-01-06")));
}

#[test]
fn test_add_working_days_from_day_before_non_working_day() {
    assert_eq!(cal().add_working_days(d("2024-01-06"), 1), Some(d("2024-01-08")));
}

#[test]
fn test_add_zero_or_negative_days_returns_start() {
    assert_eq!(cal().add_working_days(d("2024-01-03"), 0), Some(d("2024-01-03")));
    assert_eq!(cal().add_working_days(d("2024-01-03"), -4), Some(d("2024-01-03")));
    // Even a non-working start day is returned unchanged.
    assert_eq!(cal().add_working_days(d("2024-01-07"), 0), Some(d("2024-01-07")));
}

#[test]
fn test_add_working_days_never_lands_on_non_working_day() {
    let c = cal();
    for days in 1..40 {
        let end = c.add_working_days(d("2024-01-01"), days).unwrap();
        assert!(c.is_working_day(end), "{days} days landed on {end}");
    }
}

#[test]
fn test_count_working_days_inclusive() {
    let c = cal();
    assert_eq!(c.count_working_days(d("2024-01-01"), d("2024-01-14")), 12);
    assert_eq!(c.count_working_days(d("2024-01-01"), d("2024-01-08")), 7);
    assert_eq!(c.count_working_days(d("2024-01-01"), d("2024-01-01")), 1);
    assert_eq!(c.count_working_days(d("2024-01-07"), d("2024-01-07")), 0);
    assert_eq!(c.count_working_days(d("2024-01-10"), d("2024-01-01")), 0);
}

#[test]
fn test_count_matches_day_by_day_walk() {
    let c = cal();
    let start = d("2024-02-03");
    for span in 0..60u64 {
        let end = start + chrono::Days::new(span);
        let walked = (0..=span)
            .map(|i| start + chrono::Days::new(i))
            .filter(|day| c.is_working_day(*day))
            .count() as i64;
        assert_eq!(c.count_working_days(start, end), walked, "span {span}");
    }
}

#[test]
fn test_next_working_day_after() {
    let c = cal();
    assert_eq!(c.next_working_day_after(d("2024-01-01")), Some(d("2024-01-02")));
    assert_eq!(c.next_working_day_after(d("2024-01-06")), Some(d("2024-01-08")));
    assert_eq!(c.next_working_day_after(d("2024-01-07")), Some(d("2024-01-08")));
}

#[test]
fn test_custom_non_working_day() {
    let saturday_off = WorkCalendar::new(Weekday::Sat);
    assert_eq!(saturday_off.add_working_days(d("2024-01-01"), 5), Some(d("2024-01-07")));
    assert!(saturday_off.is_working_day(d("2024-01-07")));
    assert!(!saturday_off.is_working_day(d("2024-01-06")));
}

#[test]
fn test_long_spans_match_day_by_day_walk() {
    let c = cal();
    for start in ["2024-01-01", "2024-01-06", "2024-01-07"] {
        let start = d(start);
        let mut walked = start;
        for days in 1..200 {
            walked = walked.succ_opt().unwrap();
            while !c.is_working_day(walked) {
                walked = walked.succ_opt().unwrap();
            }
            assert_eq!(c.add_working_days(start, days), Some(walked), "{days} days from {start}");
        }
    }
}

#[test]
fn test_no_date_past_the_calendar_end() {
    let c = cal();
    assert_eq!(c.add_working_days(NaiveDate::MAX, 1), None);
    assert_eq!(c.add_working_days(d("2024-01-01"), i64::from(u32::MAX)), None);
    assert_eq!(c.next_working_day_after(NaiveDate::MAX), None);
    assert_eq!(c.add_working_days(NaiveDate::MAX, 0), Some(NaiveDate::MAX));
}

// ─── 2. task chain planner ─────────────────────────────────────────

#[test]
fn test_single_task_plan() {
    let mut tasks = chain(&[6]);
    let end = planner::plan_tasks(&cal(), d("2024-01-01"), &mut tasks).unwrap();
    assert_eq!(planned(&tasks[0]), (d("2024-01-01"), d("2024-01-08")));
    assert_eq!(end, d("2024-01-08"));
}

#[test]
fn test_zero_duration_task_in_chain() {
    let mut tasks = chain(&[2, 0, 5]);
    let end = planner::plan_tasks(&cal(), d("2024-01-01"), &mut tasks).unwrap();
    assert_eq!(planned(&tasks[0]), (d("2024-01-01"), d("2024-01-03")));
    assert_eq!(planned(&tasks[1]), (d("2024-01-04"), d("2024-01-04")));
    assert_eq!(planned(&tasks[2]), (d("2024-01-05"), d("2024-01-11")));
    assert_eq!(end, d("2024-01-11"));
}

#[test]
fn test_empty_plan_ends_at_start() {
    let mut tasks: Vec<Task> = Vec::new();
    assert_eq!(planner::plan_tasks(&cal(), d("2024-01-01"), &mut tasks).unwrap(), d("2024-01-01"));
    let m = milestone("2024-01-01", &[]);
    assert_eq!(m.project_end, d("2024-01-01"));
    assert_eq!(m.baseline_end, d("2024-01-01"));
}

#[test]
fn test_planning_is_idempotent() {
    let mut once = template::default_tasks();
    planner::plan_tasks(&cal(), d("2024-03-04"), &mut once).unwrap();
    let mut twice = once.clone();
    planner::plan_tasks(&cal(), d("2024-03-04"), &mut twice).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_chain_continuity() {
    let c = cal();
    let mut tasks = template::default_tasks();
    planner::plan_tasks(&c, d("2024-01-01"), &mut tasks).unwrap();
    for pair in tasks.windows(2) {
        let (_, prev_end) = planned(&pair[0]);
        let (start, end) = planned(&pair[1]);
        assert!(start > prev_end);
        assert_eq!(Some(start), c.next_working_day_after(prev_end));
        assert!(end >= start);
    }
}

#[test]
fn test_replan_from_leaves_earlier_tasks_untouched() {
    let mut tasks = chain(&[2, 0, 5]);
    planner::plan_tasks(&cal(), d("2024-01-01"), &mut tasks).unwrap();
    tasks[0].planned_start = Some(d("2023-12-01"));
    tasks[2].duration = 1;

    let end = planner::replan_from(&cal(), d("2024-01-01"), &mut tasks, 2).unwrap();
    assert_eq!(tasks[0].planned_start, Some(d("2023-12-01")));
    assert_eq!(planned(&tasks[2]), (d("2024-01-05"), d("2024-01-06")));
    assert_eq!(end, d("2024-01-06"));
}

#[test]
fn test_set_duration_cascades_forward() {
    let mut m = milestone("2024-01-01", &[2, 0, 5]);
    planner::set_duration(&cal(), &mut m, 0, 4).unwrap();
    assert_eq!(planned(&m.tasks[0]), (d("2024-01-01"), d("2024-01-05")));
    assert_eq!(planned(&m.tasks[1]), (d("2024-01-06"), d("2024-01-06")));
    assert_eq!(planned(&m.tasks[2]), (d("2024-01-08"), d("2024-01-13")));
    assert_eq!(m.project_end, d("2024-01-13"));
}

#[test]
fn test_set_duration_refreshes_outlook() {
    let mut m = milestone("2024-01-01", &[2, 3]);
    m.tasks[1].actual_start = Some(d("2024-01-05"));
    planner::set_duration(&cal(), &mut m, 1, 2).unwrap();
    assert_eq!(m.tasks[1].outlook_completion, Some(d("2024-01-08")));
}

#[test]
fn test_remove_task_closes_gap() {
    let mut m = milestone("2024-01-01", &[2, 0, 5]);
    let removed = planner::remove_task(&cal(), &mut m, 1).unwrap();
    assert_eq!(removed.name, "t1");
    assert_eq!(planned(&m.tasks[1]), (d("2024-01-04"), d("2024-01-10")));
    assert_eq!(m.project_end, d("2024-01-10"));
}

#[test]
fn test_remove_first_task_restarts_from_project_start() {
    let mut m = milestone("2024-01-01", &[2, 0, 5]);
    planner::remove_task(&cal(), &mut m, 0).unwrap();
    assert_eq!(planned(&m.tasks[0]), (d("2024-01-01"), d("2024-01-01")));
    assert_eq!(planned(&m.tasks[1]), (d("2024-01-02"), d("2024-01-08")));
}

#[test]
fn test_push_task_appends_after_current_end() {
    let mut m = milestone("2024-01-01", &[2, 0, 5]);
    let before: Vec<_> = m.tasks.iter().map(planned).collect();
    planner::push_task(&cal(), &mut m, task("extra", 1)).unwrap();
    let after: Vec<_> = m.tasks[..3].iter().map(planned).collect();
    assert_eq!(before, after);
    assert_eq!(planned(&m.tasks[3]), (d("2024-01-12"), d("2024-01-13")));
    assert_eq!(m.project_end, d("2024-01-13"));
}

#[test]
fn test_insert_task_at_front() {
    let mut m = milestone("2024-01-01", &[2, 0, 5]);
    planner::insert_task(&cal(), &mut m, 0, task("survey", 1)).unwrap();
    assert_eq!(m.tasks[0].name, "survey");
    assert_eq!(planned(&m.tasks[0]), (d("2024-01-01"), d("2024-01-02")));
    assert_eq!(planned(&m.tasks[1]), (d("2024-01-03"), d("2024-01-05")));
    assert_eq!(planned(&m.tasks[2]), (d("2024-01-06"), d("2024-01-06")));
    assert_eq!(planned(&m.tasks[3]), (d("2024-01-08"), d("2024-01-13")));

    let err = planner::insert_task(&cal(), &mut m, 9, task("late", 1)).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[test]
fn test_move_task_reorders_and_replans() {
    let mut m = milestone("2024-01-01", &[2, 0, 5]);
    planner::move_task(&cal(), &mut m, 2, 0).unwrap();
    let names: Vec<_> = m.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["t2", "t0", "t1"]);
    assert_eq!(planned(&m.tasks[0]), (d("2024-01-01"), d("2024-01-06")));
    assert_eq!(planned(&m.tasks[1]), (d("2024-01-08"), d("2024-01-10")));
    assert_eq!(planned(&m.tasks[2]), (d("2024-01-11"), d("2024-01-11")));
}

#[test]
fn test_out_of_range_index_is_validation_error() {
    let mut m = milestone("2024-01-01", &[2]);
    assert_eq!(planner::remove_task(&cal(), &mut m, 3).unwrap_err().code, ErrorCode::ValidationError);
    assert_eq!(planner::set_duration(&cal(), &mut m, 1, 2).unwrap_err().code, ErrorCode::ValidationError);
    assert_eq!(planner::move_task(&cal(), &mut m, 0, 1).unwrap_err().code, ErrorCode::ValidationError);
}

// ─── 3. flexibility ────────────────────────────────────────────────

#[test]
fn test_flexibility_buffer() {
    // 7 working days between 2024-01-01 and 2024-01-08.
    let mut m = milestone("2024-01-01", &[6]);
    assert_eq!(planner::apply_flexibility(&cal(), &mut m, 50).unwrap(), d("2024-01-12"));
    assert_eq!(m.baseline_end, d("2024-01-08"));
    assert_eq!(m.flexibility_percent, 50);
    assert_eq!(m.tasks[0].planned_end, Some(d("2024-01-08")));

    assert_eq!(planner::apply_flexibility(&cal(), &mut m, 10).unwrap(), d("2024-01-09"));
    assert_eq!(planner::apply_flexibility(&cal(), &mut m, 100).unwrap(), d("2024-01-16"));
    assert_eq!(planner::apply_flexibility(&cal(), &mut m, 0).unwrap(), d("2024-01-08"));
    assert!(!m.buffer_applied());
}

#[test]
fn test_flexibility_does_not_compound() {
    let mut m = milestone("2024-01-01", &[6]);
    planner::apply_flexibility(&cal(), &mut m, 50).unwrap();
    planner::apply_flexibility(&cal(), &mut m, 50).unwrap();
    assert_eq!(m.project_end, d("2024-01-12"));
}

#[test]
fn test_flexibility_is_monotonic() {
    let mut m = milestone("2024-01-01", &[2, 0, 5, 3, 8]);
    let last_end = m.tasks.last().and_then(|t| t.planned_end).unwrap();
    let mut previous = last_end;
    for percent in 0..=100 {
        let end = planner::apply_flexibility(&cal(), &mut m, percent).unwrap();
        assert!(end >= previous, "{percent}% went backwards");
        assert!(end >= last_end);
        previous = end;
    }
}

#[test]
fn test_structural_change_resets_flexibility() {
    let mut m = milestone("2024-01-01", &[6]);
    planner::apply_flexibility(&cal(), &mut m, 50).unwrap();
    planner::set_project_start(&cal(), &mut m, d("2024-01-08")).unwrap();
    assert_eq!(m.flexibility_percent, 0);
    assert_eq!(m.project_end, d("2024-01-15"));
    assert_eq!(m.project_end, m.baseline_end);

    planner::apply_flexibility(&cal(), &mut m, 20).unwrap();
    planner::push_task(&cal(), &mut m, task("extra", 0)).unwrap();
    assert_eq!(m.flexibility_percent, 0);
    assert_eq!(m.project_end, d("2024-01-16"));
}

#[test]
fn test_flexibility_requires_planned_tasks() {
    let mut empty = milestone("2024-01-01", &[]);
    let err = planner::apply_flexibility(&cal(), &mut empty, 10).unwrap_err();
    assert_eq!(err.code, ErrorCode::InconsistentState);

    let mut unplanned = Milestone::new("m2", "raw", "Raw", d("2024-01-01"));
    unplanned.tasks = chain(&[3]);
    let err = planner::apply_flexibility(&cal(), &mut unplanned, 10).unwrap_err();
    assert_eq!(err.code, ErrorCode::InconsistentState);
}

#[test]
fn test_flexibility_percent_range() {
    let mut m = milestone("2024-01-01", &[6]);
    let err = planner::apply_flexibility(&cal(), &mut m, 101).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    let err = planner::apply_flexibility(&cal(), &mut m, -1).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(m.project_end, d("2024-01-08"));
}

// ─── 4. boundary validation ────────────────────────────────────────

#[test]
fn test_validation_names_the_field() {
    let err = planner::validate_duration(-2).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(err.message.contains("duration"));

    let err = planner::parse_date("projectStart", "2024-13-01").unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(err.message.contains("projectStart"));

    assert_eq!(planner::validate_duration(0).unwrap(), 0);
    assert_eq!(planner::parse_date("x", " 2024-02-29 ").unwrap(), d("2024-02-29"));
}

#[test]
fn test_oversized_duration_is_rejected_without_changes() {
    let c = cal();
    let mut m = milestone("2024-01-01", &[2]);
    let before = m.clone();

    let err = planner::push_task(&c, &mut m, task("huge", 300_000_000)).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(err.message.contains("duration"));
    assert_eq!(m, before);

    let err = planner::set_duration(&c, &mut m, 0, u32::MAX).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(m, before);

    let mut tasks = vec![task("a", 300_000_000), task("b", 3)];
    assert!(planner::plan_tasks(&c, d("2024-01-01"), &mut tasks).is_err());
}

// ─── 5. classifier ─────────────────────────────────────────────────

#[test]
fn test_finished_ten_days_late_is_likely_delay() {
    let mut t = task("paint", 3);
    t.planned_end = Some(d("2024-02-10"));
    t.actual_end = Some(d("2024-02-20"));
    let c = classify(&t, d("2024-03-01"), &ClassifyRules::default());
    assert_eq!(c.status, TaskStatus::LikelyDelay);
    assert_eq!(c.completion_percent, 100);
}

#[test]
fn test_finished_29_days_late_is_delayed() {
    let mut t = task("paint", 3);
    t.planned_end = Some(d("2024-02-10"));
    t.actual_end = Some(d("2024-03-10"));
    let c = classify(&t, d("2024-03-11"), &ClassifyRules::default());
    assert_eq!(c.status, TaskStatus::Delayed);
    assert_eq!(c.completion_percent, 100);
}

#[test]
fn test_finished_on_time_is_completed() {
    let rules = ClassifyRules::default();
    let mut t = task("paint", 3);
    t.planned_end = Some(d("2024-02-10"));
    t.actual_end = Some(d("2024-02-10"));
    assert_eq!(classify(&t, d("2024-02-11"), &rules).status, TaskStatus::Completed);

    t.planned_end = None;
    t.actual_end = Some(d("2024-05-01"));
    let c = classify(&t, d("2024-05-02"), &rules);
    assert_eq!((c.status, c.completion_percent), (TaskStatus::Completed, 100));
}

#[test]
fn test_not_started() {
    let mut t = task("paint", 3);
    t.planned_end = Some(d("2024-01-03"));
    let c = classify(&t, d("2024-06-01"), &ClassifyRules::default());
    assert_eq!((c.status, c.completion_percent), (TaskStatus::NotStarted, 0));
}

#[test]
fn test_late_outlook_predicts_delay() {
    let mut t = started("2024-01-01", Some("2024-01-11"));
    t.outlook_completion = Some(d("2024-01-20"));
    let c = classify(&t, d("2024-01-06"), &ClassifyRules::default());
    assert_eq!(c.status, TaskStatus::LikelyDelay);
    assert_eq!(c.completion_percent, 50);
}

#[test]
fn test_past_planned_end_without_finish() {
    let rules = ClassifyRules::default();
    let t = started("2024-01-01", Some("2024-01-11"));
    let c = classify(&t, d("2024-01-31"), &rules);
    assert_eq!((c.status, c.completion_percent), (TaskStatus::Delayed, 100));

    assert_eq!(classify(&t, d("2024-01-26"), &rules).status, TaskStatus::LikelyDelay);
    assert_eq!(classify(&t, d("2024-01-27"), &rules).status, TaskStatus::Delayed);
}

#[test]
fn test_on_track_completion_from_elapsed_time() {
    let rules = ClassifyRules::default();
    let t = started("2024-01-01", Some("2024-01-11"));
    let c = classify(&t, d("2024-01-04"), &rules);
    assert_eq!((c.status, c.completion_percent), (TaskStatus::OnTrack, 30));

    // On the planned end day itself the task is still on track.
    assert_eq!(classify(&t, d("2024-01-11"), &rules).completion_percent, 100);
    assert_eq!(classify(&t, d("2024-01-11"), &rules).status, TaskStatus::OnTrack);

    // Before the actual start the share clamps at zero.
    assert_eq!(classify(&t, d("2023-12-25"), &rules).completion_percent, 0);
}

#[test]
fn test_on_track_default_completion() {
    let rules = ClassifyRules::default();
    let no_plan = started("2024-01-01", None);
    assert_eq!(classify(&no_plan, d("2024-01-04"), &rules).completion_percent, 50);

    let same_day = started("2024-01-05", Some("2024-01-05"));
    let c = classify(&same_day, d("2024-01-05"), &rules);
    assert_eq!((c.status, c.completion_percent), (TaskStatus::OnTrack, 50));
}

#[test]
fn test_classify_is_deterministic() {
    let mut t = started("2024-01-01", Some("2024-01-11"));
    t.outlook_completion = Some(d("2024-01-09"));
    let rules = ClassifyRules::default();
    assert_eq!(classify(&t, d("2024-01-07"), &rules), classify(&t, d("2024-01-07"), &rules));
}

#[test]
fn test_configurable_threshold() {
    let strict = ClassifyRules {
        likely_delay_threshold_days: 5,
        default_on_track_completion: 25,
    };
    let mut t = task("paint", 3);
    t.planned_end = Some(d("2024-02-10"));
    t.actual_end = Some(d("2024-02-20"));
    assert_eq!(classify(&t, d("2024-03-01"), &strict).status, TaskStatus::Delayed);

    let no_plan = started("2024-01-01", None);
    assert_eq!(classify(&no_plan, d("2024-01-02"), &strict).completion_percent, 25);
}

#[test]
fn test_classify_all_writes_back() {
    let mut m = milestone("2024-01-01", &[2, 0, 5]);
    m.tasks[0].actual_start = Some(d("2024-01-01"));
    m.tasks[0].actual_end = Some(d("2024-01-03"));
    m.tasks[2].actual_start = Some(d("2024-01-05"));

    let changed = classify_all(&mut m, d("2024-01-08"), &ClassifyRules::default());
    assert_eq!(changed, 2);
    assert_eq!(m.tasks[0].status, TaskStatus::Completed);
    assert_eq!(m.tasks[1].status, TaskStatus::NotStarted);
    assert_eq!(m.tasks[2].status, TaskStatus::OnTrack);
    assert_eq!(m.tasks[2].completion_percent, 50);

    assert_eq!(classify_all(&mut m, d("2024-01-08"), &ClassifyRules::default()), 0);
}

// ─── 6. override reducer ───────────────────────────────────────────

#[test]
fn test_status_completed_fills_actual_end() {
    let t = started("2024-01-01", Some("2024-01-11"));
    let next = apply_override(&t, FieldChange::Status(TaskStatus::Completed), &ctx("2024-01-10"));
    assert_eq!(next.status, TaskStatus::Completed);
    assert_eq!(next.actual_end, Some(d("2024-01-10")));
    assert_eq!(next.completion_percent, 100);
    // The input record is left as it was.
    assert_eq!(t.actual_end, None);

    let mut done = t.clone();
    done.actual_end = Some(d("2024-01-09"));
    let next = apply_override(&done, FieldChange::Status(TaskStatus::Completed), &ctx("2024-01-10"));
    assert_eq!(next.actual_end, Some(d("2024-01-09")));
}

#[test]
fn test_status_not_started_clears_progress() {
    let mut t = started("2024-01-01", Some("2024-01-11"));
    t.actual_end = Some(d("2024-01-09"));
    t.outlook_completion = Some(d("2024-01-06"));
    t.completion_percent = 100;
    t.status = TaskStatus::Completed;

    let next = apply_override(&t, FieldChange::Status(TaskStatus::NotStarted), &ctx("2024-01-10"));
    assert_eq!(next.status, TaskStatus::NotStarted);
    assert_eq!(next.actual_start, None);
    assert_eq!(next.actual_end, None);
    assert_eq!(next.outlook_completion, None);
    assert_eq!(next.completion_percent, 0);
}

#[test]
fn test_status_on_track_starts_task_today() {
    let mut t = task("paint", 5);
    t.planned_start = Some(d("2024-01-08"));
    t.planned_end = Some(d("2024-01-20"));
    let next = apply_override(&t, FieldChange::Status(TaskStatus::OnTrack), &ctx("2024-01-10"));
    assert_eq!(next.status, TaskStatus::OnTrack);
    assert_eq!(next.actual_start, Some(d("2024-01-10")));
    assert_eq!(next.completion_percent, 10);
    assert_eq!(next.outlook_completion, Some(d("2024-01-16")));
}

#[test]
fn test_on_track_status_and_actual_start_agree() {
    let mut t = task("paint", 5);
    t.planned_end = Some(d("2024-01-06"));
    let by_status = apply_override(&t, FieldChange::Status(TaskStatus::OnTrack), &ctx("2024-01-03"));
    let by_date = apply_override(&t, FieldChange::ActualStart(Some(d("2024-01-03"))), &ctx("2024-01-03"));
    assert_eq!(by_status.actual_start, by_date.actual_start);
    assert_eq!(by_status.outlook_completion, Some(d("2024-01-09")));
    assert_eq!(by_status.outlook_completion, by_date.outlook_completion);

    // The projection now runs past the planned end.
    let c = classify(&by_status, d("2024-01-03"), &ClassifyRules::default());
    assert_eq!(c.status, TaskStatus::LikelyDelay);

    // An already started task keeps its recorded outlook.
    let mut running = started("2024-01-01", Some("2024-01-11"));
    running.outlook_completion = Some(d("2024-01-20"));
    let next = apply_override(&running, FieldChange::Status(TaskStatus::OnTrack), &ctx("2024-01-03"));
    assert_eq!(next.outlook_completion, Some(d("2024-01-20")));
}

#[test]
fn test_status_on_track_remeasures_only_extreme_completion() {
    let mut t = started("2024-01-01", Some("2024-01-11"));
    t.completion_percent = 100;
    let next = apply_override(&t, FieldChange::Status(TaskStatus::OnTrack), &ctx("2024-01-10"));
    assert_eq!(next.completion_percent, 90);

    t.completion_percent = 40;
    let next = apply_override(&t, FieldChange::Status(TaskStatus::OnTrack), &ctx("2024-01-10"));
    assert_eq!(next.completion_percent, 40);
    assert_eq!(next.actual_start, Some(d("2024-01-01")));
}

#[test]
fn test_actual_end_completes_task() {
    let t = started("2024-01-01", Some("2024-01-11"));
    let next = apply_override(&t, FieldChange::ActualEnd(Some(d("2024-01-12"))), &ctx("2024-01-15"));
    assert_eq!(next.status, TaskStatus::Completed);
    assert_eq!(next.completion_percent, 100);
    assert_eq!(next.actual_end, Some(d("2024-01-12")));
}

#[test]
fn test_actual_start_starts_not_started_task() {
    let t = task("paint", 2);
    let next = apply_override(&t, FieldChange::ActualStart(Some(d("2024-01-05"))), &ctx("2024-01-06"));
    assert_eq!(next.status, TaskStatus::OnTrack);
    assert_eq!(next.completion_percent, 10);
    assert_eq!(next.outlook_completion, Some(d("2024-01-08")));

    let mut delayed = task("paint", 2);
    delayed.status = TaskStatus::Delayed;
    delayed.completion_percent = 30;
    let next = apply_override(&delayed, FieldChange::ActualStart(Some(d("2024-01-05"))), &ctx("2024-01-06"));
    assert_eq!(next.status, TaskStatus::Delayed);
    assert_eq!(next.completion_percent, 30);
}

#[test]
fn test_full_completion_marks_completed() {
    let t = started("2024-01-01", Some("2024-01-11"));
    let next = apply_override(&t, FieldChange::CompletionPercent(100), &ctx("2024-01-09"));
    assert_eq!(next.status, TaskStatus::Completed);
    assert_eq!(next.actual_end, Some(d("2024-01-09")));

    let next = apply_override(&t, FieldChange::CompletionPercent(60), &ctx("2024-01-09"));
    assert_eq!(next.completion_percent, 60);
    assert_eq!(next.status, TaskStatus::NotStarted);
    assert_eq!(next.actual_end, None);
}

#[test]
fn test_duration_change_reprojects_outlook() {
    let mut t = task("paint", 5);
    let next = apply_override(&t, FieldChange::Duration(3), &ctx("2024-01-09"));
    assert_eq!(next.outlook_completion, None);

    t.actual_start = Some(d("2024-01-05"));
    let next = apply_override(&t, FieldChange::Duration(2), &ctx("2024-01-09"));
    assert_eq!(next.duration, 2);
    assert_eq!(next.outlook_completion, Some(d("2024-01-08")));

    let mut manual = t.clone();
    refresh_outlook(&cal(), &mut manual);
    assert_eq!(manual.outlook_completion, Some(d("2024-01-11")));
}

#[test]
fn test_update_applies_status_before_dates() {
    let t = started("2024-01-01", Some("2024-01-11"));
    let update = TaskUpdate {
        status: Some(TaskStatus::NotStarted),
        actual_end: Some(Some(d("2024-01-09"))),
        ..TaskUpdate::default()
    };
    let next = apply_update(&t, &update, &ctx("2024-01-10"));
    assert_eq!(next.status, TaskStatus::Completed);
    assert_eq!(next.actual_start, None);
    assert_eq!(next.actual_end, Some(d("2024-01-09")));
    assert_eq!(next.completion_percent, 100);
}

#[test]
fn test_update_explicit_outlook_wins_over_projection() {
    let t = task("paint", 2);
    let update = TaskUpdate {
        actual_start: Some(Some(d("2024-01-05"))),
        outlook_completion: Some(Some(d("2024-01-30"))),
        ..TaskUpdate::default()
    };
    let next = apply_update(&t, &update, &ctx("2024-01-06"));
    assert_eq!(next.outlook_completion, Some(d("2024-01-30")));
    assert!(TaskUpdate::default().is_empty());
}

// ─── 7. template ───────────────────────────────────────────────────

#[test]
fn test_default_template() {
    let tasks = template::default_tasks();
    assert_eq!(tasks.len(), template::DEFAULT_TEMPLATE.len());
    assert!(tasks.iter().all(|t| t.status == TaskStatus::NotStarted && !t.is_planned()));
    let mut ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), tasks.len());
}
