//! Free/busy reporting over historical windows.
//!
//! Every quarter-hour slot in a day's hour range contributes 0.25h: to
//! `free_hours` when its text is empty, otherwise to the usage map keyed by
//! the exact stored text/path. Malformed date keys are excluded from range
//! selection.
//!
//! Note: `home_office_days` always scans the entire history regardless of the
//! selected range. That inconsistency with the other metrics is preserved
//! as-is pending product clarification.

use std::collections::HashMap;

use chrono::{Duration, Months, NaiveDate};

use crate::recurrence::{parse_date_key, slot_labels};
use crate::types::UserRecord;

pub const HOURS_PER_SLOT: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingUnit {
    Days,
    Months,
    Years,
}

/// Which dates a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRange {
    /// One calendar date.
    Day(NaiveDate),
    /// The last `count` units back from the reference date, inclusive.
    Trailing { count: u32, unit: TrailingUnit },
    /// No bound.
    AllTime,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageReport {
    /// Slot count x 0.25, regardless of content.
    pub total_hours: f64,
    pub free_hours: f64,
    /// Busy hours keyed by the exact stored slot text/path.
    pub usage: HashMap<String, f64>,
    /// Full-history count, independent of the selected range.
    pub home_office_days: u32,
    /// Dates that fell inside the range (with a parseable key).
    pub days_counted: u32,
}

impl UsageReport {
    pub fn busy_hours(&self) -> f64 {
        self.total_hours - self.free_hours
    }

    /// Average busy hours per counted day. `None` when no days were counted;
    /// an empty denominator is reported as unavailable, never as zero.
    pub fn average_busy_hours(&self) -> Option<f64> {
        if self.days_counted == 0 {
            return None;
        }
        Some(self.busy_hours() / self.days_counted as f64)
    }

    /// Busy share of the total slot time, as a percentage. `None` when the
    /// range contained no slots.
    pub fn busy_percentage(&self) -> Option<f64> {
        if self.total_hours == 0.0 {
            return None;
        }
        Some(self.busy_hours() / self.total_hours * 100.0)
    }
}

/// Aggregate usage over `range`, with `today` as the reference date for
/// trailing windows.
pub fn aggregate(user: &UserRecord, range: ReportRange, today: NaiveDate) -> UsageReport {
    let mut report = UsageReport::default();

    for (key, day) in &user.time_box {
        // Home-office counting ignores the range (and key validity): the
        // entire stored history is scanned.
        if day.home_office {
            report.home_office_days += 1;
        }

        let Some(date) = parse_date_key(key) else {
            continue;
        };
        if !in_range(date, range, today) {
            continue;
        }
        report.days_counted += 1;

        for label in slot_labels(day.start_hour, day.end_hour) {
            report.total_hours += HOURS_PER_SLOT;
            let text = day.slot_text(&label);
            if text.is_empty() {
                report.free_hours += HOURS_PER_SLOT;
            } else {
                *report.usage.entry(text.to_string()).or_insert(0.0) += HOURS_PER_SLOT;
            }
        }
    }

    report
}

fn in_range(date: NaiveDate, range: ReportRange, today: NaiveDate) -> bool {
    match range {
        ReportRange::Day(day) => date == day,
        ReportRange::AllTime => true,
        ReportRange::Trailing { count, unit } => {
            let cutoff = match unit {
                TrailingUnit::Days => Some(today - Duration::days(count as i64)),
                TrailingUnit::Months => today.checked_sub_months(Months::new(count)),
                TrailingUnit::Years => today.checked_sub_months(Months::new(count * 12)),
            };
            match cutoff {
                Some(cutoff) => date > cutoff && date <= today,
                None => date <= today,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DayRecord, Repeat, ScheduleSlot};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn day_9_to_10(entries: &[(&str, &str)]) -> DayRecord {
        let mut day = DayRecord::new(9, 10);
        for (label, text) in entries {
            day.schedule
                .insert(label.to_string(), ScheduleSlot::new(*text, Repeat::None));
        }
        day
    }

    fn user_with(days: &[(&str, DayRecord)]) -> UserRecord {
        let mut user = UserRecord::with_defaults("Ada");
        for (key, day) in days {
            user.time_box.insert(key.to_string(), day.clone());
        }
        user
    }

    #[test]
    fn test_single_day_usage_and_free_split() {
        let user = user_with(&[(
            "2026-08-28",
            day_9_to_10(&[("9:00 AM", "Build"), ("9:15 AM", "")]),
        )]);

        let report = aggregate(&user, ReportRange::Day(date("2026-08-28")), date("2026-08-28"));
        assert_eq!(report.total_hours, 1.0);
        assert_eq!(report.usage["Build"], 0.25);
        // 9:15 (explicit empty) + 9:30 + 9:45 (absent) are free.
        assert_eq!(report.free_hours, 0.75);
        assert_eq!(report.busy_hours(), 0.25);
        assert_eq!(report.days_counted, 1);
    }

    #[test]
    fn test_usage_keyed_by_exact_stored_text() {
        let mut day = DayRecord::new(9, 10);
        day.schedule.insert(
            "9:00 AM".to_string(),
            ScheduleSlot::new("Work / Projects / Alpha", Repeat::None),
        );
        day.schedule.insert(
            "9:15 AM".to_string(),
            ScheduleSlot::new("Work / Projects / Alpha", Repeat::None),
        );
        let user = user_with(&[("2026-08-28", day)]);

        let report = aggregate(&user, ReportRange::AllTime, date("2026-08-28"));
        assert_eq!(report.usage.len(), 1);
        assert_eq!(report.usage["Work / Projects / Alpha"], 0.5);
    }

    #[test]
    fn test_trailing_window_includes_only_recent_dates() {
        let user = user_with(&[
            ("2026-08-28", day_9_to_10(&[("9:00 AM", "Recent")])),
            ("2026-08-22", day_9_to_10(&[("9:00 AM", "Edge")])),
            ("2026-08-01", day_9_to_10(&[("9:00 AM", "Old")])),
        ]);

        let report = aggregate(
            &user,
            ReportRange::Trailing {
                count: 7,
                unit: TrailingUnit::Days,
            },
            date("2026-08-28"),
        );
        assert_eq!(report.days_counted, 2);
        assert!(report.usage.contains_key("Recent"));
        assert!(report.usage.contains_key("Edge"));
        assert!(!report.usage.contains_key("Old"));
    }

    #[test]
    fn test_trailing_months_window() {
        let user = user_with(&[
            ("2026-08-15", day_9_to_10(&[])),
            ("2026-05-15", day_9_to_10(&[])),
        ]);

        let report = aggregate(
            &user,
            ReportRange::Trailing {
                count: 1,
                unit: TrailingUnit::Months,
            },
            date("2026-08-28"),
        );
        assert_eq!(report.days_counted, 1);
    }

    #[test]
    fn test_future_dates_excluded_from_trailing_window() {
        let user = user_with(&[("2026-09-05", day_9_to_10(&[]))]);
        let report = aggregate(
            &user,
            ReportRange::Trailing {
                count: 30,
                unit: TrailingUnit::Days,
            },
            date("2026-08-28"),
        );
        assert_eq!(report.days_counted, 0);
    }

    #[test]
    fn test_all_time_counts_everything_valid() {
        let user = user_with(&[
            ("2020-01-01", day_9_to_10(&[])),
            ("2026-08-28", day_9_to_10(&[])),
            ("not-a-date", day_9_to_10(&[("9:00 AM", "Ghost")])),
        ]);

        let report = aggregate(&user, ReportRange::AllTime, date("2026-08-28"));
        assert_eq!(report.days_counted, 2);
        assert!(!report.usage.contains_key("Ghost"));
    }

    #[test]
    fn test_home_office_scans_full_history_regardless_of_range() {
        let mut old = day_9_to_10(&[]);
        old.home_office = true;
        let mut recent = day_9_to_10(&[]);
        recent.home_office = true;
        let user = user_with(&[("2020-01-01", old), ("2026-08-28", recent)]);

        let report = aggregate(&user, ReportRange::Day(date("2026-08-28")), date("2026-08-28"));
        assert_eq!(report.days_counted, 1);
        assert_eq!(report.home_office_days, 2);
    }

    #[test]
    fn test_empty_denominator_reports_unavailable_not_zero() {
        let user = user_with(&[]);
        let report = aggregate(&user, ReportRange::AllTime, date("2026-08-28"));
        assert_eq!(report.average_busy_hours(), None);
        assert_eq!(report.busy_percentage(), None);
    }

    #[test]
    fn test_busy_percentage_on_populated_range() {
        let user = user_with(&[(
            "2026-08-28",
            day_9_to_10(&[("9:00 AM", "Build"), ("9:15 AM", "Build")]),
        )]);
        let report = aggregate(&user, ReportRange::AllTime, date("2026-08-28"));
        assert_eq!(report.busy_percentage(), Some(50.0));
        assert_eq!(report.average_busy_hours(), Some(0.5));
    }
}
