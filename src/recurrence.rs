//! Recurrence propagation engine.
//!
//! On first materialization of a date, repeating slots are copied forward:
//! yesterday's `daily` slots first, then the same weekday's `weekly` slots
//! from seven days prior. A `monthly` tag is recognized and stored but never
//! auto-propagated (pending product clarification).
//!
//! Propagation is idempotent: a slot is only filled while its text is empty,
//! so re-running on an already-populated date changes nothing.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::types::{DayRecord, Repeat, ScheduleSlot};

/// Date keys in `timeBox` are plain ISO dates.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a `timeBox` key. Malformed keys are excluded from recurrence lookups
/// and date-sorted views; they are never repaired.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// Quarter-hour display labels for every slot in `[start_hour, end_hour)`,
/// e.g. `"9:00 AM"`, `"9:15 AM"`. An inverted or empty range yields no labels.
pub fn slot_labels(start_hour: u8, end_hour: u8) -> Vec<String> {
    let mut labels = Vec::new();
    for hour in start_hour..end_hour.min(24) {
        for quarter in 0..4 {
            if let Some(time) = NaiveTime::from_hms_opt(hour as u32, quarter * 15, 0) {
                labels.push(time.format("%-I:%M %p").to_string());
            }
        }
    }
    labels
}

/// Copy repeating slots forward into `date`'s record.
///
/// For every label in the record's hour range with empty text: yesterday's
/// slot wins when tagged `daily` and non-empty, else the slot from seven days
/// prior when tagged `weekly` and non-empty.
///
/// The record for `date` must already exist in `time_box`; source days that
/// are absent simply contribute nothing.
pub fn propagate(time_box: &mut HashMap<String, DayRecord>, date: NaiveDate) {
    let today_key = date_key(date);
    let Some(today) = time_box.get(&today_key) else {
        return;
    };

    let labels = slot_labels(today.start_hour, today.end_hour);
    let yesterday = time_box.get(&date_key(date - Duration::days(1)));
    let last_week = time_box.get(&date_key(date - Duration::days(7)));

    // Collect first, then apply: both phases borrow the map.
    let mut incoming: Vec<(String, ScheduleSlot)> = Vec::new();
    for label in labels {
        if !today.slot_text(&label).is_empty() {
            continue;
        }
        if let Some(slot) = repeating_slot(yesterday, &label, Repeat::Daily) {
            incoming.push((label, slot.clone()));
        } else if let Some(slot) = repeating_slot(last_week, &label, Repeat::Weekly) {
            incoming.push((label, slot.clone()));
        }
    }

    if let Some(today) = time_box.get_mut(&today_key) {
        for (label, slot) in incoming {
            today.schedule.insert(label, slot);
        }
    }
}

fn repeating_slot<'a>(
    source: Option<&'a DayRecord>,
    label: &str,
    repeat: Repeat,
) -> Option<&'a ScheduleSlot> {
    source?
        .schedule
        .get(label)
        .filter(|slot| slot.repeat == repeat && !slot.is_empty())
}
