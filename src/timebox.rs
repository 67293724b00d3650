//! DayRecord lifecycle and mutation operations.
//!
//! A date's record is materialized lazily on first access: created from the
//! principal's default hours, then run through recurrence propagation. An
//! existing record is never replaced, only mutated field-by-field.

use chrono::NaiveDate;

use crate::recurrence::{self, date_key, parse_date_key};
use crate::types::{ChecklistItem, DayRecord, Repeat, ScheduleSlot, UserRecord};

/// Which checkable list a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Priorities,
    BrainDump,
}

/// Materialize the record for `date`, creating it with the principal's
/// default hours and propagating repeating slots on first access.
/// Re-materializing an existing date is a no-op beyond idempotent propagation.
pub fn materialize_day<'a>(user: &'a mut UserRecord, date: NaiveDate) -> &'a mut DayRecord {
    let key = date_key(date);
    if !user.time_box.contains_key(&key) {
        user.time_box.insert(
            key.clone(),
            DayRecord::new(user.default_start_hour, user.default_end_hour),
        );
    }
    recurrence::propagate(&mut user.time_box, date);

    // The entry was inserted above if missing; propagate never removes keys.
    user.time_box.entry(key).or_default()
}

/// Read-only view of a date's record, if it exists. Never materializes.
pub fn day(user: &UserRecord, date: NaiveDate) -> Option<&DayRecord> {
    user.time_box.get(&date_key(date))
}

/// All valid dates in the time box, ascending. Malformed keys are skipped.
pub fn sorted_dates(user: &UserRecord) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = user
        .time_box
        .keys()
        .filter_map(|key| {
            let parsed = parse_date_key(key);
            if parsed.is_none() {
                log::warn!("skipping malformed timeBox key {key:?}");
            }
            parsed
        })
        .collect();
    dates.sort();
    dates
}

/// Set the text of the slot at `label`, creating the slot if absent.
/// The repeat tag of an existing slot is preserved.
pub fn set_slot_text(day: &mut DayRecord, label: &str, text: impl Into<String>) {
    day.schedule
        .entry(label.to_string())
        .or_insert_with(ScheduleSlot::default)
        .text = text.into();
}

/// Set the repeat tag of the slot at `label`, creating the slot if absent.
pub fn set_slot_repeat(day: &mut DayRecord, label: &str, repeat: Repeat) {
    day.schedule
        .entry(label.to_string())
        .or_insert_with(ScheduleSlot::default)
        .repeat = repeat;
}

/// Set the active hour range. Hours are stored as given (0-24); no
/// cross-field validation is enforced.
pub fn set_hours(day: &mut DayRecord, start_hour: u8, end_hour: u8) {
    day.start_hour = start_hour;
    day.end_hour = end_hour;
}

pub fn toggle_home_office(day: &mut DayRecord) {
    day.home_office = !day.home_office;
}

pub fn mark_confetti_shown(day: &mut DayRecord) {
    day.confetti_shown = true;
}

fn list_of(day: &mut DayRecord, kind: ListKind) -> &mut Vec<ChecklistItem> {
    match kind {
        ListKind::Priorities => &mut day.priorities,
        ListKind::BrainDump => &mut day.brain_dump,
    }
}

/// Append an item to the chosen list; returns its index.
pub fn add_item(day: &mut DayRecord, kind: ListKind, text: impl Into<String>) -> usize {
    let list = list_of(day, kind);
    list.push(ChecklistItem::new(text));
    list.len() - 1
}

/// Replace the text of an item in place. Out-of-range indexes are ignored.
pub fn edit_item(day: &mut DayRecord, kind: ListKind, index: usize, text: impl Into<String>) {
    if let Some(item) = list_of(day, kind).get_mut(index) {
        item.text = text.into();
    }
}

/// Flip an item's completed flag. Out-of-range indexes are ignored.
pub fn toggle_item(day: &mut DayRecord, kind: ListKind, index: usize) {
    if let Some(item) = list_of(day, kind).get_mut(index) {
        item.completed = !item.completed;
    }
}

/// Remove an item, preserving the order of the rest.
pub fn remove_item(day: &mut DayRecord, kind: ListKind, index: usize) {
    let list = list_of(day, kind);
    if index < list.len() {
        list.remove(index);
    }
}
