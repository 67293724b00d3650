//! Core data model for the time-box planner.
//!
//! Everything here serializes with camelCase field names because these structs
//! are the wire format of the remote document store. Fields carry serde
//! defaults so documents written by older sessions still deserialize.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Fallback working-hours range applied when a loaded document carries no
/// usable hour fields.
pub const FALLBACK_START_HOUR: u8 = 7;
pub const FALLBACK_END_HOUR: u8 = 23;

/// Repeat tag on a schedule slot.
///
/// `Monthly` is recognized and stored but is never auto-propagated by the
/// recurrence engine (pending product clarification).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

/// One quarter-hour schedule entry, keyed by its time label inside a
/// [`DayRecord`]'s schedule map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub repeat: Repeat,
}

impl ScheduleSlot {
    pub fn new(text: impl Into<String>, repeat: Repeat) -> Self {
        Self {
            text: text.into(),
            repeat,
        }
    }

    /// A slot counts as empty when its text is empty, regardless of how it
    /// got that way. An explicitly saved empty slot stays eligible for
    /// recurrence propagation.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Checkable list entry used by both priorities and the brain dump.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// The complete schedule/state for one principal on one calendar date.
///
/// Hour fields are plain hour-of-day ints; no cross-field validation is
/// enforced (an end before start simply yields an empty slot range).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    #[serde(default = "default_start_hour")]
    pub start_hour: u8,
    #[serde(default = "default_end_hour")]
    pub end_hour: u8,
    #[serde(default)]
    pub priorities: Vec<ChecklistItem>,
    #[serde(default)]
    pub brain_dump: Vec<ChecklistItem>,
    #[serde(default)]
    pub schedule: HashMap<String, ScheduleSlot>,
    #[serde(default)]
    pub home_office: bool,
    #[serde(default)]
    pub confetti_shown: bool,
}

impl DayRecord {
    pub fn new(start_hour: u8, end_hour: u8) -> Self {
        Self {
            start_hour,
            end_hour,
            priorities: Vec::new(),
            brain_dump: Vec::new(),
            schedule: HashMap::new(),
            home_office: false,
            confetti_shown: false,
        }
    }

    /// Text of the slot at `label`, or `""` when the slot is absent or blank.
    pub fn slot_text(&self, label: &str) -> &str {
        self.schedule.get(label).map(|s| s.text.as_str()).unwrap_or("")
    }
}

impl Default for DayRecord {
    fn default() -> Self {
        Self::new(FALLBACK_START_HOUR, FALLBACK_END_HOUR)
    }
}

/// Principal role. Owners edit their own days; supervisors browse others
/// read-only within permitted scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Owner,
    Supervisor,
}

/// Top-level persisted document for one principal.
///
/// `time_box` keys are ISO dates (`%Y-%m-%d`), unique per principal. Once a
/// [`DayRecord`] exists for a date it is only ever mutated field-by-field,
/// never silently replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub credential_secret: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub scope_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_scopes: Option<Vec<String>>,
    #[serde(
        default = "default_start_hour",
        deserialize_with = "hour_or_start_fallback"
    )]
    pub default_start_hour: u8,
    #[serde(
        default = "default_end_hour",
        deserialize_with = "hour_or_end_fallback"
    )]
    pub default_end_hour: u8,
    #[serde(default)]
    pub time_box: HashMap<String, DayRecord>,
}

impl UserRecord {
    /// Fresh record with safe defaults, as created when a principal is first
    /// seen from the identity source.
    pub fn with_defaults(display_name: impl Into<String>) -> Self {
        Self {
            role: Role::Owner,
            credential_secret: String::new(),
            display_name: display_name.into(),
            scope_id: String::new(),
            allowed_scopes: None,
            default_start_hour: FALLBACK_START_HOUR,
            default_end_hour: FALLBACK_END_HOUR,
            time_box: HashMap::new(),
        }
    }
}

impl Default for UserRecord {
    fn default() -> Self {
        Self::with_defaults("")
    }
}

fn default_start_hour() -> u8 {
    FALLBACK_START_HOUR
}

fn default_end_hour() -> u8 {
    FALLBACK_END_HOUR
}

/// Deserialize an hour field, backfilling the fallback when the stored value
/// is not numeric (legacy documents stored these as free text).
fn hour_or_fallback<'de, D>(deserializer: D, fallback: u8) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .and_then(|h| u8::try_from(h).ok())
        .unwrap_or(fallback))
}

fn hour_or_start_fallback<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    hour_or_fallback(deserializer, FALLBACK_START_HOUR)
}

fn hour_or_end_fallback<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    hour_or_fallback(deserializer, FALLBACK_END_HOUR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Repeat::Daily).unwrap(), "\"daily\"");
        assert_eq!(
            serde_json::from_str::<Repeat>("\"weekly\"").unwrap(),
            Repeat::Weekly
        );
    }

    #[test]
    fn test_day_record_camel_case_wire_names() {
        let day = DayRecord::new(9, 17);
        let value = serde_json::to_value(&day).unwrap();
        assert!(value.get("startHour").is_some());
        assert!(value.get("brainDump").is_some());
        assert!(value.get("homeOffice").is_some());
        assert!(value.get("confettiShown").is_some());
    }

    #[test]
    fn test_non_numeric_hours_backfilled() {
        let doc = serde_json::json!({
            "displayName": "Ada",
            "defaultStartHour": "nine",
            "defaultEndHour": null,
        });
        let user: UserRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(user.default_start_hour, FALLBACK_START_HOUR);
        assert_eq!(user.default_end_hour, FALLBACK_END_HOUR);
    }

    #[test]
    fn test_missing_time_box_defaults_to_empty_map() {
        let doc = serde_json::json!({ "displayName": "Ada" });
        let user: UserRecord = serde_json::from_value(doc).unwrap();
        assert!(user.time_box.is_empty());
    }

    #[test]
    fn test_explicit_empty_slot_counts_as_empty() {
        let slot = ScheduleSlot::new("", Repeat::Daily);
        assert!(slot.is_empty());
    }
}
