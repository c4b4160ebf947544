//! Store records and weekly opening hours.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{StoreId, UserId};

/// Day of the week as the REST API spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days, Monday first.
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Lowercase key used in forms and JSON.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    /// Short display label.
    #[must_use]
    pub const fn short(self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }
}

impl From<Weekday> for Day {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// Opening hours for one day of the week.
///
/// A day is open in `[open, close)` minus the optional `[break_start, break_end)`
/// window. Records with `close <= open` never open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub day: Day,
    #[serde(default = "default_working")]
    pub is_working: bool,
    #[serde(with = "super::hhmm")]
    pub open: NaiveTime,
    #[serde(with = "super::hhmm")]
    pub close: NaiveTime,
    #[serde(default, with = "super::hhmm::option", skip_serializing_if = "Option::is_none")]
    pub break_start: Option<NaiveTime>,
    #[serde(default, with = "super::hhmm::option", skip_serializing_if = "Option::is_none")]
    pub break_end: Option<NaiveTime>,
}

const fn default_working() -> bool {
    true
}

impl DayHours {
    /// A closed day with placeholder times.
    #[must_use]
    pub const fn closed(day: Day) -> Self {
        Self {
            day,
            is_working: false,
            open: NaiveTime::MIN,
            close: NaiveTime::MIN,
            break_start: None,
            break_end: None,
        }
    }

    /// Whether `time` falls inside the break window.
    #[must_use]
    pub fn on_break(&self, time: NaiveTime) -> bool {
        match (self.break_start, self.break_end) {
            (Some(start), Some(end)) if start < end => time >= start && time < end,
            _ => false,
        }
    }

    /// Whether `time` falls inside working hours (ignoring the break).
    #[must_use]
    pub fn within_hours(&self, time: NaiveTime) -> bool {
        self.is_working && self.open < self.close && time >= self.open && time < self.close
    }
}

/// Open/closed state of a store at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Open,
    OnBreak,
    Closed,
}

/// A physical shop location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(rename = "_id", alias = "id")]
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "super::optional_reference")]
    pub owner: Option<UserId>,
    #[serde(default, alias = "workingHours")]
    pub hours: Vec<DayHours>,
}

impl Store {
    /// Hours record for `day`, if the store published one.
    #[must_use]
    pub fn hours_for(&self, day: Day) -> Option<&DayHours> {
        self.hours.iter().find(|h| h.day == day)
    }

    /// Hours for all seven days, Monday first; missing days are closed.
    #[must_use]
    pub fn weekly_hours(&self) -> [DayHours; 7] {
        Day::ALL.map(|day| self.hours_for(day).copied().unwrap_or(DayHours::closed(day)))
    }

    /// State of the store at local time `at`.
    #[must_use]
    pub fn status_at(&self, at: NaiveDateTime) -> StoreStatus {
        let Some(hours) = self.hours_for(at.weekday().into()) else {
            return StoreStatus::Closed;
        };
        let time = at.time();
        if !hours.within_hours(time) {
            StoreStatus::Closed
        } else if hours.on_break(time) {
            StoreStatus::OnBreak
        } else {
            StoreStatus::Open
        }
    }

    /// Whether customers can walk in at local time `at`.
    #[must_use]
    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        self.status_at(at) == StoreStatus::Open
    }
}

/// Body for creating or updating a store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInput {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub hours: Vec<DayHours>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn store() -> Store {
        serde_json::from_value(serde_json::json!({
            "_id": "s1",
            "name": "Pike Place",
            "address": "1st Ave",
            "city": "Seattle",
            "phone": "555-0100",
            "hours": [
                {"day": "monday", "isWorking": true, "open": "09:00", "close": "18:00",
                 "breakStart": "13:00", "breakEnd": "14:00"},
                {"day": "sunday", "isWorking": false, "open": "10:00", "close": "16:00"}
            ]
        }))
        .unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        // 2024-06-03 is a Monday, 2024-06-09 a Sunday
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_open_within_hours() {
        assert_eq!(store().status_at(at(3, 9, 0)), StoreStatus::Open);
        assert_eq!(store().status_at(at(3, 17, 59)), StoreStatus::Open);
    }

    #[test]
    fn test_closed_at_close_time_and_before_open() {
        assert_eq!(store().status_at(at(3, 18, 0)), StoreStatus::Closed);
        assert_eq!(store().status_at(at(3, 8, 59)), StoreStatus::Closed);
    }

    #[test]
    fn test_break_window() {
        assert_eq!(store().status_at(at(3, 13, 30)), StoreStatus::OnBreak);
        assert!(!store().is_open_at(at(3, 13, 0)));
        assert!(store().is_open_at(at(3, 14, 0)));
    }

    #[test]
    fn test_non_working_and_missing_days_are_closed() {
        assert_eq!(store().status_at(at(9, 12, 0)), StoreStatus::Closed);
        // Tuesday has no record
        assert_eq!(store().status_at(at(4, 12, 0)), StoreStatus::Closed);
    }

    #[test]
    fn test_weekly_hours_fills_missing_days() {
        let week = store().weekly_hours();
        assert_eq!(week[0].day, Day::Monday);
        assert!(week[0].is_working);
        assert_eq!(week[1].day, Day::Tuesday);
        assert!(!week[1].is_working);
    }

    #[test]
    fn test_hours_serialize_as_hh_mm() {
        let value = serde_json::to_value(store().hours[0]).unwrap();
        assert_eq!(value["open"], "09:00");
        assert_eq!(value["breakEnd"], "14:00");
    }
}
