use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::input::{clamp_count, expand_key};
use crate::model::percentage::Percentage;

const DAY_KEYS: [&str; 6] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// The six school days tracked per week.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Storage key, e.g. `"monday"`.
    pub fn key(self) -> &'static str {
        DAY_KEYS[self as usize]
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }

    pub fn short(self) -> &'static str {
        &self.label()[..3]
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Day {
    type Err = ValidationError;

    /// Accepts the full key or any unambiguous prefix ("mon", "w", "sa").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = expand_key(s, &DAY_KEYS)?;
        let idx = DAY_KEYS.iter().position(|&k| k == key).unwrap_or_default();
        Ok(Day::ALL[idx])
    }
}

/// One present/absent flag per school day.
///
/// Each day is its own field, so a week can never gain or lose a day. Keys
/// missing from stored JSON read as absent and unknown keys are dropped.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default)]
pub struct WeekAttendance {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
}

impl WeekAttendance {
    pub fn get(&self, day: Day) -> bool {
        match day {
            Day::Monday => self.monday,
            Day::Tuesday => self.tuesday,
            Day::Wednesday => self.wednesday,
            Day::Thursday => self.thursday,
            Day::Friday => self.friday,
            Day::Saturday => self.saturday,
        }
    }

    fn slot_mut(&mut self, day: Day) -> &mut bool {
        match day {
            Day::Monday => &mut self.monday,
            Day::Tuesday => &mut self.tuesday,
            Day::Wednesday => &mut self.wednesday,
            Day::Thursday => &mut self.thursday,
            Day::Friday => &mut self.friday,
            Day::Saturday => &mut self.saturday,
        }
    }

    pub fn set(&mut self, day: Day, present: bool) {
        *self.slot_mut(day) = present;
    }

    pub fn toggle(&mut self, day: Day) {
        let slot = self.slot_mut(day);
        *slot = !*slot;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, bool)> + '_ {
        Day::ALL.iter().map(move |&d| (d, self.get(d)))
    }

    pub fn days(&self) -> u32 {
        Day::ALL.len() as u32
    }

    pub fn present(&self) -> u32 {
        self.iter().filter(|(_, p)| *p).count() as u32
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub week_number: u32,
    /// Informational only; never used in calculations.
    #[serde(default = "Utc::now", deserialize_with = "lenient_start_date")]
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub attendance: WeekAttendance,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDate {
    Text(String),
    Other(IgnoredAny),
}

/// A missing or unreadable start date is replaced with now rather than
/// failing the whole week list.
fn lenient_start_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match StoredDate::deserialize(deserializer)? {
        StoredDate::Text(text) => DateTime::parse_from_rfc3339(text.trim())
            .map(|d| d.with_timezone(&Utc))
            .ok(),
        StoredDate::Other(_) => None,
    };
    Ok(parsed.unwrap_or_else(|| {
        tracing::warn!("unreadable week start date, using now");
        Utc::now()
    }))
}

impl Week {
    pub fn new(week_number: u32) -> Self {
        Self {
            week_number,
            start_date: Utc::now(),
            attendance: WeekAttendance::default(),
        }
    }

    pub fn days_present(&self) -> u32 {
        self.attendance.present()
    }

    pub fn days_total(&self) -> u32 {
        self.attendance.days()
    }

    pub fn percentage(&self) -> Percentage {
        Percentage::from_ratio(self.days_present().into(), self.days_total().into())
    }
}

/// School-mode state: the week sequence, the viewing pointer and the
/// carry-over from before tracking started.
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolState {
    weeks: Vec<Week>,
    current_week: u32,
    previous_attended: u32,
    previous_total: u32,
}

impl Default for SchoolState {
    fn default() -> Self {
        Self {
            weeks: vec![Week::new(1)],
            current_week: 1,
            previous_attended: 0,
            previous_total: 0,
        }
    }
}

impl SchoolState {
    /// Reassembles state read from storage, repairing what would break the
    /// week invariants: an empty sequence becomes a fresh Week 1, numbering is
    /// rewritten to `1..=N` in stored order, and the pointer is clamped.
    pub fn from_parts(
        mut weeks: Vec<Week>,
        current_week: u32,
        previous_attended: u32,
        previous_total: u32,
    ) -> Self {
        if weeks.is_empty() {
            tracing::warn!("stored week list is empty, starting from week 1");
            weeks.push(Week::new(1));
        }

        let sequential = weeks
            .iter()
            .enumerate()
            .all(|(i, w)| w.week_number as usize == i + 1);
        if !sequential {
            tracing::warn!(weeks = weeks.len(), "stored week numbers out of sequence, renumbering");
            for (i, week) in weeks.iter_mut().enumerate() {
                week.week_number = i as u32 + 1;
            }
        }

        let len = weeks.len() as u32;
        let clamped = current_week.clamp(1, len);
        if clamped != current_week {
            tracing::warn!(stored = current_week, clamped, "current week pointer out of range");
        }

        Self {
            weeks,
            current_week: clamped,
            previous_attended,
            previous_total,
        }
    }

    // --- operations ---

    /// Flips one day of one week. Returns `false` when the week does not exist.
    pub fn toggle_day(&mut self, week_number: u32, day: Day) -> bool {
        match self.weeks.iter_mut().find(|w| w.week_number == week_number) {
            Some(week) => {
                week.attendance.toggle(day);
                true
            }
            None => false,
        }
    }

    /// Appends the next week and points at it. Returns the new week number.
    pub fn add_week(&mut self) -> u32 {
        let number = self.weeks.len() as u32 + 1;
        self.weeks.push(Week::new(number));
        self.current_week = number;
        number
    }

    pub fn set_current_week(&mut self, week_number: u32) -> Result<(), ValidationError> {
        if week_number == 0 || week_number as usize > self.weeks.len() {
            return Err(ValidationError::WeekOutOfRange {
                week: week_number,
                len: self.weeks.len(),
            });
        }
        self.current_week = week_number;
        Ok(())
    }

    /// Moves the pointer forward; `false` when already on the last week.
    pub fn next_week(&mut self) -> bool {
        if (self.current_week as usize) < self.weeks.len() {
            self.current_week += 1;
            true
        } else {
            false
        }
    }

    /// Moves the pointer back; `false` when already on week 1.
    pub fn previous_week(&mut self) -> bool {
        if self.current_week > 1 {
            self.current_week -= 1;
            true
        } else {
            false
        }
    }

    pub fn set_previous_attended(&mut self, n: i64) {
        self.previous_attended = clamp_count(n);
    }

    pub fn set_previous_total(&mut self, n: i64) {
        self.previous_total = clamp_count(n);
    }

    // --- queries ---

    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    pub fn week(&self, week_number: u32) -> Option<&Week> {
        self.weeks.iter().find(|w| w.week_number == week_number)
    }

    pub fn current_week_number(&self) -> u32 {
        self.current_week
    }

    /// The week under the pointer, or the first week if the pointer does not resolve.
    pub fn current_week(&self) -> &Week {
        self.week(self.current_week)
            .unwrap_or_else(|| &self.weeks[0])
    }

    pub fn previous_attended(&self) -> u32 {
        self.previous_attended
    }

    pub fn previous_total(&self) -> u32 {
        self.previous_total
    }

    pub fn current_total_days(&self) -> u64 {
        self.weeks.iter().map(|w| u64::from(w.days_total())).sum()
    }

    pub fn current_days_present(&self) -> u64 {
        self.weeks.iter().map(|w| u64::from(w.days_present())).sum()
    }

    pub fn total_days(&self) -> u64 {
        self.current_total_days() + u64::from(self.previous_total)
    }

    pub fn days_present(&self) -> u64 {
        self.current_days_present() + u64::from(self.previous_attended)
    }

    pub fn attendance_percentage(&self) -> Percentage {
        Percentage::from_ratio(self.days_present(), self.total_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_parse_accepts_prefixes() {
        assert_eq!("monday".parse::<Day>(), Ok(Day::Monday));
        assert_eq!("THU".parse::<Day>(), Ok(Day::Thursday));
        assert_eq!("sa".parse::<Day>(), Ok(Day::Saturday));
        assert!("t".parse::<Day>().is_err());
        assert!("sunday".parse::<Day>().is_err());
    }

    #[test]
    fn test_day_labels() {
        assert_eq!(Day::Wednesday.key(), "wednesday");
        assert_eq!(Day::Wednesday.short(), "Wed");
    }

    #[test]
    fn test_week_serializes_all_six_keys() {
        let week = Week::new(1);
        let value = serde_json::to_value(&week).unwrap();
        let attendance = value["attendance"].as_object().unwrap();
        let keys: Vec<&str> = attendance.keys().map(|k| k.as_str()).collect();
        assert_eq!(attendance.len(), 6);
        for key in DAY_KEYS {
            assert!(keys.contains(&key));
            assert_eq!(attendance[key], false);
        }
        assert_eq!(value["weekNumber"], 1);
    }

    #[test]
    fn test_attendance_ignores_unknown_and_fills_missing_keys() {
        let att: WeekAttendance =
            serde_json::from_str(r#"{"monday":true,"sunday":true}"#).unwrap();
        assert!(att.monday);
        assert_eq!(att.present(), 1);
        assert_eq!(att.days(), 6);
    }

    #[test]
    fn test_bad_start_date_keeps_the_week() {
        let weeks: Vec<Week> = serde_json::from_str(
            r#"[{"weekNumber":1,"startDate":"2024-06-03T04:30:00.000Z","attendance":{"monday":true}},
                {"weekNumber":2,"startDate":"","attendance":{"friday":true}},
                {"weekNumber":3,"attendance":{}},
                {"weekNumber":4,"startDate":1717389000000}]"#,
        )
        .unwrap();
        assert_eq!(weeks.len(), 4);
        assert_eq!(weeks[0].start_date.to_rfc3339(), "2024-06-03T04:30:00+00:00");
        assert!(weeks[0].attendance.monday);
        assert!(weeks[1].attendance.friday);
    }

    #[test]
    fn test_toggle_is_own_inverse() {
        let mut state = SchoolState::default();
        let before = state.weeks()[0].attendance;

        assert!(state.toggle_day(1, Day::Friday));
        assert!(state.weeks()[0].attendance.friday);
        assert!(state.toggle_day(1, Day::Friday));
        assert_eq!(state.weeks()[0].attendance, before);
    }

    #[test]
    fn test_toggle_unknown_week_is_noop() {
        let mut state = SchoolState::default();
        let before = state.clone();
        assert!(!state.toggle_day(7, Day::Monday));
        assert_eq!(state, before);
    }

    #[test]
    fn test_add_week_numbers_are_sequential() {
        let mut state = SchoolState::default();
        for expected in 2..=10 {
            let prev_len = state.weeks().len() as u32;
            let number = state.add_week();
            assert_eq!(number, prev_len + 1);
            assert_eq!(number, expected);
            assert_eq!(state.current_week_number(), number);
        }
        let numbers: Vec<u32> = state.weeks().iter().map(|w| w.week_number).collect();
        assert_eq!(numbers, (1..=10).collect::<Vec<u32>>());
        assert!(state.weeks().iter().all(|w| w.attendance.present() == 0));
    }

    #[test]
    fn test_set_current_week_rejects_out_of_range() {
        let mut state = SchoolState::default();
        state.add_week();
        assert!(state.set_current_week(1).is_ok());
        assert_eq!(state.current_week_number(), 1);
        assert!(state.set_current_week(0).is_err());
        assert!(state.set_current_week(3).is_err());
        assert_eq!(state.current_week_number(), 1);
    }

    #[test]
    fn test_next_and_previous_saturate() {
        let mut state = SchoolState::default();
        state.add_week();
        assert!(!state.next_week());
        assert!(state.previous_week());
        assert!(!state.previous_week());
        assert_eq!(state.current_week_number(), 1);
    }

    #[test]
    fn test_previous_counts_clamp_negative() {
        let mut state = SchoolState::default();
        state.set_previous_attended(-4);
        state.set_previous_total(12);
        assert_eq!(state.previous_attended(), 0);
        assert_eq!(state.previous_total(), 12);
    }

    #[test]
    fn test_session_with_carry_over() {
        let mut state = SchoolState::default();
        state.toggle_day(1, Day::Monday);
        state.toggle_day(1, Day::Tuesday);
        state.set_previous_attended(10);
        state.set_previous_total(10);

        assert_eq!(state.current_total_days(), 6);
        assert_eq!(state.current_days_present(), 2);
        assert_eq!(state.total_days(), 16);
        assert_eq!(state.days_present(), 12);
        assert_eq!(state.attendance_percentage().to_string(), "75.0");
    }

    #[test]
    fn test_week_percentage() {
        let mut week = Week::new(1);
        week.attendance.set(Day::Monday, true);
        week.attendance.set(Day::Tuesday, true);
        assert_eq!(week.percentage().to_string(), "33.3");
    }

    #[test]
    fn test_from_parts_repairs() {
        let state = SchoolState::from_parts(Vec::new(), 4, 1, 2);
        assert_eq!(state.weeks().len(), 1);
        assert_eq!(state.current_week_number(), 1);

        let weeks = vec![Week::new(3), Week::new(9)];
        let state = SchoolState::from_parts(weeks, 0, 0, 0);
        let numbers: Vec<u32> = state.weeks().iter().map(|w| w.week_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(state.current_week_number(), 1);
    }
}
