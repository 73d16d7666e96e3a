use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{LedgerError, Result};
use crate::types::WeekdayConvention;

/// clock time at minute resolution, parsed from zero-padded "HH:MM" strings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// create from components
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(LedgerError::InvalidTimeFormat {
                input: format!("{}:{}", hour, minute),
            });
        }
        Ok(Self { hour, minute })
    }

    /// parse "HH:MM" (one- or two-digit hour 0-23, two-digit minute 00-59)
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || LedgerError::InvalidTimeFormat {
            input: s.to_string(),
        };

        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().all(|b| b.is_ascii_digit()) || !m.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }

        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// minute-of-day ordinal used for overlap comparisons
    pub fn minutes_from_midnight(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        TimeOfDay::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = LedgerError;

    fn try_from(s: String) -> Result<Self> {
        TimeOfDay::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> String {
        t.to_string()
    }
}

/// time range within a single day, start strictly before end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeRange {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        if start >= end {
            return Err(LedgerError::InvertedTimeRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// parse from a pair of "HH:MM" strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(TimeOfDay::parse(start)?, TimeOfDay::parse(end)?)
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes_from_midnight() - self.start.minutes_from_midnight()
    }

    /// half-open overlap: touching ranges (one ends where the other starts)
    /// do not overlap
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// check a candidate slot against already occupied slots
pub fn has_conflict(candidate: &TimeRange, busy: &[TimeRange]) -> bool {
    busy.iter().any(|slot| candidate.overlaps(slot))
}

/// one weekday's availability: an enabled flag plus its time ranges,
/// kept in the order the user entered them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DaySchedule {
    pub enabled: bool,
    pub time_ranges: Vec<TimeRange>,
}

impl DaySchedule {
    pub fn off() -> Self {
        Self::default()
    }

    pub fn with_ranges(ranges: Vec<TimeRange>) -> Self {
        Self {
            enabled: true,
            time_ranges: ranges,
        }
    }

    /// a day contributes lessons only when enabled and non-empty
    pub fn is_active(&self) -> bool {
        self.enabled && !self.time_ranges.is_empty()
    }
}

/// weekly recurring availability pattern, one slot per weekday
///
/// slot 0 meaning is governed by [`WeekdayConvention`]; the default
/// convention is Monday-first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeeklySchedule {
    pub days: [DaySchedule; 7],
}

impl WeeklySchedule {
    pub fn empty() -> Self {
        Self::default()
    }

    /// replace one weekday slot, builder style
    pub fn with_day(mut self, slot: usize, day: DaySchedule) -> Self {
        if slot < 7 {
            self.days[slot] = day;
        }
        self
    }

    pub fn day(&self, slot: usize) -> &DaySchedule {
        &self.days[slot.min(6)]
    }

    /// look up the schedule slot for a calendar date under a convention
    pub fn day_for(&self, date: NaiveDate, convention: WeekdayConvention) -> &DaySchedule {
        use chrono::Datelike;
        &self.days[convention.slot_for(date.weekday())]
    }

    /// true when no weekday would ever produce a lesson
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|d| !d.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeekdayConvention;

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(TimeOfDay::parse("09:30").unwrap().to_string(), "09:30");
        assert_eq!(TimeOfDay::parse("9:30").unwrap().to_string(), "09:30");
        assert_eq!(TimeOfDay::parse("23:59").unwrap().to_string(), "23:59");
        assert_eq!(TimeOfDay::parse("00:00").unwrap().to_string(), "00:00");
    }

    #[test]
    fn test_reject_malformed_times() {
        for input in ["24:00", "12:60", "9:5", "0930", "12:345", "", ":30", "ab:cd", "-1:00"] {
            assert!(TimeOfDay::parse(input).is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_range_requires_order() {
        assert!(TimeRange::parse("10:00", "11:00").is_ok());
        assert!(TimeRange::parse("11:00", "10:00").is_err());
        assert!(TimeRange::parse("10:00", "10:00").is_err());
    }

    #[test]
    fn test_touching_ranges_do_not_conflict() {
        let candidate = TimeRange::parse("09:00", "10:00").unwrap();
        let busy = vec![TimeRange::parse("10:00", "11:00").unwrap()];
        assert!(!has_conflict(&candidate, &busy));
    }

    #[test]
    fn test_overlapping_ranges_conflict() {
        let candidate = TimeRange::parse("09:00", "10:00").unwrap();
        let busy = vec![TimeRange::parse("09:30", "10:30").unwrap()];
        assert!(has_conflict(&candidate, &busy));
    }

    #[test]
    fn test_contained_range_conflicts() {
        let candidate = TimeRange::parse("09:00", "12:00").unwrap();
        let busy = vec![TimeRange::parse("10:00", "10:30").unwrap()];
        assert!(has_conflict(&candidate, &busy));
    }

    #[test]
    fn test_weekday_slot_mapping_is_monday_first() {
        // 2024-01-01 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();

        let schedule = WeeklySchedule::empty().with_day(
            0,
            DaySchedule::with_ranges(vec![TimeRange::parse("10:00", "11:00").unwrap()]),
        );

        assert!(schedule
            .day_for(monday, WeekdayConvention::MondayFirst)
            .is_active());
        assert!(!schedule
            .day_for(sunday, WeekdayConvention::MondayFirst)
            .is_active());

        // under the sunday-first convention the same slot 0 means Sunday
        assert!(schedule
            .day_for(sunday, WeekdayConvention::SundayFirst)
            .is_active());
        assert!(!schedule
            .day_for(monday, WeekdayConvention::SundayFirst)
            .is_active());
    }

    #[test]
    fn test_empty_schedule() {
        assert!(WeeklySchedule::empty().is_empty());

        let disabled_with_ranges = WeeklySchedule::empty().with_day(
            2,
            DaySchedule {
                enabled: false,
                time_ranges: vec![TimeRange::parse("10:00", "11:00").unwrap()],
            },
        );
        assert!(disabled_with_ranges.is_empty());

        let active = WeeklySchedule::empty().with_day(
            2,
            DaySchedule::with_ranges(vec![TimeRange::parse("10:00", "11:00").unwrap()]),
        );
        assert!(!active.is_empty());
    }
}
