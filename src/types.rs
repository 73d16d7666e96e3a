use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::schedule::{TimeOfDay, TimeRange, WeeklySchedule};

/// unique identifier for a subject
pub type SubjectId = Uuid;

/// unique identifier for a lesson occurrence
pub type LessonId = Uuid;

/// unique identifier for a prepayment
pub type PrepaymentId = Uuid;

/// unique identifier for a tutor book
pub type BookId = Uuid;

/// payment status of a lesson occurrence
///
/// wire labels match the source dataset's single observed locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "Не оплачено")]
    Unpaid,
    #[serde(rename = "Оплачено")]
    Paid,
    #[serde(rename = "Отменено")]
    Cancelled,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Unpaid => "Не оплачено",
            PaymentStatus::Paid => "Оплачено",
            PaymentStatus::Cancelled => "Отменено",
        };
        write!(f, "{}", label)
    }
}

/// which weekday occupies schedule slot 0
///
/// the source system disagreed with itself here; this port pins the
/// convention per dataset and defaults to Monday-first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeekdayConvention {
    #[default]
    MondayFirst,
    SundayFirst,
}

impl WeekdayConvention {
    /// schedule slot (0-6) for a calendar weekday
    pub fn slot_for(&self, weekday: Weekday) -> usize {
        match self {
            WeekdayConvention::MondayFirst => weekday.num_days_from_monday() as usize,
            WeekdayConvention::SundayFirst => weekday.num_days_from_sunday() as usize,
        }
    }

    /// calendar weekday occupying a schedule slot (0-6)
    pub fn weekday_at(&self, slot: usize) -> Weekday {
        const FROM_MONDAY: [Weekday; 7] = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        match self {
            WeekdayConvention::MondayFirst => FROM_MONDAY[slot.min(6)],
            WeekdayConvention::SundayFirst => {
                if slot == 0 {
                    Weekday::Sun
                } else {
                    FROM_MONDAY[slot.min(6) - 1]
                }
            }
        }
    }
}

/// why a subject was excluded from generation; a policy outcome, not a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    EmptyName,
    MissingDates,
    InvertedDates,
    EmptySchedule,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkipReason::EmptyName => "empty name",
            SkipReason::MissingDates => "missing start or end date",
            SkipReason::InvertedDates => "end date before start date",
            SkipReason::EmptySchedule => "no enabled weekday with time ranges",
        };
        write!(f, "{}", label)
    }
}

/// generation identity of a lesson occurrence: calendar day, subject
/// name and start time; regeneration matches on this key instead of
/// creating duplicates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LessonKey {
    pub day: NaiveDate,
    pub subject_name: String,
    pub start: TimeOfDay,
}

/// a recurring course: weekly schedule, price and validity date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub price: Money,
    pub duration_minutes: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub schedule: WeeklySchedule,
}

impl Subject {
    pub fn new(
        name: impl Into<String>,
        price: Money,
        duration_minutes: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
        schedule: WeeklySchedule,
    ) -> Result<Self> {
        let subject = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            duration_minutes,
            start_date: Some(start_date),
            end_date: Some(end_date),
            schedule,
        };
        subject.validate()?;
        Ok(subject)
    }

    /// hard validation, rejected at the call boundary
    pub fn validate(&self) -> Result<()> {
        if self.price.is_negative() {
            return Err(LedgerError::NegativeAmount { amount: self.price });
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(LedgerError::InvertedDateRange { start, end });
            }
        }
        Ok(())
    }

    /// soft generation gate: a failing subject is skipped, never an error
    pub fn eligibility(&self) -> std::result::Result<(NaiveDate, NaiveDate), SkipReason> {
        if self.name.trim().is_empty() {
            return Err(SkipReason::EmptyName);
        }
        let (start, end) = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(SkipReason::MissingDates),
        };
        if end < start {
            return Err(SkipReason::InvertedDates);
        }
        if self.schedule.is_empty() {
            return Err(SkipReason::EmptySchedule);
        }
        Ok((start, end))
    }
}

/// one concrete dated lesson occurrence, generated or manually added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub date_time: DateTime<Utc>,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub subject_name: String,
    pub payment_amount: Money,
    pub status: PaymentStatus,
    pub has_passed: bool,
    pub is_cancelled: bool,
    pub is_auto_generated: bool,
    /// prepayment balance left immediately after this lesson in the sweep;
    /// written only by the reconciler
    pub remaining_prepayment: Money,
}

impl Lesson {
    /// synthesize a generated occurrence from a subject's schedule slot
    pub fn auto(
        subject: &Subject,
        date_time: DateTime<Utc>,
        slot: &TimeRange,
        has_passed: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date_time,
            start_time: slot.start,
            end_time: slot.end,
            subject_name: subject.name.clone(),
            payment_amount: subject.price,
            status: PaymentStatus::Unpaid,
            has_passed,
            is_cancelled: false,
            is_auto_generated: true,
            remaining_prepayment: Money::ZERO,
        }
    }

    /// user-entered occurrence outside any recurring schedule
    pub fn manual(
        subject_name: impl Into<String>,
        payment_amount: Money,
        date_time: DateTime<Utc>,
        slot: TimeRange,
    ) -> Result<Self> {
        if payment_amount.is_negative() {
            return Err(LedgerError::NegativeAmount {
                amount: payment_amount,
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            date_time,
            start_time: slot.start,
            end_time: slot.end,
            subject_name: subject_name.into(),
            payment_amount,
            status: PaymentStatus::Unpaid,
            has_passed: false,
            is_cancelled: false,
            is_auto_generated: false,
            remaining_prepayment: Money::ZERO,
        })
    }

    /// generation identity used for dedup across regenerations
    pub fn key(&self) -> LessonKey {
        LessonKey {
            day: self.date_time.date_naive(),
            subject_name: self.subject_name.clone(),
            start: self.start_time,
        }
    }

    /// the occupied slot, for conflict checks
    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// a deposit of funds applied against lessons in date order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prepayment {
    pub id: PrepaymentId,
    pub amount: Money,
    pub date_time: DateTime<Utc>,
}

impl Prepayment {
    pub fn new(amount: Money, date_time: DateTime<Utc>) -> Result<Self> {
        if !amount.is_positive() {
            return Err(LedgerError::NonPositivePrepayment { amount });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            date_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{DaySchedule, TimeRange};
    use chrono::TimeZone;

    fn monday_schedule() -> WeeklySchedule {
        WeeklySchedule::empty().with_day(
            0,
            DaySchedule::with_ranges(vec![TimeRange::parse("10:00", "11:00").unwrap()]),
        )
    }

    #[test]
    fn test_payment_status_wire_labels() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Unpaid).unwrap(),
            "\"Не оплачено\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"Оплачено\""
        );
        let parsed: PaymentStatus = serde_json::from_str("\"Отменено\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Cancelled);
    }

    #[test]
    fn test_weekday_convention_round_trip() {
        for slot in 0..7 {
            let convention = WeekdayConvention::MondayFirst;
            assert_eq!(convention.slot_for(convention.weekday_at(slot)), slot);

            let convention = WeekdayConvention::SundayFirst;
            assert_eq!(convention.slot_for(convention.weekday_at(slot)), slot);
        }
        assert_eq!(WeekdayConvention::MondayFirst.weekday_at(0), Weekday::Mon);
        assert_eq!(WeekdayConvention::SundayFirst.weekday_at(0), Weekday::Sun);
    }

    #[test]
    fn test_subject_validation() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 14).unwrap();

        assert!(Subject::new("Math", Money::from_major(1_000), 60, start, end, monday_schedule())
            .is_ok());
        assert!(matches!(
            Subject::new("Math", Money::from_major(-1), 60, start, end, monday_schedule()),
            Err(LedgerError::NegativeAmount { .. })
        ));
        assert!(matches!(
            Subject::new("Math", Money::from_major(1_000), 60, end, start, monday_schedule()),
            Err(LedgerError::InvertedDateRange { .. })
        ));
    }

    #[test]
    fn test_subject_eligibility() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 14).unwrap();

        let mut subject =
            Subject::new("Math", Money::from_major(1_000), 60, start, end, monday_schedule())
                .unwrap();
        assert_eq!(subject.eligibility(), Ok((start, end)));

        subject.name = "   ".to_string();
        assert_eq!(subject.eligibility(), Err(SkipReason::EmptyName));

        subject.name = "Math".to_string();
        subject.start_date = None;
        assert_eq!(subject.eligibility(), Err(SkipReason::MissingDates));

        subject.start_date = Some(start);
        subject.schedule = WeeklySchedule::empty();
        assert_eq!(subject.eligibility(), Err(SkipReason::EmptySchedule));
    }

    #[test]
    fn test_prepayment_must_be_positive() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(Prepayment::new(Money::from_major(500), at).is_ok());
        assert!(Prepayment::new(Money::ZERO, at).is_err());
        assert!(Prepayment::new(Money::from_major(-500), at).is_err());
    }

    #[test]
    fn test_lesson_key_matches_on_day_name_start() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 14).unwrap();
        let subject =
            Subject::new("Math", Money::from_major(1_000), 60, start, end, monday_schedule())
                .unwrap();

        let slot = TimeRange::parse("10:00", "11:00").unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();

        let a = Lesson::auto(&subject, at, &slot, false);
        let b = Lesson::auto(&subject, at, &slot, true);
        assert_ne!(a.id, b.id);
        assert_eq!(a.key(), b.key());
    }
}
