/// serialization support and the snapshot-shaped entry point
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::book::TutorBook;
use crate::config::LedgerConfig;
use crate::errors::Result;
use crate::events::EventStore;
use crate::generator::LessonGenerator;
use crate::ledger::Reconciler;
use crate::stats::{compute_stats, Stats};
use crate::types::{BookId, Lesson, Prepayment, Subject};

/// full input snapshot for one reconciliation pass; the wire shape a
/// service wrapper would accept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileRequest {
    pub subjects: Vec<Subject>,
    pub prepayments: Vec<Prepayment>,
    pub existing_lessons: Vec<Lesson>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub lessons: Vec<Lesson>,
    pub stats: Stats,
}

/// run generation, reconciliation and aggregation over one snapshot
///
/// atomic: validation rejects the whole request up front and nothing is
/// partially applied; concurrent calls over different snapshots share
/// no state
pub fn reconcile_snapshot(
    request: &ReconcileRequest,
    config: &LedgerConfig,
    events: &mut EventStore,
) -> Result<ReconcileResponse> {
    config.validate()?;
    for subject in &request.subjects {
        subject.validate()?;
    }

    let generator = LessonGenerator::new(config.weekday_convention);
    let outcome = generator.generate_at(
        &request.subjects,
        &request.existing_lessons,
        request.now,
        events,
    );
    let lessons = Reconciler::new().reconcile(&outcome.lessons, &request.prepayments, events)?;
    let stats = compute_stats(&lessons);

    Ok(ReconcileResponse { lessons, stats })
}

/// serializable view of a book's state
#[derive(Debug, Serialize, Deserialize)]
pub struct BookView {
    pub id: BookId,
    pub subject_count: usize,
    pub lesson_count: usize,
    pub prepayment_count: usize,
    pub skipped_subjects: u32,
    pub last_reconciled: Option<DateTime<Utc>>,
    pub stats: Stats,
}

impl BookView {
    pub fn from_book(book: &TutorBook) -> Self {
        BookView {
            id: book.id,
            subject_count: book.state.subjects.len(),
            lesson_count: book.state.lessons.len(),
            prepayment_count: book.state.prepayments.len(),
            skipped_subjects: book.state.skipped_subjects,
            last_reconciled: book.state.last_reconciled,
            stats: book.state.stats.clone(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::schedule::{DaySchedule, TimeRange, WeeklySchedule};
    use crate::types::PaymentStatus;
    use chrono::{NaiveDate, TimeZone};

    fn example_request() -> ReconcileRequest {
        let subject = Subject::new(
            "Math",
            Money::from_major(1_000),
            60,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
            WeeklySchedule::empty().with_day(
                0,
                DaySchedule::with_ranges(vec![TimeRange::parse("10:00", "11:00").unwrap()]),
            ),
        )
        .unwrap();
        let prepayment = Prepayment::new(
            Money::from_major(2_500),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();

        ReconcileRequest {
            subjects: vec![subject],
            prepayments: vec![prepayment],
            existing_lessons: Vec::new(),
            now: Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_snapshot_runs_full_pipeline() {
        let mut events = EventStore::new();
        let response =
            reconcile_snapshot(&example_request(), &LedgerConfig::standard(), &mut events)
                .unwrap();

        assert_eq!(response.lessons.len(), 2);
        assert_eq!(response.lessons[0].status, PaymentStatus::Paid);
        assert_eq!(
            response.lessons[0].remaining_prepayment,
            Money::from_major(1_500)
        );
        assert_eq!(
            response.lessons[1].remaining_prepayment,
            Money::from_major(500)
        );
        assert_eq!(response.stats.paid_lessons, 2);
        assert_eq!(response.stats.paid_amount, Money::from_major(2_000));
    }

    #[test]
    fn test_invalid_subject_rejects_whole_request() {
        let mut request = example_request();
        request.subjects[0].price = Money::from_major(-1);
        let mut events = EventStore::new();

        let result = reconcile_snapshot(&request, &LedgerConfig::standard(), &mut events);
        assert!(result.is_err());
        assert!(events.events().is_empty());
    }

    #[test]
    fn test_request_round_trips_through_json() {
        let request = example_request();
        let json = serde_json::to_string(&request).unwrap();
        let back: ReconcileRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.subjects, request.subjects);
        assert_eq!(back.prepayments, request.prepayments);
        assert_eq!(back.now, request.now);
    }
}
