use chrono::{DateTime, Duration, Utc};
use hourglass_rs::SafeTimeProvider;
use tracing::trace;

use crate::config::LedgerConfig;
use crate::errors::Result;
use crate::events::EventStore;
use crate::serialization::{reconcile_snapshot, ReconcileRequest, ReconcileResponse};

/// cooperative single-slot timer: at most one pending deadline, and
/// scheduling again replaces any unfired one
///
/// there is no background thread; callers drive it by polling with the
/// injected clock, so tests advance time explicitly
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    due_at: Option<DateTime<Utc>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            due_at: None,
        }
    }

    /// arm (or re-arm) the timer; a previously pending deadline is dropped
    pub fn schedule(&mut self, time_provider: &SafeTimeProvider) {
        let due = time_provider.now() + self.delay;
        trace!(%due, rearmed = self.due_at.is_some(), "debounce scheduled");
        self.due_at = Some(due);
    }

    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// true exactly once per armed deadline, when now has reached it
    pub fn fire_due(&mut self, time_provider: &SafeTimeProvider) -> bool {
        match self.due_at {
            Some(due) if time_provider.now() >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

/// debounced wrapper over the pure reconciliation pipeline
///
/// holds the latest request snapshot; each schedule supersedes the
/// previous one, and results are observable only after a fire — callers
/// must treat earlier outputs as stale until then
pub struct DebouncedReconciler {
    config: LedgerConfig,
    timer: Debouncer,
    request: Option<ReconcileRequest>,
}

impl DebouncedReconciler {
    pub fn new(config: LedgerConfig) -> Self {
        let timer = Debouncer::new(config.debounce_delay());
        Self {
            config,
            timer,
            request: None,
        }
    }

    /// replace any pending run with a fresh snapshot and deadline
    pub fn schedule(&mut self, request: ReconcileRequest, time_provider: &SafeTimeProvider) {
        self.request = Some(request);
        self.timer.schedule(time_provider);
    }

    pub fn cancel(&mut self) {
        self.request = None;
        self.timer.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// run the pending request if its deadline has been reached
    pub fn fire_due(
        &mut self,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Option<ReconcileResponse>> {
        if !self.timer.fire_due(time_provider) {
            return Ok(None);
        }
        match self.request.take() {
            Some(request) => reconcile_snapshot(&request, &self.config, events).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::schedule::{DaySchedule, TimeRange, WeeklySchedule};
    use crate::types::{PaymentStatus, Prepayment, Subject};
    use chrono::{NaiveDate, TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn request(now: DateTime<Utc>) -> ReconcileRequest {
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
            now,
        }
    }

    #[test]
    fn test_fires_only_after_delay() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap(),
        ));
        let controller = time.test_control().unwrap();
        let mut events = EventStore::new();

        let mut debounced = DebouncedReconciler::new(LedgerConfig::standard());
        debounced.schedule(request(time.now()), &time);

        assert!(debounced.is_pending());
        assert!(debounced.fire_due(&time, &mut events).unwrap().is_none());

        controller.advance(Duration::milliseconds(399));
        assert!(debounced.fire_due(&time, &mut events).unwrap().is_none());

        controller.advance(Duration::milliseconds(1));
        let response = debounced.fire_due(&time, &mut events).unwrap().unwrap();
        assert_eq!(response.lessons.len(), 2);
        assert_eq!(response.lessons[0].status, PaymentStatus::Paid);
        assert!(!debounced.is_pending());
    }

    #[test]
    fn test_reschedule_supersedes_pending_run() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap(),
        ));
        let controller = time.test_control().unwrap();
        let mut events = EventStore::new();

        let mut debounced = DebouncedReconciler::new(LedgerConfig::standard());
        debounced.schedule(request(time.now()), &time);

        // just before the deadline a new edit arrives; the old run is gone
        controller.advance(Duration::milliseconds(399));
        debounced.schedule(request(time.now()), &time);

        controller.advance(Duration::milliseconds(1));
        assert!(debounced.fire_due(&time, &mut events).unwrap().is_none());

        controller.advance(Duration::milliseconds(399));
        assert!(debounced.fire_due(&time, &mut events).unwrap().is_some());
    }

    #[test]
    fn test_cancel_drops_pending_run() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap(),
        ));
        let controller = time.test_control().unwrap();
        let mut events = EventStore::new();

        let mut debounced = DebouncedReconciler::new(LedgerConfig::standard());
        debounced.schedule(request(time.now()), &time);
        debounced.cancel();

        controller.advance(Duration::seconds(10));
        assert!(debounced.fire_due(&time, &mut events).unwrap().is_none());
        assert!(!debounced.is_pending());
    }

    #[test]
    fn test_fire_is_one_shot() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap(),
        ));
        let controller = time.test_control().unwrap();
        let mut events = EventStore::new();

        let mut debounced = DebouncedReconciler::new(LedgerConfig::standard());
        debounced.schedule(request(time.now()), &time);

        controller.advance(Duration::seconds(1));
        assert!(debounced.fire_due(&time, &mut events).unwrap().is_some());
        assert!(debounced.fire_due(&time, &mut events).unwrap().is_none());
    }
}
