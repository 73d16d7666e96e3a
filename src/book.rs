use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::generator::LessonGenerator;
use crate::history::{combined_history, HistoryEntry};
use crate::ledger::{Debouncer, Reconciler};
use crate::schedule::{has_conflict, TimeRange};
use crate::serialization::BookView;
use crate::state::BookState;
use crate::stats::{subject_stats, Stats};
use crate::types::{
    BookId, Lesson, LessonId, Prepayment, PrepaymentId, Subject, SubjectId,
};

/// one tutor's book: subjects, lessons and prepayments plus the engines
/// that keep them reconciled
///
/// the book is the imperative shell; everything it calls into is a pure
/// function over snapshots
pub struct TutorBook {
    pub id: BookId,
    pub config: LedgerConfig,
    pub state: BookState,
    pub events: EventStore,
    generator: LessonGenerator,
    reconciler: Reconciler,
    refresh_timer: Debouncer,
}

impl TutorBook {
    pub fn new(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        let generator = LessonGenerator::new(config.weekday_convention);
        let refresh_timer = Debouncer::new(config.debounce_delay());
        Ok(Self {
            id: Uuid::new_v4(),
            config,
            state: BookState::new(),
            events: EventStore::new(),
            generator,
            reconciler: Reconciler::new(),
            refresh_timer,
        })
    }

    /// add or replace a subject; rejected subjects change nothing
    pub fn upsert_subject(&mut self, subject: Subject) -> Result<SubjectId> {
        subject.validate()?;
        let id = subject.id;
        self.events.emit(Event::SubjectUpserted {
            subject_id: id,
            name: subject.name.clone(),
        });
        match self.state.subject_position(id) {
            Some(position) => self.state.subjects[position] = subject,
            None => self.state.subjects.push(subject),
        }
        Ok(id)
    }

    /// remove a subject; its already generated lessons stay in history
    pub fn remove_subject(&mut self, id: SubjectId) -> Result<()> {
        let position = self
            .state
            .subject_position(id)
            .ok_or(LedgerError::SubjectNotFound { id })?;
        self.state.subjects.remove(position);
        self.events.emit(Event::SubjectRemoved { subject_id: id });
        Ok(())
    }

    pub fn add_prepayment(&mut self, amount: Money, at: DateTime<Utc>) -> Result<PrepaymentId> {
        let prepayment = Prepayment::new(amount, at)?;
        let id = prepayment.id;
        self.events.emit(Event::PrepaymentRecorded {
            prepayment_id: id,
            amount,
            date_time: at,
        });
        self.state.prepayments.push(prepayment);
        Ok(id)
    }

    pub fn update_prepayment(
        &mut self,
        id: PrepaymentId,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if !amount.is_positive() {
            return Err(LedgerError::NonPositivePrepayment { amount });
        }
        let prepayment = self
            .state
            .prepayment_mut(id)
            .ok_or(LedgerError::PrepaymentNotFound { id })?;
        prepayment.amount = amount;
        prepayment.date_time = at;
        Ok(())
    }

    pub fn remove_prepayment(&mut self, id: PrepaymentId) -> Result<()> {
        let position = self
            .state
            .prepayments
            .iter()
            .position(|p| p.id == id)
            .ok_or(LedgerError::PrepaymentNotFound { id })?;
        self.state.prepayments.remove(position);
        self.events.emit(Event::PrepaymentRemoved { prepayment_id: id });
        Ok(())
    }

    /// add a one-off lesson after checking the slot against that day's
    /// busy ranges (half-open: touching slots are fine)
    pub fn add_manual_lesson(
        &mut self,
        subject_name: impl Into<String>,
        payment_amount: Money,
        day: NaiveDate,
        slot: TimeRange,
    ) -> Result<LessonId> {
        let busy = self.state.busy_ranges_on(day);
        if has_conflict(&slot, &busy) {
            let occupied = busy
                .iter()
                .find(|b| slot.overlaps(b))
                .map(|b| b.to_string())
                .unwrap_or_default();
            return Err(LedgerError::SlotConflict {
                candidate: slot.to_string(),
                busy: occupied,
            });
        }

        let date_time = day.and_time(slot.start.to_naive_time()).and_utc();
        let lesson = Lesson::manual(subject_name, payment_amount, date_time, slot)?;
        let id = lesson.id;
        self.events.emit(Event::ManualLessonAdded {
            lesson_id: id,
            subject_name: lesson.subject_name.clone(),
            date_time,
        });
        self.state.lessons.push(lesson);
        Ok(id)
    }

    /// mark cancelled; the status label and balances update on the next
    /// reconciliation
    pub fn cancel_lesson(&mut self, id: LessonId) -> Result<()> {
        let lesson = self
            .state
            .lesson_mut(id)
            .ok_or(LedgerError::LessonNotFound { id })?;
        lesson.is_cancelled = true;
        self.events.emit(Event::LessonCancelled { lesson_id: id });
        Ok(())
    }

    pub fn restore_lesson(&mut self, id: LessonId) -> Result<()> {
        let lesson = self
            .state
            .lesson_mut(id)
            .ok_or(LedgerError::LessonNotFound { id })?;
        lesson.is_cancelled = false;
        self.events.emit(Event::LessonRestored { lesson_id: id });
        Ok(())
    }

    /// delete a manual record; generated history is never deleted, only
    /// cancelled
    pub fn remove_lesson(&mut self, id: LessonId) -> Result<()> {
        let position = self
            .state
            .lessons
            .iter()
            .position(|l| l.id == id)
            .ok_or(LedgerError::LessonNotFound { id })?;
        if self.state.lessons[position].is_auto_generated {
            return Err(LedgerError::NotManuallyRemovable { id });
        }
        self.state.lessons.remove(position);
        self.events.emit(Event::LessonRemoved { lesson_id: id });
        Ok(())
    }

    /// synchronous generate + reconcile + aggregate over current state
    ///
    /// on a validation error the previous lessons and stats remain
    /// untouched (stale but consistent)
    pub fn refresh(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        let now = time_provider.now();
        let mut outcome = self.generator.generate(
            &self.state.subjects,
            &self.state.lessons,
            time_provider,
            &mut self.events,
        );
        // has_passed is derived state for every record, manual ones included
        for lesson in &mut outcome.lessons {
            lesson.has_passed = lesson.date_time < now;
        }
        let reconciled =
            self.reconciler
                .reconcile(&outcome.lessons, &self.state.prepayments, &mut self.events)?;

        self.state.stats = crate::stats::compute_stats(&reconciled);
        self.state.lessons = reconciled;
        self.state.skipped_subjects = outcome.skipped_subjects;
        self.state.last_reconciled = Some(now);
        Ok(())
    }

    /// debounced refresh: arm (or re-arm) the timer instead of running now
    pub fn schedule_refresh(&mut self, time_provider: &SafeTimeProvider) {
        self.refresh_timer.schedule(time_provider);
    }

    /// run a scheduled refresh once its deadline has been reached
    pub fn poll_refresh(&mut self, time_provider: &SafeTimeProvider) -> Result<bool> {
        if !self.refresh_timer.fire_due(time_provider) {
            return Ok(false);
        }
        self.refresh(time_provider)?;
        Ok(true)
    }

    pub fn cancel_refresh(&mut self) {
        self.refresh_timer.cancel();
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh_timer.is_pending()
    }

    /// totals as of the last reconciliation
    pub fn stats(&self) -> Stats {
        self.state.stats.clone()
    }

    pub fn subject_stats(&self, subject_name: &str) -> Stats {
        subject_stats(&self.state.lessons, subject_name)
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        combined_history(&self.state.lessons, &self.state.prepayments)
    }

    pub fn view(&self) -> BookView {
        BookView::from_book(self)
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}
