use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LessonId, PrepaymentId, SkipReason, SubjectId};

/// all events that can be emitted by generation, reconciliation and
/// book operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // generation events
    SubjectSkipped {
        subject_id: SubjectId,
        name: String,
        reason: SkipReason,
    },
    LessonScheduled {
        lesson_id: LessonId,
        subject_name: String,
        date_time: DateTime<Utc>,
        amount: Money,
    },
    LessonRefreshed {
        lesson_id: LessonId,
        amount: Money,
        has_passed: bool,
    },
    GenerationCompleted {
        created: u32,
        refreshed: u32,
        skipped_subjects: u32,
    },

    // reconciliation events
    PrepaymentApplied {
        prepayment_id: PrepaymentId,
        amount: Money,
        balance: Money,
    },
    LessonPaid {
        lesson_id: LessonId,
        amount: Money,
        remaining: Money,
    },
    LessonUnpaid {
        lesson_id: LessonId,
        amount: Money,
        balance: Money,
    },
    LessonCancelledInSweep {
        lesson_id: LessonId,
        balance: Money,
    },
    ReconciliationCompleted {
        paid: u32,
        unpaid: u32,
        cancelled: u32,
        closing_balance: Money,
    },

    // book operations
    SubjectUpserted {
        subject_id: SubjectId,
        name: String,
    },
    SubjectRemoved {
        subject_id: SubjectId,
    },
    PrepaymentRecorded {
        prepayment_id: PrepaymentId,
        amount: Money,
        date_time: DateTime<Utc>,
    },
    PrepaymentRemoved {
        prepayment_id: PrepaymentId,
    },
    ManualLessonAdded {
        lesson_id: LessonId,
        subject_name: String,
        date_time: DateTime<Utc>,
    },
    LessonCancelled {
        lesson_id: LessonId,
    },
    LessonRestored {
        lesson_id: LessonId,
    },
    LessonRemoved {
        lesson_id: LessonId,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
