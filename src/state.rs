use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::TimeRange;
use crate::stats::Stats;
use crate::types::{Lesson, LessonId, Prepayment, PrepaymentId, Subject, SubjectId};

/// full in-memory state of one tutor's book
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BookState {
    pub subjects: Vec<Subject>,
    pub lessons: Vec<Lesson>,
    pub prepayments: Vec<Prepayment>,

    // derived on reconciliation; stale between runs
    pub stats: Stats,
    pub last_reconciled: Option<DateTime<Utc>>,
    pub skipped_subjects: u32,
}

impl BookState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn subject_position(&self, id: SubjectId) -> Option<usize> {
        self.subjects.iter().position(|s| s.id == id)
    }

    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn lesson_mut(&mut self, id: LessonId) -> Option<&mut Lesson> {
        self.lessons.iter_mut().find(|l| l.id == id)
    }

    pub fn prepayment_mut(&mut self, id: PrepaymentId) -> Option<&mut Prepayment> {
        self.prepayments.iter_mut().find(|p| p.id == id)
    }

    /// occupied slots on a calendar day, cancelled lessons excluded
    pub fn busy_ranges_on(&self, day: NaiveDate) -> Vec<TimeRange> {
        self.lessons
            .iter()
            .filter(|l| !l.is_cancelled && l.date_time.date_naive() == day)
            .map(|l| l.time_range())
            .collect()
    }
}
