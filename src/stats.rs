use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{Lesson, PaymentStatus};

/// totals derived from reconciled lessons; cancelled lessons contribute
/// to no bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_lessons: u32,
    pub total_amount: Money,
    pub completed_lessons: u32,
    pub paid_lessons: u32,
    pub paid_amount: Money,
    pub unpaid_lessons: u32,
    pub unpaid_amount: Money,
}

impl Stats {
    /// outstanding amount owed for lessons not yet covered by prepayments
    pub fn debt(&self) -> Money {
        self.unpaid_amount
    }
}

/// fold over all non-cancelled lessons
pub fn compute_stats(lessons: &[Lesson]) -> Stats {
    fold(lessons.iter())
}

/// the same fold restricted to one subject
pub fn subject_stats(lessons: &[Lesson], subject_name: &str) -> Stats {
    fold(lessons.iter().filter(|l| l.subject_name == subject_name))
}

fn fold<'a>(lessons: impl Iterator<Item = &'a Lesson>) -> Stats {
    let mut stats = Stats::default();
    for lesson in lessons {
        if lesson.is_cancelled {
            continue;
        }
        stats.total_lessons += 1;
        stats.total_amount += lesson.payment_amount;
        if lesson.has_passed {
            stats.completed_lessons += 1;
        }
        if lesson.status == PaymentStatus::Paid {
            stats.paid_lessons += 1;
            stats.paid_amount += lesson.payment_amount;
        } else {
            stats.unpaid_lessons += 1;
            stats.unpaid_amount += lesson.payment_amount;
        }
    }
    stats
}
