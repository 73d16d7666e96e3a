use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Lesson, PaymentStatus, Prepayment};

pub const PAID_COLOR: &str = "#4caf50";
pub const UNPAID_COLOR: &str = "#f44336";
pub const CANCELLED_COLOR: &str = "#9e9e9e";
pub const PREPAYMENT_COLOR: &str = "#2196f3";

/// one row of the combined history feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub occurred_at: DateTime<Utc>,
    pub color: String,
    pub record: HistoryRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryRecord {
    Lesson(Lesson),
    Prepayment(Prepayment),
}

/// merge lessons and prepayments into one feed, newest first
///
/// derived on demand for display, never stored
pub fn combined_history(lessons: &[Lesson], prepayments: &[Prepayment]) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = Vec::with_capacity(lessons.len() + prepayments.len());

    for lesson in lessons {
        let color = match lesson.status {
            PaymentStatus::Paid => PAID_COLOR,
            PaymentStatus::Unpaid => UNPAID_COLOR,
            PaymentStatus::Cancelled => CANCELLED_COLOR,
        };
        entries.push(HistoryEntry {
            occurred_at: lesson.date_time,
            color: color.to_string(),
            record: HistoryRecord::Lesson(lesson.clone()),
        });
    }
    for prepayment in prepayments {
        entries.push(HistoryEntry {
            occurred_at: prepayment.date_time,
            color: PREPAYMENT_COLOR.to_string(),
            record: HistoryRecord::Prepayment(prepayment.clone()),
        });
    }

    entries.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    entries
}
