use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("negative amount: {amount}")]
    NegativeAmount {
        amount: Money,
    },

    #[error("prepayment must be positive: {amount}")]
    NonPositivePrepayment {
        amount: Money,
    },

    #[error("invalid time format: {input:?}, expected HH:MM")]
    InvalidTimeFormat {
        input: String,
    },

    #[error("time range end {end} is not after start {start}")]
    InvertedTimeRange {
        start: String,
        end: String,
    },

    #[error("date range end {end} is before start {start}")]
    InvertedDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("time slot {candidate} conflicts with busy slot {busy}")]
    SlotConflict {
        candidate: String,
        busy: String,
    },

    #[error("lesson not found: {id}")]
    LessonNotFound {
        id: Uuid,
    },

    #[error("subject not found: {id}")]
    SubjectNotFound {
        id: Uuid,
    },

    #[error("prepayment not found: {id}")]
    PrepaymentNotFound {
        id: Uuid,
    },

    #[error("generated lesson cannot be removed: {id}")]
    NotManuallyRemovable {
        id: Uuid,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
