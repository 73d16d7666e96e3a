pub mod book;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod generator;
pub mod history;
pub mod ledger;
pub mod schedule;
pub mod serialization;
pub mod state;
pub mod stats;
pub mod types;

// re-export key types
pub use book::TutorBook;
pub use config::LedgerConfig;
pub use decimal::Money;
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use generator::{GenerationOutcome, LessonGenerator};
pub use history::{combined_history, HistoryEntry, HistoryRecord};
pub use ledger::{DebouncedReconciler, Debouncer, Reconciler};
pub use schedule::{has_conflict, DaySchedule, TimeOfDay, TimeRange, WeeklySchedule};
pub use serialization::{reconcile_snapshot, BookView, ReconcileRequest, ReconcileResponse};
pub use state::BookState;
pub use stats::{compute_stats, subject_stats, Stats};
pub use types::{
    BookId, Lesson, LessonId, LessonKey, PaymentStatus, Prepayment, PrepaymentId, SkipReason,
    Subject, SubjectId, WeekdayConvention,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
