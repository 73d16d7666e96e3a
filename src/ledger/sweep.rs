use tracing::{debug, trace};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::types::{Lesson, PaymentStatus, Prepayment};

/// chronological ledger sweep: consumes prepayment balance against
/// lessons in date order and classifies each as paid, unpaid or cancelled
///
/// the sweep is a pure function of payment_amount, is_cancelled and
/// date_time; stale status and remaining_prepayment values on the input
/// are treated as outputs and recomputed from scratch
#[derive(Debug, Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// reconcile a lesson list against a prepayment list
    ///
    /// returns the same records (same identities, caller's order) with
    /// status and remaining_prepayment rewritten; validation failures
    /// reject the whole call before any record is produced
    pub fn reconcile(
        &self,
        lessons: &[Lesson],
        prepayments: &[Prepayment],
        events: &mut EventStore,
    ) -> Result<Vec<Lesson>> {
        // fail fast, nothing partially applied
        for lesson in lessons {
            if lesson.payment_amount.is_negative() {
                return Err(LedgerError::NegativeAmount {
                    amount: lesson.payment_amount,
                });
            }
        }
        for prepayment in prepayments {
            if !prepayment.amount.is_positive() {
                return Err(LedgerError::NonPositivePrepayment {
                    amount: prepayment.amount,
                });
            }
        }

        let mut reconciled = lessons.to_vec();

        // sweep order is chronological; output order stays the caller's.
        // sort_by_key is stable, ties keep their relative input order
        let mut order: Vec<usize> = (0..reconciled.len()).collect();
        order.sort_by_key(|&position| reconciled[position].date_time);

        let mut deposits: Vec<&Prepayment> = prepayments.iter().collect();
        deposits.sort_by_key(|p| p.date_time);

        let mut balance = Money::ZERO;
        let mut cursor = 0usize;
        let mut paid = 0u32;
        let mut unpaid = 0u32;
        let mut cancelled = 0u32;

        for &position in &order {
            let due = reconciled[position].date_time;

            // a prepayment dated exactly at the lesson instant applies
            // before the lesson is judged
            while cursor < deposits.len() && deposits[cursor].date_time <= due {
                balance += deposits[cursor].amount;
                events.emit(Event::PrepaymentApplied {
                    prepayment_id: deposits[cursor].id,
                    amount: deposits[cursor].amount,
                    balance,
                });
                cursor += 1;
            }

            let lesson = &mut reconciled[position];
            if lesson.is_cancelled {
                lesson.status = PaymentStatus::Cancelled;
                lesson.remaining_prepayment = balance;
                cancelled += 1;
                events.emit(Event::LessonCancelledInSweep {
                    lesson_id: lesson.id,
                    balance,
                });
            } else if balance >= lesson.payment_amount {
                balance -= lesson.payment_amount;
                lesson.status = PaymentStatus::Paid;
                lesson.remaining_prepayment = balance;
                paid += 1;
                events.emit(Event::LessonPaid {
                    lesson_id: lesson.id,
                    amount: lesson.payment_amount,
                    remaining: balance,
                });
            } else {
                // all-or-nothing: an unpaid lesson leaves the balance intact
                lesson.status = PaymentStatus::Unpaid;
                lesson.remaining_prepayment = balance;
                unpaid += 1;
                events.emit(Event::LessonUnpaid {
                    lesson_id: lesson.id,
                    amount: lesson.payment_amount,
                    balance,
                });
            }

            trace!(lesson = %lesson.id, status = %lesson.status, %balance, "swept lesson");
        }

        debug!(paid, unpaid, cancelled, closing = %balance, "reconciliation completed");
        events.emit(Event::ReconciliationCompleted {
            paid,
            unpaid,
            cancelled,
            closing_balance: balance,
        });

        Ok(reconciled)
    }
}
