use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, trace, warn};

use crate::events::{Event, EventStore};
use crate::types::{Lesson, LessonKey, Subject, WeekdayConvention};

/// outcome of one generation pass
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    /// the full lesson list: passed-through records plus refreshed and
    /// newly created occurrences, in stable order
    pub lessons: Vec<Lesson>,
    pub created: u32,
    pub refreshed: u32,
    pub skipped_subjects: u32,
}

/// expands weekly recurring schedules into dated lesson occurrences
///
/// regeneration is idempotent: occurrences are matched against existing
/// records by (calendar day, subject name, start time) and refreshed in
/// place of being duplicated
pub struct LessonGenerator {
    convention: WeekdayConvention,
}

impl LessonGenerator {
    pub fn new(convention: WeekdayConvention) -> Self {
        Self { convention }
    }

    /// generate with an injected clock
    pub fn generate(
        &self,
        subjects: &[Subject],
        existing: &[Lesson],
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> GenerationOutcome {
        self.generate_at(subjects, existing, time_provider.now(), events)
    }

    /// generate against an explicit "now" instant
    pub fn generate_at(
        &self,
        subjects: &[Subject],
        existing: &[Lesson],
        now: DateTime<Utc>,
        events: &mut EventStore,
    ) -> GenerationOutcome {
        let mut lessons: Vec<Lesson> = existing.to_vec();
        let mut index: HashMap<LessonKey, usize> = lessons
            .iter()
            .enumerate()
            .map(|(position, lesson)| (lesson.key(), position))
            .collect();

        let mut created = 0u32;
        let mut refreshed = 0u32;
        let mut skipped_subjects = 0u32;

        for subject in subjects {
            let (start, end) = match subject.eligibility() {
                Ok(range) => range,
                Err(reason) => {
                    warn!(subject = %subject.name, %reason, "skipping subject");
                    events.emit(Event::SubjectSkipped {
                        subject_id: subject.id,
                        name: subject.name.clone(),
                        reason,
                    });
                    skipped_subjects += 1;
                    continue;
                }
            };

            trace!(subject = %subject.name, %start, %end, "expanding schedule");

            // closed interval, both endpoints included
            for day in start.iter_days().take_while(|d| *d <= end) {
                let plan = subject.schedule.day_for(day, self.convention);
                if !plan.is_active() {
                    continue;
                }

                // ranges stay in the order the user entered them
                for slot in &plan.time_ranges {
                    let date_time = day.and_time(slot.start.to_naive_time()).and_utc();
                    let has_passed = date_time < now;
                    let key = LessonKey {
                        day,
                        subject_name: subject.name.clone(),
                        start: slot.start,
                    };

                    match index.get(&key) {
                        Some(&position) => {
                            let current = &lessons[position];
                            if current.payment_amount != subject.price
                                || current.has_passed != has_passed
                            {
                                // replace with a fresh copy, same identity
                                let mut updated = current.clone();
                                updated.payment_amount = subject.price;
                                updated.has_passed = has_passed;
                                events.emit(Event::LessonRefreshed {
                                    lesson_id: updated.id,
                                    amount: updated.payment_amount,
                                    has_passed,
                                });
                                lessons[position] = updated;
                                refreshed += 1;
                            }
                        }
                        None => {
                            let lesson = Lesson::auto(subject, date_time, slot, has_passed);
                            events.emit(Event::LessonScheduled {
                                lesson_id: lesson.id,
                                subject_name: lesson.subject_name.clone(),
                                date_time,
                                amount: lesson.payment_amount,
                            });
                            index.insert(key, lessons.len());
                            lessons.push(lesson);
                            created += 1;
                        }
                    }
                }
            }
        }

        debug!(created, refreshed, skipped_subjects, "generation completed");
        events.emit(Event::GenerationCompleted {
            created,
            refreshed,
            skipped_subjects,
        });

        GenerationOutcome {
            lessons,
            created,
            refreshed,
            skipped_subjects,
        }
    }
}
