/// quick start - minimal example to get started
use lesson_ledger_rs::{
    DaySchedule, LedgerConfig, Money, SafeTimeProvider, Subject, TimeRange, TimeSource, TutorBook,
    WeeklySchedule,
};
use lesson_ledger_rs::chrono::{NaiveDate, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut book = TutorBook::new(LedgerConfig::standard())?;

    // a Math course, 1000 per lesson, mondays 10:00-11:00 for two weeks
    let subject = Subject::new(
        "Math",
        Money::from_major(1_000),
        60,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
        WeeklySchedule::empty().with_day(
            0,
            DaySchedule::with_ranges(vec![TimeRange::parse("10:00", "11:00")?]),
        ),
    )?;
    book.upsert_subject(subject)?;

    // the student prepays 2500 up front
    book.add_prepayment(
        Money::from_major(2_500),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )?;

    // expand the schedule and settle the ledger
    book.refresh(&time)?;

    for lesson in &book.state.lessons {
        println!(
            "{} {} {} -> {} (remaining {})",
            lesson.date_time.format("%Y-%m-%d"),
            lesson.start_time,
            lesson.subject_name,
            lesson.status,
            lesson.remaining_prepayment,
        );
    }

    // print current state
    println!("{}", book.view().to_json_pretty()?);

    Ok(())
}
