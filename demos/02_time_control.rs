/// time control - deterministic runs with a controlled clock and the
/// debounced refresh path
use lesson_ledger_rs::chrono::{Duration, NaiveDate, TimeZone, Utc};
use lesson_ledger_rs::{
    DaySchedule, LedgerConfig, Money, SafeTimeProvider, Subject, TimeRange, TimeSource, TutorBook,
    WeeklySchedule,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // create controlled time for testing
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let mut book = TutorBook::new(LedgerConfig::standard())?;
    book.upsert_subject(Subject::new(
        "Physics",
        Money::from_major(1_200),
        90,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        WeeklySchedule::empty().with_day(
            3, // thursdays
            DaySchedule::with_ranges(vec![TimeRange::parse("16:00", "17:30")?]),
        ),
    )?)?;
    book.add_prepayment(
        Money::from_major(3_000),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )?;

    // three rapid edits arm the debounce timer three times; only the
    // final deadline fires
    book.schedule_refresh(&time);
    book.schedule_refresh(&time);
    book.schedule_refresh(&time);
    assert!(!book.poll_refresh(&time)?);

    controller.advance(Duration::milliseconds(400));
    assert!(book.poll_refresh(&time)?);
    println!(
        "reconciled at {}: {} lessons, {} passed",
        time.now().format("%Y-%m-%d %H:%M"),
        book.stats().total_lessons,
        book.stats().completed_lessons,
    );

    // two weeks later the same book sees more lessons in the past
    controller.advance(Duration::days(14));
    book.refresh(&time)?;
    println!(
        "reconciled at {}: {} lessons, {} passed, debt {}",
        time.now().format("%Y-%m-%d %H:%M"),
        book.stats().total_lessons,
        book.stats().completed_lessons,
        book.stats().debt(),
    );

    Ok(())
}
