/// prepayment ledger - the chronological sweep on raw lesson lists
use lesson_ledger_rs::chrono::{TimeZone, Utc};
use lesson_ledger_rs::{
    EventStore, Event, Lesson, Money, Prepayment, Reconciler, TimeRange,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // log the engine's decisions to stderr
    tracing_subscriber::fmt()
        .with_env_filter("lesson_ledger_rs=debug")
        .init();

    let slot = TimeRange::parse("10:00", "11:00")?;
    let lessons = vec![
        Lesson::manual(
            "Math",
            Money::from_major(1_000),
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            slot,
        )?,
        Lesson::manual(
            "Math",
            Money::from_major(1_000),
            Utc.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).unwrap(),
            slot,
        )?,
        Lesson::manual(
            "Math",
            Money::from_major(1_000),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            slot,
        )?,
    ];

    // 2500 covers two lessons; the third stays owed
    let prepayments = vec![Prepayment::new(
        Money::from_major(2_500),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )?];

    let mut events = EventStore::new();
    let reconciled = Reconciler::new().reconcile(&lessons, &prepayments, &mut events)?;

    for lesson in &reconciled {
        println!(
            "{}: {} (remaining {})",
            lesson.date_time.format("%Y-%m-%d"),
            lesson.status,
            lesson.remaining_prepayment,
        );
    }

    for event in events.take_events() {
        if let Event::ReconciliationCompleted {
            paid,
            unpaid,
            closing_balance,
            ..
        } = event
        {
            println!(
                "swept: {} paid, {} unpaid, {} left on balance",
                paid, unpaid, closing_balance
            );
        }
    }

    Ok(())
}
