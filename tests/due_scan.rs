use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proptest::prelude::*;
use reminder_tui::scheduler::{due_at, shared};
use reminder_tui::{Notification, Recurrence, ReminderFields, Scheduler, Store};
use tokio::sync::{mpsc, watch};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn store_with(fields: &[ReminderFields]) -> Store {
    let mut store = Store::new();
    for f in fields {
        store.add(f).unwrap();
    }
    store
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

#[test]
fn scanning_twice_gives_the_same_answer() {
    let store = store_with(&[
        ReminderFields::new("2024-07-10", "Dentist").time("14:30"),
        ReminderFields::new("2024-06-10", "Rent").time("14:30").recurrence(Recurrence::Monthly),
        ReminderFields::new("2024-07-10", "Lunch").time("12:00"),
    ]);
    let now = at("2024-07-10 14:30:05");

    let first = due_at(&store, now);
    let second = due_at(&store, now);
    assert_eq!(first, second);
    let titles: Vec<&str> = first.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, ["Dentist", "Rent"]);
}

#[test]
fn nothing_fires_after_the_end_date() {
    let store = store_with(&[
        ReminderFields::new("2024-07-01", "Stretch")
            .time("08:00")
            .recurrence(Recurrence::Daily)
            .end_date("2024-07-20"),
        ReminderFields::new("2024-01-15", "Invoice")
            .time("08:00")
            .recurrence(Recurrence::Monthly)
            .end_date("2024-03-01"),
    ]);

    assert!(due_at(&store, at("2024-07-21 08:00:00")).is_empty());
    assert!(due_at(&store, at("2024-04-15 08:00:00")).is_empty());

    let february = due_at(&store, at("2024-02-15 08:00:00"));
    assert_eq!(february.len(), 1);
    assert_eq!(february[0].title, "Invoice");
    assert!(february[0].is_recurring);
    assert_eq!(february[0].original_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn daily_and_weekly_after_their_anchor_stay_quiet() {
    // The next occurrence of a started daily or weekly rule is always
    // strictly after the scan date, so the scan never matches it.
    let store = store_with(&[
        ReminderFields::new("2024-07-01", "Stretch").time("08:00").recurrence(Recurrence::Daily),
        ReminderFields::new("2024-07-03", "Bins").time("08:00").recurrence(Recurrence::Weekly),
    ]);
    assert!(due_at(&store, at("2024-07-10 08:00:00")).is_empty());
    assert!(due_at(&store, at("2024-07-03 08:00:00")).is_empty());
}

proptest! {
    #[test]
    fn minute_spaced_scans_fire_once(hour in 0u32..24, minute in 0u32..60, second in 0i64..60) {
        let store = store_with(&[
            ReminderFields::new("2024-07-10", "Call").time(format!("{hour:02}:{minute:02}")),
        ]);
        let start = at("2024-07-10 00:00:00") + TimeDelta::seconds(second);

        let fired: usize = (0..24 * 60)
            .map(|i| due_at(&store, start + TimeDelta::minutes(i)).len())
            .sum();
        prop_assert_eq!(fired, 1);
    }
}

fn paused_clock(base: NaiveDateTime) -> impl Fn() -> NaiveDateTime + Send + Sync + 'static {
    let start = tokio::time::Instant::now();
    move || TimeDelta::from_std(start.elapsed()).map_or(base, |d| base + d)
}

#[tokio::test(start_paused = true)]
async fn run_delivers_a_due_reminder_once() {
    let store = shared(store_with(&[ReminderFields::new("2024-07-10", "Dentist").time("09:00")]));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(store, tx)
        .with_period(Duration::from_secs(60))
        .with_clock(paused_clock(at("2024-07-10 08:58:30")));

    let (stop, signal) = watch::channel(false);
    let task = tokio::spawn(scheduler.run(signal));

    tokio::time::sleep(Duration::from_secs(290)).await;
    stop.send(true).unwrap();
    task.await.unwrap();

    let got = drain(&mut rx);
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].title, "Dentist");
    assert_eq!(got[0].message(), "Reminder: Dentist at 09:00");
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_later_scans() {
    let store = shared(store_with(&[ReminderFields::new("2024-07-10", "Dentist").time("09:00")]));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(store, tx)
        .with_period(Duration::from_secs(60))
        .with_clock(paused_clock(at("2024-07-10 08:57:30")));

    let (stop, signal) = watch::channel(false);
    let task = tokio::spawn(scheduler.run(signal));

    tokio::time::sleep(Duration::from_secs(90)).await;
    stop.send(true).unwrap();
    task.await.unwrap();

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn run_sees_reminders_added_while_running() {
    let store = shared(Store::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(store.clone(), tx)
        .with_period(Duration::from_secs(60))
        .with_clock(paused_clock(at("2024-07-10 08:55:10")));

    let (stop, signal) = watch::channel(false);
    let task = tokio::spawn(scheduler.run(signal));

    tokio::time::sleep(Duration::from_secs(30)).await;
    store
        .lock()
        .unwrap()
        .add(&ReminderFields::new("2024-07-10", "Late add").time("08:57"))
        .unwrap();

    tokio::time::sleep(Duration::from_secs(240)).await;
    stop.send(true).unwrap();
    task.await.unwrap();

    let titles: Vec<String> = drain(&mut rx).into_iter().map(|n| n.title).collect();
    assert_eq!(titles, ["Late add"]);
}

#[tokio::test(start_paused = true)]
async fn run_ends_when_the_receiver_is_gone() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    let scheduler = Scheduler::new(shared(Store::new()), tx)
        .with_clock(paused_clock(at("2024-07-10 09:00:00")));

    let (_stop, signal) = watch::channel(false);
    tokio::time::timeout(Duration::from_secs(3600), scheduler.run(signal))
        .await
        .expect("scheduler should exit on its own");
}

#[test]
fn spawned_scheduler_stops_promptly() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let handle = Scheduler::new(shared(Store::new()), tx).spawn().unwrap();
    let started = std::time::Instant::now();
    handle.stop();
    assert!(started.elapsed() < Duration::from_secs(5));
}
