use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use reminder_tui::error::Field;
use reminder_tui::{Error, Recurrence, ReminderFields, ReminderId, Store};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn day(offset: u64) -> String {
    (base() + Days::new(offset)).format("%Y-%m-%d").to_string()
}

fn fields_strategy() -> impl Strategy<Value = ReminderFields> {
    (
        0u64..60,
        proptest::option::of((0u32..24, 0u32..60)),
        "[a-z]{1,8}",
        prop::sample::select(Recurrence::ALL.to_vec()),
    )
        .prop_map(|(offset, time, title, rule)| {
            let mut fields = ReminderFields::new(day(offset), title).recurrence(rule);
            if let Some((h, m)) = time {
                fields = fields.time(format!("{h:02}:{m:02}"));
            }
            fields
        })
}

/// Every reminder is filed under its own date exactly once.
fn assert_filed_correctly(store: &Store) {
    let mut seen = std::collections::HashSet::new();
    let mut count = 0;
    for date in store.dates() {
        let bucket = store.get_by_date(date);
        assert!(!bucket.is_empty(), "empty bucket left for {date}");
        for reminder in bucket {
            assert_eq!(reminder.date, date);
            assert!(seen.insert(reminder.id.clone()), "duplicate id {}", reminder.id);
            count += 1;
        }
    }
    assert_eq!(count, store.len());
}

proptest! {
    #[test]
    fn added_reminders_are_retrievable(all in prop::collection::vec(fields_strategy(), 1..30)) {
        let mut store = Store::new();
        let ids: Vec<ReminderId> = all.iter().map(|f| store.add(f).unwrap()).collect();

        prop_assert_eq!(store.len(), all.len());
        for (id, fields) in ids.iter().zip(&all) {
            let reminder = store.get(id).unwrap();
            prop_assert_eq!(reminder.date.format("%Y-%m-%d").to_string(), fields.date.clone());
            prop_assert!(store.get_by_date(reminder.date).iter().any(|r| &r.id == id));
        }
        assert_filed_correctly(&store);
    }

    #[test]
    fn updates_move_between_dates(
        all in prop::collection::vec(fields_strategy(), 1..20),
        moves in prop::collection::vec((any::<prop::sample::Index>(), 0u64..60), 1..20),
    ) {
        let mut store = Store::new();
        let ids: Vec<ReminderId> = all.iter().map(|f| store.add(f).unwrap()).collect();

        for (pick, offset) in moves {
            let id = pick.get(&ids);
            let moved = store.get(id).unwrap().to_fields();
            let moved = ReminderFields { date: day(offset), ..moved };
            store.update(id, &moved).unwrap();
            prop_assert_eq!(store.get(id).unwrap().date, base() + Days::new(offset));
        }

        prop_assert_eq!(store.len(), ids.len());
        assert_filed_correctly(&store);
    }

    #[test]
    fn deleting_everything_empties_the_store(all in prop::collection::vec(fields_strategy(), 0..30)) {
        let mut store = Store::new();
        let ids: Vec<ReminderId> = all.iter().map(|f| store.add(f).unwrap()).collect();

        for id in &ids {
            store.delete(id).unwrap();
            prop_assert!(store.get(id).is_none());
            assert_filed_correctly(&store);
        }
        prop_assert!(store.is_empty());
        prop_assert_eq!(store.dates().count(), 0);
    }
}

#[test]
fn failed_update_leaves_reminder_untouched() {
    let mut store = Store::new();
    let id = store
        .add(&ReminderFields::new("2024-07-10", "Dentist").time("14:30"))
        .unwrap();
    let before = store.get(&id).cloned();

    let bad = ReminderFields::new("2024-07-11", " ").time("25:00");
    match store.update(&id, &bad) {
        Err(Error::Validation(e)) => {
            assert!(e.contains(Field::Title));
            assert!(e.contains(Field::Time));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(store.get(&id).cloned(), before);
    assert!(store.get_by_date(NaiveDate::from_ymd_opt(2024, 7, 11).unwrap()).is_empty());
}

#[test]
fn unknown_ids_are_reported() {
    let mut store = Store::new();
    let ghost = ReminderId::from("ghost");
    assert!(matches!(store.delete(&ghost), Err(Error::NotFound(_))));
    assert!(matches!(
        store.update(&ghost, &ReminderFields::new("2024-07-10", "x")),
        Err(Error::NotFound(_))
    ));
}
