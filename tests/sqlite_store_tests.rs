#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use timetable_remap::{
    BaseTimetableEntry, CalendarWeekday, LogicalWeekday, MappingStore, MarkerEventGateway,
    ReorderConfigBuilder, SqliteStore, TimetableRepository, parse_arrow_mapping,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monday() -> CalendarWeekday {
    LogicalWeekday::MONDAY.to_calendar()
}

#[test]
fn timetable_round_trip_through_file() {
    let file = NamedTempFile::new().unwrap();
    {
        let store = SqliteStore::new(file.path()).expect("open store");
        store
            .replace_entries(vec![
                BaseTimetableEntry::new(monday(), 2, "English").with_room("204"),
                BaseTimetableEntry::new(monday(), 1, "Math").with_color("#ff0000"),
                BaseTimetableEntry::new(CalendarWeekday::new(0).unwrap(), 1, "Club"),
            ])
            .expect("save timetable");
    }

    let store = SqliteStore::new(file.path()).expect("reopen store");
    let monday_entries = store.fetch_by_weekday(monday()).unwrap();
    assert_eq!(monday_entries.len(), 2);
    assert_eq!(monday_entries[0].subject, "Math");
    assert_eq!(monday_entries[0].color.as_deref(), Some("#ff0000"));
    assert_eq!(monday_entries[1].room.as_deref(), Some("204"));

    let all = store.all_entries().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].subject, "Club");
}

#[test]
fn invalid_timetable_is_rejected() {
    let store = SqliteStore::in_memory().unwrap();
    let duplicate = vec![
        BaseTimetableEntry::new(monday(), 1, "Math"),
        BaseTimetableEntry::new(monday(), 1, "Art"),
    ];
    assert!(store.replace_entries(duplicate).is_err());
    assert!(store
        .replace_entries(vec![BaseTimetableEntry::new(monday(), 10, "Late")])
        .is_err());
    assert!(store.all_entries().unwrap().is_empty());
}

#[test]
fn mapping_rows_round_trip_and_replace_is_idempotent() {
    let file = NamedTempFile::new().unwrap();
    let date = d(2025, 1, 8);
    let configs = ReorderConfigBuilder::new().build("短縮B時程", LogicalWeekday::WEDNESDAY);
    {
        let store = SqliteStore::new(file.path()).unwrap();
        store.replace(date, &configs, "短縮B時程").unwrap();
        store.replace(date, &configs, "短縮B時程").unwrap();
    }

    let store = SqliteStore::new(file.path()).unwrap();
    assert_eq!(store.rows_for_date(date).unwrap().len(), 3);
    assert_eq!(store.configs_for_date(date).unwrap(), configs);

    let mixed = parse_arrow_mapping("月123→月12水3");
    store.replace(date, &mixed, "custom").unwrap();
    let record = store.record(date).unwrap().expect("record");
    assert_eq!(record.pattern_name, "custom");
    assert_eq!(record.rows.len(), 3);
    assert_eq!(store.configs_for_date(date).unwrap(), mixed);
}

#[test]
fn clear_and_special_dates() {
    let store = SqliteStore::in_memory().unwrap();
    let configs = parse_arrow_mapping("月1→火1");
    store.replace(d(2025, 5, 1), &configs, "x").unwrap();
    store.replace(d(2025, 5, 20), &[], "通常時程").unwrap();
    store.replace(d(2025, 6, 2), &configs, "x").unwrap();

    assert_eq!(
        store.special_dates(d(2025, 5, 1), d(2025, 5, 31)).unwrap(),
        vec![d(2025, 5, 1), d(2025, 5, 20)]
    );
    assert!(store.record(d(2025, 5, 20)).unwrap().unwrap().rows.is_empty());

    assert!(store.clear(d(2025, 5, 20)).unwrap());
    assert!(!store.clear(d(2025, 5, 20)).unwrap());
    assert!(store.record(d(2025, 5, 20)).unwrap().is_none());
}

#[test]
fn create_marker_replaces_existing_markers_only() {
    let store = SqliteStore::in_memory().unwrap();
    let date = d(2025, 1, 10);
    store.add_event(date, "Parent meeting").unwrap();
    store.add_event(date, "短縮授業").unwrap();

    let handle = store.create_marker(date, "テスト時程").unwrap();
    let events = store.events_on(date).unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|event| event.title == "Parent meeting"));
    let marker_event = events.iter().find(|event| event.handle == handle).unwrap();
    assert_eq!(marker_event.title, "特殊時程:テスト時程");
    assert!(marker_event.all_day);
    assert_eq!(marker_event.end - marker_event.start, chrono::Duration::days(1));

    let marker = store.find_marker(date).unwrap().expect("marker");
    assert_eq!(marker.pattern_name, "テスト時程");
    assert_eq!(marker.handle, handle);

    store.delete_marker(handle).unwrap();
    assert!(store.find_marker(date).unwrap().is_none());
    assert!(store.delete_marker(handle).is_err());
}

#[test]
fn custom_marker_prefix() {
    let store = SqliteStore::in_memory().unwrap().with_marker_prefix("[remap]");
    let date = d(2025, 1, 10);
    store.create_marker(date, "月1→火1").unwrap();
    let events = store.events_on(date).unwrap();
    assert_eq!(events[0].title, "[remap]月1→火1");
    assert_eq!(store.find_marker(date).unwrap().unwrap().pattern_name, "月1→火1");
}

#[test]
fn engine_over_a_single_sqlite_store() {
    use std::sync::Arc;
    use timetable_remap::ScheduleReconstructor;

    let file = NamedTempFile::new().unwrap();
    let date = d(2025, 1, 6);
    {
        let store = Arc::new(SqliteStore::new(file.path()).unwrap());
        store
            .replace_entries(vec![
                BaseTimetableEntry::new(monday(), 1, "Math"),
                BaseTimetableEntry::new(monday(), 2, "English"),
                BaseTimetableEntry::new(monday(), 3, "Science"),
                BaseTimetableEntry::new(monday(), 4, "History"),
            ])
            .unwrap();
        let engine = ScheduleReconstructor::new(store.clone(), store.clone(), store);
        assert!(engine.apply_special_schedule(date, "短縮B時程", None).unwrap());
        assert!(engine.apply_special_schedule(date, "短縮B時程", None).unwrap());
    }

    let store = Arc::new(SqliteStore::new(file.path()).unwrap());
    assert_eq!(store.rows_for_date(date).unwrap().len(), 3);
    assert_eq!(store.events_on(date).unwrap().len(), 1);

    let engine = ScheduleReconstructor::new(store.clone(), store.clone(), store.clone());
    let entries = engine.effective_schedule(date);
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|entry| entry.is_special));

    assert!(engine.remove_special_schedule(date).unwrap());
    assert!(store.events_on(date).unwrap().is_empty());
    assert_eq!(engine.effective_schedule(date).len(), 4);
}

#[test]
fn concurrent_readers_never_see_a_partial_replace() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteStore::new(file.path()).unwrap();
    let date = d(2025, 1, 8);
    let three = ReorderConfigBuilder::new().build("短縮B時程", LogicalWeekday::WEDNESDAY);
    let five = parse_arrow_mapping("月12345→月123水45");

    std::thread::scope(|scope| {
        for writer in 0..2 {
            let (store, three, five) = (&store, &three, &five);
            scope.spawn(move || {
                for i in 0..50 {
                    if (i + writer) % 2 == 0 {
                        store.replace(date, three, "three").unwrap();
                    } else {
                        store.replace(date, five, "five").unwrap();
                    }
                }
            });
        }
        for _ in 0..4 {
            let store = &store;
            scope.spawn(move || {
                for _ in 0..100 {
                    let rows = store.rows_for_date(date).unwrap();
                    let expected = match rows.len() {
                        0 => continue,
                        3 => "three",
                        5 => "five",
                        other => panic!("observed {other} rows"),
                    };
                    assert!(rows.iter().all(|row| row.pattern_name == expected));
                }
            });
        }
    });

    let record = store.record(date).unwrap().expect("record");
    assert!(record.rows.len() == 3 || record.rows.len() == 5);
}
