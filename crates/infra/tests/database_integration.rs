//! End-to-end coverage for the SQLite activity repository.
//!
//! Each test runs against its own database file so staging, commit, and
//! visibility from a second connection can be checked the way the driver
//! binary uses them.

mod support;

use idletally_core::ActivityRepository;
use idletally_domain::{IdleTallyError, TimeSegment};
use support::{activity_with_hours, at, TestDatabase};

#[test]
fn activities_and_segments_round_trip() {
    let db = TestDatabase::new();
    let mut writing = activity_with_hours("Writing", &[(8, 9), (10, 11)]);
    let mut open = TimeSegment::open_at(at(12, 0, 0));
    open.end_time = at(12, 30, 0);
    writing.time_segments.push(open);

    db.repository.save_activity(&mut writing).unwrap();
    db.repository.save_changes().unwrap();

    let loaded = db.reopen().load_activities().unwrap();
    assert_eq!(loaded, vec![writing.clone()]);
    assert!(loaded[0].time_segments[2].is_open);
    assert!(loaded[0].time_segments.iter().all(|s| s.activity_id == writing.id));
}

#[test]
fn staged_writes_are_invisible_until_commit() {
    let db = TestDatabase::new();
    let other = db.reopen();
    let mut reading = activity_with_hours("Reading", &[(8, 9)]);

    db.repository.save_activity(&mut reading).unwrap();

    assert!(db.repository.has_pending_changes());
    assert!(other.load_activities().unwrap().is_empty());

    db.repository.save_changes().unwrap();

    assert!(!db.repository.has_pending_changes());
    assert_eq!(other.load_activities().unwrap().len(), 1);
}

#[test]
fn updates_keep_ids_and_rewrite_fields() {
    let db = TestDatabase::new();
    let mut activity = activity_with_hours("Draft", &[(8, 9)]);
    db.repository.save_activity(&mut activity).unwrap();
    db.repository.save_changes().unwrap();
    let segment_id = activity.time_segments[0].id;

    activity.name = "Final".to_string();
    activity.time_segments[0].end_time = at(9, 30, 0);
    db.repository.save_activity(&mut activity).unwrap();
    db.repository.save_changes().unwrap();

    let loaded = db.repository.load_activities().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Final");
    assert_eq!(loaded[0].time_segments[0].id, segment_id);
    assert_eq!(loaded[0].time_segments[0].end_time, at(9, 30, 0));
}

#[test]
fn deletes_cascade_to_segments() {
    let db = TestDatabase::new();
    let mut first = activity_with_hours("First", &[(8, 9), (9, 10)]);
    let mut second = activity_with_hours("Second", &[(11, 12)]);
    db.repository.save_activity(&mut first).unwrap();
    db.repository.save_activity(&mut second).unwrap();
    db.repository.save_changes().unwrap();

    db.repository.delete_time_segment(&first.time_segments[0]).unwrap();
    db.repository.delete_activity(&second).unwrap();
    db.repository.save_changes().unwrap();

    let loaded = db.repository.load_activities().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].time_segments, vec![first.time_segments[1].clone()]);
}

#[test]
fn deleting_unsaved_rows_is_not_found() {
    let db = TestDatabase::new();
    let unsaved = activity_with_hours("Never saved", &[(8, 9)]);

    assert!(matches!(
        db.repository.delete_activity(&unsaved),
        Err(IdleTallyError::NotFound(_))
    ));
    assert!(matches!(
        db.repository.delete_time_segment(&unsaved.time_segments[0]),
        Err(IdleTallyError::NotFound(_))
    ));
}

#[test]
fn failed_write_discards_pending_changes() {
    let db = TestDatabase::new();
    let mut kept = activity_with_hours("Kept", &[(8, 9)]);
    db.repository.save_activity(&mut kept).unwrap();
    db.repository.save_changes().unwrap();

    let mut discarded = activity_with_hours("Discarded", &[(10, 11)]);
    db.repository.save_activity(&mut discarded).unwrap();
    let mut ghost = activity_with_hours("Ghost", &[]);
    ghost.id = Some(9_999);
    assert!(db.repository.delete_activity(&ghost).is_err());
    db.repository.save_changes().unwrap();

    let names: Vec<_> =
        db.repository.load_activities().unwrap().into_iter().map(|a| a.name).collect();
    assert_eq!(names, vec!["Kept".to_string()]);
}

#[test]
fn time_segments_are_filtered_by_overlap() {
    let db = TestDatabase::new();
    let mut activity = activity_with_hours("Overlap", &[(6, 7), (8, 10), (13, 14)]);
    db.repository.save_activity(&mut activity).unwrap();
    db.repository.save_changes().unwrap();
    let id = activity.id.unwrap();

    let segments = db.repository.load_time_segments(id, at(9, 0, 0), at(12, 0, 0)).unwrap();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].start_time, at(8, 0, 0));
}

#[test]
fn sub_second_instants_survive_storage() {
    let db = TestDatabase::new();
    let start = at(8, 0, 0) + chrono::Duration::nanoseconds(123_456_789);
    let mut activity = activity_with_hours("Precise", &[]);
    activity.time_segments.push(TimeSegment::closed(start, at(9, 0, 0)));

    db.repository.save_activity(&mut activity).unwrap();
    db.repository.save_changes().unwrap();

    let loaded = db.repository.load_activities().unwrap();
    assert_eq!(loaded[0].time_segments[0].start_time, start);
}
