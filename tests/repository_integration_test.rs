// ==========================================
// PatientRepository integration tests
// ==========================================
// File-backed SQLite, on its own and as the queue's mirror
// ==========================================


use std::sync::Arc;

use wellbeing_waitlist::domain::types::Category;
use wellbeing_waitlist::engine::AdmissionQueue;
use wellbeing_waitlist::repository::{PatientRepository, PersistenceGateway, RepositoryError};
use wellbeing_waitlist::{Patient, PatientIntake};

fn patient(name: &str, age: u32, score: i32) -> Patient {
    Patient::admit(PatientIntake::new(name, age, Category::Female, "fever"), score)
}

#[test]
fn test_save_is_upsert_and_round_trips_fields() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = PatientRepository::new(&db_path).expect("Failed to open repository");

    let mut p = patient("Ana", 34, 50);
    repo.save(&p).unwrap();
    p.urgency_score = 58;
    repo.save(&p).unwrap();

    let all = repo.list_all().unwrap();
    assert_eq!(all.len(), 1);
    let stored = repo.find_by_id(&p.patient_id).unwrap().unwrap();
    assert_eq!(stored.urgency_score, 58);
    assert_eq!(stored.category, Category::Female);
    // stored at microsecond precision
    assert_eq!(
        stored.arrival_time.timestamp_micros(),
        p.arrival_time.timestamp_micros()
    );
    assert!(!stored.resolved);
}

#[test]
fn test_mark_resolved_and_filters() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = PatientRepository::new(&db_path).expect("Failed to open repository");

    let a = patient("A", 30, 40);
    let b = patient("B", 30, 70);
    repo.save(&a).unwrap();
    repo.save(&b).unwrap();

    repo.mark_resolved(&a.patient_id).unwrap();
    let stored = repo.find_by_id(&a.patient_id).unwrap().unwrap();
    assert!(stored.resolved);
    assert!(stored.resolved_at.is_some());

    assert_eq!(repo.list_by_resolved(true).unwrap().len(), 1);
    assert_eq!(repo.list_by_resolved(false).unwrap()[0].patient_id, b.patient_id);

    assert!(matches!(
        repo.mark_resolved("no-such-id"),
        Err(RepositoryError::NotFound { .. })
    ));
}

#[test]
fn test_list_unresolved_orderings() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = PatientRepository::new(&db_path).expect("Failed to open repository");

    let first = patient("first", 30, 20);
    let second = patient("second", 30, 90);
    let third = patient("third", 30, 55);
    for p in [&first, &second, &third] {
        repo.save(p).unwrap();
    }

    let by_arrival: Vec<String> = repo
        .list_unresolved(false)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(by_arrival, vec!["first", "second", "third"]);

    let by_urgency: Vec<String> = repo
        .list_unresolved(true)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(by_urgency, vec!["second", "third", "first"]);
}

#[test]
fn test_delete_reports_whether_a_row_went() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = PatientRepository::new(&db_path).expect("Failed to open repository");

    let p = patient("Ana", 34, 50);
    repo.save(&p).unwrap();
    assert!(repo.delete(&p.patient_id).unwrap());
    assert!(!repo.delete(&p.patient_id).unwrap());
    assert!(repo.find_by_id(&p.patient_id).unwrap().is_none());
}

#[test]
fn test_queue_mirrors_escalation_into_sqlite() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = Arc::new(PatientRepository::new(&db_path).expect("Failed to open repository"));
    let queue = AdmissionQueue::new(repo.clone());

    let young = patient("young", 30, 50);
    let senior_high = patient("senior", 70, 65);
    let top = patient("top", 30, 95);
    queue.insert(young.clone());
    queue.insert(senior_high.clone());
    queue.insert(top.clone());

    let out = queue.extract_max().unwrap();
    assert_eq!(out.patient_id, top.patient_id);

    // a second repository on the same file sees the mirrored state
    let reader = PatientRepository::new(&db_path).expect("Failed to reopen repository");
    assert!(reader.find_by_id(&top.patient_id).unwrap().unwrap().resolved);
    assert_eq!(
        reader.find_by_id(&young.patient_id).unwrap().unwrap().urgency_score,
        55
    );
    assert_eq!(
        reader.find_by_id(&senior_high.patient_id).unwrap().unwrap().urgency_score,
        75
    );
    assert_eq!(reader.list_unresolved(true).unwrap()[0].name, "senior");
}
