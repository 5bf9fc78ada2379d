// ==========================================
// WaitlistApi integration tests
// ==========================================
// Full stack: AppState over a temporary SQLite database
// ==========================================


use wellbeing_waitlist::api::{ApiError, SubmitOutcome};
use wellbeing_waitlist::app::AppState;
use wellbeing_waitlist::config::config_keys;
use wellbeing_waitlist::domain::types::ScoreSource;
use wellbeing_waitlist::engine::DispatchOutcome;
use wellbeing_waitlist::logging;
use wellbeing_waitlist::Patient;

fn accepted(outcome: SubmitOutcome) -> Patient {
    match outcome {
        SubmitOutcome::Accepted(p) => p,
        SubmitOutcome::RejectedDuplicate => panic!("expected acceptance"),
    }
}

fn dispatched(outcome: DispatchOutcome) -> Patient {
    match outcome {
        DispatchOutcome::Dispatched(p) => p,
        DispatchOutcome::Empty => panic!("expected a dispatch"),
    }
}

#[test]
fn test_scoring_scenarios_through_api() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).expect("Failed to create AppState");
    let api = &state.waitlist_api;

    assert_eq!(api.score("chest pain"), 80);
    assert_eq!(api.score("  SEVERE CHEST PAIN "), 90);
    assert_eq!(api.score("gallbladder ache"), 20);
    assert_eq!(api.score(""), 10);

    let detail = api.score_detailed("pain chest");
    assert_eq!(detail.source, ScoreSource::Fuzzy);
    assert_eq!(detail.score, 80);
}

#[test]
fn test_submit_dispatch_and_escalation() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).expect("Failed to create AppState");
    let api = &state.waitlist_api;

    // A: severe chest pain 90, B: fever 50, C: stroke 95
    let a = accepted(api.submit("A", 40, "Male", "severe chest pain").unwrap());
    let b = accepted(api.submit("B", 40, "Female", "fever").unwrap());
    let c = accepted(api.submit("C", 40, "Other", "stroke").unwrap());
    assert_eq!((a.urgency_score, b.urgency_score, c.urgency_score), (90, 50, 95));

    let first = dispatched(api.dispatch_next());
    assert_eq!(first.patient_id, c.patient_id);

    let queue = api.peek_queue_ordered();
    assert_eq!(queue[0].patient_id, a.patient_id);
    assert_eq!(queue[0].urgency_score, 98);
    assert_eq!(queue[1].patient_id, b.patient_id);
    assert_eq!(queue[1].urgency_score, 55);

    // stored state mirrors the queue
    let stored_a = api.get_patient(&a.patient_id).unwrap();
    assert_eq!(stored_a.urgency_score, 98);
    let stored_c = api.get_patient(&c.patient_id).unwrap();
    assert!(stored_c.resolved);

    assert_eq!(api.list_patients(Some(true)).unwrap().len(), 1);
    assert_eq!(api.list_patients(Some(false)).unwrap().len(), 2);
    assert_eq!(api.list_patients(None).unwrap().len(), 3);
}

#[test]
fn test_duplicate_submission_rejected_until_dispatched() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).expect("Failed to create AppState");
    let api = &state.waitlist_api;

    accepted(api.submit("A", 40, "Male", "chest pain").unwrap());
    let again = api.submit("A", 40, "Male", "chest pain").unwrap();
    assert_eq!(again, SubmitOutcome::RejectedDuplicate);
    assert_eq!(api.peek_queue().len(), 1);

    // any differing field is a different request
    accepted(api.submit("A", 41, "Male", "chest pain").unwrap());

    dispatched(api.dispatch_next());
    dispatched(api.dispatch_next());
    assert!(matches!(api.dispatch_next(), DispatchOutcome::Empty));
    accepted(api.submit("A", 40, "Male", "chest pain").unwrap());
}

#[test]
fn test_submit_validates_input() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).expect("Failed to create AppState");
    let api = &state.waitlist_api;

    assert!(matches!(
        api.submit("A", 40, "male", "fever"),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        api.submit("   ", 40, "Male", "fever"),
        Err(ApiError::InvalidInput(_))
    ));

    // blank complaint is accepted at the floor score
    let p = accepted(api.submit("A", 40, "Male", "  ").unwrap());
    assert_eq!(p.urgency_score, 10);
}

#[test]
fn test_resolve_and_delete_by_identity() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).expect("Failed to create AppState");
    let api = &state.waitlist_api;

    let a = accepted(api.submit("A", 40, "Male", "fever").unwrap());
    let b = accepted(api.submit("B", 40, "Male", "cough").unwrap());

    // resolving is not a dispatch: B keeps its score
    let resolved = api.resolve_patient(&a.patient_id).unwrap();
    assert!(resolved.resolved);
    assert_eq!(api.peek_queue().len(), 1);
    assert_eq!(api.peek_queue()[0].urgency_score, b.urgency_score);
    assert!(api.get_patient(&a.patient_id).unwrap().resolved);

    // resolving a record already out of the queue goes straight to storage
    assert!(api.resolve_patient(&a.patient_id).unwrap().resolved);
    assert!(matches!(
        api.resolve_patient("missing"),
        Err(ApiError::NotFound(_))
    ));

    api.delete_patient(&b.patient_id).unwrap();
    assert!(api.peek_queue().is_empty());
    assert!(matches!(api.get_patient(&b.patient_id), Err(ApiError::NotFound(_))));
    assert!(matches!(api.delete_patient(&b.patient_id), Err(ApiError::NotFound(_))));
    assert!(matches!(api.get_patient(""), Err(ApiError::InvalidInput(_))));
}

#[test]
fn test_waiting_patients_survive_restart() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");

    {
        let state = AppState::new(db_path.clone()).expect("Failed to create AppState");
        let api = &state.waitlist_api;
        accepted(api.submit("A", 40, "Male", "fever").unwrap());
        accepted(api.submit("B", 40, "Male", "stroke").unwrap());
        accepted(api.submit("C", 40, "Male", "cough").unwrap());
        dispatched(api.dispatch_next());
    }

    let state = AppState::new(db_path).expect("Failed to reopen AppState");
    let api = &state.waitlist_api;
    let names: Vec<String> = api.peek_queue_ordered().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["A".to_string(), "C".to_string()]);

    // restored entries still participate in dedup
    assert_eq!(
        api.submit("A", 40, "Male", "fever").unwrap(),
        SubmitOutcome::RejectedDuplicate
    );
}

#[test]
fn test_config_overrides_phrase_table_and_escalation() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let table = test_helpers::write_phrase_table(".json", r#"{"kidney stone": 85, "sprain": 30}"#)
        .expect("Failed to write phrase table");

    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_test_config(
        &conn,
        config_keys::PHRASE_TABLE_PATH,
        table.path().to_str().unwrap(),
    )
    .unwrap();
    test_helpers::insert_test_config(&conn, config_keys::ESCALATION_BASE_STEP, "10").unwrap();
    drop(conn);

    let state = AppState::new(db_path).expect("Failed to create AppState");
    let api = &state.waitlist_api;

    assert_eq!(api.score("Kidney Stone"), 85);
    assert_eq!(api.cache_statistics().precomputed_count, 2);
    // built-in phrases are gone; keyword rules apply
    assert_eq!(api.score_detailed("stroke").source, ScoreSource::Keyword);

    accepted(api.submit("A", 30, "Male", "kidney stone").unwrap());
    accepted(api.submit("B", 30, "Male", "sprain").unwrap());
    dispatched(api.dispatch_next());
    assert_eq!(api.peek_queue()[0].urgency_score, 40);
}

#[test]
fn test_seeded_score_is_used_for_submission() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).expect("Failed to create AppState");
    let api = &state.waitlist_api;

    assert!(api.seed_score("gallbladder ache", 65));
    let p = accepted(api.submit("A", 30, "Male", "Gallbladder Ache").unwrap());
    assert_eq!(p.urgency_score, 65);
    assert_eq!(
        api.score_detailed("gallbladder ache").source,
        ScoreSource::Seeded
    );

    let stats = api.cache_statistics();
    assert_eq!(stats.runtime_cache_count, 1);
    assert_eq!(stats.total_cached_problems, stats.precomputed_count + 1);
}
