// ==========================================
// ConfigManager integration tests
// ==========================================
// Values written to a file database and read back by fresh managers
// ==========================================


use std::time::Duration;

use wellbeing_waitlist::app::AppState;
use wellbeing_waitlist::config::{config_keys, ConfigManager, WaitlistConfig};
use wellbeing_waitlist::logging;

#[test]
fn test_empty_database_yields_defaults() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).expect("Failed to open ConfigManager");

    let config = manager.load_waitlist_config().unwrap();
    assert_eq!(config, WaitlistConfig::default());
}

#[test]
fn test_values_persist_across_managers() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");

    {
        let manager = ConfigManager::new(&db_path).expect("Failed to open ConfigManager");
        manager
            .set_global_config_value(config_keys::DISPATCH_INITIAL_DELAY_SECS, "3")
            .unwrap();
        manager
            .set_global_config_value(config_keys::ESCALATION_SENIOR_AGE, "75")
            .unwrap();
    }

    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_test_config(&conn, config_keys::ESCALATION_HIGH_SCORE_BONUS, "6").unwrap();
    drop(conn);

    let manager = ConfigManager::new(&db_path).expect("Failed to reopen ConfigManager");
    let config = manager.load_waitlist_config().unwrap();
    assert_eq!(config.dispatch.initial_delay, Duration::from_secs(3));
    assert_eq!(config.dispatch.interval, Duration::from_secs(20));
    assert_eq!(config.escalation.senior_age, 75);
    assert_eq!(config.escalation.high_score_bonus, 6);
    assert_eq!(config.escalation.base_step, 5);

    // 75-year-old at 40: base only; 80-year-old at 70: base + high + senior
    assert_eq!(config.escalation.increment(40, 75), 5);
    assert_eq!(config.escalation.increment(70, 80), 13);
}

#[test]
fn test_shrinking_escalation_step_is_rejected() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_test_config(&conn, config_keys::ESCALATION_BASE_STEP, "-20").unwrap();
    drop(conn);

    let state = AppState::new(db_path).expect("Failed to create AppState");
    assert_eq!(state.config.escalation.base_step, 5);

    let api = &state.waitlist_api;
    api.submit("A", 30, "Male", "stroke").unwrap();
    api.submit("B", 30, "Male", "fever").unwrap();
    api.dispatch_next();

    let waiting = api.peek_queue();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].urgency_score, 55);
}

#[test]
fn test_zero_interval_is_rejected() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).expect("Failed to open ConfigManager");
    manager
        .set_global_config_value(config_keys::DISPATCH_INTERVAL_SECS, "0")
        .unwrap();

    let config = manager.get_dispatch_config().unwrap();
    assert_eq!(config.interval, Duration::from_secs(20));
}

#[test]
fn test_oversized_dispatch_durations_fall_back() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).expect("Failed to open ConfigManager");
    manager
        .set_global_config_value(
            config_keys::DISPATCH_INITIAL_DELAY_SECS,
            &u64::MAX.to_string(),
        )
        .unwrap();
    manager
        .set_global_config_value(config_keys::DISPATCH_INTERVAL_SECS, "86401")
        .unwrap();

    let config = manager.get_dispatch_config().unwrap();
    assert_eq!(config.initial_delay, Duration::ZERO);
    assert_eq!(config.interval, Duration::from_secs(20));
}
