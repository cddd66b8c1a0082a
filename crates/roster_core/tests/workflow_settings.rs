use roster_core::db::{open_db, open_db_in_memory};
use roster_core::settings::open_settings_db;
use roster_core::{RosterConfig, SettingsError, WorkflowSettings};

#[test]
fn fresh_database_has_every_stage_enabled() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let settings = WorkflowSettings::load(&conn).expect("settings should load");

    assert!(settings.disabled_stages().is_empty());
    assert!(!settings.is_stage_disabled("validation"));
}

#[test]
fn disabled_stages_survive_reopen() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("settings.db");

    {
        let conn = open_db(&path).expect("db should open");
        let mut settings = WorkflowSettings::load(&conn).expect("settings should load");
        assert!(settings
            .set_stage_disabled("validation", true)
            .expect("write should succeed"));
        assert!(settings
            .set_stage_disabled("approval", true)
            .expect("write should succeed"));
        assert!(settings
            .set_stage_disabled("approval", false)
            .expect("write should succeed"));
    }

    let conn = open_db(&path).expect("db should reopen");
    let settings = WorkflowSettings::load(&conn).expect("settings should load");
    assert_eq!(settings.disabled_stages(), vec!["validation"]);
    assert!(settings.is_stage_disabled(" validation "));
    assert!(!settings.is_stage_disabled("approval"));
}

#[test]
fn unchanged_value_reports_no_change() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let mut settings = WorkflowSettings::load(&conn).expect("settings should load");

    assert!(!settings
        .set_stage_disabled("monitoring", false)
        .expect("no-op should succeed"));
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM settings;", [], |row| row.get(0))
        .expect("count should succeed");
    assert_eq!(rows, 0);
}

#[test]
fn invalid_stage_id_is_rejected_without_state_change() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let mut settings = WorkflowSettings::load(&conn).expect("settings should load");

    let err = settings
        .set_stage_disabled("Stage With Spaces", true)
        .expect_err("invalid id must be rejected");
    assert!(matches!(err, SettingsError::InvalidStageId(_)));
    assert!(settings.disabled_stages().is_empty());
}

#[test]
fn failed_write_keeps_previous_state() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let mut settings = WorkflowSettings::load(&conn).expect("settings should load");
    conn.execute_batch("DROP TABLE settings;")
        .expect("drop should succeed");

    let err = settings
        .set_stage_disabled("validation", true)
        .expect_err("write must fail without table");
    assert!(matches!(err, SettingsError::Db(_)));
    assert!(!settings.is_stage_disabled("validation"));
}

#[test]
fn configured_settings_path_is_used() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("configured.db");
    let config = RosterConfig {
        settings_db_path: Some(path.to_string_lossy().into_owned()),
        ..RosterConfig::default()
    };

    let conn = open_settings_db(&config).expect("configured db should open");
    let mut settings = WorkflowSettings::load(&conn).expect("settings should load");
    settings
        .set_stage_disabled("approval", true)
        .expect("write should succeed");

    assert!(path.exists());
}
