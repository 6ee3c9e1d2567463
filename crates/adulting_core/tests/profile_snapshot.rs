use adulting_core::db::open_db_in_memory;
use adulting_core::{
    decode_profile, encode_profile, KvRepository, LoadSource, ProfileStore, SqliteKvRepository,
    Task, UserProfile, PROFILE_KEY,
};
use chrono::{TimeZone, Utc};

fn populated_profile() -> UserProfile {
    UserProfile {
        name: "Jordan".to_string(),
        level: 2,
        current_week: 3,
        flower_growth: 66,
        watering_streak: 4,
        last_watered: Some("2026-01-04T18:00:00.000Z".to_string()),
        dark_mode: true,
        tasks: vec![
            Task::new("1", "Complete profile setup").completed(true),
            Task::new("tax-1", "Research your tax code").completed(true),
        ],
        suggested_tasks: vec![Task::new("suggested-1", "Understanding Taxes")
            .with_info_link("taxes")],
        week_start_date: Some(Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap()),
        profile_setup_complete: Some(true),
        age: Some("23".to_string()),
        goals: Some("Move out".to_string()),
        ..UserProfile::default()
    }
}

#[test]
fn snapshot_roundtrip_is_exact() {
    let profile = populated_profile();
    let encoded = encode_profile(&profile).unwrap();
    let decoded = decode_profile(&encoded).unwrap();

    assert_eq!(decoded, profile);
    assert_eq!(encode_profile(&decoded).unwrap(), encoded);
}

#[test]
fn snapshot_uses_camel_case_and_browser_timestamps() {
    let encoded = encode_profile(&populated_profile()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&encoded).unwrap();

    assert_eq!(json["weekStartDate"], "2026-01-05T09:30:00.000Z");
    assert_eq!(json["flowerGrowth"], 66);
    assert_eq!(json["suggestedTasks"][0]["infoLink"], "taxes");
    assert!(json["tasks"][0].get("infoLink").is_none());
    assert!(json.get("password").is_none());
}

#[test]
fn snapshot_written_by_the_web_app_is_accepted() {
    let raw = r#"{
        "isLoggedIn": true,
        "name": "",
        "level": 0,
        "flowerGrowth": 0,
        "wateringStreak": 0,
        "lastWatered": null,
        "darkMode": false,
        "tasks": [{"id": "1", "title": "Complete profile setup", "completed": true}],
        "suggestedTasks": [],
        "weekStartDate": "2026-02-01T07:15:42.123Z",
        "currentWeek": 1,
        "profileSetupComplete": false
    }"#;
    let profile = decode_profile(raw).unwrap();

    assert_eq!(profile.tasks.len(), 1);
    assert_eq!(profile.profile_setup_complete, Some(true));
    let encoded = encode_profile(&profile).unwrap();
    assert!(encoded.contains("\"weekStartDate\":\"2026-02-01T07:15:42.123Z\""));
}

#[test]
fn store_falls_back_to_new_session_when_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = ProfileStore::new(SqliteKvRepository::try_new(&conn).unwrap());

    let (profile, source) = store.load_or_new();
    assert_eq!(source, LoadSource::Fresh);
    assert_eq!(profile, UserProfile::new_session());
}

#[test]
fn store_recovers_from_malformed_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    repo.put(PROFILE_KEY, "{\"tasks\": [oops").unwrap();
    let store = ProfileStore::new(repo);

    let (profile, source) = store.load_or_new();
    assert_eq!(source, LoadSource::Recovered);
    assert_eq!(profile, UserProfile::new_session());
    assert!(store.read().is_err());
}

#[test]
fn store_save_then_load_returns_same_profile() {
    let conn = open_db_in_memory().unwrap();
    let store = ProfileStore::new(SqliteKvRepository::try_new(&conn).unwrap());
    let profile = populated_profile();

    store.save(&profile).unwrap();
    let (loaded, source) = store.load_or_new();
    assert_eq!(source, LoadSource::Stored);
    assert_eq!(loaded, profile);

    assert!(store.clear().unwrap());
    assert_eq!(store.read().unwrap(), None);
}

#[test]
fn rehydration_normalizes_out_of_range_values() {
    let raw = r#"{
        "flowerGrowth": 250,
        "currentWeek": 0,
        "tasks": [
            {"id": "a", "title": "first", "completed": false},
            {"id": "a", "title": "again", "completed": true}
        ]
    }"#;
    let profile = decode_profile(raw).unwrap();

    assert_eq!(profile.flower_growth, 100);
    assert_eq!(profile.current_week, 1);
    assert_eq!(profile.tasks.len(), 1);
    assert_eq!(profile.tasks[0].title, "first");
}

#[test]
fn pending_setup_reloads_as_complete() {
    let profile = UserProfile {
        profile_setup_complete: Some(false),
        ..populated_profile()
    };
    let decoded = decode_profile(&encode_profile(&profile).unwrap()).unwrap();

    assert_eq!(decoded.profile_setup_complete, Some(true));
    assert_eq!(
        UserProfile {
            profile_setup_complete: Some(false),
            ..decoded
        },
        profile
    );
}
