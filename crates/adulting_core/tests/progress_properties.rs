use adulting_core::db::open_db_in_memory;
use adulting_core::{
    decode_profile, encode_profile, flower_growth_for, NoopNotifier, ProfileStore,
    ProgressEngine, SqliteKvRepository, SystemClock, Task, UserProfile,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn task_strategy() -> impl Strategy<Value = Task> {
    ("[a-e]{1,2}", "[A-Za-z ]{0,12}", any::<bool>(), proptest::option::of("[a-z]{3,8}"))
        .prop_map(|(id, title, completed, link)| {
            let task = Task::new(id, title).completed(completed);
            match link {
                Some(link) => task.with_info_link(link),
                None => task,
            }
        })
}

fn unique_tasks() -> impl Strategy<Value = Vec<Task>> {
    proptest::collection::vec(task_strategy(), 0..12).prop_map(|tasks| {
        let mut seen = HashSet::new();
        tasks
            .into_iter()
            .filter(|task| seen.insert(task.id.clone()))
            .collect()
    })
}

fn profile_strategy() -> impl Strategy<Value = UserProfile> {
    (
        unique_tasks(),
        unique_tasks(),
        1u32..60,
        any::<bool>(),
        proptest::option::of(0i64..4_000_000_000_000),
        "[A-Za-z]{0,10}",
    )
        .prop_map(|(tasks, suggested_tasks, current_week, dark_mode, start_ms, name)| {
            let mut profile = UserProfile {
                name,
                level: current_week - 1,
                current_week,
                dark_mode,
                tasks,
                suggested_tasks,
                week_start_date: start_ms
                    .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
                profile_setup_complete: Some(true),
                ..UserProfile::default()
            };
            profile.recompute_growth();
            profile
        })
}

proptest! {
    #[test]
    fn growth_is_floored_percentage_of_both_lists(
        tasks in unique_tasks(),
        suggested in unique_tasks(),
    ) {
        let total = tasks.len() + suggested.len();
        let completed = tasks.iter().chain(suggested.iter()).filter(|task| task.completed).count();
        let expected = if total == 0 { 0 } else { (100 * completed / total) as u8 };

        let growth = flower_growth_for(&tasks, &suggested);
        prop_assert_eq!(growth, expected);
        prop_assert!(growth <= 100);
    }

    #[test]
    fn snapshot_roundtrip_is_stable(profile in profile_strategy()) {
        let encoded = encode_profile(&profile).unwrap();
        let decoded = decode_profile(&encoded).unwrap();
        prop_assert_eq!(&decoded, &profile);
        prop_assert_eq!(encode_profile(&decoded).unwrap(), encoded);
    }

    #[test]
    fn topic_batches_never_duplicate_ids(
        existing in unique_tasks(),
        candidates in proptest::collection::vec(task_strategy(), 0..10),
    ) {
        let conn = open_db_in_memory().unwrap();
        ProfileStore::new(SqliteKvRepository::try_new(&conn).unwrap())
            .save(&UserProfile { tasks: existing.clone(), ..UserProfile::default() })
            .unwrap();
        let mut engine = ProgressEngine::load(
            SqliteKvRepository::try_new(&conn).unwrap(),
            Arc::new(NoopNotifier),
            Arc::new(SystemClock),
        );

        let added = engine.add_tasks_from_topic(&candidates);

        let tasks = &engine.snapshot().tasks;
        let ids: HashSet<_> = tasks.iter().map(|task| task.id.as_str()).collect();
        prop_assert_eq!(ids.len(), tasks.len());
        prop_assert_eq!(tasks.len(), existing.len() + added);
        prop_assert_eq!(&tasks[..existing.len()], &existing[..]);
        prop_assert_eq!(
            engine.snapshot().flower_growth,
            flower_growth_for(tasks, &engine.snapshot().suggested_tasks)
        );
    }

    #[test]
    fn seeding_twice_equals_seeding_once(profile in profile_strategy()) {
        let conn = open_db_in_memory().unwrap();
        ProfileStore::new(SqliteKvRepository::try_new(&conn).unwrap())
            .save(&profile)
            .unwrap();
        let mut engine = ProgressEngine::load(
            SqliteKvRepository::try_new(&conn).unwrap(),
            Arc::new(NoopNotifier),
            Arc::new(SystemClock),
        );

        engine.ensure_suggested_tasks_seeded();
        let once = engine.snapshot().clone();
        prop_assert!(!engine.ensure_suggested_tasks_seeded());
        prop_assert_eq!(engine.snapshot(), &once);
        prop_assert!(!once.suggested_tasks.is_empty());
    }
}
