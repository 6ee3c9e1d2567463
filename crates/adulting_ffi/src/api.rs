//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the progress engine to Dart through FRB sync functions.
//! - Map engine state into flat view DTOs.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens the store, rehydrates the engine, applies at most one
//!   operation and returns the resulting view.
//! - Calls are serialized inside the process; the engine has one owner at a
//!   time.

use adulting_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, notifier_from_config,
    open_db, ping as ping_inner, topics, topics_for_level, CoreConfig, GrowthNotifier, InfoTopic,
    ProfileUpdate, ProgressEngine, SqliteKvRepository, SystemClock, Task, TaskList, UserProfile,
    WeekStatus,
};
use log::warn;
use std::sync::{Arc, Mutex, OnceLock};

static CONFIG: OnceLock<CoreConfig> = OnceLock::new();
static NOTIFIER: OnceLock<Arc<dyn GrowthNotifier>> = OnceLock::new();
static ENGINE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One checklist row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub info_link: Option<String>,
}

/// Progress screen projection of the session aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub is_logged_in: bool,
    pub name: String,
    pub level: u32,
    pub current_week: u32,
    /// `0..=100`.
    pub flower_growth: u32,
    /// `seed|sprout|growing|blooming`.
    pub flower_stage: String,
    /// `in_progress|ready_to_advance|advanced`.
    pub week_status: String,
    pub days_remaining: i64,
    /// RFC 3339 with milliseconds, `None` before the first activation.
    pub week_start_date: Option<String>,
    pub dark_mode: bool,
    pub profile_setup_complete: bool,
    pub tasks: Vec<TaskView>,
    pub suggested_tasks: Vec<TaskView>,
}

/// Response envelope for every progress/profile/settings call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressResponse {
    /// `false` when the operation was rejected or the store is unavailable.
    pub ok: bool,
    /// Created task id for `progress_add_task`.
    pub task_id: Option<String>,
    /// Number of tasks added by `progress_add_topic_tasks`.
    pub added_count: u32,
    pub message: String,
    /// `None` only when the store could not be opened.
    pub progress: Option<ProgressView>,
}

/// Info screen topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoTopicView {
    pub id: String,
    pub title: String,
    pub relevant_level: u32,
    pub description: String,
    pub tasks: Vec<TaskView>,
    pub sources: Vec<String>,
}

/// Returns the current aggregate without mutating it.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_snapshot() -> ProgressResponse {
    run("progress_snapshot", |_| Outcome::done("Loaded."))
}

/// Screen activation: starts the week, seeds suggestions, re-evaluates
/// advancement and publishes growth.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_activate() -> ProgressResponse {
    run("progress_activate", |engine| {
        let status = engine.activate();
        Outcome::done(week_message(status))
    })
}

/// Toggles one task; `list` is `tasks` or `suggested`.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_toggle_task(task_id: String, list: String) -> ProgressResponse {
    let Some(list) = TaskList::parse(&list) else {
        return rejected(format!("unknown task list `{}`", list.trim()));
    };
    run("progress_toggle_task", |engine| {
        if engine.toggle_task(task_id.trim(), list) {
            Outcome::done("Task toggled.")
        } else {
            Outcome::rejected("Task not found.")
        }
    })
}

/// Adds one regular task; blank titles are rejected without mutation.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_add_task(title: String) -> ProgressResponse {
    run("progress_add_task", |engine| match engine.add_task(&title) {
        Some(task_id) => Outcome {
            task_id: Some(task_id),
            ..Outcome::done("Task added.")
        },
        None => Outcome::rejected("Task title cannot be empty."),
    })
}

/// Removes one task; `list` is `tasks` or `suggested`.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_remove_task(task_id: String, list: String) -> ProgressResponse {
    let Some(list) = TaskList::parse(&list) else {
        return rejected(format!("unknown task list `{}`", list.trim()));
    };
    run("progress_remove_task", |engine| {
        if engine.remove_task(task_id.trim(), list) {
            Outcome::done("Task removed.")
        } else {
            Outcome::rejected("Task not found.")
        }
    })
}

/// Adds the tasks of one info topic that are not on the list yet.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_add_topic_tasks(topic_id: String) -> ProgressResponse {
    run("progress_add_topic_tasks", |engine| {
        let added = engine.add_topic_tasks(&topic_id);
        Outcome {
            added_count: u32::try_from(added).unwrap_or(u32::MAX),
            ..Outcome::done(format!("Added {added} task(s)."))
        }
    })
}

/// Re-evaluates week advancement at the current time.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_tick() -> ProgressResponse {
    run("progress_tick", |engine| {
        let status = engine.tick();
        Outcome::done(week_message(status))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn settings_set_dark_mode(enabled: bool) -> ProgressResponse {
    run("settings_set_dark_mode", |engine| {
        engine.set_dark_mode(enabled);
        Outcome::done("Theme updated.")
    })
}

/// Logs in under `name`; blank names are rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_login(name: String) -> ProgressResponse {
    run("profile_login", |engine| {
        if engine.login(&name) {
            Outcome::done("Logged in.")
        } else {
            Outcome::rejected("Name cannot be empty.")
        }
    })
}

/// Applies profile-form values; `None` keeps the stored value.
///
/// `complete_setup` additionally marks profile setup as finished.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_update(
    name: Option<String>,
    password: Option<String>,
    age: Option<String>,
    goals: Option<String>,
    complete_setup: bool,
) -> ProgressResponse {
    let update = ProfileUpdate {
        name,
        password,
        age,
        goals,
    };
    run("profile_update", |engine| {
        if complete_setup {
            engine.complete_profile_setup(&update);
        } else {
            engine.update_profile(&update);
        }
        Outcome::done("Profile saved.")
    })
}

/// Resets progress to the signed-out state, keeping the theme.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_logout() -> ProgressResponse {
    run("profile_logout", |engine| {
        engine.logout();
        Outcome::done("Logged out.")
    })
}

/// Lists info topics; `level` filters to topics relevant at that level.
#[flutter_rust_bridge::frb(sync)]
pub fn info_topics(level: Option<u32>) -> Vec<InfoTopicView> {
    let topics = match level {
        Some(level) => topics_for_level(level),
        None => topics(),
    };
    topics.into_iter().map(to_topic_view).collect()
}

struct Outcome {
    ok: bool,
    task_id: Option<String>,
    added_count: u32,
    message: String,
}

impl Outcome {
    fn done(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            task_id: None,
            added_count: 0,
            message: message.into(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            ..Self::done(message)
        }
    }
}

fn run(
    operation: &'static str,
    apply: impl FnOnce(&mut ProgressEngine<SqliteKvRepository<'_>>) -> Outcome,
) -> ProgressResponse {
    // Poisoning only means another call panicked; the store is still usable.
    let _guard = ENGINE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let config = resolve_config();
    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => return unavailable(operation, format!("store open failed: {err}")),
    };
    let repo = match SqliteKvRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => return unavailable(operation, format!("store init failed: {err}")),
    };

    let mut engine = ProgressEngine::load(repo, resolve_notifier(), Arc::new(SystemClock));
    let outcome = apply(&mut engine);
    let progress = to_progress_view(&engine);
    ProgressResponse {
        ok: outcome.ok,
        task_id: outcome.task_id,
        added_count: outcome.added_count,
        message: outcome.message,
        progress: Some(progress),
    }
}

fn rejected(message: String) -> ProgressResponse {
    ProgressResponse {
        ok: false,
        task_id: None,
        added_count: 0,
        message,
        progress: None,
    }
}

fn unavailable(operation: &'static str, message: String) -> ProgressResponse {
    warn!(
        "event=ffi_call module=ffi status=error operation={} error={}",
        operation, message
    );
    rejected(format!("{operation} failed: {message}"))
}

fn resolve_config() -> &'static CoreConfig {
    CONFIG.get_or_init(|| {
        CoreConfig::from_env().unwrap_or_else(|err| {
            warn!(
                "event=config_load module=ffi status=fallback error={}",
                err
            );
            CoreConfig::default()
        })
    })
}

fn resolve_notifier() -> Arc<dyn GrowthNotifier> {
    Arc::clone(NOTIFIER.get_or_init(|| notifier_from_config(resolve_config())))
}

fn week_message(status: WeekStatus) -> String {
    match status {
        WeekStatus::InProgress => "Week in progress.".to_string(),
        WeekStatus::ReadyToAdvance { days_passed } => {
            format!("Week complete; {days_passed} day(s) passed.")
        }
        WeekStatus::Advanced { week } => format!("Advanced to week {week}."),
    }
}

fn to_progress_view(engine: &ProgressEngine<SqliteKvRepository<'_>>) -> ProgressView {
    let profile: &UserProfile = engine.snapshot();
    ProgressView {
        is_logged_in: profile.is_logged_in,
        name: profile.name.clone(),
        level: profile.level,
        current_week: profile.current_week,
        flower_growth: u32::from(profile.flower_growth),
        flower_stage: engine.flower_stage().as_str().to_string(),
        week_status: engine.week_status().as_str().to_string(),
        days_remaining: engine.days_remaining(),
        week_start_date: profile
            .week_start_date
            .as_ref()
            .map(adulting_core::model::timestamp::format),
        dark_mode: profile.dark_mode,
        profile_setup_complete: profile.profile_setup_complete.unwrap_or(false),
        tasks: profile.tasks.iter().map(to_task_view).collect(),
        suggested_tasks: profile.suggested_tasks.iter().map(to_task_view).collect(),
    }
}

fn to_task_view(task: &Task) -> TaskView {
    TaskView {
        id: task.id.clone(),
        title: task.title.clone(),
        completed: task.completed,
        info_link: task.info_link.clone(),
    }
}

fn to_topic_view(topic: InfoTopic) -> InfoTopicView {
    InfoTopicView {
        id: topic.id.to_string(),
        title: topic.title.to_string(),
        relevant_level: topic.relevant_level,
        description: topic.description.to_string(),
        tasks: topic.tasks.iter().map(to_task_view).collect(),
        sources: topic.sources.iter().map(|source| source.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, info_topics, init_logging, ping, profile_login, profile_logout,
        profile_update, progress_activate, progress_add_task, progress_add_topic_tasks,
        progress_remove_task, progress_snapshot, progress_toggle_task, settings_set_dark_mode,
    };
    use std::sync::{Mutex, MutexGuard, Once};

    static TEST_ENV: Once = Once::new();
    static SERIAL: Mutex<()> = Mutex::new(());

    /// Points the store at a private temp file with notifications off.
    fn isolated() -> MutexGuard<'static, ()> {
        TEST_ENV.call_once(|| {
            let dir = std::env::temp_dir().join(format!("adulting-ffi-{}", std::process::id()));
            std::env::set_var("ADULTING_DB_PATH", dir.join("ffi.sqlite3"));
            std::env::set_var("ADULTING_NOTIFY", "off");
        });
        SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn add_then_toggle_updates_growth() {
        let _guard = isolated();
        let added = progress_add_task("  Call the landlord  ".to_string());
        assert!(added.ok, "{}", added.message);
        let task_id = added.task_id.expect("created task id");
        let view = added.progress.expect("progress view");
        let row = view
            .tasks
            .iter()
            .find(|task| task.id == task_id)
            .expect("new task listed");
        assert_eq!(row.title, "Call the landlord");
        assert!(!row.completed);

        let toggled = progress_toggle_task(task_id.clone(), "tasks".to_string());
        assert!(toggled.ok, "{}", toggled.message);
        let view = toggled.progress.expect("progress view");
        assert!(view.tasks.iter().any(|task| task.id == task_id && task.completed));
        assert!(view.flower_growth > 0);
    }

    #[test]
    fn blank_title_and_unknown_list_are_rejected() {
        let _guard = isolated();
        let before = progress_snapshot().progress.expect("progress view");

        let blank = progress_add_task("   ".to_string());
        assert!(!blank.ok);
        assert_eq!(blank.progress.expect("progress view"), before);

        let wrong_list = progress_remove_task("1".to_string(), "archive".to_string());
        assert!(!wrong_list.ok);
        assert!(wrong_list.message.contains("archive"));
    }

    #[test]
    fn activate_seeds_suggestions_and_starts_week() {
        let _guard = isolated();
        progress_logout_for_test();
        let response = progress_activate();
        assert!(response.ok, "{}", response.message);
        let view = response.progress.expect("progress view");
        assert!(view.week_start_date.is_some());
        let ids: Vec<_> = view.suggested_tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["suggested-1", "suggested-2", "suggested-3"]);
    }

    #[test]
    fn topic_tasks_are_added_once() {
        let _guard = isolated();
        progress_logout_for_test();
        let first = progress_add_topic_tasks("taxes".to_string());
        assert_eq!(first.added_count, 3);
        let second = progress_add_topic_tasks("taxes".to_string());
        assert_eq!(second.added_count, 0);
        let unknown = progress_add_topic_tasks("astrology".to_string());
        assert_eq!(unknown.added_count, 0);
    }

    #[test]
    fn logout_keeps_only_dark_mode() {
        let _guard = isolated();
        settings_set_dark_mode(true);
        profile_login("Robin".to_string());
        profile_update(None, None, Some("24".to_string()), None, true);

        let view = profile_logout().progress.expect("progress view");
        assert!(view.dark_mode);
        assert!(view.name.is_empty());
        assert!(view.tasks.is_empty());
        assert!(view.suggested_tasks.is_empty());
        assert_eq!(view.current_week, 1);

        settings_set_dark_mode(false);
    }

    #[test]
    fn login_rejects_blank_names() {
        let _guard = isolated();
        assert!(!profile_login("  ".to_string()).ok);
        let response = profile_login("Alex".to_string());
        assert!(response.ok);
        let view = response.progress.expect("progress view");
        assert_eq!(view.name, "Alex");
        assert!(!view.profile_setup_complete);
    }

    #[test]
    fn info_topics_filter_by_level() {
        assert_eq!(info_topics(None).len(), 5);
        let starter = info_topics(Some(0));
        assert!(starter.iter().all(|topic| topic.relevant_level == 0));
        assert!(starter.iter().any(|topic| topic.id == "wellness" && topic.tasks.is_empty()));
    }

    fn progress_logout_for_test() {
        assert!(profile_logout().ok);
    }
}
