//! Progress state engine.
//!
//! # Responsibility
//! - Own the user aggregate for one session and expose every mutation on it.
//! - Derive growth, evaluate week advancement and level progression.
//! - Persist the full snapshot after every mutation, then notify growth.
//!
//! # Invariants
//! - Malformed input is a silent no-op reported through return values.
//! - `flower_growth` matches both task lists after every list mutation;
//!   advancement resets it to `0`.
//! - Persistence failures are logged and never surface to callers.
//! - The notifier is called only after the snapshot write was attempted and
//!   only when committed growth differs from the value before the operation.

use crate::catalog;
use crate::model::profile::{FlowerStage, ProfileUpdate, UserProfile, WEEK_LENGTH_DAYS};
use crate::model::task::{contains_id, Task, TaskId, TaskList};
use crate::model::timestamp::truncate_millis;
use crate::notify::GrowthNotifier;
use crate::repo::kv_repo::KvRepository;
use crate::repo::profile_store::{LoadSource, ProfileStore};
use crate::service::clock::Clock;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::sync::Arc;

/// Week-advancement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekStatus {
    /// Regular tasks are not all done or growth is below 100.
    InProgress,
    /// Work is done; the week window has not elapsed yet.
    ReadyToAdvance { days_passed: i64 },
    /// The week was advanced to `week` by this evaluation.
    Advanced { week: u32 },
}

impl WeekStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::ReadyToAdvance { .. } => "ready_to_advance",
            Self::Advanced { .. } => "advanced",
        }
    }
}

/// Evaluates advancement for `profile` at `now` without mutating it.
///
/// A due week is reported as `ReadyToAdvance` with `days_passed >= 7`;
/// only the engine turns it into `Advanced`.
pub fn evaluate_week(profile: &UserProfile, now: DateTime<Utc>) -> WeekStatus {
    if !profile.all_regular_tasks_completed() || profile.flower_growth != 100 {
        return WeekStatus::InProgress;
    }
    let days_passed = profile.days_passed(now).unwrap_or(0).max(0);
    WeekStatus::ReadyToAdvance { days_passed }
}

/// Single owner of the session aggregate.
pub struct ProgressEngine<R: KvRepository> {
    store: ProfileStore<R>,
    notifier: Arc<dyn GrowthNotifier>,
    clock: Arc<dyn Clock>,
    profile: UserProfile,
    load_source: LoadSource,
}

impl<R: KvRepository> ProgressEngine<R> {
    /// Rehydrates the engine from storage, falling back to a fresh session.
    pub fn load(repo: R, notifier: Arc<dyn GrowthNotifier>, clock: Arc<dyn Clock>) -> Self {
        let store = ProfileStore::new(repo);
        let (profile, load_source) = store.load_or_new();
        Self {
            store,
            notifier,
            clock,
            profile,
            load_source,
        }
    }

    /// Read-only view of the aggregate.
    pub fn snapshot(&self) -> &UserProfile {
        &self.profile
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn store(&self) -> &ProfileStore<R> {
        &self.store
    }

    /// Screen activation: start the week, seed suggestions, re-evaluate and
    /// publish the current growth once.
    pub fn activate(&mut self) -> WeekStatus {
        let now = self.clock.now();
        let started = self.start_week_if_unset(now);
        let seeded = self.seed_suggested_if_empty();
        let status = self.advance_if_due(now);
        if started || seeded || matches!(status, WeekStatus::Advanced { .. }) {
            self.persist("activate");
        }
        self.notifier.growth_changed(self.profile.flower_growth);
        debug!(
            "event=progress_activate module=service status=ok week={} growth={} week_status={}",
            self.profile.current_week,
            self.profile.flower_growth,
            status.as_str()
        );
        status
    }

    /// Flips one task's completion flag.
    ///
    /// Returns `false` when no task with `task_id` exists in `list`.
    pub fn toggle_task(&mut self, task_id: &str, list: TaskList) -> bool {
        let previous_growth = self.profile.flower_growth;
        let Some(task) = self
            .list_mut(list)
            .iter_mut()
            .find(|task| task.id == task_id)
        else {
            return false;
        };
        task.toggle();
        self.after_list_change();
        self.commit("toggle_task", previous_growth);
        true
    }

    /// Appends a new incomplete task with a generated id.
    ///
    /// Returns `None` for titles that are blank after trimming.
    pub fn add_task(&mut self, title: &str) -> Option<TaskId> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let previous_growth = self.profile.flower_growth;
        let task = Task::generated(title);
        let task_id = task.id.clone();
        self.profile.tasks.push(task);
        self.after_list_change();
        self.commit("add_task", previous_growth);
        Some(task_id)
    }

    /// Appends candidates whose id is not yet in the regular list.
    ///
    /// Input order is kept; duplicates inside `candidates` are added once.
    /// Returns the number of tasks added.
    pub fn add_tasks_from_topic(&mut self, candidates: &[Task]) -> usize {
        let previous_growth = self.profile.flower_growth;
        let mut added = 0;
        for candidate in candidates {
            if contains_id(&self.profile.tasks, &candidate.id) {
                continue;
            }
            self.profile.tasks.push(candidate.clone());
            added += 1;
        }
        if added == 0 {
            return 0;
        }
        self.after_list_change();
        self.commit("add_tasks_from_topic", previous_growth);
        added
    }

    /// Adds the tasks of one catalog topic.
    ///
    /// Returns `0` for unknown topics and topics without tasks.
    pub fn add_topic_tasks(&mut self, topic_id: &str) -> usize {
        match catalog::topic(topic_id) {
            Some(topic) => self.add_tasks_from_topic(&topic.tasks),
            None => 0,
        }
    }

    /// Removes one task by id. Returns `false` when absent.
    pub fn remove_task(&mut self, task_id: &str, list: TaskList) -> bool {
        let previous_growth = self.profile.flower_growth;
        let tasks = self.list_mut(list);
        let before = tasks.len();
        tasks.retain(|task| task.id != task_id);
        if tasks.len() == before {
            return false;
        }
        self.after_list_change();
        self.commit("remove_task", previous_growth);
        true
    }

    /// Seeds the starter suggestions into an empty suggested list and
    /// recomputes growth over the enlarged list.
    pub fn ensure_suggested_tasks_seeded(&mut self) -> bool {
        let previous_growth = self.profile.flower_growth;
        if !self.seed_suggested_if_empty() {
            return false;
        }
        self.commit("seed_suggested", previous_growth);
        true
    }

    /// Starts the week at the clock's now when no start date exists.
    pub fn ensure_week_started(&mut self) -> bool {
        let now = self.clock.now();
        if !self.start_week_if_unset(now) {
            return false;
        }
        self.persist("start_week");
        true
    }

    /// Runs the advancement state machine at `now`.
    pub fn try_advance_week(&mut self, now: DateTime<Utc>) -> WeekStatus {
        let previous_growth = self.profile.flower_growth;
        let status = self.advance_if_due(now);
        if matches!(status, WeekStatus::Advanced { .. }) {
            self.commit("advance_week", previous_growth);
        }
        status
    }

    /// Re-evaluates advancement at the clock's now.
    pub fn tick(&mut self) -> WeekStatus {
        let now = self.clock.now();
        self.try_advance_week(now)
    }

    /// Read-only advancement evaluation at the clock's now.
    pub fn week_status(&self) -> WeekStatus {
        evaluate_week(&self.profile, self.clock.now())
    }

    pub fn days_remaining(&self) -> i64 {
        self.profile.days_remaining(self.clock.now())
    }

    pub fn flower_stage(&self) -> FlowerStage {
        self.profile.flower_stage()
    }

    /// Marks the user as logged in under `name`; profile setup restarts.
    ///
    /// Returns `false` for blank names.
    pub fn login(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.profile.is_logged_in = true;
        self.profile.name = name.to_string();
        self.profile.profile_setup_complete = Some(false);
        self.persist("login");
        true
    }

    /// Applies profile-form edits.
    pub fn update_profile(&mut self, update: &ProfileUpdate) {
        update.apply_to(&mut self.profile);
        self.persist("update_profile");
    }

    /// Applies the setup form and marks setup as complete.
    pub fn complete_profile_setup(&mut self, update: &ProfileUpdate) {
        update.apply_to(&mut self.profile);
        self.profile.profile_setup_complete = Some(true);
        self.persist("complete_profile_setup");
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        if self.profile.dark_mode == enabled {
            return;
        }
        self.profile.dark_mode = enabled;
        self.persist("set_dark_mode");
    }

    /// Flips dark mode and returns the new value.
    pub fn toggle_dark_mode(&mut self) -> bool {
        let enabled = !self.profile.dark_mode;
        self.set_dark_mode(enabled);
        enabled
    }

    /// Resets the aggregate to the signed-out state, keeping dark mode.
    pub fn logout(&mut self) {
        let previous_growth = self.profile.flower_growth;
        self.profile = UserProfile::signed_out(self.profile.dark_mode);
        self.commit("logout", previous_growth);
        info!("event=profile_logout module=service status=ok");
    }

    fn list_mut(&mut self, list: TaskList) -> &mut Vec<Task> {
        match list {
            TaskList::Regular => &mut self.profile.tasks,
            TaskList::Suggested => &mut self.profile.suggested_tasks,
        }
    }

    fn after_list_change(&mut self) {
        self.profile.recompute_growth();
        let now = self.clock.now();
        self.advance_if_due(now);
    }

    fn start_week_if_unset(&mut self, now: DateTime<Utc>) -> bool {
        if self.profile.week_start_date.is_some() {
            return false;
        }
        self.profile.week_start_date = Some(truncate_millis(now));
        true
    }

    fn seed_suggested_if_empty(&mut self) -> bool {
        if !self.profile.suggested_tasks.is_empty() {
            return false;
        }
        self.profile.suggested_tasks = catalog::seed_suggested_tasks();
        self.profile.recompute_growth();
        true
    }

    fn advance_if_due(&mut self, now: DateTime<Utc>) -> WeekStatus {
        // Stored dates carry millisecond precision only.
        let now = truncate_millis(now);
        let status = evaluate_week(&self.profile, now);
        let WeekStatus::ReadyToAdvance { days_passed } = status else {
            return status;
        };
        if self.profile.week_start_date.is_none() || days_passed < WEEK_LENGTH_DAYS {
            return status;
        }

        self.profile.current_week = self.profile.current_week.saturating_add(1);
        self.profile.level = self.profile.current_week.saturating_sub(1);
        self.profile.week_start_date = Some(now);
        self.profile.flower_growth = 0;
        info!(
            "event=week_advance module=service status=ok week={} level={} days_passed={}",
            self.profile.current_week, self.profile.level, days_passed
        );
        WeekStatus::Advanced {
            week: self.profile.current_week,
        }
    }

    fn commit(&mut self, action: &'static str, previous_growth: u8) {
        self.persist(action);
        let growth = self.profile.flower_growth;
        if growth != previous_growth {
            self.notifier.growth_changed(growth);
        }
    }

    fn persist(&self, action: &'static str) {
        match self.store.save(&self.profile) {
            Ok(()) => debug!(
                "event=profile_save module=service status=ok action={} growth={} tasks={} suggested={}",
                action,
                self.profile.flower_growth,
                self.profile.tasks.len(),
                self.profile.suggested_tasks.len()
            ),
            Err(err) => error!(
                "event=profile_save module=service status=error action={} error={}",
                action, err
            ),
        }
    }
}
