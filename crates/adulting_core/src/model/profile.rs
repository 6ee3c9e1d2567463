//! User profile aggregate and derived progress math.
//!
//! # Responsibility
//! - Define the single snapshot persisted under `adultingAppData`.
//! - Apply defaults once, at construction or rehydration.
//! - Provide the pure growth and week-window calculations the engine uses.
//!
//! # Invariants
//! - `flower_growth == flower_growth_for(&tasks, &suggested_tasks)` after every
//!   list mutation; week advancement resets it to `0` by rule.
//! - `current_week >= 1` and `flower_growth <= 100` after `normalize()`.
//! - Task ids are unique within each list after `normalize()`.

use crate::model::task::{completed_count, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Length of one progress week in days.
pub const WEEK_LENGTH_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// The user aggregate owned by the progress engine.
///
/// Optional fields stay `None` (and are omitted from JSON) when the stored
/// snapshot never carried them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub is_logged_in: bool,
    pub name: String,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_level: Option<u32>,
    pub flower_growth: u8,
    pub watering_streak: u32,
    /// Opaque pass-through value; the engine never interprets it.
    pub last_watered: Option<String>,
    pub dark_mode: bool,
    pub tasks: Vec<Task>,
    pub suggested_tasks: Vec<Task>,
    #[serde(with = "crate::model::timestamp::option")]
    pub week_start_date: Option<DateTime<Utc>>,
    pub current_week: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_setup_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            is_logged_in: true,
            name: String::new(),
            level: 0,
            current_level: None,
            flower_growth: 0,
            watering_streak: 0,
            last_watered: None,
            dark_mode: false,
            tasks: Vec::new(),
            suggested_tasks: Vec::new(),
            week_start_date: None,
            current_week: 1,
            profile_setup_complete: None,
            password: None,
            age: None,
            goals: None,
        }
    }
}

impl UserProfile {
    /// First-run aggregate with the onboarding checklist pre-filled.
    pub fn new_session() -> Self {
        let mut profile = Self {
            tasks: starter_tasks(),
            suggested_tasks: starter_suggested_tasks(),
            profile_setup_complete: Some(true),
            ..Self::default()
        };
        profile.recompute_growth();
        profile
    }

    /// Aggregate after logout: blank lists, only the theme preference kept.
    pub fn signed_out(dark_mode: bool) -> Self {
        Self {
            dark_mode,
            profile_setup_complete: Some(true),
            ..Self::default()
        }
    }

    /// Recomputes `flower_growth` from both task lists.
    pub fn recompute_growth(&mut self) {
        self.flower_growth = flower_growth_for(&self.tasks, &self.suggested_tasks);
    }

    /// Returns whether every regular task is done and the list is non-empty.
    pub fn all_regular_tasks_completed(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|task| task.completed)
    }

    /// Clamps numeric fields and drops duplicate task ids (first wins).
    ///
    /// Returns the number of dropped duplicate tasks.
    pub fn normalize(&mut self) -> usize {
        self.flower_growth = self.flower_growth.min(100);
        self.current_week = self.current_week.max(1);
        dedup_by_id(&mut self.tasks) + dedup_by_id(&mut self.suggested_tasks)
    }

    /// Whole days elapsed since the week started, floored.
    ///
    /// Returns `None` when the week has not started yet. Negative when `now`
    /// precedes the start date.
    pub fn days_passed(&self, now: DateTime<Utc>) -> Option<i64> {
        self.week_start_date.map(|start| days_between(start, now))
    }

    /// Days left in the current week, never negative; a full week when unset.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        match self.days_passed(now) {
            Some(days) => (WEEK_LENGTH_DAYS - days).max(0),
            None => WEEK_LENGTH_DAYS,
        }
    }

    /// Visual stage for the current growth value.
    pub fn flower_stage(&self) -> FlowerStage {
        FlowerStage::from_growth(self.flower_growth)
    }
}

/// Partial profile-form input; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
    pub age: Option<String>,
    pub goals: Option<String>,
}

impl ProfileUpdate {
    /// Applies the form values to `profile`.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = name.trim().to_string();
        }
        if let Some(password) = &self.password {
            profile.password = Some(password.clone());
        }
        if let Some(age) = &self.age {
            profile.age = Some(age.trim().to_string());
        }
        if let Some(goals) = &self.goals {
            profile.goals = Some(goals.trim().to_string());
        }
    }
}

/// Flower rendering stage derived from growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowerStage {
    Seed,
    Sprout,
    Growing,
    Blooming,
}

impl FlowerStage {
    /// `<25` seed, `<50` sprout, `<75` growing, otherwise blooming.
    pub fn from_growth(growth: u8) -> Self {
        match growth {
            0..=24 => Self::Seed,
            25..=49 => Self::Sprout,
            50..=74 => Self::Growing,
            _ => Self::Blooming,
        }
    }

    /// Numeric stage (`0..=3`) sent to the display device.
    pub fn state_value(self) -> u8 {
        match self {
            Self::Seed => 0,
            Self::Sprout => 1,
            Self::Growing => 2,
            Self::Blooming => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Sprout => "sprout",
            Self::Growing => "growing",
            Self::Blooming => "blooming",
        }
    }
}

/// `floor(100 * completed / total)` across both lists, `0` for empty lists.
pub fn flower_growth_for(tasks: &[Task], suggested_tasks: &[Task]) -> u8 {
    let total = tasks.len() + suggested_tasks.len();
    if total == 0 {
        return 0;
    }
    let completed = completed_count(tasks) + completed_count(suggested_tasks);
    // completed <= total, so the quotient is within 0..=100.
    ((completed * 100) / total) as u8
}

fn days_between(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

fn dedup_by_id(tasks: &mut Vec<Task>) -> usize {
    let before = tasks.len();
    let mut seen = HashSet::new();
    tasks.retain(|task| seen.insert(task.id.clone()));
    before - tasks.len()
}

fn starter_tasks() -> Vec<Task> {
    vec![
        Task::new("1", "Complete profile setup").completed(true),
        Task::new("2", "Learn about tax basics").with_info_link("taxes"),
        Task::new("3", "Set up bank account documents"),
        Task::new("4", "Understanding your first payslip").with_info_link("payslip"),
        Task::new("5", "Create a monthly budget"),
    ]
}

fn starter_suggested_tasks() -> Vec<Task> {
    vec![
        Task::new("6", "Schedule a doctor's appointment"),
        Task::new("7", "Organize your closet"),
        Task::new("8", "Plan a weekend getaway"),
    ]
}
