//! Core domain logic for Adulting 101.
//! This crate is the single source of truth for progress invariants.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use catalog::{seed_suggested_tasks, topic, topics, topics_for_level, InfoTopic};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::profile::{flower_growth_for, FlowerStage, ProfileUpdate, UserProfile};
pub use model::task::{Task, TaskId, TaskList};
pub use notify::{
    DispatchReport, GrowthNotifier, HttpGrowthNotifier, HttpNotifierConfig, NoopNotifier,
    NotifyError,
};
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use repo::profile_store::{decode_profile, encode_profile, LoadSource, ProfileStore, PROFILE_KEY};
pub use service::clock::{Clock, ManualClock, SystemClock};
pub use service::progress_service::{evaluate_week, ProgressEngine, WeekStatus};

use std::sync::Arc;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Builds the growth notifier selected by configuration.
pub fn notifier_from_config(config: &CoreConfig) -> Arc<dyn GrowthNotifier> {
    match &config.notify {
        Some(http) => Arc::new(HttpGrowthNotifier::new(http.clone())),
        None => Arc::new(NoopNotifier),
    }
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
