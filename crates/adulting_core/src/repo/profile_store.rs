//! Profile snapshot persistence.
//!
//! # Responsibility
//! - Encode/decode the full `UserProfile` under the `adultingAppData` key.
//! - Rehydrate with defaults applied once, falling back to a fresh session on
//!   missing or unreadable snapshots.
//!
//! # Invariants
//! - `decode_profile(&encode_profile(p)?)? == p` for every profile the engine
//!   can reach, `profile_setup_complete` excluded, and re-encoding yields
//!   identical bytes.
//! - Rehydrated profiles are normalized and marked as set up, so a snapshot
//!   saved after `login` reloads with `profile_setup_complete == Some(true)`.

use crate::model::profile::UserProfile;
use crate::repo::kv_repo::{KvRepository, RepoError, RepoResult};
use log::{info, warn};

/// Storage key of the profile snapshot.
pub const PROFILE_KEY: &str = "adultingAppData";

/// How a profile was obtained by `ProfileStore::load_or_new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from the stored snapshot.
    Stored,
    /// No snapshot existed; a fresh session was created.
    Fresh,
    /// Snapshot was unreadable; a fresh session replaced it in memory.
    Recovered,
}

/// Snapshot reader/writer over any key/value repository.
pub struct ProfileStore<R: KvRepository> {
    repo: R,
}

impl<R: KvRepository> ProfileStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Reads the stored snapshot strictly.
    ///
    /// # Errors
    /// - `RepoError::InvalidData` when the stored JSON cannot be decoded.
    /// - Storage errors from the underlying repository.
    pub fn read(&self) -> RepoResult<Option<UserProfile>> {
        match self.repo.get(PROFILE_KEY)? {
            Some(raw) => decode_profile(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the snapshot, falling back to `UserProfile::new_session()`.
    ///
    /// Never fails; read and decode problems are logged.
    pub fn load_or_new(&self) -> (UserProfile, LoadSource) {
        match self.read() {
            Ok(Some(profile)) => {
                info!(
                    "event=profile_load module=repo status=ok source=stored week={} growth={}",
                    profile.current_week, profile.flower_growth
                );
                (profile, LoadSource::Stored)
            }
            Ok(None) => {
                info!("event=profile_load module=repo status=ok source=fresh");
                (UserProfile::new_session(), LoadSource::Fresh)
            }
            Err(err) => {
                warn!(
                    "event=profile_load module=repo status=fallback source=recovered error={}",
                    err
                );
                (UserProfile::new_session(), LoadSource::Recovered)
            }
        }
    }

    /// Writes the full snapshot.
    pub fn save(&self, profile: &UserProfile) -> RepoResult<()> {
        let encoded = encode_profile(profile)?;
        self.repo.put(PROFILE_KEY, &encoded)
    }

    /// Deletes the stored snapshot.
    pub fn clear(&self) -> RepoResult<bool> {
        self.repo.remove(PROFILE_KEY)
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }
}

/// Encodes a profile as compact JSON.
pub fn encode_profile(profile: &UserProfile) -> RepoResult<String> {
    serde_json::to_string(profile).map_err(RepoError::Encode)
}

/// Decodes and normalizes a stored profile snapshot.
pub fn decode_profile(raw: &str) -> RepoResult<UserProfile> {
    let mut profile: UserProfile = serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("profile snapshot: {err}")))?;
    let dropped = profile.normalize();
    if dropped > 0 {
        warn!(
            "event=profile_normalize module=repo status=ok dropped_duplicate_tasks={}",
            dropped
        );
    }
    profile.profile_setup_complete = Some(true);
    Ok(profile)
}
