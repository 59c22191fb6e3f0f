//! Session persistence
//!
//! Two durable keys survive restarts: the station that was last loaded
//! (restored at startup without starting playback) and a bounded cache of
//! popular stations used to resolve deep links by id or slug without a
//! network round trip.
//!
//! Malformed files are a cold-start nicety gone wrong, not a failure:
//! they are logged and treated as absent.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use tracing::{debug, warn};

use crate::config::storage::{SESSION_FILE, STATION_CACHE_FILE, STATION_CACHE_LIMIT};
use crate::data::storage;
use crate::data::types::{find_by_slug, Station};
use crate::error::Result;
use crate::player::store::PlayerState;
use crate::providers::StationDirectory;

/// Durable snapshot of the current station
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store over the default session file
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: storage::data_path(SESSION_FILE)?,
        })
    }

    /// Create a store over a specific path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Write the station snapshot, overwriting any previous value
    pub fn save(&self, station: &Station) -> Result<()> {
        storage::save_to(&self.path, station)
    }

    /// Read the snapshot saved by a previous run.
    ///
    /// Absent or malformed snapshots yield `None`; the malformed case is
    /// logged but never surfaced to the user.
    pub fn restore(&self) -> Option<Station> {
        match storage::load_from::<Station>(&self.path) {
            Ok(station) => station,
            Err(e) => {
                warn!(error = %e, "discarding unreadable session snapshot");
                None
            }
        }
    }

    /// Remove the snapshot
    pub fn clear(&self) -> Result<()> {
        storage::delete_at(&self.path)
    }
}

/// Mirror `current_station` changes from the player to the session store.
///
/// Subscribes one-way: only a change of station id triggers a write, so
/// volume and play-state churn never touch the disk.
pub fn spawn_session_writer(
    store: SessionStore,
    updates: Receiver<PlayerState>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("session-writer".to_string())
        .spawn(move || {
            let mut last_id: Option<String> = None;
            for state in updates {
                let Some(station) = &state.current_station else {
                    continue;
                };
                if last_id.as_deref() == Some(station.id.as_str()) {
                    continue;
                }
                if let Err(e) = store.save(station) {
                    warn!(error = %e, "failed to persist current station");
                } else {
                    debug!(station = %station.name, "session snapshot saved");
                }
                last_id = Some(station.id.clone());
            }
        })
        .expect("Failed to spawn session-writer thread")
}

/// Bounded local cache of the station catalog, for id/slug lookup
pub struct StationCache {
    path: PathBuf,
}

impl StationCache {
    /// Create a cache over the default cache file
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: storage::data_path(STATION_CACHE_FILE)?,
        })
    }

    /// Create a cache over a specific path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Replace the cached list, truncated to the configured bound
    pub fn store(&self, stations: &[Station]) -> Result<()> {
        let bounded = &stations[..stations.len().min(STATION_CACHE_LIMIT)];
        storage::save_to(&self.path, &bounded)
    }

    /// Load the cached list; absent or malformed files yield an empty list
    pub fn load(&self) -> Vec<Station> {
        match storage::load_from::<Vec<Station>>(&self.path) {
            Ok(stations) => stations.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "discarding unreadable station cache");
                Vec::new()
            }
        }
    }

    /// Look up a cached station by its directory id
    pub fn find_by_id(&self, id: &str) -> Option<Station> {
        self.load().into_iter().find(|s| s.id == id)
    }

    /// Look up a cached station by its URL-path slug
    pub fn find_by_slug(&self, slug: &str) -> Option<Station> {
        let stations = self.load();
        find_by_slug(&stations, slug).cloned()
    }
}

/// Prime the station cache from the directory on a background thread.
///
/// Failures are logged and otherwise ignored — the cache is an
/// optimization, not a requirement.
pub fn spawn_cache_primer(
    directory: Arc<dyn StationDirectory>,
    cache: StationCache,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("station-cache-primer".to_string())
        .spawn(move || match directory.top_stations(STATION_CACHE_LIMIT) {
            Ok(stations) => {
                if let Err(e) = cache.store(&stations) {
                    warn!(error = %e, "failed to write station cache");
                } else {
                    debug!(count = stations.len(), "station cache primed");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch stations for cache priming");
            }
        })
        .expect("Failed to spawn station-cache-primer thread")
}
