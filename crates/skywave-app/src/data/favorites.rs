//! Favorites management
//!
//! A persisted list of favorite stations, keyed by station id. Order of
//! addition is preserved; every mutation is written through to disk.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::storage::FAVORITES_FILE;
use crate::data::storage;
use crate::data::types::Station;
use crate::error::Result;

/// Favorites file format version for migrations
const FAVORITES_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct FavoritesFile {
    version: u32,
    stations: Vec<Station>,
}

/// Persisted favorite stations
pub struct Favorites {
    path: PathBuf,
    stations: Vec<Station>,
}

impl Favorites {
    /// Load favorites from the default storage location
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(storage::data_path(FAVORITES_FILE)?))
    }

    /// Load favorites from a specific path; absent or malformed files
    /// start an empty list.
    pub fn load_from(path: PathBuf) -> Self {
        let stations = match storage::load_from::<FavoritesFile>(&path) {
            Ok(Some(file)) => file.stations,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable favorites file");
                Vec::new()
            }
        };
        Self { path, stations }
    }

    fn persist(&self) -> Result<()> {
        let file = FavoritesFile {
            version: FAVORITES_VERSION,
            stations: self.stations.clone(),
        };
        storage::save_to(&self.path, &file)
    }

    /// Whether a station id is favorited
    pub fn contains(&self, id: &str) -> bool {
        self.stations.iter().any(|s| s.id == id)
    }

    /// Add or remove a station. Returns true if it was added.
    pub fn toggle(&mut self, station: &Station) -> Result<bool> {
        let added = if let Some(pos) = self.stations.iter().position(|s| s.id == station.id) {
            self.stations.remove(pos);
            false
        } else {
            self.stations.push(station.clone());
            true
        };
        self.persist()?;
        Ok(added)
    }

    /// Remove a station by id, if present
    pub fn remove(&mut self, id: &str) -> Result<Option<Station>> {
        let removed = self
            .stations
            .iter()
            .position(|s| s.id == id)
            .map(|pos| self.stations.remove(pos));
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// All favorites, in order of addition
    pub fn all(&self) -> &[Station] {
        &self.stations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::fs;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_path() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        temp_dir().join(format!("skywave_favorites_test_{}.json", id))
    }

    fn sample(id: &str) -> Station {
        Station::new(id, format!("Station {id}"), format!("http://s.example/{id}"))
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let path = temp_path();
        let mut favs = Favorites::load_from(path.clone());

        assert!(favs.toggle(&sample("a")).unwrap());
        assert!(favs.contains("a"));

        assert!(!favs.toggle(&sample("a")).unwrap());
        assert!(!favs.contains("a"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_favorites_survive_reload() {
        let path = temp_path();
        {
            let mut favs = Favorites::load_from(path.clone());
            favs.toggle(&sample("a")).unwrap();
            favs.toggle(&sample("b")).unwrap();
        }
        let favs = Favorites::load_from(path.clone());
        assert_eq!(favs.all().len(), 2);
        assert!(favs.contains("a"));
        assert!(favs.contains("b"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_order_of_addition_preserved() {
        let path = temp_path();
        let mut favs = Favorites::load_from(path.clone());
        favs.toggle(&sample("z")).unwrap();
        favs.toggle(&sample("a")).unwrap();
        let ids: Vec<&str> = favs.all().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_remove_missing_is_none() {
        let path = temp_path();
        let mut favs = Favorites::load_from(path.clone());
        assert!(favs.remove("ghost").unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_starts_empty() {
        let path = temp_path();
        fs::write(&path, "not json").unwrap();
        let favs = Favorites::load_from(path.clone());
        assert!(favs.all().is_empty());
        let _ = fs::remove_file(&path);
    }
}
