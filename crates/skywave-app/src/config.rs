//! Configuration constants for skywave app services

/// Application metadata
pub mod app {
    /// Application name (used for config directory, etc.)
    pub const NAME: &str = "skywave";
}

/// Provider-related configuration
pub mod providers {
    /// Radio Browser API mirrors, tried in order
    pub const API_ENDPOINTS: &[&str] = &[
        "https://de1.api.radio-browser.info/json",
        "https://fr1.api.radio-browser.info/json",
        "https://nl1.api.radio-browser.info/json",
    ];

    /// Default result limit for directory queries
    pub const DEFAULT_FETCH_LIMIT: usize = 20;
}

/// Player-related configuration
pub mod player {
    /// Initial volume level
    pub const DEFAULT_VOLUME: f32 = 0.7;

    /// Command poll interval for the controller thread (milliseconds)
    pub const POLL_INTERVAL_MS: u64 = 50;
}

/// Persistence file names and limits
pub mod storage {
    /// Snapshot of the station that was last loaded
    pub const SESSION_FILE: &str = "current_station.json";

    /// Cached station list for offline lookup by id or slug
    pub const STATION_CACHE_FILE: &str = "stations_cache.json";

    /// Favorite stations
    pub const FAVORITES_FILE: &str = "favorites.json";

    /// Maximum number of stations kept in the lookup cache
    pub const STATION_CACHE_LIMIT: usize = 100;
}
