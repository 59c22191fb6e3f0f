//! Data persistence
//!
//! Session snapshots, the station lookup cache, favorites, and the JSON
//! storage layer underneath them.

pub mod favorites;
pub mod session;
pub mod storage;
pub mod types;

pub use favorites::Favorites;
pub use session::{spawn_cache_primer, spawn_session_writer, SessionStore, StationCache};
pub use types::{find_by_slug, station_slug, Station};
