//! Station directory trait
//!
//! The interface every station directory service implements. All calls are
//! fallible; callers decide whether and how to fall back on error.

use crate::data::types::Station;
use crate::error::Result;

use super::types::{CategoryInfo, CountryInfo};

/// A source of radio station listings
pub trait StationDirectory: Send + Sync {
    /// Most popular stations, best first
    fn top_stations(&self, limit: usize) -> Result<Vec<Station>>;

    /// Stations broadcasting from a country
    fn stations_by_country(&self, country: &str, limit: usize) -> Result<Vec<Station>>;

    /// Stations carrying a genre/category tag
    fn stations_by_tag(&self, tag: &str, limit: usize) -> Result<Vec<Station>>;

    /// Free-text search by station name
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Station>>;

    /// Look up a single station by its directory id
    fn station_by_id(&self, id: &str) -> Result<Option<Station>>;

    /// Countries with station counts, largest first
    fn countries(&self, limit: usize) -> Result<Vec<CountryInfo>>;

    /// Genre/category tags with station counts, largest first
    fn categories(&self, limit: usize) -> Result<Vec<CategoryInfo>>;
}
