//! Catalog service
//!
//! Front door for everything that lists stations. Wraps a `StationDirectory`
//! with the fallback policy: if the directory errors out or comes back
//! empty, serve the built-in data (filtered to match the request) instead of
//! surfacing an error to every browsing surface.

use std::sync::Arc;

use tracing::warn;

use crate::data::types::Station;

use super::fallback::{fallback_categories, fallback_countries, fallback_stations};
use super::traits::StationDirectory;
use super::types::{CategoryInfo, CountryInfo};

/// Station catalog with built-in fallback data
pub struct Catalog {
    directory: Arc<dyn StationDirectory>,
}

impl Catalog {
    pub fn new(directory: Arc<dyn StationDirectory>) -> Self {
        Self { directory }
    }

    fn stations_or_fallback<F>(
        &self,
        what: &str,
        result: crate::error::Result<Vec<Station>>,
        fallback_filter: F,
    ) -> Vec<Station>
    where
        F: Fn(&Station) -> bool,
    {
        match result {
            Ok(stations) if !stations.is_empty() => stations,
            Ok(_) => fallback_stations().into_iter().filter(|s| fallback_filter(s)).collect(),
            Err(e) => {
                warn!(error = %e, what, "directory request failed, using fallback data");
                fallback_stations().into_iter().filter(|s| fallback_filter(s)).collect()
            }
        }
    }

    /// Most popular stations
    pub fn top_stations(&self, limit: usize) -> Vec<Station> {
        self.stations_or_fallback("top stations", self.directory.top_stations(limit), |_| true)
    }

    /// Stations broadcasting from a country
    pub fn stations_by_country(&self, country: &str, limit: usize) -> Vec<Station> {
        self.stations_or_fallback(
            "stations by country",
            self.directory.stations_by_country(country, limit),
            |s| {
                s.country
                    .as_deref()
                    .is_some_and(|c| c == country || c.contains(country))
            },
        )
    }

    /// Stations carrying a genre tag
    pub fn stations_by_tag(&self, tag: &str, limit: usize) -> Vec<Station> {
        let tag_lower = tag.to_lowercase();
        self.stations_or_fallback(
            "stations by tag",
            self.directory.stations_by_tag(tag, limit),
            |s| s.tags.iter().any(|t| t.to_lowercase() == tag_lower),
        )
    }

    /// Free-text station search
    pub fn search(&self, query: &str, limit: usize) -> Vec<Station> {
        let query_lower = query.to_lowercase();
        self.stations_or_fallback("search", self.directory.search(query, limit), |s| {
            s.name.to_lowercase().contains(&query_lower)
                || s.country
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&query_lower))
        })
    }

    /// Look up a single station by directory id
    pub fn station_by_id(&self, id: &str) -> Option<Station> {
        match self.directory.station_by_id(id) {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "directory lookup failed, checking fallback data");
                fallback_stations().into_iter().find(|s| s.id == id)
            }
        }
    }

    /// Countries with station counts
    pub fn countries(&self, limit: usize) -> Vec<CountryInfo> {
        match self.directory.countries(limit) {
            Ok(countries) if !countries.is_empty() => countries,
            Ok(_) => fallback_countries(),
            Err(e) => {
                warn!(error = %e, "country listing failed, using fallback data");
                fallback_countries()
            }
        }
    }

    /// Genre/category tags with station counts
    pub fn categories(&self, limit: usize) -> Vec<CategoryInfo> {
        match self.directory.categories(limit) {
            Ok(categories) if !categories.is_empty() => categories,
            Ok(_) => fallback_categories(),
            Err(e) => {
                warn!(error = %e, "category listing failed, using fallback data");
                fallback_categories()
            }
        }
    }
}
