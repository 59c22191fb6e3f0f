//! Radio Browser API provider
//!
//! Implementation of `StationDirectory` for the Radio Browser directory
//! (<https://www.radio-browser.info/>). Several community mirrors serve the
//! same data; every request walks the configured endpoints in order and the
//! first one that answers wins.

use serde::Deserialize;
use tracing::warn;

use crate::config::providers::API_ENDPOINTS;
use crate::data::types::Station;
use crate::error::{AppError, Result};
use crate::network::HttpClient;

use super::traits::StationDirectory;
use super::types::{CategoryInfo, CountryInfo};

/// Countries with fewer stations than this are noise in the listing
const MIN_COUNTRY_STATIONS: usize = 5;

/// Tags with fewer stations than this are noise in the listing
const MIN_CATEGORY_STATIONS: usize = 100;

// =============================================================================
// Wire types (serde)
// =============================================================================

#[derive(Debug, Deserialize)]
struct RbStation {
    stationuuid: String,
    name: String,
    #[serde(default)]
    url_resolved: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    favicon: String,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    language: String,
}

#[derive(Debug, Deserialize)]
struct RbCountry {
    name: String,
    #[serde(default)]
    iso_3166_1: String,
    #[serde(default)]
    stationcount: usize,
}

#[derive(Debug, Deserialize)]
struct RbTag {
    name: String,
    #[serde(default)]
    stationcount: usize,
}

// =============================================================================
// Conversion
// =============================================================================

/// Convert an empty or whitespace-only string to None
fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a comma-separated tag string, preserving order and dropping
/// duplicates and empty entries.
fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',') {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

impl From<RbStation> for Station {
    fn from(rb: RbStation) -> Self {
        // Prefer url_resolved (playlist already unwrapped), fall back to url
        let stream_url = if rb.url_resolved.is_empty() {
            rb.url
        } else {
            rb.url_resolved
        };

        Station {
            id: rb.stationuuid,
            name: rb.name,
            stream_url,
            icon_url: non_empty(&rb.favicon),
            country: non_empty(&rb.country),
            language: non_empty(&rb.language),
            tags: parse_tags(&rb.tags),
        }
    }
}

// =============================================================================
// RadioBrowserDirectory
// =============================================================================

/// Radio Browser directory client
pub struct RadioBrowserDirectory {
    client: HttpClient,
    endpoints: Vec<String>,
}

impl RadioBrowserDirectory {
    /// Create a directory client over the default mirror list
    pub fn new() -> Result<Self> {
        Self::with_endpoints(API_ENDPOINTS.iter().map(|s| s.to_string()).collect())
    }

    /// Create a directory client with custom endpoints (for testing or mirrors)
    pub fn with_endpoints(endpoints: Vec<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            endpoints,
        })
    }

    /// GET `path` against each endpoint in turn until one answers
    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut last_err = None;
        for base in &self.endpoints {
            let url = format!("{base}{path}");
            match self.client.get_json_query::<T>(&url, params) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(endpoint = %base, error = %e, "directory endpoint failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| AppError::Directory("No API endpoints configured".to_string())))
    }

    /// Station search with one filter key (name/country/tag)
    fn search_stations(&self, key: &str, value: &str, limit: usize) -> Result<Vec<Station>> {
        let limit_str = limit.to_string();
        let rb: Vec<RbStation> = self.get_json(
            "/stations/search",
            &[
                (key, value),
                ("limit", &limit_str),
                ("hidebroken", "true"),
                ("order", "clickcount"),
                ("reverse", "true"),
            ],
        )?;
        Ok(rb.into_iter().map(Station::from).collect())
    }
}

impl StationDirectory for RadioBrowserDirectory {
    fn top_stations(&self, limit: usize) -> Result<Vec<Station>> {
        let rb: Vec<RbStation> = self.get_json(&format!("/stations/topvote/{limit}"), &[])?;
        Ok(rb.into_iter().map(Station::from).collect())
    }

    fn stations_by_country(&self, country: &str, limit: usize) -> Result<Vec<Station>> {
        self.search_stations("country", country, limit)
    }

    fn stations_by_tag(&self, tag: &str, limit: usize) -> Result<Vec<Station>> {
        self.search_stations("tag", tag, limit)
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Station>> {
        self.search_stations("name", query, limit)
    }

    fn station_by_id(&self, id: &str) -> Result<Option<Station>> {
        let rb: Vec<RbStation> = self.get_json(&format!("/stations/byuuid/{id}"), &[])?;
        Ok(rb.into_iter().next().map(Station::from))
    }

    fn countries(&self, limit: usize) -> Result<Vec<CountryInfo>> {
        let mut rb: Vec<RbCountry> = self.get_json("/countries", &[])?;
        rb.retain(|c| !c.name.is_empty() && c.stationcount > MIN_COUNTRY_STATIONS);
        rb.sort_by(|a, b| b.stationcount.cmp(&a.stationcount));
        Ok(rb
            .into_iter()
            .take(limit)
            .map(|c| CountryInfo {
                name: c.name,
                code: c.iso_3166_1,
                station_count: c.stationcount,
            })
            .collect())
    }

    fn categories(&self, limit: usize) -> Result<Vec<CategoryInfo>> {
        let mut rb: Vec<RbTag> = self.get_json("/tags", &[])?;
        rb.retain(|t| !t.name.is_empty() && t.stationcount > MIN_CATEGORY_STATIONS);
        rb.sort_by(|a, b| b.stationcount.cmp(&a.stationcount));
        Ok(rb
            .into_iter()
            .take(limit)
            .map(|t| CategoryInfo {
                name: t.name,
                station_count: t.stationcount,
            })
            .collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
