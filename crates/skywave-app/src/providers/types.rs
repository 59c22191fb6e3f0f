//! Shared provider types

use serde::{Deserialize, Serialize};

/// A country with its station count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    pub name: String,
    /// ISO 3166-1 alpha-2 code
    pub code: String,
    pub station_count: usize,
}

/// A genre/category with its station count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub station_count: usize,
}
