//! Static fallback data
//!
//! A small built-in slice of the directory, served when every API mirror is
//! unreachable so browsing still shows something playable.

use crate::data::types::Station;

use super::types::{CategoryInfo, CountryInfo};

/// Built-in stations for when the directory is unreachable
pub fn fallback_stations() -> Vec<Station> {
    vec![
        Station::new(
            "fallback-1",
            "Radio Congo",
            "https://streamingv2.shoutcast.com/radio-congo",
        )
        .with_origin(Some("Congo".to_string()), Some("French".to_string()))
        .with_tags(vec!["news".to_string(), "music".to_string()]),
        Station::new(
            "fallback-2",
            "DRC FM",
            "https://streamingv2.shoutcast.com/drc-fm",
        )
        .with_origin(
            Some("Democratic Republic of the Congo".to_string()),
            Some("French".to_string()),
        )
        .with_tags(vec!["news".to_string(), "talk".to_string()]),
        Station::new(
            "fallback-3",
            "France Info",
            "https://direct.franceinfo.fr/live/franceinfo-midfi.mp3",
        )
        .with_origin(Some("France".to_string()), Some("French".to_string()))
        .with_tags(vec!["news".to_string()]),
        Station::new(
            "fallback-4",
            "BBC World Service",
            "https://stream.live.vc.bbcmedia.co.uk/bbc_world_service",
        )
        .with_origin(Some("United Kingdom".to_string()), Some("English".to_string()))
        .with_tags(vec!["news".to_string()]),
        Station::new(
            "fallback-5",
            "CNN Radio",
            "https://tunein.com/cnn/",
        )
        .with_origin(Some("United States".to_string()), Some("English".to_string()))
        .with_tags(vec!["news".to_string()]),
    ]
}

/// Built-in country listing
pub fn fallback_countries() -> Vec<CountryInfo> {
    [
        ("Congo", "CG", 10),
        ("Democratic Republic of the Congo", "CD", 15),
        ("France", "FR", 500),
        ("United States", "US", 1000),
        ("United Kingdom", "GB", 400),
        ("Germany", "DE", 300),
        ("Canada", "CA", 200),
        ("Australia", "AU", 150),
        ("Brazil", "BR", 180),
        ("Japan", "JP", 120),
    ]
    .iter()
    .map(|&(name, code, station_count)| CountryInfo {
        name: name.to_string(),
        code: code.to_string(),
        station_count,
    })
    .collect()
}

/// Built-in category listing
pub fn fallback_categories() -> Vec<CategoryInfo> {
    [
        ("News", 500),
        ("Music", 2000),
        ("Talk", 300),
        ("Sports", 150),
        ("Culture", 100),
        ("Pop", 400),
        ("Rock", 350),
        ("Jazz", 200),
        ("Classical", 180),
        ("Hip Hop", 250),
    ]
    .iter()
    .map(|&(name, station_count)| CategoryInfo {
        name: name.to_string(),
        station_count,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_stations_are_complete() {
        let stations = fallback_stations();
        assert_eq!(stations.len(), 5);
        for station in &stations {
            assert!(!station.id.is_empty());
            assert!(!station.stream_url.is_empty());
            assert!(!station.tags.is_empty());
        }
    }

    #[test]
    fn test_fallback_ids_are_unique() {
        let stations = fallback_stations();
        let mut ids: Vec<_> = stations.iter().map(|s| &s.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), stations.len());
    }

    #[test]
    fn test_fallback_countries_and_categories_nonempty() {
        assert_eq!(fallback_countries().len(), 10);
        assert_eq!(fallback_categories().len(), 10);
    }
}
