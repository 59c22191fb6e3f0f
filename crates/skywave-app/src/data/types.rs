//! Common data types for the station catalog and persistence

use serde::{Deserialize, Serialize};

/// A radio station with its directory metadata.
///
/// Supplied by a station directory (or restored from disk) and treated as
/// immutable by the player; the stream URL in particular is untrusted and
/// may point at an unreachable or invalid resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Station {
    /// Opaque stable identifier, unique within a catalog fetch
    pub id: String,
    /// Display name
    pub name: String,
    /// Network address of the audio stream
    pub stream_url: String,
    /// Logo/favicon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Country of origin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Primary language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Genre/category labels, in directory order, deduplicated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Station {
    /// Create a station with minimal info
    pub fn new(id: impl Into<String>, name: impl Into<String>, stream_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stream_url: stream_url.into(),
            icon_url: None,
            country: None,
            language: None,
            tags: Vec::new(),
        }
    }

    /// Set the logo URL
    pub fn with_icon(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }

    /// Set country and language
    pub fn with_origin(mut self, country: Option<String>, language: Option<String>) -> Self {
        self.country = country;
        self.language = language;
        self
    }

    /// Set genre tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// URL-path identifier derived from the station name
    pub fn slug(&self) -> String {
        station_slug(&self.name)
    }
}

/// Turn a station name into a URL-path identifier: lowercased, punctuation
/// stripped, whitespace collapsed to single dashes.
pub fn station_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            pending_dash = !slug.is_empty();
        } else if c.is_alphanumeric() || c == '_' || c == '-' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(c);
        }
    }
    slug
}

/// Find a station whose name slugifies to `slug`
pub fn find_by_slug<'a>(stations: &'a [Station], slug: &str) -> Option<&'a Station> {
    stations.iter().find(|s| s.slug() == slug)
}
