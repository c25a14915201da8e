//! Movie record as returned by the catalog provider.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Base URL for poster images at the width used by listings.
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// A single catalog entry.
///
/// Only `id` and `title` are required. Well-known provider fields are typed;
/// anything else is carried untouched in `extra` so the record round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Provider identifier
    pub id: u64,
    /// Display title
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Relative poster path, e.g. `/abc.jpg`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// `YYYY-MM-DD`, frequently empty for unreleased titles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Movie {
    /// Creates a movie with only the required fields.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Release year parsed from `release_date`.
    pub fn year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .and_then(|year| year.parse().ok())
    }

    /// Absolute poster URL, if the provider supplied a poster path.
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| format!("{POSTER_BASE_URL}{path}"))
    }

    /// Average rating, treating a zero vote count as unrated.
    pub fn rating(&self) -> Option<f64> {
        self.vote_average.filter(|rating| *rating > 0.0)
    }
}
