//! Core data models used throughout the explorer.
//!
//! Raw records arrive from the search endpoint as loose JSON objects
//! ([`RawTrack`]); the normalizer turns each into a [`TrackSummary`] with
//! every field present, and the ranking pass wraps survivors in an
//! [`ExplorerResult`].

use serde::{Deserialize, Serialize};

/// A raw track record as returned by the search endpoint.
///
/// Keys may be canonical (`track_name`) or legacy display names
/// (`"Track Name"`), and any field may be missing.
pub type RawTrack = serde_json::Map<String, serde_json::Value>;

/// Canonical shape of a track after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Track identity. Empty only when upstream omitted it entirely.
    pub track_uri: String,
    pub track_name: String,
    pub artist_names: Option<String>,
    pub album_name: Option<String>,
    pub release_year: Option<i32>,
    pub genres: Vec<String>,
    /// Expected domain 0–100.
    pub popularity: Option<f64>,
    pub duration_ms: Option<f64>,
    pub explicit: Option<bool>,
    /// Audio features, expected domain 0.0–1.0.
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
}

impl TrackSummary {
    /// A summary carrying only identity; every other field takes its default.
    pub fn with_uri(track_uri: impl Into<String>) -> Self {
        Self {
            track_uri: track_uri.into(),
            track_name: crate::normalize::UNKNOWN_TRACK.to_string(),
            artist_names: None,
            album_name: None,
            release_year: None,
            genres: Vec::new(),
            popularity: None,
            duration_ms: None,
            explicit: None,
            danceability: None,
            energy: None,
            valence: None,
            tempo: None,
        }
    }
}

/// A normalized track with its derived match score.
///
/// Serializes flat, with the score under `matchScore`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorerResult {
    #[serde(flatten)]
    pub track: TrackSummary,
    /// Heuristic fit in `[10, 100]`.
    #[serde(rename = "matchScore")]
    pub match_score: u32,
}
