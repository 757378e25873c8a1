//! Display helpers for explorer results.
//!
//! Missing values render as an em dash rather than failing.

use serde::Serialize;

use crate::models::ExplorerResult;

pub const PLACEHOLDER: &str = "—";
pub const UNKNOWN_ARTIST: &str = "Unknown artist";

/// Coarse quality bucket for a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchIntent {
    Positive,
    Neutral,
    Warning,
}

impl MatchIntent {
    pub fn for_score(score: u32) -> Self {
        if score >= 80 {
            MatchIntent::Positive
        } else if score >= 60 {
            MatchIntent::Neutral
        } else {
            MatchIntent::Warning
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchIntent::Positive => "positive",
            MatchIntent::Neutral => "neutral",
            MatchIntent::Warning => "warning",
        }
    }
}

/// A 0–1 audio feature as a whole percentage.
pub fn feature_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}%", (v * 100.0).round() as i64),
        None => PLACEHOLDER.to_string(),
    }
}

/// Milliseconds as `m:ss`.
pub fn duration(ms: Option<f64>) -> String {
    let Some(ms) = ms else {
        return PLACEHOLDER.to_string();
    };
    let total_seconds = (ms / 1000.0).round().max(0.0) as u64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

pub fn popularity(value: Option<f64>) -> String {
    value
        .map(|p| p.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn year(value: Option<i32>) -> String {
    value
        .map(|y| y.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// One result as a multi-line block for terminal output.
pub fn result_block(rank: usize, result: &ExplorerResult) -> String {
    let track = &result.track;
    let genres = if track.genres.is_empty() {
        "No genre tags".to_string()
    } else {
        track
            .genres
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{}. [{}% {}] {} / {}\n    album: {}\n    genres: {}\n    popularity: {}  energy: {}  dance: {}  vibe: {}  year: {}  length: {}\n    uri: {}\n",
        rank,
        result.match_score,
        MatchIntent::for_score(result.match_score).as_str(),
        track.artist_names.as_deref().unwrap_or(UNKNOWN_ARTIST),
        track.track_name,
        track.album_name.as_deref().unwrap_or(PLACEHOLDER),
        genres,
        popularity(track.popularity),
        feature_percent(track.energy),
        feature_percent(track.danceability),
        feature_percent(track.valence),
        year(track.release_year),
        duration(track.duration_ms),
        track.track_uri,
    )
}
