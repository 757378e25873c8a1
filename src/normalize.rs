//! Record normalization.
//!
//! Upstream records come in two shapes: canonical snake_case keys and the
//! older display-name keys from the CSV import (`"Track Name"`,
//! `"Artist Name(s)"`, ...). [`normalize_track`] resolves every field through
//! one precedence table: canonical key, then legacy key, then a default.
//!
//! A key counts as present when its value is not `null` and not the empty
//! string. `0` and `false` are real values. A value that cannot be coerced to
//! the field's type is skipped and the next key is tried.
//!
//! Normalization never fails. A record with no identity yields an empty
//! `track_uri`.

use serde_json::Value;

use crate::models::{RawTrack, TrackSummary};

/// Placeholder name for records without a title.
pub const UNKNOWN_TRACK: &str = "Unknown track";

/// Canonical field name → keys consulted in order.
pub const KEY_PRECEDENCE: &[(&str, &[&str])] = &[
    ("track_uri", &["track_uri", "Track URI"]),
    ("track_name", &["track_name", "Track Name"]),
    ("artist_names", &["artist_names", "Artist Name(s)"]),
    ("album_name", &["album_name", "Album Name"]),
    ("release_year", &["release_year", "Release Year"]),
    ("release_date", &["release_date", "Release Date"]),
    ("genres", &["genres", "Genres"]),
    ("popularity", &["popularity", "Popularity"]),
    ("duration_ms", &["duration_ms", "Duration (ms)"]),
    ("explicit", &["explicit", "Explicit"]),
    ("danceability", &["danceability", "Danceability"]),
    ("energy", &["energy", "Energy"]),
    ("valence", &["valence", "Valence"]),
    ("tempo", &["tempo", "Tempo"]),
];

/// Normalize one raw record into a complete [`TrackSummary`].
pub fn normalize_track(raw: &RawTrack) -> TrackSummary {
    let release_year = pick(raw, "release_year", as_year)
        .or_else(|| pick(raw, "release_date", year_from_date));

    TrackSummary {
        track_uri: pick(raw, "track_uri", as_text).unwrap_or_default(),
        track_name: pick(raw, "track_name", as_text).unwrap_or_else(|| UNKNOWN_TRACK.to_string()),
        artist_names: pick(raw, "artist_names", as_artists),
        album_name: pick(raw, "album_name", as_text),
        release_year,
        genres: pick(raw, "genres", as_genres).unwrap_or_default(),
        popularity: pick(raw, "popularity", as_number),
        duration_ms: pick(raw, "duration_ms", as_number),
        explicit: pick(raw, "explicit", as_bool),
        danceability: pick(raw, "danceability", as_number),
        energy: pick(raw, "energy", as_number),
        valence: pick(raw, "valence", as_number),
        tempo: pick(raw, "tempo", as_number),
    }
}

/// Normalize an arbitrary JSON value. Non-object values degrade to an
/// all-default summary.
pub fn normalize_value(value: &Value) -> TrackSummary {
    match value {
        Value::Object(map) => normalize_track(map),
        _ => normalize_track(&RawTrack::new()),
    }
}

pub fn normalize_tracks(values: &[Value]) -> Vec<TrackSummary> {
    values.iter().map(normalize_value).collect()
}

fn keys_for(field: &str) -> &'static [&'static str] {
    KEY_PRECEDENCE
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn pick<T>(raw: &RawTrack, field: &str, coerce: fn(&Value) -> Option<T>) -> Option<T> {
    keys_for(field)
        .iter()
        .filter_map(|key| raw.get(*key))
        .filter(|value| is_present(value))
        .find_map(coerce)
}

// ============ Coercions ============

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn as_year(value: &Value) -> Option<i32> {
    let n = as_number(value)?;
    if n < i32::MIN as f64 || n > i32::MAX as f64 {
        return None;
    }
    Some(n.trunc() as i32)
}

fn year_from_date(value: &Value) -> Option<i32> {
    let Value::String(s) = value else {
        return None;
    };
    let prefix = s.trim().get(..4)?;
    if !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_genres(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

fn as_artists(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let names: Vec<&str> = items
                .iter()
                .filter_map(|item| item.as_str())
                .filter(|name| !name.is_empty())
                .collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        other => as_text(other),
    }
}
