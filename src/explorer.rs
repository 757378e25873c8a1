//! Track filtering, scoring, and ranking.
//!
//! The explorer pipeline is pure and synchronous:
//!
//! 1. Normalize every raw record ([`crate::normalize`]).
//! 2. Score each track against the filters ([`compute_match_score`]).
//! 3. Drop tracks that fail any filter rule ([`track_matches_filters`]).
//! 4. Order survivors by the selected sort mode ([`sort_explorer_results`]).
//! 5. Truncate to the result limit.
//!
//! # Match score
//!
//! An additive heuristic, reproduced exactly:
//!
//! | Condition | Points |
//! |-----------|--------|
//! | base | 25 |
//! | popularity within bounds | +15 |
//! | popularity / 3 | +0..33 |
//! | genre term set: match / no match | +20 / −5 |
//! | year bound set: satisfied / not | +10 / −5 |
//! | energy profile set and in band | +10 |
//! | dance profile set and in band | +8 |
//! | vibe profile set and in band | +8 |
//!
//! The sum is rounded half-up and clamped to `[10, 100]`.

use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

use crate::filters::{Band, ExplorerFilters, SortBy};
use crate::models::{ExplorerResult, TrackSummary};
use crate::normalize::normalize_tracks;

/// Default number of results kept after sorting.
pub const DEFAULT_RESULT_LIMIT: usize = 80;

pub const MIN_MATCH_SCORE: u32 = 10;
pub const MAX_MATCH_SCORE: u32 = 100;

fn genre_matches(track: &TrackSummary, needle: &str) -> bool {
    track
        .genres
        .iter()
        .any(|genre| genre.to_lowercase().contains(needle))
}

fn in_band(value: Option<f64>, band: Band) -> bool {
    value.is_some_and(|v| band.contains(v))
}

fn popularity_in_bounds(track: &TrackSummary, filters: &ExplorerFilters) -> bool {
    let (lo, hi) = filters.popularity_bounds();
    let popularity = track.popularity.unwrap_or(0.0);
    popularity >= lo && popularity <= hi
}

/// Both year bounds, with a missing year failing whichever bound is set.
fn year_in_bounds(track: &TrackSummary, filters: &ExplorerFilters) -> bool {
    if let Some(min) = filters.min_year {
        match track.release_year {
            Some(year) if year >= min => {}
            _ => return false,
        }
    }
    if let Some(max) = filters.max_year {
        match track.release_year {
            Some(year) if year <= max => {}
            _ => return false,
        }
    }
    true
}

/// Returns `true` only if the track satisfies every filter rule.
pub fn track_matches_filters(track: &TrackSummary, filters: &ExplorerFilters) -> bool {
    if !popularity_in_bounds(track, filters) {
        return false;
    }

    if let Some(needle) = filters.genre_needle() {
        if !genre_matches(track, &needle) {
            return false;
        }
    }

    if !year_in_bounds(track, filters) {
        return false;
    }

    if let Some(band) = filters.energy_profile.band() {
        if !in_band(track.energy, band) {
            return false;
        }
    }
    if let Some(band) = filters.dance_profile.band() {
        if !in_band(track.danceability, band) {
            return false;
        }
    }
    if let Some(band) = filters.vibe_profile.band() {
        if !in_band(track.valence, band) {
            return false;
        }
    }

    true
}

/// Heuristic relevance of a track to the filters, in `[10, 100]`.
///
/// Computed independently of [`track_matches_filters`].
pub fn compute_match_score(track: &TrackSummary, filters: &ExplorerFilters) -> u32 {
    let mut score = 25.0;

    if popularity_in_bounds(track, filters) {
        score += 15.0;
    }
    score += track.popularity.unwrap_or(0.0) / 3.0;

    if let Some(needle) = filters.genre_needle() {
        score += if genre_matches(track, &needle) { 20.0 } else { -5.0 };
    }

    if filters.has_year_bounds() {
        let satisfied = track.release_year.is_some() && year_in_bounds(track, filters);
        score += if satisfied { 10.0 } else { -5.0 };
    }

    if let Some(band) = filters.energy_profile.band() {
        if in_band(track.energy, band) {
            score += 10.0;
        }
    }
    if let Some(band) = filters.dance_profile.band() {
        if in_band(track.danceability, band) {
            score += 8.0;
        }
    }
    if let Some(band) = filters.vibe_profile.band() {
        if in_band(track.valence, band) {
            score += 8.0;
        }
    }

    clamp_score(score)
}

/// Round half-up, then clamp to `[MIN_MATCH_SCORE, MAX_MATCH_SCORE]`.
fn clamp_score(score: f64) -> u32 {
    let rounded = (score + 0.5).floor();
    if rounded.is_nan() {
        return MIN_MATCH_SCORE;
    }
    rounded.clamp(MIN_MATCH_SCORE as f64, MAX_MATCH_SCORE as f64) as u32
}

fn sort_key(result: &ExplorerResult, sort_by: SortBy) -> f64 {
    let track = &result.track;
    match sort_by {
        SortBy::Relevance => result.match_score as f64,
        SortBy::Popularity => track.popularity.unwrap_or(0.0),
        SortBy::ReleaseYear => track.release_year.map(f64::from).unwrap_or(0.0),
        SortBy::Energy => track.energy.unwrap_or(0.0),
        SortBy::Danceability => track.danceability.unwrap_or(0.0),
    }
}

/// Sort descending by the selected key. Missing values count as `0`.
///
/// The sort is stable: tracks with equal keys keep their input order.
pub fn sort_explorer_results(results: &mut [ExplorerResult], sort_by: SortBy) {
    results.sort_by(|a, b| {
        sort_key(b, sort_by)
            .partial_cmp(&sort_key(a, sort_by))
            .unwrap_or(Ordering::Equal)
    });
}

/// Score, filter, sort, and truncate already-normalized tracks.
pub fn rank_summaries(
    tracks: Vec<TrackSummary>,
    filters: &ExplorerFilters,
    limit: usize,
) -> Vec<ExplorerResult> {
    let total = tracks.len();

    let mut results: Vec<ExplorerResult> = tracks
        .into_iter()
        .map(|track| {
            let match_score = compute_match_score(&track, filters);
            ExplorerResult { track, match_score }
        })
        .filter(|result| track_matches_filters(&result.track, filters))
        .collect();

    let matched = results.len();
    sort_explorer_results(&mut results, filters.sort_by);
    results.truncate(limit);

    debug!(
        total,
        matched,
        returned = results.len(),
        sort_by = filters.sort_by.as_str(),
        "ranked explorer results"
    );

    results
}

/// Run the full pipeline over raw records from the search endpoint.
pub fn rank_tracks(raw: &[Value], filters: &ExplorerFilters, limit: usize) -> Vec<ExplorerResult> {
    rank_summaries(normalize_tracks(raw), filters, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DanceProfile, EnergyProfile, VibeProfile};
    use serde_json::json;

    fn track(uri: &str) -> TrackSummary {
        TrackSummary::with_uri(uri)
    }

    fn filters() -> ExplorerFilters {
        ExplorerFilters::default()
    }

    #[test]
    fn test_default_filters_match_everything() {
        let t = track("a");
        assert!(track_matches_filters(&t, &filters()));
    }

    #[test]
    fn test_popularity_bounds_inclusive() {
        let mut t = track("a");
        t.popularity = Some(50.0);
        let f = ExplorerFilters {
            min_popularity: Some(50.0),
            max_popularity: Some(50.0),
            ..filters()
        };
        assert!(track_matches_filters(&t, &f));
        t.popularity = Some(50.5);
        assert!(!track_matches_filters(&t, &f));
    }

    #[test]
    fn test_missing_popularity_counts_as_zero() {
        let t = track("a");
        let f = ExplorerFilters {
            min_popularity: Some(1.0),
            ..filters()
        };
        assert!(!track_matches_filters(&t, &f));
    }

    #[test]
    fn test_genre_term_case_insensitive_substring() {
        let mut t = track("a");
        t.genres = vec!["Art Rock".to_string(), "post-punk".to_string()];
        let f = ExplorerFilters {
            genre_term: "ROCK".to_string(),
            ..filters()
        };
        assert!(track_matches_filters(&t, &f));

        let f = ExplorerFilters {
            genre_term: "jazz".to_string(),
            ..filters()
        };
        assert!(!track_matches_filters(&t, &f));
    }

    #[test]
    fn test_genre_term_excludes_track_without_genres() {
        let f = ExplorerFilters {
            genre_term: "rock".to_string(),
            ..filters()
        };
        assert!(!track_matches_filters(&track("a"), &f));
    }

    #[test]
    fn test_blank_genre_term_never_excludes() {
        let f = ExplorerFilters {
            genre_term: "  ".to_string(),
            ..filters()
        };
        let mut with_genres = track("a");
        with_genres.genres = vec!["house".to_string()];
        assert!(track_matches_filters(&track("b"), &f));
        assert!(track_matches_filters(&with_genres, &f));
    }

    #[test]
    fn test_missing_year_fails_either_bound() {
        let t = track("a");
        let min_only = ExplorerFilters {
            min_year: Some(1990),
            ..filters()
        };
        let max_only = ExplorerFilters {
            max_year: Some(2020),
            ..filters()
        };
        assert!(!track_matches_filters(&t, &min_only));
        assert!(!track_matches_filters(&t, &max_only));

        let mut dated = track("b");
        dated.release_year = Some(2000);
        assert!(track_matches_filters(&dated, &min_only));
        assert!(track_matches_filters(&dated, &max_only));
    }

    #[test]
    fn test_profile_requires_feature() {
        let f = ExplorerFilters {
            energy_profile: EnergyProfile::Calm,
            ..filters()
        };
        let mut t = track("a");
        assert!(!track_matches_filters(&t, &f));
        t.energy = Some(0.0);
        assert!(track_matches_filters(&t, &f));
    }

    #[test]
    fn test_dance_and_vibe_profiles() {
        let mut t = track("a");
        t.danceability = Some(0.55);
        t.valence = Some(0.8);
        let club = ExplorerFilters {
            dance_profile: DanceProfile::Club,
            ..filters()
        };
        let chill = ExplorerFilters {
            dance_profile: DanceProfile::Chill,
            ..filters()
        };
        assert!(!track_matches_filters(&t, &club));
        assert!(!track_matches_filters(&t, &chill));

        let uplifting = ExplorerFilters {
            vibe_profile: VibeProfile::Uplifting,
            ..filters()
        };
        assert!(track_matches_filters(&t, &uplifting));
    }

    #[test]
    fn test_stricter_filter_never_grows_matches() {
        let tracks: Vec<TrackSummary> = (0..20)
            .map(|i| {
                let mut t = track(&i.to_string());
                t.popularity = Some((i * 5) as f64);
                t.energy = if i % 3 == 0 { None } else { Some(i as f64 / 20.0) };
                t.release_year = if i % 4 == 0 { None } else { Some(1980 + i) };
                t
            })
            .collect();

        let loose = filters();
        let stricter = [
            ExplorerFilters {
                min_popularity: Some(30.0),
                ..filters()
            },
            ExplorerFilters {
                max_popularity: Some(60.0),
                ..filters()
            },
            ExplorerFilters {
                min_year: Some(1990),
                ..filters()
            },
            ExplorerFilters {
                energy_profile: EnergyProfile::Steady,
                ..filters()
            },
        ];

        let count = |f: &ExplorerFilters| tracks.iter().filter(|t| track_matches_filters(t, f)).count();
        let baseline = count(&loose);
        for f in &stricter {
            assert!(count(f) <= baseline);
        }
    }

    #[test]
    fn test_score_base_case() {
        // 25 + 15 (in bounds) + 0
        assert_eq!(compute_match_score(&track("a"), &filters()), 40);
    }

    #[test]
    fn test_score_popularity_contribution() {
        let mut t = track("a");
        t.popularity = Some(90.0);
        // 25 + 15 + 30
        assert_eq!(compute_match_score(&t, &filters()), 70);
        t.popularity = Some(100.0);
        // 25 + 15 + 33.33 -> 73
        assert_eq!(compute_match_score(&t, &filters()), 73);
    }

    #[test]
    fn test_score_rounds_half_up() {
        let mut t = track("a");
        t.popularity = Some(1.5);
        // 25 + 15 + 0.5 = 40.5 -> 41
        assert_eq!(compute_match_score(&t, &filters()), 41);
    }

    #[test]
    fn test_score_all_bonuses_clamped() {
        let mut t = track("a");
        t.popularity = Some(100.0);
        t.genres = vec!["techno".to_string()];
        t.release_year = Some(2010);
        t.energy = Some(0.9);
        t.danceability = Some(0.9);
        t.valence = Some(0.9);
        let f = ExplorerFilters {
            genre_term: "tech".to_string(),
            min_year: Some(2000),
            energy_profile: EnergyProfile::High,
            dance_profile: DanceProfile::Club,
            vibe_profile: VibeProfile::Uplifting,
            ..filters()
        };
        assert_eq!(compute_match_score(&t, &f), 100);
    }

    #[test]
    fn test_score_penalties() {
        let f = ExplorerFilters {
            genre_term: "folk".to_string(),
            max_year: Some(1970),
            min_popularity: Some(50.0),
            ..filters()
        };
        // 25 - 5 - 5 = 15
        assert_eq!(compute_match_score(&track("a"), &f), 15);
    }

    #[test]
    fn test_score_genre_bonus() {
        let mut t = track("a");
        t.genres = vec!["art rock".to_string()];
        let f = ExplorerFilters {
            genre_term: "rock".to_string(),
            ..filters()
        };
        // 25 + 15 + 20
        assert_eq!(compute_match_score(&t, &f), 60);
    }

    #[test]
    fn test_score_year_bonus() {
        let mut t = track("a");
        t.release_year = Some(1995);
        let f = ExplorerFilters {
            min_year: Some(1990),
            max_year: Some(2000),
            ..filters()
        };
        // 25 + 15 + 10
        assert_eq!(compute_match_score(&t, &f), 50);
    }

    #[test]
    fn test_score_energy_bonus_at_band_edge() {
        let mut t = track("a");
        t.energy = Some(0.0);
        let f = ExplorerFilters {
            energy_profile: EnergyProfile::Calm,
            ..filters()
        };
        // 25 + 15 + 10
        assert_eq!(compute_match_score(&t, &f), 50);
    }

    #[test]
    fn test_score_dance_bonus_at_band_edge() {
        let mut t = track("a");
        t.danceability = Some(0.6);
        let f = ExplorerFilters {
            dance_profile: DanceProfile::Club,
            ..filters()
        };
        // 25 + 15 + 8
        assert_eq!(compute_match_score(&t, &f), 48);
    }

    #[test]
    fn test_score_vibe_bonus_at_band_edge() {
        let mut t = track("a");
        t.valence = Some(0.55);
        let f = ExplorerFilters {
            vibe_profile: VibeProfile::Uplifting,
            ..filters()
        };
        // 25 + 15 + 8
        assert_eq!(compute_match_score(&t, &f), 48);
    }

    #[test]
    fn test_score_popularity_out_of_bounds_drops_bonus() {
        let f = ExplorerFilters {
            max_popularity: Some(-1.0),
            ..filters()
        };
        // absent popularity counts as 0, which exceeds the max
        assert_eq!(compute_match_score(&track("a"), &f), 25);
    }

    #[test]
    fn test_score_lower_clamp() {
        let mut t = track("a");
        t.popularity = Some(-90.0);
        assert_eq!(compute_match_score(&t, &filters()), MIN_MATCH_SCORE);
    }

    #[test]
    fn test_score_bounds_hold_broadly() {
        let profiles = [EnergyProfile::Any, EnergyProfile::Calm, EnergyProfile::High];
        for p in 0..=10 {
            for profile in profiles {
                let mut t = track("a");
                t.popularity = Some(p as f64 * 10.0);
                t.energy = Some(p as f64 / 10.0);
                let f = ExplorerFilters {
                    energy_profile: profile,
                    genre_term: "x".to_string(),
                    ..filters()
                };
                let score = compute_match_score(&t, &f);
                assert!((MIN_MATCH_SCORE..=MAX_MATCH_SCORE).contains(&score));
            }
        }
    }

    #[test]
    fn test_sort_by_popularity_missing_is_zero_and_stable() {
        let mut results: Vec<ExplorerResult> = [
            ("a", None),
            ("b", Some(50.0)),
            ("c", Some(0.0)),
            ("d", Some(50.0)),
        ]
        .into_iter()
        .map(|(uri, pop)| {
            let mut t = track(uri);
            t.popularity = pop;
            ExplorerResult {
                track: t,
                match_score: 40,
            }
        })
        .collect();

        sort_explorer_results(&mut results, SortBy::Popularity);
        let order: Vec<&str> = results.iter().map(|r| r.track.track_uri.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_sort_by_relevance() {
        let mut results: Vec<ExplorerResult> = [("a", 20), ("b", 90), ("c", 55)]
            .into_iter()
            .map(|(uri, score)| ExplorerResult {
                track: track(uri),
                match_score: score,
            })
            .collect();
        sort_explorer_results(&mut results, SortBy::Relevance);
        let order: Vec<&str> = results.iter().map(|r| r.track.track_uri.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let raw: Vec<Value> = (0..95)
            .map(|i| json!({ "track_uri": i.to_string(), "popularity": i % 100 }))
            .collect();
        let f = ExplorerFilters {
            sort_by: SortBy::Popularity,
            ..filters()
        };
        let results = rank_tracks(&raw, &f, DEFAULT_RESULT_LIMIT);
        assert_eq!(results.len(), 80);
        for pair in results.windows(2) {
            assert!(
                pair[0].track.popularity.unwrap_or(0.0) >= pair[1].track.popularity.unwrap_or(0.0)
            );
        }
    }

    #[test]
    fn test_rank_energy_profile_example() {
        let raw = vec![
            json!({ "track_uri": "1", "popularity": 90, "energy": 0.8 }),
            json!({ "track_uri": "2", "popularity": 40, "energy": 0.3 }),
        ];
        let f = ExplorerFilters {
            energy_profile: EnergyProfile::High,
            sort_by: SortBy::Popularity,
            ..filters()
        };
        let results = rank_tracks(&raw, &f, DEFAULT_RESULT_LIMIT);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].track.track_uri, "1");
        // 25 + 15 + 30 + 10
        assert_eq!(results[0].match_score, 80);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let raw: Vec<Value> = (0..30)
            .map(|i| json!({ "track_uri": format!("t{}", i), "popularity": (i * 7) % 40 }))
            .collect();
        let f = filters();
        let first = rank_tracks(&raw, &f, DEFAULT_RESULT_LIMIT);
        let second = rank_tracks(&raw, &f, DEFAULT_RESULT_LIMIT);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rank_empty_input() {
        assert!(rank_tracks(&[], &filters(), DEFAULT_RESULT_LIMIT).is_empty());
    }
}
