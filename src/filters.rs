//! Explorer filter configuration.
//!
//! [`ExplorerFilters`] is created with defaults, edited field by field, and
//! read (never written) by the ranking pass. Each audio-feature profile maps
//! to a closed band over a 0–1 feature. The bands are disjoint with gaps:
//! a danceability of 0.55 is neither `chill` nor `club`.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A closed numeric range `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lo: f64,
    pub hi: f64,
}

impl Band {
    const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyProfile {
    #[default]
    Any,
    Calm,
    Steady,
    High,
}

impl EnergyProfile {
    /// `None` for [`EnergyProfile::Any`].
    pub fn band(self) -> Option<Band> {
        match self {
            EnergyProfile::Any => None,
            EnergyProfile::Calm => Some(Band::new(0.0, 0.45)),
            EnergyProfile::Steady => Some(Band::new(0.45, 0.7)),
            EnergyProfile::High => Some(Band::new(0.7, 1.0)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnergyProfile::Any => "any",
            EnergyProfile::Calm => "calm",
            EnergyProfile::Steady => "steady",
            EnergyProfile::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanceProfile {
    #[default]
    Any,
    Chill,
    Club,
}

impl DanceProfile {
    pub fn band(self) -> Option<Band> {
        match self {
            DanceProfile::Any => None,
            DanceProfile::Chill => Some(Band::new(0.0, 0.5)),
            DanceProfile::Club => Some(Band::new(0.6, 1.0)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DanceProfile::Any => "any",
            DanceProfile::Chill => "chill",
            DanceProfile::Club => "club",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VibeProfile {
    #[default]
    Any,
    Moody,
    Uplifting,
}

impl VibeProfile {
    pub fn band(self) -> Option<Band> {
        match self {
            VibeProfile::Any => None,
            VibeProfile::Moody => Some(Band::new(0.0, 0.45)),
            VibeProfile::Uplifting => Some(Band::new(0.55, 1.0)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VibeProfile::Any => "any",
            VibeProfile::Moody => "moody",
            VibeProfile::Uplifting => "uplifting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    Popularity,
    ReleaseYear,
    Energy,
    Danceability,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Popularity => "popularity",
            SortBy::ReleaseYear => "release_year",
            SortBy::Energy => "energy",
            SortBy::Danceability => "danceability",
        }
    }

    /// Human-readable label, e.g. "Sorted by match score".
    pub fn label(self) -> &'static str {
        match self {
            SortBy::Relevance => "match score",
            SortBy::Popularity => "popularity",
            SortBy::ReleaseYear => "release year",
            SortBy::Energy => "energy",
            SortBy::Danceability => "danceability",
        }
    }
}

macro_rules! impl_named {
    ($ty:ty, $what:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim().to_ascii_lowercase();
                $(
                    if $variant.as_str() == wanted {
                        return Ok($variant);
                    }
                )+
                let known: Vec<&str> = vec![$($variant.as_str()),+];
                bail!("Unknown {}: '{}'. Use one of: {}.", $what, s, known.join(", "))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_named!(
    EnergyProfile,
    "energy profile",
    [EnergyProfile::Any, EnergyProfile::Calm, EnergyProfile::Steady, EnergyProfile::High]
);
impl_named!(
    DanceProfile,
    "dance profile",
    [DanceProfile::Any, DanceProfile::Chill, DanceProfile::Club]
);
impl_named!(
    VibeProfile,
    "vibe profile",
    [VibeProfile::Any, VibeProfile::Moody, VibeProfile::Uplifting]
);
impl_named!(
    SortBy,
    "sort mode",
    [
        SortBy::Relevance,
        SortBy::Popularity,
        SortBy::ReleaseYear,
        SortBy::Energy,
        SortBy::Danceability,
    ]
);

/// Filter and sort configuration for one explorer session.
///
/// Deserializes with camelCase keys and per-field defaults, so a preset may
/// name only the fields it cares about.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExplorerFilters {
    /// Case-insensitive substring matched against each genre. Blank means
    /// no genre constraint.
    pub genre_term: String,
    pub min_popularity: Option<f64>,
    pub max_popularity: Option<f64>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub energy_profile: EnergyProfile,
    pub dance_profile: DanceProfile,
    pub vibe_profile: VibeProfile,
    pub sort_by: SortBy,
}

impl ExplorerFilters {
    /// Popularity bounds with defaults applied: `[0, 100]`.
    pub fn popularity_bounds(&self) -> (f64, f64) {
        (
            self.min_popularity.unwrap_or(0.0),
            self.max_popularity.unwrap_or(100.0),
        )
    }

    /// The lower-cased genre term, or `None` when blank.
    pub fn genre_needle(&self) -> Option<String> {
        let term = self.genre_term.trim();
        (!term.is_empty()).then(|| term.to_lowercase())
    }

    pub fn has_year_bounds(&self) -> bool {
        self.min_year.is_some() || self.max_year.is_some()
    }

    /// Reject bounds that can never match.
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = self.popularity_bounds();
        if !lo.is_finite() || !hi.is_finite() {
            bail!("popularity bounds must be finite numbers (got {}-{})", lo, hi);
        }
        if lo > hi {
            bail!("minPopularity ({}) is greater than maxPopularity ({})", lo, hi);
        }
        if let (Some(lo), Some(hi)) = (self.min_year, self.max_year) {
            if lo > hi {
                bail!("minYear ({}) is greater than maxYear ({})", lo, hi);
            }
        }
        Ok(())
    }
}

/// Short descriptions of every active constraint, in display order.
pub fn filter_chips(filters: &ExplorerFilters) -> Vec<String> {
    let mut chips = Vec::new();

    let term = filters.genre_term.trim();
    if !term.is_empty() {
        chips.push(format!("Genre ~ {}", term));
    }

    let (pop_min, pop_max) = filters.popularity_bounds();
    if pop_min != 0.0 || pop_max != 100.0 {
        chips.push(format!("Popularity {}-{}", pop_min, pop_max));
    }

    if filters.has_year_bounds() {
        let from = filters
            .min_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "any".to_string());
        let to = filters
            .max_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "now".to_string());
        chips.push(format!("Years {}-{}", from, to));
    }

    if filters.energy_profile != EnergyProfile::Any {
        chips.push(format!("Energy: {}", filters.energy_profile));
    }
    if filters.dance_profile != DanceProfile::Any {
        chips.push(format!("Dance: {}", filters.dance_profile));
    }
    if filters.vibe_profile != VibeProfile::Any {
        chips.push(format!("Mood: {}", filters.vibe_profile));
    }

    chips
}
