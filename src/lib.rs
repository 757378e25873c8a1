//! # Notethrough Explorer
//!
//! Track explorer for the Notethrough music-discovery API.
//!
//! The explorer sends a free-text query to the remote search endpoint,
//! normalizes the raw records it gets back, scores each track against the
//! user's filters, drops non-matching tracks, and returns a ranked list.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌─────────────────────────────┐
//! │ TrackSource  │──▶│ Normalize  │──▶│ Score → Filter → Sort → Cap │
//! │ GET /tracks/ │   │ key table  │   │        (explorer)           │
//! └──────────────┘   └────────────┘   └──────────────┬──────────────┘
//!                                                    ▼
//!                                          ┌───────────────────┐
//!                                          │ ExplorerSession   │
//!                                          │ latest req. wins  │
//!                                          └───────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! nt search "radiohead" --energy high --sort popularity
//! nt rank --input tracks.json --genre "trip hop" --json
//! nt normalize --input legacy.json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`normalize`] | Canonical/legacy record normalization |
//! | [`filters`] | Filter configuration and profile bands |
//! | [`explorer`] | Scoring, filtering, and ranking |
//! | [`client`] | Search endpoint client |
//! | [`session`] | Search state and stale-response guard |
//! | [`format`] | Display helpers |
//! | [`error`] | Pipeline error taxonomy |

pub mod client;
pub mod config;
pub mod error;
pub mod explorer;
pub mod filters;
pub mod format;
pub mod models;
pub mod normalize;
pub mod session;
