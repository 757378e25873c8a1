//! Explorer session state.
//!
//! An [`ExplorerSession`] owns the query, the filters, the visible results,
//! and the search status for one user. A search moves through
//! `Idle → Searching → Idle | Failed`; a query shorter than the minimum
//! never leaves the session and lands in `Notice`.
//!
//! # Latest request wins
//!
//! Each search is split into [`ExplorerSession::begin_search`], which issues
//! a [`SearchTicket`] holding a sequence token plus a snapshot of the query
//! and filters, and [`ExplorerSession::complete_search`], which applies the
//! response only if the ticket is still the newest one. A slow response to
//! an older search is dropped, and later edits to the filters never leak
//! into an in-flight ranking.

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::client::TrackSource;
use crate::config::ExplorerConfig;
use crate::error::ExplorerError;
use crate::explorer::rank_tracks;
use crate::filters::ExplorerFilters;
use crate::models::ExplorerResult;

/// Monotonic sequence guard. Only the most recently issued token is current.
#[derive(Debug, Default)]
pub struct LatestRequestGuard {
    latest: u64,
}

impl LatestRequestGuard {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Make every outstanding token stale without issuing a new one.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Searching,
    /// Guidance shown instead of searching (query too short).
    Notice(String),
    /// The last search failed; results were cleared.
    Failed(String),
}

/// Everything one in-flight search needs, captured when it starts.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    token: u64,
    pub query: String,
    pub filters: ExplorerFilters,
    pub candidate_limit: usize,
    pub result_limit: usize,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub candidate_limit: usize,
    pub result_limit: usize,
    pub min_query_len: usize,
    pub default_filters: ExplorerFilters,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&ExplorerConfig::default())
    }
}

impl From<&ExplorerConfig> for SessionSettings {
    fn from(config: &ExplorerConfig) -> Self {
        Self {
            candidate_limit: config.candidate_limit,
            result_limit: config.result_limit,
            min_query_len: config.min_query_len,
            default_filters: config.filters.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ExplorerSession {
    query: String,
    filters: ExplorerFilters,
    settings: SessionSettings,
    status: SearchStatus,
    results: Vec<ExplorerResult>,
    guard: LatestRequestGuard,
}

impl Default for ExplorerSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl ExplorerSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            query: String::new(),
            filters: settings.default_filters.clone(),
            settings,
            status: SearchStatus::Idle,
            results: Vec::new(),
            guard: LatestRequestGuard::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn filters(&self) -> &ExplorerFilters {
        &self.filters
    }

    /// Edit the filters in place. Takes effect on the next search.
    pub fn update_filters(&mut self, edit: impl FnOnce(&mut ExplorerFilters)) {
        edit(&mut self.filters);
    }

    /// Restore the default filters and drop any pending search.
    pub fn reset_filters(&mut self) {
        self.filters = self.settings.default_filters.clone();
        self.guard.invalidate();
        if self.status == SearchStatus::Searching {
            self.status = SearchStatus::Idle;
        }
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Searching
    }

    pub fn results(&self) -> &[ExplorerResult] {
        &self.results
    }

    /// The message to show for the current status, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.status {
            SearchStatus::Notice(msg) | SearchStatus::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    /// Start a search for the current query.
    ///
    /// Returns `None` (and clears the results) when the trimmed query is too
    /// short. Either way every earlier ticket becomes stale.
    pub fn begin_search(&mut self) -> Option<SearchTicket> {
        let token = self.guard.issue();
        let query = self.query.trim();

        if query.chars().count() < self.settings.min_query_len {
            let err = ExplorerError::QueryTooShort {
                min: self.settings.min_query_len,
            };
            self.results.clear();
            self.status = SearchStatus::Notice(err.to_string());
            return None;
        }

        info!(query, token, "search started");
        self.status = SearchStatus::Searching;

        Some(SearchTicket {
            token,
            query: query.to_string(),
            filters: self.filters.clone(),
            candidate_limit: self.settings.candidate_limit,
            result_limit: self.settings.result_limit,
        })
    }

    /// Apply the outcome of a search. Returns `false` if the ticket was
    /// superseded and the outcome was discarded.
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<Value>, ExplorerError>,
    ) -> bool {
        if !self.guard.is_current(ticket.token) {
            warn!(
                query = %ticket.query,
                token = ticket.token,
                "discarding stale search response"
            );
            return false;
        }

        match outcome {
            Ok(raw) => {
                self.results = rank_tracks(&raw, &ticket.filters, ticket.result_limit);
                self.status = SearchStatus::Idle;
                info!(
                    query = %ticket.query,
                    candidates = raw.len(),
                    results = self.results.len(),
                    "search completed"
                );
            }
            Err(err) => {
                warn!(query = %ticket.query, error = %err, "search failed");
                self.results.clear();
                self.status = SearchStatus::Failed(err.to_string());
            }
        }
        true
    }

    /// Run one search end to end against `source`.
    pub async fn search(&mut self, source: &dyn TrackSource) -> bool {
        let Some(ticket) = self.begin_search() else {
            return false;
        };
        let outcome = source
            .search_tracks(&ticket.query, ticket.candidate_limit)
            .await;
        self.complete_search(ticket, outcome)
    }
}

/// Run a search on a shared session without holding the lock across the
/// request, so a newer search can start (and win) while this one waits.
pub async fn search_shared(session: &Mutex<ExplorerSession>, source: &dyn TrackSource) -> bool {
    let ticket = session.lock().await.begin_search();
    let Some(ticket) = ticket else {
        return false;
    };
    let outcome = source
        .search_tracks(&ticket.query, ticket.candidate_limit)
        .await;
    session.lock().await.complete_search(ticket, outcome)
}
