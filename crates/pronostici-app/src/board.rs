// Presentation state of the match board and its transition rules.
//
// `ViewState` is pure data: transitions return what the caller must do next
// (a fetch ticket, a follow-up status request) instead of doing I/O. Every
// fetch carries the sequence number of the `select_date` that issued it, and
// only the latest sequence number may settle the board.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use pronostici_core::model::{ApiStatus, Match, MatchId};

use crate::fetcher::FetchError;

/// Where the board is in its fetch cycle. Loading and error are separate
/// variants, so they can never be shown together.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// Nothing requested yet.
    Idle,
    /// A request for the selected date is in flight.
    Loading,
    /// The last request succeeded; matches in backend order.
    Settled(Vec<Match>),
    /// The last request failed; `message` is user-facing.
    Failed { message: String },
}

/// A fetch the caller must start for `date`, tagged with `seq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub date: NaiveDate,
}

/// Work triggered by applying a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// The list came back empty: fetch backend status for the debug panel.
    FetchDebugInfo { seq: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    selected_date: NaiveDate,
    load: LoadState,
    expanded: HashSet<MatchId>,
    debug_info: Option<ApiStatus>,
    latest_seq: u64,
}

impl ViewState {
    /// Fresh state for a board opened on `today`.
    pub fn new(today: NaiveDate) -> Self {
        ViewState {
            selected_date: today,
            load: LoadState::Idle,
            expanded: HashSet::new(),
            debug_info: None,
            latest_seq: 0,
        }
    }

    // -- accessors --

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.load {
            LoadState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// The settled match list, or `None` while idle, loading or failed.
    pub fn matches(&self) -> Option<&[Match]> {
        match &self.load {
            LoadState::Settled(matches) => Some(matches),
            _ => None,
        }
    }

    pub fn is_expanded(&self, id: &MatchId) -> bool {
        self.expanded.contains(id)
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    pub fn debug_info(&self) -> Option<&ApiStatus> {
        self.debug_info.as_ref()
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    // -- transitions --

    /// Switch to `date`: clear error, debug payload and expanded set, enter
    /// `Loading`, and hand back the fetch to start.
    pub fn select_date(&mut self, date: NaiveDate) -> FetchTicket {
        self.latest_seq += 1;
        self.selected_date = date;
        self.debug_info = None;
        self.expanded.clear();
        self.load = LoadState::Loading;
        info!("Loading matches for {} (request #{})", date, self.latest_seq);
        FetchTicket {
            seq: self.latest_seq,
            date,
        }
    }

    /// Re-request the currently selected date.
    pub fn retry(&mut self) -> FetchTicket {
        self.select_date(self.selected_date)
    }

    /// Apply the outcome of the match fetch tagged `seq`. Stale results are
    /// dropped. Returns a follow-up when the settled list is empty.
    pub fn apply_matches(
        &mut self,
        seq: u64,
        result: Result<Vec<Match>, FetchError>,
    ) -> Option<FollowUp> {
        if seq != self.latest_seq || !self.is_loading() {
            debug!(
                "Discarding stale match response #{} (latest #{})",
                seq, self.latest_seq
            );
            return None;
        }

        match result {
            Ok(matches) => {
                info!(
                    "Loaded {} matches for {}",
                    matches.len(),
                    self.selected_date
                );
                let empty = matches.is_empty();
                self.load = LoadState::Settled(matches);
                empty.then_some(FollowUp::FetchDebugInfo { seq })
            }
            Err(e) => {
                warn!("Match fetch for {} failed: {}", self.selected_date, e);
                self.load = LoadState::Failed {
                    message: e.user_message().to_string(),
                };
                None
            }
        }
    }

    /// Apply the status payload requested for the empty list of fetch `seq`.
    /// Failures are logged only. Returns whether the payload was stored.
    pub fn apply_debug_info(&mut self, seq: u64, result: Result<ApiStatus, FetchError>) -> bool {
        let still_empty = self.matches().is_some_and(|m| m.is_empty());
        if seq != self.latest_seq || !still_empty {
            debug!("Discarding stale status response #{}", seq);
            return false;
        }

        match result {
            Ok(status) => {
                self.debug_info = Some(status);
                true
            }
            Err(e) => {
                warn!("Status fetch failed, omitting debug panel: {}", e);
                false
            }
        }
    }

    /// Flip the expanded flag of `id`. Only meaningful while settled and for
    /// ids in the current list; anything else is a no-op. Returns whether the
    /// set changed.
    pub fn toggle_expanded(&mut self, id: &MatchId) -> bool {
        let known = self
            .matches()
            .is_some_and(|matches| matches.iter().any(|m| &m.id == id));
        if !known {
            return false;
        }
        if !self.expanded.remove(id) {
            self.expanded.insert(id.clone());
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
