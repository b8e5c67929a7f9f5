//! Per-widget search session.
//!
//! Owns the raw input, the suggestion list, the debounce controller and the
//! outstanding exact resolution. All transitions are synchronous; anything
//! that needs I/O is handed back to the caller as an [`Effect`] and its
//! completion is fed back in, tagged, so stale completions can be told apart.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use lookup_types::Member;

use crate::debounce::{DebounceController, Disposition, Generation};
use crate::error::SearchError;
use crate::query::{normalize_with_min, NormalizedQuery, SearchQuery};
use crate::suggestions::{EnterAction, Key, SuggestionList};

/// I/O the session asks its driver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch suggestions; report back with the same generation.
    Fetch {
        generation: Generation,
        query: SearchQuery,
    },
    /// Resolve the submitted text exactly; report back with the same ticket.
    Resolve { ticket: u64, query: String },
}

/// Snapshot of the suggestion list for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SuggestionListState {
    /// Text shown in the input (replaced on selection)
    pub query: String,
    pub visible: bool,
    pub items: Vec<Member>,
    pub highlighted: Option<usize>,
    pub loading: bool,
}

/// How the current result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Picked from the suggestion list
    Selection,
    /// Exact name match on submit
    ExactMatch,
    /// Submit found nobody: not a member
    NoMatch,
    /// Submit could not read the roster; shown as no result
    StoreUnavailable,
}

/// The member currently presented, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SearchResult {
    pub member: Option<Member>,
    /// False until the first result (hit or miss) is published
    pub searched: bool,
    pub source: Option<ResultSource>,
    /// Bumped on every publication so repeated misses are distinguishable
    pub revision: u64,
}

/// Mutable state of one mounted search widget.
#[derive(Debug)]
pub struct SearchSession {
    raw_query: String,
    list: SuggestionList,
    debounce: DebounceController,
    min_query_chars: usize,
    submit_ticket: u64,
    resolving: Option<u64>,
    result: SearchResult,
    unmounted: bool,
}

impl SearchSession {
    pub fn new(debounce: Duration, min_query_chars: usize) -> Self {
        Self {
            raw_query: String::new(),
            list: SuggestionList::new(),
            debounce: DebounceController::new(debounce),
            min_query_chars,
            submit_ticket: 0,
            resolving: None,
            result: SearchResult::default(),
            unmounted: false,
        }
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn list(&self) -> &SuggestionList {
        &self.list
    }

    pub fn generation(&self) -> Generation {
        self.debounce.current()
    }

    pub fn result(&self) -> &SearchResult {
        &self.result
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// A suggestion fetch or an exact resolution is outstanding.
    pub fn loading(&self) -> bool {
        self.debounce.is_in_flight() || self.resolving.is_some()
    }

    pub fn timer_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn snapshot(&self) -> SuggestionListState {
        SuggestionListState {
            query: self.raw_query.clone(),
            visible: self.list.is_open(),
            items: self.list.suggestions().to_vec(),
            highlighted: self.list.highlighted(),
            loading: self.loading(),
        }
    }

    /// The input text changed.
    pub fn text_changed(&mut self, text: &str, now: Instant) {
        if self.unmounted {
            return;
        }
        self.raw_query = text.to_string();
        match normalize_with_min(text, self.min_query_chars) {
            NormalizedQuery::NotSearchable => {
                self.debounce.invalidate();
                self.list.clear();
            }
            NormalizedQuery::Searchable(_) => {
                self.debounce.keystroke(now);
            }
        }
    }

    /// Debounce timer check; yields the fetch to issue once the input is quiet.
    pub fn poll_timer(&mut self, now: Instant) -> Option<Effect> {
        let generation = self.debounce.fire(now)?;
        match normalize_with_min(&self.raw_query, self.min_query_chars) {
            NormalizedQuery::Searchable(query) => {
                debug!(%generation, query = %query, "Issuing suggestion fetch");
                Some(Effect::Fetch { generation, query })
            }
            NormalizedQuery::NotSearchable => {
                self.debounce.invalidate();
                None
            }
        }
    }

    /// A suggestion fetch finished.
    pub fn fetch_completed(
        &mut self,
        generation: Generation,
        result: Result<Vec<Member>, SearchError>,
    ) -> Disposition {
        let disposition = self.debounce.complete(generation);
        if disposition != Disposition::Commit {
            return disposition;
        }
        match result {
            Ok(members) => self.list.commit(members),
            Err(e) => {
                warn!(%generation, error = %e, "Suggestions unavailable");
                self.list.clear();
            }
        }
        disposition
    }

    pub fn key(&mut self, key: Key) -> Option<Effect> {
        if self.unmounted {
            return None;
        }
        match self.list.handle_key(key)? {
            EnterAction::Select(member) => {
                self.select(member);
                None
            }
            EnterAction::Resolve => self.submit(),
        }
    }

    /// Pointer activation of a suggestion row. Returns whether it selected.
    pub fn activate(&mut self, index: usize) -> bool {
        if self.unmounted {
            return false;
        }
        match self.list.activate(index) {
            Some(member) => {
                self.select(member);
                true
            }
            None => false,
        }
    }

    /// Explicit submission of the current text.
    pub fn submit(&mut self) -> Option<Effect> {
        if self.unmounted {
            return None;
        }
        let query = self.raw_query.trim();
        if query.is_empty() {
            return None;
        }
        self.submit_ticket += 1;
        self.resolving = Some(self.submit_ticket);
        debug!(ticket = self.submit_ticket, query, "Resolving submitted name");
        Some(Effect::Resolve {
            ticket: self.submit_ticket,
            query: query.to_string(),
        })
    }

    /// An exact resolution finished. Returns whether a result was published.
    pub fn resolution_completed(
        &mut self,
        ticket: u64,
        result: Result<Option<Member>, SearchError>,
    ) -> bool {
        if self.unmounted || self.resolving != Some(ticket) {
            debug!(ticket, "Stale resolution dropped");
            return false;
        }
        self.resolving = None;
        self.list.close();

        let (member, source) = match result {
            Ok(Some(member)) => (Some(member), ResultSource::ExactMatch),
            Ok(None) => (None, ResultSource::NoMatch),
            Err(e) => {
                warn!(ticket, error = %e, "Exact match failed, presenting no result");
                (None, ResultSource::StoreUnavailable)
            }
        };
        self.publish(member, source);
        true
    }

    /// Widget teardown; nothing commits or publishes afterwards.
    pub fn unmount(&mut self) {
        self.unmounted = true;
        self.resolving = None;
        self.list.close();
        self.debounce.unmount();
    }

    fn select(&mut self, member: Member) {
        info!(member_id = member.id, "Suggestion selected");
        self.raw_query = member.display_name();
        // Selection supersedes pending fetches and resolutions.
        self.debounce.invalidate();
        self.submit_ticket += 1;
        self.resolving = None;
        self.list.close();
        self.publish(Some(member), ResultSource::Selection);
    }

    fn publish(&mut self, member: Option<Member>, source: ResultSource) {
        self.result = SearchResult {
            member,
            searched: true,
            source: Some(source),
            revision: self.result.revision + 1,
        };
    }
}
