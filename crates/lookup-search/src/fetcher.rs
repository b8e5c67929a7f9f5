//! Suggestion fetching.
//!
//! Asks the store for members whose last or first name contains the query,
//! then re-filters the page against the assembled names.

use std::sync::Arc;

use tracing::{debug, warn};

use lookup_store::RecordStore;
use lookup_types::{Member, NameField, MAX_SUGGESTIONS};

use crate::error::SearchError;
use crate::matcher::{matches, MatchMode};
use crate::query::SearchQuery;

/// Suggestions requested per fetch unless configured lower.
pub const DEFAULT_SUGGESTION_LIMIT: usize = MAX_SUGGESTIONS;

/// Fetches suggestion candidates from a record store.
#[derive(Clone)]
pub struct SuggestionFetcher {
    store: Arc<dyn RecordStore>,
    limit: usize,
}

impl SuggestionFetcher {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }

    /// Set the per-fetch limit, clamped to `1..=MAX_SUGGESTIONS`.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_SUGGESTIONS);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Fetch suggestions for a searchable query.
    ///
    /// `Ok(vec![])` means no member matched; `Err` means the store could not
    /// answer. Store order is preserved.
    pub async fn fetch_suggestions(&self, query: &SearchQuery) -> Result<Vec<Member>, SearchError> {
        let candidates = self
            .store
            .query_substring(&NameField::BOTH, query.as_str(), self.limit)
            .await
            .map_err(|e| {
                warn!(query = %query, error = %e, "Suggestion fetch failed");
                SearchError::from(e)
            })?;

        let fetched = candidates.len();
        let suggestions: Vec<Member> = candidates
            .into_iter()
            .filter(|m| matches(m, query.as_str(), MatchMode::Substring))
            .collect();

        debug!(
            query = %query,
            fetched,
            kept = suggestions.len(),
            "Fetched suggestions"
        );
        Ok(suggestions)
    }
}
