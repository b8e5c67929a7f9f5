//! Search error types.

use lookup_store::StoreError;
use thiserror::Error;

/// Errors that can occur during search operations.
///
/// Short queries and superseded fetch results are not errors: the first is a
/// no-op and the second is dropped without being surfaced.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The record store failed; kept apart from a legitimate "no match"
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Query was blank (or too short) after trimming
    #[error("Query is not searchable: {0:?}")]
    NotSearchable(String),

    /// The widget task has shut down
    #[error("Search widget is closed")]
    WidgetClosed,
}
