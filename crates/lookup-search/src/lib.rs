//! # lookup-search
//!
//! Debounced incremental member search for roster-lookup.
//!
//! Typing into the widget produces name suggestions after a quiet period;
//! selecting one (or submitting an exact full name) presents that member.
//!
//! ## Pieces
//! - `query`: trimming and the minimum-length gate
//! - `matcher`: case-insensitive name matching in both name orders
//! - `fetcher` / `resolver`: suggestion fetch and exact resolution over a `RecordStore`
//! - `debounce`: quiet-period timer with generation-tagged stale suppression
//! - `suggestions`: list visibility, highlight and keyboard navigation
//! - `session`: the per-widget state machine tying the above together
//! - `widget`: a tokio task driving a session from input events

pub mod debounce;
pub mod error;
pub mod fetcher;
pub mod matcher;
pub mod query;
pub mod resolver;
pub mod session;
pub mod suggestions;
pub mod widget;

pub use debounce::{DebounceController, DebounceState, Disposition, Generation, DEFAULT_DEBOUNCE};
pub use error::SearchError;
pub use fetcher::{SuggestionFetcher, DEFAULT_SUGGESTION_LIMIT};
pub use matcher::{matches, MatchMode};
pub use query::{normalize, normalize_with_min, NormalizedQuery, SearchQuery, MIN_QUERY_CHARS};
pub use resolver::ExactMatchResolver;
pub use session::{Effect, ResultSource, SearchResult, SearchSession, SuggestionListState};
pub use suggestions::{EnterAction, Key, ListState, SuggestionList};
pub use widget::{SearchWidget, WidgetConfig, WidgetEvent};
