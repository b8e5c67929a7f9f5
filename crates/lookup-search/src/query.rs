//! Query normalization.
//!
//! Raw input is trimmed and checked for length. Case is preserved; case
//! folding happens at comparison time in the matcher.

/// Minimum trimmed length (in characters) worth sending to the store.
pub const MIN_QUERY_CHARS: usize = 2;

/// A trimmed query long enough to search for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SearchQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of normalizing raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedQuery {
    /// Too short after trimming; no fetch should be issued.
    NotSearchable,
    Searchable(SearchQuery),
}

impl NormalizedQuery {
    pub fn is_searchable(&self) -> bool {
        matches!(self, NormalizedQuery::Searchable(_))
    }

    pub fn searchable(self) -> Option<SearchQuery> {
        match self {
            NormalizedQuery::Searchable(q) => Some(q),
            NormalizedQuery::NotSearchable => None,
        }
    }
}

/// Normalize with the default minimum length.
pub fn normalize(raw: &str) -> NormalizedQuery {
    normalize_with_min(raw, MIN_QUERY_CHARS)
}

/// Normalize, treating anything shorter than `min_chars` as not searchable.
pub fn normalize_with_min(raw: &str, min_chars: usize) -> NormalizedQuery {
    let trimmed = raw.trim();
    if trimmed.chars().count() < min_chars {
        NormalizedQuery::NotSearchable
    } else {
        NormalizedQuery::Searchable(SearchQuery(trimmed.to_string()))
    }
}
