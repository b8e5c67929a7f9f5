//! Pluggable record store and document resolver traits.

use async_trait::async_trait;
use reqwest::Url;

use lookup_types::{Member, NameField};

use crate::error::StoreError;

/// Read-only access to the member roster.
///
/// `query_substring` is a per-field, case-insensitive containment filter: a
/// member matches when ANY of `fields` contains `pattern`. Results come back
/// in the store's own order, truncated to `limit`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query_substring(
        &self,
        fields: &[NameField],
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<Member>, StoreError>;

    /// The full roster, unfiltered.
    async fn query_all(&self) -> Result<Vec<Member>, StoreError>;
}

/// Turns a member's document reference into a public URL.
#[async_trait]
pub trait DocumentResolver: Send + Sync {
    async fn resolve_document_url(&self, document_ref: &str) -> Result<Url, StoreError>;
}
