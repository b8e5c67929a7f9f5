//! Exact-match resolution on submit.
//!
//! Reads the whole roster and returns the first member whose name, in either
//! order, equals the submitted text. A server-side exact filter would avoid
//! the full scan; rosters here are small enough that the store's
//! `query_all` path is kept.

use std::sync::Arc;

use tracing::{info, warn};

use lookup_store::RecordStore;
use lookup_types::Member;

use crate::error::SearchError;
use crate::matcher::{matches, MatchMode};

/// Resolves a submitted name to at most one member.
#[derive(Clone)]
pub struct ExactMatchResolver {
    store: Arc<dyn RecordStore>,
}

impl ExactMatchResolver {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Find the member named `raw_query`.
    ///
    /// Returns `Ok(None)` for non-membership and `Err` when the roster could
    /// not be read, so callers can tell the two apart in diagnostics.
    pub async fn resolve_exact(&self, raw_query: &str) -> Result<Option<Member>, SearchError> {
        let query = raw_query.trim();
        if query.is_empty() {
            return Err(SearchError::NotSearchable(raw_query.to_string()));
        }

        let roster = self.store.query_all().await.map_err(|e| {
            warn!(query, error = %e, "Roster unavailable for exact match");
            SearchError::from(e)
        })?;

        let found = roster
            .into_iter()
            .find(|m| matches(m, query, MatchMode::Exact));

        match &found {
            Some(member) => info!(query, member_id = member.id, "Exact match found"),
            None => info!(query, "No member matches"),
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lookup_store::{InMemoryStore, StoreError};
    use lookup_types::NameField;

    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn query_substring(
            &self,
            _fields: &[NameField],
            _pattern: &str,
            _limit: usize,
        ) -> Result<Vec<Member>, StoreError> {
            Err(StoreError::Http {
                status: 503,
                body: "unavailable".to_string(),
            })
        }

        async fn query_all(&self) -> Result<Vec<Member>, StoreError> {
            Err(StoreError::Http {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    fn resolver() -> ExactMatchResolver {
        ExactMatchResolver::new(Arc::new(InMemoryStore::sample()))
    }

    #[tokio::test]
    async fn test_resolve_first_last() {
        let member = resolver().resolve_exact("Fatima Zahra").await.unwrap();
        assert_eq!(member.map(|m| m.id), Some(2));
    }

    #[tokio::test]
    async fn test_resolve_last_first() {
        let member = resolver().resolve_exact("  zahra FATIMA ").await.unwrap();
        assert_eq!(member.map(|m| m.id), Some(2));
    }

    #[tokio::test]
    async fn test_resolve_non_member() {
        let member = resolver().resolve_exact("Jean Dupont").await.unwrap();
        assert!(member.is_none());
    }

    #[tokio::test]
    async fn test_partial_name_is_not_a_match() {
        let member = resolver().resolve_exact("Fatima").await.unwrap();
        assert!(member.is_none());
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let store = InMemoryStore::new(vec![
            Member::new(4, "Martin", "Paul", "p1.pdf"),
            Member::new(9, "Martin", "Paul", "p2.pdf"),
        ]);
        let member = ExactMatchResolver::new(Arc::new(store))
            .resolve_exact("paul martin")
            .await
            .unwrap();
        assert_eq!(member.map(|m| m.id), Some(4));
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let result = resolver().resolve_exact("   ").await;
        assert!(matches!(result, Err(SearchError::NotSearchable(_))));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let result = ExactMatchResolver::new(Arc::new(FailingStore))
            .resolve_exact("Fatima Zahra")
            .await;
        assert!(matches!(
            result,
            Err(SearchError::StoreUnavailable(StoreError::Http { status: 503, .. }))
        ));
    }
}
