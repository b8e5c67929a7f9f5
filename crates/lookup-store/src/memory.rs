//! In-memory record store.
//!
//! Holds the roster as a vector in insertion order, which is also the order
//! results come back in. Useful for tests and for small rosters shipped as a
//! JSON file.

use std::path::Path;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tracing::{debug, info};

use lookup_types::{Member, NameField};

use crate::error::StoreError;
use crate::store::RecordStore;

/// Roster held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    members: Vec<Member>,
}

impl InMemoryStore {
    /// Create a store over the given members.
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// The three-member roster the members table is provisioned with.
    pub fn sample() -> Self {
        let created_at = Utc
            .with_ymd_and_hms(2025, 1, 15, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);

        Self::new(vec![
            Member::new(1, "BENALI", "AHMED", "AHMED-BENALI.PDF").with_created_at(created_at),
            Member::new(2, "ZAHRA", "FATIMA", "FATIMA-ZAHRA.PDF").with_created_at(created_at),
            Member::new(3, "AMRANI", "YOUSSEF", "YOUSSEF-AMRANI.PDF").with_created_at(created_at),
        ])
    }

    /// Parse a JSON array of members.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let members: Vec<Member> = serde_json::from_str(json)?;
        for member in &members {
            member
                .validate()
                .map_err(|e| StoreError::Decode(e.to_string()))?;
        }
        Ok(Self::new(members))
    }

    /// Load a JSON roster file.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        info!("Loading roster from {:?}", path);
        let json = tokio::fs::read_to_string(path).await?;
        let store = Self::from_json_str(&json)?;
        info!(count = store.len(), "Roster loaded");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

/// Case-insensitive containment, the `ilike '%pattern%'` the REST backend runs.
fn ilike_contains(value: &str, pattern: &str) -> bool {
    value.to_lowercase().contains(&pattern.to_lowercase())
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn query_substring(
        &self,
        fields: &[NameField],
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<Member>, StoreError> {
        let results: Vec<Member> = self
            .members
            .iter()
            .filter(|m| fields.iter().any(|f| ilike_contains(m.field(*f), pattern)))
            .take(limit)
            .cloned()
            .collect();

        debug!(pattern, count = results.len(), "In-memory substring query");
        Ok(results)
    }

    async fn query_all(&self) -> Result<Vec<Member>, StoreError> {
        Ok(self.members.clone())
    }
}
