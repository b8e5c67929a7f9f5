//! # lookup-store
//!
//! Record store backends and document resolution for roster-lookup.
//!
//! ## Backends
//! - `InMemoryStore`: sample roster or a JSON roster file
//! - `RestStore`: PostgREST `/rest/v1/{table}` endpoint
//!
//! Both implement `RecordStore`; `PublicUrlResolver` implements
//! `DocumentResolver`.

pub mod documents;
pub mod error;
pub mod memory;
pub mod rest;
pub mod store;

use std::sync::Arc;

use tracing::info;

use lookup_types::{Settings, StoreBackend};

pub use documents::PublicUrlResolver;
pub use error::StoreError;
pub use memory::InMemoryStore;
pub use rest::{RestStore, RestStoreConfig};
pub use store::{DocumentResolver, RecordStore};

/// Open the record store selected by `store.backend`.
pub async fn open_store(settings: &Settings) -> Result<Arc<dyn RecordStore>, StoreError> {
    match settings.store.backend {
        StoreBackend::Memory => match settings.expanded_roster_path() {
            Some(path) => Ok(Arc::new(InMemoryStore::load(&path).await?)),
            None => {
                info!("No roster file configured, using the sample roster");
                Ok(Arc::new(InMemoryStore::sample()))
            }
        },
        StoreBackend::Rest => {
            let config = RestStoreConfig::from_settings(&settings.store)?;
            let store = RestStore::new(config)?;
            info!(endpoint = %store.endpoint(), "Using REST record store");
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_default_store_is_sample() {
        let store = open_store(&Settings::default()).await.unwrap();
        assert_eq!(store.query_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_open_rest_store_without_url_fails() {
        let mut settings = Settings::default();
        settings.store.backend = StoreBackend::Rest;
        let result = open_store(&settings).await;
        assert!(matches!(result, Err(StoreError::Config(_))));
    }
}
