//! Public URL resolution for member documents.

use async_trait::async_trait;
use reqwest::Url;

use lookup_types::DocumentSettings;

use crate::error::StoreError;
use crate::store::DocumentResolver;

/// Resolves documents served under a fixed public base URL.
///
/// The document reference becomes the last path segment, percent-encoded, so
/// `AHMED-BENALI.PDF` under `https://host/pdfs/` resolves to
/// `https://host/pdfs/AHMED-BENALI.PDF`.
#[derive(Debug, Clone)]
pub struct PublicUrlResolver {
    base: Url,
}

impl PublicUrlResolver {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let base =
            Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(format!("{base_url}: cannot be a base")));
        }
        Ok(Self { base })
    }

    pub fn from_settings(settings: &DocumentSettings) -> Result<Self, StoreError> {
        Self::new(&settings.base_url)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl DocumentResolver for PublicUrlResolver {
    async fn resolve_document_url(&self, document_ref: &str) -> Result<Url, StoreError> {
        let document_ref = document_ref.trim();
        if document_ref.is_empty() {
            return Err(StoreError::DocumentNotFound("empty document reference".to_string()));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(document_ref);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_under_base() {
        let resolver = PublicUrlResolver::new("https://docs.example.com/pdfs/").unwrap();
        let url = resolver
            .resolve_document_url("AHMED-BENALI.PDF")
            .await
            .unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/pdfs/AHMED-BENALI.PDF");
    }

    #[tokio::test]
    async fn test_base_without_trailing_slash() {
        let resolver = PublicUrlResolver::new("https://docs.example.com/pdfs").unwrap();
        let url = resolver.resolve_document_url("a.pdf").await.unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/pdfs/a.pdf");
    }

    #[tokio::test]
    async fn test_reference_is_a_single_segment() {
        let resolver = PublicUrlResolver::new("https://docs.example.com/pdfs/").unwrap();
        let url = resolver
            .resolve_document_url("../secret dir/x.pdf")
            .await
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://docs.example.com/pdfs/..%2Fsecret%20dir%2Fx.pdf"
        );
    }

    #[tokio::test]
    async fn test_empty_reference() {
        let resolver = PublicUrlResolver::new("https://docs.example.com/").unwrap();
        let result = resolver.resolve_document_url("  ").await;
        assert!(matches!(result, Err(StoreError::DocumentNotFound(_))));
    }

    #[test]
    fn test_rejects_non_base_urls() {
        assert!(PublicUrlResolver::new("mailto:someone@example.com").is_err());
        assert!(PublicUrlResolver::new("/pdfs/").is_err());
    }
}
