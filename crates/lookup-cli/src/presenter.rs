//! Terminal rendering of search results and member documents.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Url;
use tracing::{info, warn};

use lookup_search::{ResultSource, SearchResult, SuggestionListState};
use lookup_store::DocumentResolver;
use lookup_types::Member;

/// What the user sees for a published result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Nothing searched yet
    Nothing,
    Member {
        name: String,
        document: String,
        url: Option<Url>,
    },
    NotAMember,
    /// Roster could not be read; shown as no result
    NoResult,
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presentation::Nothing => Ok(()),
            Presentation::Member {
                name,
                document,
                url,
            } => {
                writeln!(f, "{name}")?;
                write!(f, "  document: {document}")?;
                if let Some(url) = url {
                    write!(f, "\n  url: {url}")?;
                }
                Ok(())
            }
            Presentation::NotAMember => write!(f, "Not a member"),
            Presentation::NoResult => write!(f, "No result"),
        }
    }
}

/// Renders results and fetches member documents.
pub struct ResultPresenter {
    resolver: Arc<dyn DocumentResolver>,
    http: reqwest::Client,
}

impl ResultPresenter {
    pub fn new(resolver: Arc<dyn DocumentResolver>) -> Self {
        Self {
            resolver,
            http: reqwest::Client::new(),
        }
    }

    pub async fn present(&self, result: &SearchResult) -> Presentation {
        if !result.searched {
            return Presentation::Nothing;
        }
        match (&result.member, result.source) {
            (Some(member), _) => self.present_member(member).await,
            (None, Some(ResultSource::StoreUnavailable)) => Presentation::NoResult,
            (None, _) => Presentation::NotAMember,
        }
    }

    async fn present_member(&self, member: &Member) -> Presentation {
        let url = match self.resolver.resolve_document_url(&member.document_ref).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(member_id = member.id, error = %e, "Document unavailable");
                None
            }
        };
        Presentation::Member {
            name: member.display_name(),
            document: member.document_ref.clone(),
            url,
        }
    }

    /// Download `member`'s document into `dir`, returning the written path.
    pub async fn download(&self, member: &Member, dir: &Path) -> Result<PathBuf> {
        let url = self
            .resolver
            .resolve_document_url(&member.document_ref)
            .await
            .context("Failed to resolve document URL")?;

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?
            .error_for_status()
            .with_context(|| format!("Document request failed: {url}"))?;
        let bytes = response
            .bytes()
            .await
            .context("Failed to read document body")?;

        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(document_file_name(&member.document_ref));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(member_id = member.id, path = %path.display(), bytes = bytes.len(), "Document downloaded");
        Ok(path)
    }
}

/// File name for a document reference, restricted to a safe character set.
pub fn document_file_name(document_ref: &str) -> String {
    let name: String = document_ref
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let name = name.trim_start_matches('.');
    if name.is_empty() {
        "document.pdf".to_string()
    } else {
        name.to_string()
    }
}

/// Render the suggestion list, one numbered row per suggestion.
///
/// Returns an empty string while the list is hidden.
pub fn render_list(state: &SuggestionListState) -> String {
    if !state.visible {
        return String::new();
    }
    let mut out = String::new();
    for (i, member) in state.items.iter().enumerate() {
        let marker = if state.highlighted == Some(i) { '>' } else { ' ' };
        out.push_str(&format!("{marker} {}. {}\n", i + 1, member.display_name()));
    }
    out
}
