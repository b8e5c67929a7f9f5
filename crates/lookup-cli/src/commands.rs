//! Command implementations for roster-lookup.
//!
//! Handles:
//! - search: exact resolution of a full name, optional document download
//! - suggest: one suggestion fetch, printed
//! - interactive: a mounted search widget driven from stdin
//! - config: effective settings

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{info, warn};

use lookup_search::{
    normalize_with_min, ExactMatchResolver, NormalizedQuery, ResultSource, SearchError,
    SearchResult, SearchWidget, SuggestionFetcher, WidgetConfig,
};
use lookup_store::{open_store, PublicUrlResolver};
use lookup_types::{Settings, StoreBackend};

use crate::interactive::run_interactive;
use crate::presenter::ResultPresenter;

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
    roster_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    if let Some(roster) = roster_override {
        settings.store.backend = StoreBackend::Memory;
        settings.store.roster_path = Some(roster.to_string());
    }
    Ok(settings)
}

/// Initialize logging on stderr so command output stays clean.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn presenter(settings: &Settings) -> Result<ResultPresenter> {
    let resolver = PublicUrlResolver::from_settings(&settings.documents)
        .context("Invalid documents.base_url")?;
    Ok(ResultPresenter::new(Arc::new(resolver)))
}

/// Resolve `name` exactly and print the result.
pub async fn handle_search(settings: &Settings, name: &[String], download: Option<&Path>) -> Result<()> {
    let query = name.join(" ");
    let store = open_store(settings).await.context("Failed to open record store")?;
    let presenter = presenter(settings)?;

    let (member, source) = match ExactMatchResolver::new(store).resolve_exact(&query).await {
        Ok(Some(member)) => (Some(member), ResultSource::ExactMatch),
        Ok(None) => (None, ResultSource::NoMatch),
        Err(SearchError::NotSearchable(_)) => anyhow::bail!("Name must not be empty"),
        Err(e) => {
            warn!(query = %query, error = %e, "Lookup failed");
            (None, ResultSource::StoreUnavailable)
        }
    };

    let result = SearchResult {
        member,
        searched: true,
        source: Some(source),
        revision: 1,
    };
    println!("{}", presenter.present(&result).await);

    if let (Some(dir), Some(member)) = (download, &result.member) {
        let path = presenter.download(member, dir).await?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

/// Fetch and print suggestions for a partial query.
pub async fn handle_suggest(settings: &Settings, query: &str, json: bool) -> Result<()> {
    let NormalizedQuery::Searchable(query) =
        normalize_with_min(query, settings.search.min_query_chars)
    else {
        println!(
            "Type at least {} characters to get suggestions",
            settings.search.min_query_chars
        );
        return Ok(());
    };

    let store = open_store(settings).await.context("Failed to open record store")?;
    let fetcher = SuggestionFetcher::new(store).with_limit(settings.search.suggestion_limit);
    let suggestions = fetcher
        .fetch_suggestions(&query)
        .await
        .context("Suggestions unavailable")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else if suggestions.is_empty() {
        println!("No suggestions");
    } else {
        for (i, member) in suggestions.iter().enumerate() {
            println!("{}. {}", i + 1, member.display_name());
        }
    }
    Ok(())
}

/// Run an interactive session on stdin/stdout.
pub async fn handle_interactive(settings: &Settings) -> Result<()> {
    let store = open_store(settings).await.context("Failed to open record store")?;
    let presenter = presenter(settings)?;
    let widget = SearchWidget::mount(store, WidgetConfig::from(&settings.search));

    info!("Interactive session started");
    run_interactive(
        widget,
        &presenter,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Print the effective settings as TOML. The API key is never printed.
pub fn show_config(settings: &Settings) -> Result<()> {
    print!("{}", render_config(settings)?);
    Ok(())
}

fn render_config(settings: &Settings) -> Result<String> {
    let mut out = toml::to_string_pretty(settings).context("Failed to render settings")?;
    if settings.store.api_key.is_some() {
        out.push_str("\n# store.api_key is set (redacted)\n");
    }
    Ok(out)
}
