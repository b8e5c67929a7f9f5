//! Mounted search widget.
//!
//! One tokio task owns the [`SearchSession`]. Input events arrive over an
//! mpsc channel; the list snapshot and the current result are published on
//! watch channels. Fetches and resolutions run as child tasks in a `JoinSet`
//! and report back into the same loop, so every state change happens on the
//! widget task. Unmounting cancels the loop and aborts outstanding children.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lookup_store::RecordStore;
use lookup_types::{Member, SearchSettings, MAX_SUGGESTIONS};

use crate::debounce::{Generation, DEFAULT_DEBOUNCE};
use crate::error::SearchError;
use crate::fetcher::{SuggestionFetcher, DEFAULT_SUGGESTION_LIMIT};
use crate::query::MIN_QUERY_CHARS;
use crate::resolver::ExactMatchResolver;
use crate::session::{Effect, SearchResult, SearchSession, SuggestionListState};
use crate::suggestions::Key;

/// Tuning for a mounted widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetConfig {
    pub debounce: Duration,
    pub suggestion_limit: usize,
    pub min_query_chars: usize,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            min_query_chars: MIN_QUERY_CHARS,
        }
    }
}

impl From<&SearchSettings> for WidgetConfig {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            debounce: Duration::from_millis(settings.debounce_ms),
            suggestion_limit: settings.suggestion_limit.clamp(1, MAX_SUGGESTIONS),
            min_query_chars: settings.min_query_chars,
        }
    }
}

/// User input delivered to the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    TextChanged(String),
    Key(Key),
    /// Pointer activation of the row at this index
    Activate(usize),
    Submit,
}

enum TaskOutput {
    Suggestions {
        generation: Generation,
        result: Result<Vec<Member>, SearchError>,
    },
    Resolution {
        ticket: u64,
        result: Result<Option<Member>, SearchError>,
    },
}

/// Handle to a mounted widget. Dropping it unmounts the widget.
pub struct SearchWidget {
    events: mpsc::UnboundedSender<WidgetEvent>,
    list: watch::Receiver<SuggestionListState>,
    result: watch::Receiver<SearchResult>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SearchWidget {
    /// Mount a widget over `store`. Must be called inside a tokio runtime.
    pub fn mount(store: Arc<dyn RecordStore>, config: WidgetConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (list_tx, list_rx) = watch::channel(SuggestionListState::default());
        let (result_tx, result_rx) = watch::channel(SearchResult::default());
        let cancel = CancellationToken::new();

        let actor = WidgetTask {
            session: SearchSession::new(config.debounce, config.min_query_chars),
            fetcher: SuggestionFetcher::new(store.clone()).with_limit(config.suggestion_limit),
            resolver: ExactMatchResolver::new(store),
            tasks: JoinSet::new(),
            list_tx,
            result_tx,
        };
        let task = tokio::spawn(actor.run(events_rx, cancel.clone()));

        info!(
            debounce_ms = config.debounce.as_millis() as u64,
            suggestion_limit = config.suggestion_limit,
            "Search widget mounted"
        );

        Self {
            events: events_tx,
            list: list_rx,
            result: result_rx,
            cancel,
            task: Some(task),
        }
    }

    pub fn send(&self, event: WidgetEvent) -> Result<(), SearchError> {
        self.events
            .send(event)
            .map_err(|_| SearchError::WidgetClosed)
    }

    pub fn set_text(&self, text: impl Into<String>) -> Result<(), SearchError> {
        self.send(WidgetEvent::TextChanged(text.into()))
    }

    pub fn press(&self, key: Key) -> Result<(), SearchError> {
        self.send(WidgetEvent::Key(key))
    }

    pub fn activate(&self, index: usize) -> Result<(), SearchError> {
        self.send(WidgetEvent::Activate(index))
    }

    pub fn submit(&self) -> Result<(), SearchError> {
        self.send(WidgetEvent::Submit)
    }

    /// Subscribe to suggestion list snapshots.
    pub fn suggestions(&self) -> watch::Receiver<SuggestionListState> {
        self.list.clone()
    }

    /// Subscribe to published results.
    pub fn results(&self) -> watch::Receiver<SearchResult> {
        self.result.clone()
    }

    pub fn list_state(&self) -> SuggestionListState {
        self.list.borrow().clone()
    }

    pub fn last_result(&self) -> SearchResult {
        self.result.borrow().clone()
    }

    /// Unmount and wait for the widget task to finish.
    pub async fn unmount(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Search widget task ended abnormally");
            }
        }
    }
}

impl Drop for SearchWidget {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct WidgetTask {
    session: SearchSession,
    fetcher: SuggestionFetcher,
    resolver: ExactMatchResolver,
    tasks: JoinSet<TaskOutput>,
    list_tx: watch::Sender<SuggestionListState>,
    result_tx: watch::Sender<SearchResult>,
}

impl WidgetTask {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<WidgetEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            let deadline = self.session.timer_deadline();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.handle_timer();
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.handle_joined(joined);
                }
            }
            self.publish();
        }

        self.session.unmount();
        self.tasks.abort_all();
        self.publish();
        info!("Search widget unmounted");
    }

    fn handle_event(&mut self, event: WidgetEvent) {
        debug!(?event, "Widget event");
        match event {
            WidgetEvent::TextChanged(text) => self.session.text_changed(&text, Instant::now()),
            WidgetEvent::Key(key) => {
                if let Some(effect) = self.session.key(key) {
                    self.spawn(effect);
                }
            }
            WidgetEvent::Activate(index) => {
                self.session.activate(index);
            }
            WidgetEvent::Submit => {
                if let Some(effect) = self.session.submit() {
                    self.spawn(effect);
                }
            }
        }
    }

    fn handle_timer(&mut self) {
        if let Some(effect) = self.session.poll_timer(Instant::now()) {
            self.spawn(effect);
        }
    }

    fn handle_joined(&mut self, joined: Result<TaskOutput, JoinError>) {
        match joined {
            Ok(TaskOutput::Suggestions { generation, result }) => {
                self.session.fetch_completed(generation, result);
            }
            Ok(TaskOutput::Resolution { ticket, result }) => {
                self.session.resolution_completed(ticket, result);
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!(error = %e, "Search task panicked"),
        }
    }

    fn spawn(&mut self, effect: Effect) {
        match effect {
            Effect::Fetch { generation, query } => {
                let fetcher = self.fetcher.clone();
                self.tasks.spawn(async move {
                    let result = fetcher.fetch_suggestions(&query).await;
                    TaskOutput::Suggestions { generation, result }
                });
            }
            Effect::Resolve { ticket, query } => {
                let resolver = self.resolver.clone();
                self.tasks.spawn(async move {
                    let result = resolver.resolve_exact(&query).await;
                    TaskOutput::Resolution { ticket, result }
                });
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.session.snapshot();
        self.list_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });

        let result = self.session.result().clone();
        self.result_tx.send_if_modified(|current| {
            if *current == result {
                return false;
            }
            *current = result;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use lookup_store::{InMemoryStore, StoreError};
    use lookup_types::NameField;

    use crate::session::ResultSource;

    const WAIT: Duration = Duration::from_secs(30);

    /// In-memory store that counts substring queries.
    struct CountingStore {
        inner: InMemoryStore,
        substring_calls: AtomicUsize,
    }

    impl CountingStore {
        fn sample() -> Arc<Self> {
            Self::with_members(InMemoryStore::sample().members().to_vec())
        }

        fn with_members(members: Vec<Member>) -> Arc<Self> {
            Arc::new(Self {
                inner: InMemoryStore::new(members),
                substring_calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.substring_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn query_substring(
            &self,
            fields: &[NameField],
            pattern: &str,
            limit: usize,
        ) -> Result<Vec<Member>, StoreError> {
            self.substring_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.query_substring(fields, pattern, limit).await
        }

        async fn query_all(&self) -> Result<Vec<Member>, StoreError> {
            self.inner.query_all().await
        }
    }

    async fn wait_list(
        widget: &SearchWidget,
        pred: impl FnMut(&SuggestionListState) -> bool,
    ) -> SuggestionListState {
        let mut rx = widget.suggestions();
        let state = tokio::time::timeout(WAIT, rx.wait_for(pred))
            .await
            .expect("timed out waiting for list state")
            .expect("widget closed")
            .clone();
        state
    }

    async fn wait_result(widget: &SearchWidget, min_revision: u64) -> SearchResult {
        let mut rx = widget.results();
        let result = tokio::time::timeout(WAIT, rx.wait_for(|r| r.revision >= min_revision))
            .await
            .expect("timed out waiting for result")
            .expect("widget closed")
            .clone();
        result
    }

    #[test]
    fn test_config_from_settings() {
        let settings = SearchSettings {
            debounce_ms: 150,
            suggestion_limit: 8,
            min_query_chars: 3,
        };
        let config = WidgetConfig::from(&settings);
        assert_eq!(config.debounce, Duration::from_millis(150));
        assert_eq!(config.suggestion_limit, 5);
        assert_eq!(config.min_query_chars, 3);
        assert_eq!(WidgetConfig::default().debounce, Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_shows_suggestions_after_quiet_period() {
        let store = CountingStore::sample();
        let widget = SearchWidget::mount(store.clone(), WidgetConfig::default());

        widget.set_text("ahm").unwrap();
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(store.calls(), 0);

        let state = wait_list(&widget, |s| s.visible).await;
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].display_name(), "AHMED BENALI");
        assert_eq!(state.highlighted, None);
        assert!(!state.loading);
        assert_eq!(store.calls(), 1);

        widget.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_limit_shows_at_most_five() {
        let members = (1..=8)
            .map(|i| Member::new(i, format!("NAME{i}"), "ALEX", format!("{i}.pdf")))
            .collect();
        let settings = SearchSettings {
            debounce_ms: 300,
            suggestion_limit: 8,
            min_query_chars: 2,
        };
        let config = WidgetConfig {
            suggestion_limit: 8,
            ..WidgetConfig::from(&settings)
        };
        let widget = SearchWidget::mount(CountingStore::with_members(members), config);

        widget.set_text("alex").unwrap();
        let state = wait_list(&widget, |s| s.visible).await;
        assert_eq!(state.items.len(), 5);
        assert_eq!(state.items[0].id, 1);

        widget.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_publishes_closed_list() {
        let widget = SearchWidget::mount(CountingStore::sample(), WidgetConfig::default());

        widget.set_text("ahm").unwrap();
        wait_list(&widget, |s| s.visible).await;

        let mut list_rx = widget.suggestions();
        widget.unmount().await;

        let state = list_rx.borrow_and_update().clone();
        assert!(!state.visible);
        assert!(!state.loading);
        assert_eq!(state.highlighted, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_fetches_once() {
        let store = CountingStore::sample();
        let widget = SearchWidget::mount(store.clone(), WidgetConfig::default());

        for text in ["fa", "fat", "fati", "fatim", "fatima"] {
            widget.set_text(text).unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let state = wait_list(&widget, |s| s.visible).await;
        assert_eq!(state.items[0].id, 2);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_char_never_fetches() {
        let store = CountingStore::sample();
        let widget = SearchWidget::mount(store.clone(), WidgetConfig::default());

        widget.set_text("a").unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.calls(), 0);
        assert!(!widget.list_state().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyboard_selection_publishes_member() {
        let widget = SearchWidget::mount(CountingStore::sample(), WidgetConfig::default());

        widget.set_text("am").unwrap();
        wait_list(&widget, |s| s.visible).await;
        widget.press(Key::ArrowDown).unwrap();
        widget.press(Key::ArrowDown).unwrap();
        widget.press(Key::Enter).unwrap();

        let result = wait_result(&widget, 1).await;
        assert_eq!(result.source, Some(ResultSource::Selection));
        let member = result.member.unwrap();
        let state = widget.list_state();
        assert!(!state.visible);
        assert_eq!(state.query, member.display_name());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_resolves_exact_name() {
        let widget = SearchWidget::mount(CountingStore::sample(), WidgetConfig::default());

        widget.set_text("Fatima Zahra").unwrap();
        widget.submit().unwrap();
        let result = wait_result(&widget, 1).await;
        assert_eq!(result.source, Some(ResultSource::ExactMatch));
        assert_eq!(result.member.map(|m| m.id), Some(2));

        widget.set_text("Jean Dupont").unwrap();
        widget.press(Key::Enter).unwrap();
        let result = wait_result(&widget, 2).await;
        assert_eq!(result.source, Some(ResultSource::NoMatch));
        assert!(result.searched);
        assert!(result.member.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_after_unmount_fail() {
        let widget = SearchWidget::mount(CountingStore::sample(), WidgetConfig::default());
        let events = widget.events.clone();
        widget.unmount().await;
        assert!(events.send(WidgetEvent::Submit).is_err());
    }
}
