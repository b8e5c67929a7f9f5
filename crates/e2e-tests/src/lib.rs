//! End-to-end test infrastructure for roster-lookup.
//!
//! Provides a shared TestHarness around a mounted search widget and a
//! scriptable record store whose queries can be held back, failed, and
//! counted, so completion interleavings can be forced from a test.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use lookup_search::{SearchResult, SearchWidget, SuggestionListState, WidgetConfig};
use lookup_store::{InMemoryStore, RecordStore, StoreError};
use lookup_types::{Member, NameField};

/// Gate key used for `query_all`.
pub const ALL_MEMBERS: &str = "*";

/// How long the wait helpers give the widget before failing the test.
pub const WAIT_LIMIT: Duration = Duration::from_secs(30);

/// Record store whose answers a test controls.
///
/// A gated pattern holds its queries until the test releases them, one
/// query per release, in arrival order.
pub struct ScriptedStore {
    inner: InMemoryStore,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    patterns: Mutex<Vec<String>>,
    substring_calls: AtomicUsize,
    all_calls: AtomicUsize,
    failing: AtomicBool,
}

impl ScriptedStore {
    pub fn new(members: Vec<Member>) -> Self {
        Self {
            inner: InMemoryStore::new(members),
            gates: Mutex::new(HashMap::new()),
            patterns: Mutex::new(Vec::new()),
            substring_calls: AtomicUsize::new(0),
            all_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn sample() -> Self {
        Self::new(sample_roster())
    }

    /// Hold every query for `pattern` until released.
    pub fn gate(&self, pattern: &str) {
        self.gates
            .lock()
            .expect("gate lock poisoned")
            .insert(pattern.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Let one held query for `pattern` through.
    pub fn release(&self, pattern: &str) {
        if let Some(gate) = self.gates.lock().expect("gate lock poisoned").get(pattern) {
            gate.add_permits(1);
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn substring_calls(&self) -> usize {
        self.substring_calls.load(Ordering::SeqCst)
    }

    pub fn all_calls(&self) -> usize {
        self.all_calls.load(Ordering::SeqCst)
    }

    /// Patterns of every substring query, in arrival order.
    pub fn patterns(&self) -> Vec<String> {
        self.patterns.lock().expect("pattern lock poisoned").clone()
    }

    async fn pass_gate(&self, key: &str) -> Result<(), StoreError> {
        let gate = self
            .gates
            .lock()
            .expect("gate lock poisoned")
            .get(key)
            .cloned();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|_| StoreError::Unavailable("gate closed".to_string()))?
                .forget();
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("scripted failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn query_substring(
        &self,
        fields: &[NameField],
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<Member>, StoreError> {
        self.substring_calls.fetch_add(1, Ordering::SeqCst);
        self.patterns
            .lock()
            .expect("pattern lock poisoned")
            .push(pattern.to_string());
        self.pass_gate(pattern).await?;
        self.inner.query_substring(fields, pattern, limit).await
    }

    async fn query_all(&self) -> Result<Vec<Member>, StoreError> {
        self.all_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate(ALL_MEMBERS).await?;
        self.inner.query_all().await
    }
}

/// Shared test harness for E2E tests.
///
/// Mounts a widget over a [`ScriptedStore`]. Must be created inside a tokio
/// runtime.
pub struct TestHarness {
    pub store: Arc<ScriptedStore>,
    pub widget: SearchWidget,
}

impl TestHarness {
    /// Widget over the sample roster with default tuning.
    pub fn new() -> Self {
        Self::with_store(ScriptedStore::sample(), WidgetConfig::default())
    }

    pub fn with_roster(members: Vec<Member>) -> Self {
        Self::with_store(ScriptedStore::new(members), WidgetConfig::default())
    }

    pub fn with_store(store: ScriptedStore, config: WidgetConfig) -> Self {
        let store = Arc::new(store);
        let widget = SearchWidget::mount(store.clone(), config);
        Self { store, widget }
    }

    pub fn type_text(&self, text: &str) {
        self.widget.set_text(text).expect("widget closed");
    }

    /// Wait until the list snapshot satisfies `pred`.
    pub async fn wait_for_list(
        &self,
        pred: impl FnMut(&SuggestionListState) -> bool,
    ) -> SuggestionListState {
        let mut rx = self.widget.suggestions();
        let state = tokio::time::timeout(WAIT_LIMIT, rx.wait_for(pred))
            .await
            .expect("timed out waiting for suggestion list")
            .expect("widget closed")
            .clone();
        state
    }

    /// Wait until a result with at least `revision` is published.
    pub async fn wait_for_result(&self, revision: u64) -> SearchResult {
        let mut rx = self.widget.results();
        let result = tokio::time::timeout(WAIT_LIMIT, rx.wait_for(|r| r.revision >= revision))
            .await
            .expect("timed out waiting for search result")
            .expect("widget closed")
            .clone();
        result
    }

    /// Let (paused) time run past any armed debounce and pending work.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}

/// The three-member roster used across scenarios.
pub fn sample_roster() -> Vec<Member> {
    InMemoryStore::sample().members().to_vec()
}

/// Three members whose first names all contain "ann", in store order A, B, C.
pub fn ann_roster() -> Vec<Member> {
    vec![
        Member::new(1, "ALPHA", "ANNA", "ANNA-ALPHA.PDF"),
        Member::new(2, "BRAVO", "JOANNA", "JOANNA-BRAVO.PDF"),
        Member::new(3, "CHARLIE", "HANNAH", "HANNAH-CHARLIE.PDF"),
    ]
}

/// Display names of `members`, in order.
pub fn names(members: &[Member]) -> Vec<String> {
    members.iter().map(Member::display_name).collect()
}

/// Write `members` as a JSON roster file under `dir`.
pub fn write_roster_file(dir: &tempfile::TempDir, members: &[Member]) -> PathBuf {
    let path = dir.path().join("roster.json");
    let json = serde_json::to_string_pretty(members).expect("Failed to serialize roster");
    std::fs::write(&path, json).expect("Failed to write roster file");
    path
}
