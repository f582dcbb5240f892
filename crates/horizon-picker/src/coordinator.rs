//! The search coordinator.
//!
//! One logical search runs here, keystroke to published list: clean the
//! entered text, decide between local filtering and remote lookup, reconcile
//! out-of-order asynchronous responses, and feed the match engine.
//!
//! Overlapping remote searches are resolved with two monotonically
//! increasing counters owned by the coordinator instance: every issued
//! request captures `last_request_id + 1`, and a response is accepted only
//! while its request id is not behind `last_response_id`. A slow response
//! arriving after a newer one has completed compares stale and is dropped.
//! There is no cancellation token; discard-by-comparison is sufficient.
//!
//! Chunked (streaming) responses publish progressively: each accepted chunk
//! appends to the candidate list and re-runs the match pipeline, so the
//! dropdown fills while the stream is still producing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use futures_util::StreamExt;
use horizon_picker_core::{Signal, StateCell};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::accessor::ItemAccessors;
use crate::config::AutocompleteOptions;
use crate::item::{self, FilteredItem, ListItem};
use crate::matching::{self, MatchPolicy};
use crate::source::{SearchSource, SourceReply};
use crate::text;

/// What a finished search pass asks of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// The entered text is below the search threshold; the dropdown should
    /// close.
    pub should_close: bool,
}

/// Orchestrates searches over the candidate list.
///
/// The coordinator owns the candidates, their projection, and the published
/// filtered list; the selection state machine and the presentation layer
/// only read them. [`list_updated`](Self::list_updated) fires on every
/// publish.
pub struct SearchCoordinator<T> {
    options: Arc<AutocompleteOptions>,
    accessors: Arc<ItemAccessors<T>>,
    policy: MatchPolicy<T>,
    source: Option<Arc<dyn SearchSource<T>>>,

    /// Candidate list. Caller-supplied in local mode, response-owned in
    /// remote mode.
    items: RwLock<Vec<Arc<T>>>,
    /// Searchable projection of `items`, rebuilt wholesale.
    entries: RwLock<Vec<ListItem<T>>>,
    /// The published filtered list the presentation renders.
    filtered: RwLock<Vec<FilteredItem<T>>>,

    /// Length (in characters) of the last cleaned search text.
    filtered_text_len: AtomicUsize,
    /// Id handed to the most recently issued remote request.
    last_request_id: AtomicU64,
    /// Highest request id whose response has been accepted.
    last_response_id: AtomicU64,

    loading: StateCell<bool>,

    /// Emitted every time the published filtered list is replaced.
    pub list_updated: Signal<()>,
}

impl<T: Send + Sync + 'static> SearchCoordinator<T> {
    /// Create a coordinator over an empty candidate list.
    pub fn new(
        options: Arc<AutocompleteOptions>,
        accessors: Arc<ItemAccessors<T>>,
        policy: MatchPolicy<T>,
        source: Option<Arc<dyn SearchSource<T>>>,
    ) -> Self {
        Self {
            options,
            accessors,
            policy,
            source,
            items: RwLock::new(Vec::new()),
            entries: RwLock::new(Vec::new()),
            filtered: RwLock::new(Vec::new()),
            filtered_text_len: AtomicUsize::new(0),
            last_request_id: AtomicU64::new(0),
            last_response_id: AtomicU64::new(0),
            loading: StateCell::new(false),
            list_updated: Signal::new(),
        }
    }

    /// Install (or remove) the remote search source. Builder-phase only.
    pub(crate) fn install_source(&mut self, source: Option<Arc<dyn SearchSource<T>>>) {
        self.source = source;
    }

    /// Replace the match policy. Builder-phase only.
    pub(crate) fn install_policy(&mut self, policy: MatchPolicy<T>) {
        self.policy = policy;
    }

    // =========================================================================
    // Candidate access
    // =========================================================================

    /// Replace the candidate list, reproject it, and publish the full list.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.write() = items.into_iter().map(Arc::new).collect();
        self.reproject_and_reset();
    }

    /// Replace the candidate list with a single (freshly created) candidate.
    pub(crate) fn replace_with_single(&self, item: Arc<T>) {
        *self.items.write() = vec![item];
        self.reproject_and_reset();
    }

    /// Number of candidates currently held.
    pub fn items_len(&self) -> usize {
        self.items.read().len()
    }

    /// Number of projected list items.
    pub fn entries_len(&self) -> usize {
        self.entries.read().len()
    }

    /// Snapshot of the published filtered list.
    pub fn filtered_items(&self) -> Vec<FilteredItem<T>> {
        self.filtered.read().clone()
    }

    /// The published entry at `index`, if any.
    pub fn filtered_at(&self, index: usize) -> Option<FilteredItem<T>> {
        self.filtered.read().get(index).cloned()
    }

    /// Length of the published filtered list.
    pub fn filtered_len(&self) -> usize {
        self.filtered.read().len()
    }

    /// Index of a candidate in the published list, by identity.
    pub fn find_item_index(&self, item: &Arc<T>) -> Option<usize> {
        self.filtered
            .read()
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.item, item))
    }

    /// Whether a remote search source is configured.
    pub fn source_configured(&self) -> bool {
        self.source.is_some()
    }

    /// Whether a remote lookup is in flight.
    pub fn loading(&self) -> bool {
        self.loading.get()
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    /// Character count of the last cleaned search text.
    pub fn filtered_text_len(&self) -> usize {
        self.filtered_text_len.load(Ordering::Acquire)
    }

    /// True when the cleaned text is below the configured search threshold.
    ///
    /// Without a search source the dropdown may always open on empty text,
    /// so the threshold only applies to non-empty input there.
    pub fn not_enough_text(&self) -> bool {
        let min = self.options.min_characters_to_search;
        let len = self.filtered_text_len();
        min > 0 && len < min && (self.source.is_some() || len > 0)
    }

    // =========================================================================
    // Publishing
    // =========================================================================

    /// Publish the full projection, unfiltered and unannotated.
    pub fn reset_to_all(&self) {
        let plain: Vec<FilteredItem<T>> =
            self.entries.read().iter().map(FilteredItem::plain).collect();
        self.publish(plain);
    }

    /// Reproject the candidates, then publish the full projection.
    pub(crate) fn reproject_and_reset(&self) {
        self.prepare_entries();
        self.reset_to_all();
    }

    fn prepare_entries(&self) {
        let items = self.items.read().clone();
        let entries = item::project(&items, &self.accessors, &self.options);
        debug!(
            target: "horizon_picker::search",
            count = entries.len(),
            "projected candidate list"
        );
        *self.entries.write() = entries;
    }

    fn publish(&self, filtered: Vec<FilteredItem<T>>) {
        *self.filtered.write() = filtered;
        self.list_updated.emit(());
    }

    /// Reproject and run the match pipeline for the given cleaned text.
    fn process(&self, cleaned: &str) {
        self.prepare_entries();

        let searchable = if self.options.ignore_accents {
            text::remove_accents(cleaned).into_owned()
        } else {
            cleaned.to_string()
        };
        let tokens = matching::tokenize(&searchable);

        let entries = self.entries.read();
        let filtered = matching::run_pipeline(&entries, &tokens, &self.options, &self.policy);
        drop(entries);

        debug!(
            target: "horizon_picker::search",
            tokens = tokens.len(),
            kept = filtered.len(),
            "search pass complete"
        );
        self.publish(filtered);
    }

    // =========================================================================
    // Searching
    // =========================================================================

    /// Clean user-entered search text per the configured options and hooks.
    pub fn clean_search_text(&self, raw: &str) -> String {
        if !self.options.clean_user_text {
            return raw.to_string();
        }
        let stripped = text::strip_search_punctuation(raw);
        let hooked = self.accessors.clean_text(&stripped);
        text::fold_case(&hooked, self.options.lowercase_keywords)
    }

    /// Run one logical search for the entered text.
    ///
    /// Local mode filters synchronously. Remote mode issues a request under
    /// a fresh id and reconciles the response (or each streamed chunk)
    /// against the id fence before publishing.
    pub async fn search(&self, raw_text: &str) -> SearchOutcome {
        let cleaned = self.clean_search_text(raw_text);
        self.filtered_text_len
            .store(cleaned.chars().count(), Ordering::Release);

        if self.not_enough_text() {
            if self.source.is_some() {
                // The next full-length query re-fetches; drop what a
                // previous one loaded.
                self.items.write().clear();
                self.entries.write().clear();
                self.publish(Vec::new());
            } else {
                self.reset_to_all();
            }
            return SearchOutcome { should_close: true };
        }

        if cleaned.is_empty() && self.source.is_some() {
            // Threshold of zero: the empty query goes to the source, with
            // stale local accumulation dropped first.
            self.items.write().clear();
            self.entries.write().clear();
            self.publish(Vec::new());
        }

        match self.source.clone() {
            None => self.process(&cleaned),
            Some(source) => {
                let current = self.last_request_id.fetch_add(1, Ordering::AcqRel) + 1;
                self.loading.set(true);
                debug!(
                    target: "horizon_picker::search",
                    request = current,
                    query = %cleaned,
                    "remote search issued"
                );

                match source.search(&cleaned, self.options.max_items_to_show_in_list) {
                    SourceReply::Batch(fut) => {
                        let result = fut.await;
                        if current >= self.last_response_id.load(Ordering::Acquire) {
                            let items = match result {
                                Ok(items) => items,
                                Err(err) => {
                                    warn!(
                                        target: "horizon_picker::search",
                                        request = current,
                                        error = %err,
                                        "search source failed; publishing empty result"
                                    );
                                    Vec::new()
                                }
                            };
                            self.last_response_id.store(current, Ordering::Release);
                            *self.items.write() = items.into_iter().map(Arc::new).collect();
                            self.process(&cleaned);
                        } else {
                            debug!(
                                target: "horizon_picker::search",
                                request = current,
                                "stale response dropped"
                            );
                        }
                    }
                    SourceReply::Chunks(mut stream) => {
                        let mut abandoned = false;
                        while let Some(chunk) = stream.next().await {
                            let last = self.last_response_id.load(Ordering::Acquire);
                            if current < last {
                                // A newer request already completed; stop
                                // consuming this stream entirely.
                                debug!(
                                    target: "horizon_picker::search",
                                    request = current,
                                    "stale stream abandoned"
                                );
                                abandoned = true;
                                break;
                            }
                            let chunk = match chunk {
                                Ok(chunk) => chunk,
                                Err(err) => {
                                    warn!(
                                        target: "horizon_picker::search",
                                        request = current,
                                        error = %err,
                                        "search source stream failed; ending stream"
                                    );
                                    break;
                                }
                            };
                            if current > last {
                                // First accepted chunk of a new response:
                                // restart accumulation.
                                self.items.write().clear();
                            }
                            self.last_response_id.store(current, Ordering::Release);
                            self.items
                                .write()
                                .extend(chunk.into_iter().map(Arc::new));
                            self.process(&cleaned);
                        }

                        // An empty (or fully failed) stream still counts as
                        // this request's response.
                        if !abandoned && self.last_response_id.load(Ordering::Acquire) < current
                        {
                            self.last_response_id.store(current, Ordering::Release);
                            self.items.write().clear();
                            self.process(&cleaned);
                        }
                    }
                }

                self.loading.set(false);
            }
        }

        SearchOutcome {
            should_close: self.not_enough_text(),
        }
    }
}

impl<T> std::fmt::Debug for SearchCoordinator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCoordinator")
            .field("items", &self.items.read().len())
            .field("filtered", &self.filtered.read().len())
            .field("loading", &self.loading.get())
            .field(
                "last_request_id",
                &self.last_request_id.load(Ordering::Acquire),
            )
            .field(
                "last_response_id",
                &self.last_response_id.load(Ordering::Acquire),
            )
            .finish()
    }
}
