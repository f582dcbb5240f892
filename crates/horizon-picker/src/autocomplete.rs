//! The selection state machine.
//!
//! [`Autocomplete`] ties the search coordinator to selection state and the
//! command surface a presentation layer drives: keyboard and pointer
//! commands come in, reactive state and signals go out. Every command
//! recomputes the derived flags (`has_selection`, `locked`, `clearable`,
//! `show_list`, `highlighted_item`) synchronously before it returns, so
//! observers never see a stale derivation.
//!
//! # Signals
//!
//! - `changed(SelectedItems)`: the selection changed; emitted on every
//!   confirmed selection, including reselecting the current item and
//!   toggling an item off
//! - `focused()` / `blurred()`: the input gained or lost focus
//! - `focus_requested()`: the core wants the presentation to refocus the
//!   input (after clearing, unselecting a tag, closing via Escape, …)
//!
//! # Example
//!
//! ```
//! use horizon_picker::accessor::ItemAccessors;
//! use horizon_picker::{Autocomplete, AutocompleteOptions};
//!
//! # async fn demo() {
//! let picker = Autocomplete::new(
//!     AutocompleteOptions::default(),
//!     ItemAccessors::<String>::display(),
//! )
//! .with_items(vec!["Argentina".to_string(), "Brazil".to_string()]);
//!
//! picker.on_input("gen").await;
//! assert_eq!(picker.filtered_items().len(), 1);
//!
//! picker.down();
//! picker.select_item().await;
//! assert_eq!(picker.text(), "Argentina");
//! # }
//! ```

use std::sync::Arc;

use futures_util::future::BoxFuture;
use horizon_picker_core::{Debouncer, Signal, StateCell};
use parking_lot::RwLock;
use tracing::debug;

use crate::accessor::ItemAccessors;
use crate::config::AutocompleteOptions;
use crate::coordinator::SearchCoordinator;
use crate::events::Key;
use crate::item::FilteredItem;
use crate::matching::MatchPolicy;
use crate::source::SearchSource;

// ============================================================================
// Selection Containers
// ============================================================================

/// The current selection, shaped by the configured mode.
///
/// Membership checks compare candidates by identity (`Arc::ptr_eq`), so
/// candidates do not need `PartialEq`.
pub enum SelectedItems<T> {
    /// Single-select mode: at most one candidate.
    Single(Option<Arc<T>>),
    /// Multi-select mode: an ordered sequence of candidates.
    Multiple(Vec<Arc<T>>),
}

impl<T> SelectedItems<T> {
    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(item) => item.is_none(),
            Self::Multiple(items) => items.is_empty(),
        }
    }

    /// Number of selected candidates.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(item) => usize::from(item.is_some()),
            Self::Multiple(items) => items.len(),
        }
    }

    /// Whether the given candidate is part of the selection, by identity.
    pub fn contains(&self, item: &Arc<T>) -> bool {
        match self {
            Self::Single(current) => current
                .as_ref()
                .is_some_and(|selected| Arc::ptr_eq(selected, item)),
            Self::Multiple(items) => items.iter().any(|selected| Arc::ptr_eq(selected, item)),
        }
    }

    /// The single-mode selection, if any.
    pub fn as_single(&self) -> Option<&Arc<T>> {
        match self {
            Self::Single(item) => item.as_ref(),
            Self::Multiple(_) => None,
        }
    }

    /// The selection as a sequence (zero or one element in single mode).
    pub fn to_vec(&self) -> Vec<Arc<T>> {
        match self {
            Self::Single(item) => item.iter().cloned().collect(),
            Self::Multiple(items) => items.clone(),
        }
    }
}

impl<T> Clone for SelectedItems<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Single(item) => Self::Single(item.clone()),
            Self::Multiple(items) => Self::Multiple(items.clone()),
        }
    }
}

impl<T> std::fmt::Debug for SelectedItems<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(item) => f
                .debug_tuple("Single")
                .field(&item.is_some())
                .finish(),
            Self::Multiple(items) => f.debug_tuple("Multiple").field(&items.len()).finish(),
        }
    }
}

/// The value-accessor projection of the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<V> {
    /// Nothing selected (single mode).
    None,
    /// The single-mode value.
    One(V),
    /// The multi-mode values, in selection order.
    Many(Vec<V>),
}

/// Outcome of the create-new-candidate callback.
pub enum CreateResult<T> {
    /// The callback declined to create anything; the selection fails.
    Rejected,
    /// A candidate, available immediately.
    Ready(T),
    /// A candidate being created asynchronously; `None` on resolution means
    /// creation failed.
    Pending(BoxFuture<'static, Option<T>>),
}

impl<T> std::fmt::Debug for CreateResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected => f.write_str("CreateResult::Rejected"),
            Self::Ready(_) => f.write_str("CreateResult::Ready"),
            Self::Pending(_) => f.write_str("CreateResult::Pending"),
        }
    }
}

/// Veto gate consulted before a selection change: `(old, new) -> allow`.
pub type BeforeChangeFn<T> = Arc<dyn Fn(&SelectedItems<T>, &T) -> bool + Send + Sync>;

/// Create-new-candidate callback, given the entered text.
pub type CreateFn<T> = Arc<dyn Fn(&str) -> CreateResult<T> + Send + Sync>;

/// Value projection of one candidate.
pub type ValueFn<T, V> = Arc<dyn Fn(&T) -> V + Send + Sync>;

// ============================================================================
// Autocomplete
// ============================================================================

/// A searchable, filterable selection input core.
///
/// `T` is the candidate type; `V` the value type produced by the configured
/// value accessor (`T` itself by default).
///
/// The component is driven through `&self` commands: internally it uses
/// interior mutability so a presentation adapter can hold it behind an
/// `Arc`. All state transitions between two await points run to completion;
/// overlapping searches are reconciled by the coordinator's request fencing,
/// not by locks.
pub struct Autocomplete<T, V = T> {
    options: Arc<AutocompleteOptions>,
    accessors: Arc<ItemAccessors<T>>,
    coordinator: SearchCoordinator<T>,

    value_fn: ValueFn<T, V>,
    before_change: Option<BeforeChangeFn<T>>,
    on_create: Option<CreateFn<T>>,

    debouncer: Debouncer,

    selected: RwLock<SelectedItems<T>>,
    value: RwLock<Selection<V>>,
    text: StateCell<String>,
    opened: StateCell<bool>,
    highlight_index: StateCell<i32>,

    // Derived flags, recomputed after every command.
    has_selection: StateCell<bool>,
    clearable: StateCell<bool>,
    locked: StateCell<bool>,
    show_list: StateCell<bool>,
    highlighted_item: RwLock<Option<Arc<T>>>,

    reposition_pending: StateCell<bool>,
    dragging_over: StateCell<Option<usize>>,
    drag_source: StateCell<Option<usize>>,

    /// Emitted on every confirmed selection change.
    pub changed: Signal<SelectedItems<T>>,
    /// Emitted when the input gains focus.
    pub focused: Signal<()>,
    /// Emitted when the input loses focus.
    pub blurred: Signal<()>,
    /// Emitted when the presentation should refocus the input.
    pub focus_requested: Signal<()>,
}

impl<T: Clone + Send + Sync + 'static> Autocomplete<T, T> {
    /// Create a picker whose value accessor is the candidate itself.
    pub fn new(options: AutocompleteOptions, accessors: ItemAccessors<T>) -> Self {
        Self::build(options, accessors, Arc::new(|item: &T| item.clone()))
    }
}

impl<T, V> Autocomplete<T, V>
where
    T: Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    fn build(
        options: AutocompleteOptions,
        accessors: ItemAccessors<T>,
        value_fn: ValueFn<T, V>,
    ) -> Self {
        let options = Arc::new(options);
        let accessors = Arc::new(accessors);
        let coordinator = SearchCoordinator::new(
            options.clone(),
            accessors.clone(),
            MatchPolicy::default(),
            None,
        );
        let selected = if options.multiple {
            SelectedItems::Multiple(Vec::new())
        } else {
            SelectedItems::Single(None)
        };
        let debouncer = Debouncer::new(options.delay);

        let component = Self {
            options,
            accessors,
            coordinator,
            value_fn,
            before_change: None,
            on_create: None,
            debouncer,
            selected: RwLock::new(selected),
            value: RwLock::new(Selection::None),
            text: StateCell::new(String::new()),
            opened: StateCell::new(false),
            highlight_index: StateCell::new(-1),
            has_selection: StateCell::new(false),
            clearable: StateCell::new(false),
            locked: StateCell::new(false),
            show_list: StateCell::new(false),
            highlighted_item: RwLock::new(None),
            reposition_pending: StateCell::new(false),
            dragging_over: StateCell::new(None),
            drag_source: StateCell::new(None),
            changed: Signal::new(),
            focused: Signal::new(),
            blurred: Signal::new(),
            focus_requested: Signal::new(),
        };
        let initial = component.selected.read().clone();
        *component.value.write() = component.compute_value(&initial);
        component.refresh_derived();
        component
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Seed the local candidate list.
    pub fn with_items(self, items: Vec<T>) -> Self {
        self.set_items(items);
        self
    }

    /// Install a remote search source, switching the coordinator into
    /// remote mode.
    pub fn with_source(mut self, source: Arc<dyn SearchSource<T>>) -> Self {
        self.coordinator.install_source(Some(source));
        self
    }

    /// Replace the match engine's filter/sort policy.
    pub fn with_match_policy(mut self, policy: MatchPolicy<T>) -> Self {
        self.coordinator.install_policy(policy);
        self
    }

    /// Install the veto gate consulted before every selection change.
    pub fn with_before_change<F>(mut self, before_change: F) -> Self
    where
        F: Fn(&SelectedItems<T>, &T) -> bool + Send + Sync + 'static,
    {
        self.before_change = Some(Arc::new(before_change));
        self
    }

    /// Install the create-new-candidate callback.
    pub fn with_on_create<F>(mut self, on_create: F) -> Self
    where
        F: Fn(&str) -> CreateResult<T> + Send + Sync + 'static,
    {
        self.on_create = Some(Arc::new(on_create));
        self
    }

    /// Replace the value accessor, changing the value type.
    pub fn with_value_fn<V2, F>(self, value_fn: F) -> Autocomplete<T, V2>
    where
        V2: Clone + Send + 'static,
        F: Fn(&T) -> V2 + Send + Sync + 'static,
    {
        let component = Autocomplete {
            options: self.options,
            accessors: self.accessors,
            coordinator: self.coordinator,
            value_fn: Arc::new(value_fn) as ValueFn<T, V2>,
            before_change: self.before_change,
            on_create: self.on_create,
            debouncer: self.debouncer,
            selected: self.selected,
            value: RwLock::new(Selection::None),
            text: self.text,
            opened: self.opened,
            highlight_index: self.highlight_index,
            has_selection: self.has_selection,
            clearable: self.clearable,
            locked: self.locked,
            show_list: self.show_list,
            highlighted_item: self.highlighted_item,
            reposition_pending: self.reposition_pending,
            dragging_over: self.dragging_over,
            drag_source: self.drag_source,
            changed: self.changed,
            focused: self.focused,
            blurred: self.blurred,
            focus_requested: self.focus_requested,
        };
        let selected = component.selected.read().clone();
        *component.value.write() = component.compute_value(&selected);
        component
    }

    // =========================================================================
    // Candidates
    // =========================================================================

    /// Replace the local candidate list.
    pub fn set_items(&self, items: Vec<T>) {
        self.coordinator.set_items(items);
        self.refresh_derived();
    }

    /// The search coordinator, for its read surface and `list_updated`
    /// signal.
    pub fn coordinator(&self) -> &SearchCoordinator<T> {
        &self.coordinator
    }

    // =========================================================================
    // Text Input
    // =========================================================================

    /// Record a text change and run the (debounced) search.
    ///
    /// With a configured delay, rapid calls supersede each other and only
    /// the newest runs a search once the delay elapses.
    pub async fn on_input(&self, text: impl Into<String>) {
        self.text.set_silent(text.into());

        if !self.debouncer.debounce().await {
            return;
        }
        self.process_input().await;
    }

    /// Update the mirrored input text without searching.
    pub fn set_text(&self, text: impl Into<String>) {
        self.text.set_silent(text.into());
    }

    async fn process_input(&self) {
        let outcome = self.coordinator.search(&self.text.get()).await;
        if outcome.should_close {
            self.close();
        }
        self.highlight_index.set(0);
        self.open();
        self.refresh_derived();
    }

    // =========================================================================
    // Dropdown
    // =========================================================================

    /// Open the dropdown. No-op while locked or below the search threshold.
    pub fn open(&self) {
        if self.locked.get() || self.coordinator.not_enough_text() {
            return;
        }
        self.reposition_pending.set(true);
        self.opened.set(true);
        self.refresh_derived();
    }

    /// Close the dropdown and stop showing the loading state.
    ///
    /// With `select_first_if_empty` and empty text, confirms the first
    /// filtered entry.
    pub fn close(&self) {
        self.opened.set(false);
        self.coordinator.set_loading(false);

        if self.text.get().is_empty() && self.options.select_first_if_empty {
            self.highlight_index.set(0);
            if let Some(entry) = self.coordinator.filtered_at(0) {
                self.apply_selection(&entry);
            }
        }
        self.refresh_derived();
    }

    /// Move the highlight up. Opens the dropdown; never wraps.
    pub fn up(&self) {
        self.open();
        let index = self.highlight_index.get();
        if index > 0 {
            self.highlight_index.set(index - 1);
        }
        self.refresh_derived();
    }

    /// Move the highlight down. Opens the dropdown; never wraps.
    pub fn down(&self) {
        self.open();
        let index = self.highlight_index.get();
        if index < self.coordinator.filtered_len() as i32 - 1 {
            self.highlight_index.set(index + 1);
        }
        self.refresh_derived();
    }

    /// Highlight the entry at `index` (pointer hover).
    pub fn set_highlight(&self, index: usize) {
        self.highlight_index.set(index as i32);
        self.refresh_derived();
    }

    /// Escape: refocus the input and close, when open.
    pub fn on_esc(&self) {
        if self.opened.get() {
            self.focus_requested.emit(());
            self.close();
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a filtered entry, or run the create flow when none is given.
    ///
    /// Returns `false` only when there is nothing to select: no entry and
    /// either create mode is off or the create callback yields nothing. A
    /// veto from `before_change` and the locked state both count as handled
    /// (`true`) without changing the selection.
    pub async fn select_list_item(&self, entry: Option<FilteredItem<T>>) -> bool {
        let entry = match entry {
            Some(entry) => Some(entry),
            None if self.options.create => self.run_create().await,
            None => None,
        };

        match entry {
            Some(entry) => self.apply_selection(&entry),
            None => {
                debug!(
                    target: "horizon_picker::selection",
                    "no list item to select"
                );
                false
            }
        }
    }

    /// Confirm the highlighted entry.
    ///
    /// On success the dropdown closes; in multi-select mode the text clears
    /// and the input is refocused. On failure the dropdown stays open.
    pub async fn select_item(&self) -> bool {
        let entry = {
            let index = self.highlight_index.get();
            if index >= 0 {
                self.coordinator.filtered_at(index as usize)
            } else {
                None
            }
        };
        self.confirm_entry(entry).await
    }

    /// Pointer click (or Enter) on the list row at `index`.
    pub async fn on_list_item_click(&self, index: usize) -> bool {
        let entry = self.coordinator.filtered_at(index);
        self.confirm_entry(entry).await
    }

    async fn confirm_entry(&self, entry: Option<FilteredItem<T>>) -> bool {
        if !self.select_list_item(entry).await {
            return false;
        }
        self.close();
        if self.options.multiple {
            self.text.set_silent(String::new());
            self.focus_requested.emit(());
        }
        self.refresh_derived();
        true
    }

    async fn run_create(&self) -> Option<FilteredItem<T>> {
        let on_create = self.on_create.as_ref()?;
        match on_create(&self.text.get()) {
            CreateResult::Ready(item) => self.after_create(Arc::new(item)),
            CreateResult::Pending(pending) => {
                let item = pending.await?;
                self.after_create(Arc::new(item))
            }
            CreateResult::Rejected => None,
        }
    }

    /// Fold a freshly created candidate into the list and highlight it.
    fn after_create(&self, created: Arc<T>) -> Option<FilteredItem<T>> {
        debug!(
            target: "horizon_picker::selection",
            "created candidate received"
        );
        self.coordinator.reproject_and_reset();

        let mut index = self.coordinator.find_item_index(&created);
        if index.is_none_or(|found| found == 0) {
            // The candidate set does not carry the created item yet; it
            // becomes the whole list.
            self.coordinator.replace_with_single(created);
            index = Some(0);
        }

        let index = index?;
        self.highlight_index.set(index as i32);
        self.coordinator.filtered_at(index)
    }

    /// Apply a selection to the state. Always "handled"; the `before_change`
    /// veto and the locked state skip the mutation silently.
    fn apply_selection(&self, entry: &FilteredItem<T>) -> bool {
        if self.locked.get() {
            return true;
        }

        let new_item = entry.item.clone();
        if let Some(guard) = &self.before_change {
            let old = self.selected.read().clone();
            if !guard(&old, &new_item) {
                debug!(
                    target: "horizon_picker::selection",
                    "selection change vetoed"
                );
                return true;
            }
        }

        {
            let mut selected = self.selected.write();
            match &mut *selected {
                // Replacing with the same item still notifies below.
                SelectedItems::Single(current) => *current = Some(new_item),
                SelectedItems::Multiple(items) => {
                    if let Some(position) =
                        items.iter().position(|item| Arc::ptr_eq(item, &new_item))
                    {
                        items.remove(position);
                    } else {
                        items.push(new_item);
                    }
                }
            }
        }

        self.on_selected_changed();
        true
    }

    /// Remove a candidate from a multi-select selection and refocus.
    pub fn unselect_item(&self, item: &Arc<T>) {
        let was_multiple = {
            let mut selected = self.selected.write();
            match &mut *selected {
                SelectedItems::Multiple(items) => {
                    items.retain(|selected| !Arc::ptr_eq(selected, item));
                    true
                }
                SelectedItems::Single(_) => false,
            }
        };
        if was_multiple {
            self.on_selected_changed();
            self.focus_requested.emit(());
        }
    }

    /// Backspace with empty text: unselect the last selected candidate.
    pub fn on_backspace(&self) {
        if !self.options.multiple || !self.text.get().is_empty() {
            return;
        }
        let last = match &*self.selected.read() {
            SelectedItems::Multiple(items) => items.last().cloned(),
            SelectedItems::Single(_) => None,
        };
        if let Some(last) = last {
            self.unselect_item(&last);
        }
    }

    /// Clear the text and the whole selection, then refocus.
    pub fn clear(&self) {
        self.text.set_silent(String::new());
        {
            let mut selected = self.selected.write();
            *selected = if self.options.multiple {
                SelectedItems::Multiple(Vec::new())
            } else {
                SelectedItems::Single(None)
            };
        }
        self.on_selected_changed();
        self.focus_requested.emit(());
    }

    /// Relocate the selected element at `from` to `to`: a stable
    /// single-element move, not a swap.
    pub fn move_selected_item(&self, from: usize, to: usize) {
        let moved = {
            let mut selected = self.selected.write();
            match &mut *selected {
                SelectedItems::Multiple(items)
                    if from != to && from < items.len() && to < items.len() =>
                {
                    let item = items.remove(from);
                    items.insert(to, item);
                    true
                }
                _ => false,
            }
        };
        if moved {
            self.on_selected_changed();
        }
    }

    fn on_selected_changed(&self) {
        let selected = self.selected.read().clone();
        *self.value.write() = self.compute_value(&selected);

        if let SelectedItems::Single(Some(item)) = &selected {
            self.text.set_silent(self.accessors.label_of(item));
        }

        self.coordinator.reset_to_all();
        self.refresh_derived();
        self.changed.emit(selected);
    }

    fn compute_value(&self, selected: &SelectedItems<T>) -> Selection<V> {
        match selected {
            SelectedItems::Single(None) => Selection::None,
            SelectedItems::Single(Some(item)) => Selection::One((self.value_fn)(item)),
            SelectedItems::Multiple(items) => {
                Selection::Many(items.iter().map(|item| (self.value_fn)(item)).collect())
            }
        }
    }

    // =========================================================================
    // Drag Reordering
    // =========================================================================

    /// Begin dragging the selected element at `index`.
    pub fn drag_start(&self, index: usize) {
        if self.options.orderable_selection {
            self.drag_source.set(Some(index));
        }
    }

    /// Drag moved over the selected element at `index`.
    pub fn drag_over(&self, index: usize) {
        if self.options.orderable_selection {
            self.dragging_over.set(Some(index));
        }
    }

    /// Drag left the selection area.
    pub fn drag_leave(&self) {
        if self.options.orderable_selection {
            self.dragging_over.set(None);
        }
    }

    /// Drop on the selected element at `index`, completing the reorder.
    pub fn drop_on(&self, index: usize) {
        if !self.options.orderable_selection {
            return;
        }
        self.dragging_over.set(None);
        if let Some(from) = self.drag_source.replace(None).flatten()
            && from != index
        {
            self.move_selected_item(from, index);
        }
    }

    // =========================================================================
    // Focus / Blur / Keyboard
    // =========================================================================

    /// The input gained focus: notify and open with the full list.
    pub async fn on_focus(&self) {
        self.focused.emit(());
        self.reset_list_to_all_and_open().await;
    }

    /// The input was clicked: open with the full list.
    pub async fn on_input_click(&self) {
        self.reset_list_to_all_and_open().await;
    }

    /// The input lost focus.
    pub fn on_blur(&self) {
        if self.options.close_on_blur {
            self.close();
        }
        self.blurred.emit(());
    }

    async fn reset_list_to_all_and_open(&self) {
        if self.coordinator.source_configured() && self.coordinator.entries_len() == 0 {
            let outcome = self.coordinator.search(&self.text.get()).await;
            if outcome.should_close {
                self.close();
            }
        } else if self.text.get().is_empty() {
            self.coordinator.reset_to_all();
        }

        self.open();

        // Re-highlight the current selection, when visible.
        let selected = self.selected.read().as_single().cloned();
        if let Some(item) = selected
            && let Some(index) = self.coordinator.find_item_index(&item)
        {
            self.highlight_index.set(index as i32);
        }
        self.refresh_derived();
    }

    /// Dispatch a keyboard command. Returns whether the key was handled
    /// (and should be consumed rather than forwarded).
    pub async fn handle_key(&self, key: Key) -> bool {
        match key {
            Key::Tab | Key::ShiftTab => {
                if self.opened.get() {
                    self.close();
                    true
                } else {
                    false
                }
            }
            Key::Down => {
                self.down();
                true
            }
            Key::Up => {
                self.up();
                true
            }
            Key::Escape => {
                self.on_esc();
                true
            }
            Key::Backspace => {
                if self.options.multiple
                    && self.has_selection.get()
                    && self.text.get().is_empty()
                {
                    self.on_backspace();
                    true
                } else {
                    false
                }
            }
            Key::Enter => {
                if self.opened.get() {
                    self.select_item().await;
                    true
                } else {
                    false
                }
            }
        }
    }

    // =========================================================================
    // Derived State
    // =========================================================================

    /// Recompute every derived flag from the primary state.
    fn refresh_derived(&self) {
        let has_selection = !self.selected.read().is_empty();
        let locked = self.options.lock && has_selection;
        let clearable = self.options.show_clear
            || ((self.options.lock || self.options.multiple) && has_selection);
        let show_list = self.opened.get()
            && (self.coordinator.items_len() > 0 || self.coordinator.filtered_text_len() > 0);

        let index = self.highlight_index.get();
        let highlighted = if index >= 0 {
            self.coordinator
                .filtered_at(index as usize)
                .map(|entry| entry.item)
        } else {
            None
        };

        self.has_selection.set(has_selection);
        self.locked.set(locked);
        self.clearable.set(clearable);
        self.show_list.set(show_list);
        *self.highlighted_item.write() = highlighted;
    }

    // =========================================================================
    // Read Surface
    // =========================================================================

    /// Snapshot of the published filtered list.
    pub fn filtered_items(&self) -> Vec<FilteredItem<T>> {
        self.coordinator.filtered_items()
    }

    /// The current selection.
    pub fn selected(&self) -> SelectedItems<T> {
        self.selected.read().clone()
    }

    /// The value projection of the current selection.
    pub fn value(&self) -> Selection<V> {
        self.value.read().clone()
    }

    /// The value projection of one candidate (force-single form).
    pub fn value_of(&self, item: &T) -> V {
        (self.value_fn)(item)
    }

    /// The mirrored input text.
    pub fn text(&self) -> String {
        self.text.get()
    }

    /// Whether the dropdown is open.
    pub fn opened(&self) -> bool {
        self.opened.get()
    }

    /// Whether a remote lookup is in flight.
    pub fn loading(&self) -> bool {
        self.coordinator.loading()
    }

    /// Index of the highlighted entry, `-1` for none.
    pub fn highlight_index(&self) -> i32 {
        self.highlight_index.get()
    }

    /// The highlighted candidate, when the highlight is in range.
    pub fn highlighted_item(&self) -> Option<Arc<T>> {
        self.highlighted_item.read().clone()
    }

    /// Whether anything is selected.
    pub fn has_selection(&self) -> bool {
        self.has_selection.get()
    }

    /// Whether the clear affordance should show.
    pub fn clearable(&self) -> bool {
        self.clearable.get()
    }

    /// Whether the control is locked by its selection.
    pub fn locked(&self) -> bool {
        self.locked.get()
    }

    /// Whether the dropdown list should render.
    pub fn show_list(&self) -> bool {
        self.show_list.get()
    }

    /// Whether the given candidate is part of the selection.
    pub fn is_confirmed(&self, item: &Arc<T>) -> bool {
        self.selected.read().contains(item)
    }

    /// The selected element currently dragged over, if any.
    pub fn dragging_over(&self) -> Option<usize> {
        self.dragging_over.get()
    }

    /// Take the pending dropdown-reposition request, if one was scheduled.
    ///
    /// The presentation calls this after rendering and repositions the
    /// dropdown viewport-aware when it returns `true`.
    pub fn take_reposition_request(&self) -> bool {
        self.reposition_pending.replace(false).unwrap_or(false)
    }
}

impl<T, V> std::fmt::Debug for Autocomplete<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autocomplete")
            .field("multiple", &self.options.multiple)
            .field("opened", &self.opened.get())
            .field("highlight_index", &self.highlight_index.get())
            .field("selected", &*self.selected.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker(options: AutocompleteOptions) -> Autocomplete<String> {
        Autocomplete::new(options, ItemAccessors::<String>::display())
            .with_items(vec!["aa".to_string(), "ab".to_string(), "bb".to_string()])
    }

    fn entry_at(picker: &Autocomplete<String>, index: usize) -> FilteredItem<String> {
        picker.coordinator().filtered_at(index).unwrap()
    }

    #[tokio::test]
    async fn test_down_up_clamped() {
        let picker = picker(AutocompleteOptions::default());
        picker.on_input("").await;

        assert_eq!(picker.highlight_index(), 0);
        picker.down();
        picker.down();
        picker.down(); // clamped at the last entry
        assert_eq!(picker.highlight_index(), 2);

        picker.up();
        picker.up();
        picker.up(); // clamped at the first entry
        assert_eq!(picker.highlight_index(), 0);
    }

    #[tokio::test]
    async fn test_down_opens_dropdown() {
        let picker = picker(AutocompleteOptions::default());
        assert!(!picker.opened());
        picker.down();
        assert!(picker.opened());
        assert!(picker.show_list());
    }

    #[tokio::test]
    async fn test_down_with_empty_list_keeps_no_highlight() {
        let picker = Autocomplete::new(
            AutocompleteOptions::default(),
            ItemAccessors::<String>::display(),
        );
        picker.down();
        assert_eq!(picker.highlight_index(), -1);
    }

    #[tokio::test]
    async fn test_select_mirrors_label_into_text() {
        let picker = picker(AutocompleteOptions::default());
        picker.on_input("ab").await;
        assert!(picker.select_item().await);
        assert_eq!(picker.text(), "ab");
        assert!(!picker.opened());
        assert!(picker.has_selection());
    }

    #[tokio::test]
    async fn test_reselect_same_item_notifies_again() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let picker = picker(AutocompleteOptions::default());
        let notifications = Arc::new(AtomicUsize::new(0));
        let notifications_clone = notifications.clone();
        picker.changed.connect(move |_| {
            notifications_clone.fetch_add(1, Ordering::SeqCst);
        });

        picker.on_input("").await;
        let entry = entry_at(&picker, 0);
        assert!(picker.select_list_item(Some(entry.clone())).await);
        assert!(picker.select_list_item(Some(entry)).await);

        assert_eq!(notifications.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_multiple_toggles_membership() {
        let picker = picker(AutocompleteOptions::multi());
        picker.on_input("").await;

        let first = entry_at(&picker, 0);
        assert!(picker.select_list_item(Some(first.clone())).await);
        assert_eq!(picker.selected().len(), 1);

        let second = entry_at(&picker, 1);
        assert!(picker.select_list_item(Some(second)).await);
        assert_eq!(picker.selected().len(), 2);

        // Selecting an already-selected candidate removes it.
        assert!(picker.select_list_item(Some(first)).await);
        assert_eq!(picker.selected().len(), 1);
    }

    #[tokio::test]
    async fn test_before_change_veto_keeps_selection() {
        let picker = Autocomplete::new(
            AutocompleteOptions::default(),
            ItemAccessors::<String>::display(),
        )
        .with_before_change(|_, _| false)
        .with_items(vec!["aa".to_string()]);
        picker.on_input("").await;

        let entry = entry_at(&picker, 0);
        // Vetoed selection still counts as handled.
        assert!(picker.select_list_item(Some(entry)).await);
        assert!(!picker.has_selection());
    }

    #[tokio::test]
    async fn test_locked_selection_is_fixed() {
        let picker = Autocomplete::new(
            AutocompleteOptions::default().with_lock(true),
            ItemAccessors::<String>::display(),
        )
        .with_items(vec!["aa".to_string(), "ab".to_string()]);
        picker.on_input("").await;

        assert!(picker.select_list_item(Some(entry_at(&picker, 0))).await);
        assert!(picker.locked());
        assert!(picker.clearable());

        // Further selections succeed trivially without changing anything.
        assert!(picker.select_list_item(Some(entry_at(&picker, 1))).await);
        let selected = picker.selected();
        assert_eq!(picker.accessors.label_of(selected.as_single().unwrap()), "aa");

        // Locked also blocks opening.
        picker.open();
        assert!(!picker.opened());
    }

    #[tokio::test]
    async fn test_clear_resets_selection_and_text() {
        let picker = picker(AutocompleteOptions::default());
        picker.on_input("aa").await;
        picker.select_item().await;
        assert!(picker.has_selection());

        picker.clear();
        assert!(!picker.has_selection());
        assert_eq!(picker.text(), "");
        assert_eq!(picker.value(), Selection::None);
    }

    #[tokio::test]
    async fn test_move_selected_item_spec_vectors() {
        let picker = Autocomplete::new(
            AutocompleteOptions::multi().with_orderable_selection(true),
            ItemAccessors::<String>::display(),
        )
        .with_items(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
        ]);
        picker.on_input("").await;
        for index in 0..4 {
            picker.select_list_item(Some(entry_at(&picker, index))).await;
        }

        let labels = |picker: &Autocomplete<String>| -> Vec<String> {
            picker
                .selected()
                .to_vec()
                .iter()
                .map(|item| (**item).clone())
                .collect()
        };

        picker.move_selected_item(0, 2);
        assert_eq!(labels(&picker), vec!["b", "c", "a", "d"]);

        // Reset to a,b,c,d.
        picker.clear();
        picker.on_input("").await;
        for index in 0..4 {
            picker.select_list_item(Some(entry_at(&picker, index))).await;
        }
        picker.move_selected_item(3, 1);
        assert_eq!(labels(&picker), vec!["a", "d", "b", "c"]);
    }

    #[tokio::test]
    async fn test_drag_surface_inert_without_orderable_selection() {
        let picker = picker(AutocompleteOptions::multi());
        picker.on_input("").await;
        picker.select_list_item(Some(entry_at(&picker, 0))).await;
        picker.select_list_item(Some(entry_at(&picker, 1))).await;

        picker.drag_start(0);
        picker.drag_over(1);
        assert_eq!(picker.dragging_over(), None);
        picker.drop_on(1);

        let first = picker.selected().to_vec()[0].clone();
        assert_eq!(*first, "aa");
    }

    #[tokio::test]
    async fn test_backspace_unselects_last() {
        let picker = picker(AutocompleteOptions::multi());
        picker.on_input("").await;
        picker.select_list_item(Some(entry_at(&picker, 0))).await;
        picker.select_list_item(Some(entry_at(&picker, 1))).await;
        picker.set_text("");

        assert!(picker.handle_key(Key::Backspace).await);
        let remaining = picker.selected().to_vec();
        assert_eq!(remaining.len(), 1);
        assert_eq!(*remaining[0], "aa");
    }

    #[tokio::test]
    async fn test_escape_closes_and_requests_focus() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let picker = picker(AutocompleteOptions::default());
        let refocused = Arc::new(AtomicUsize::new(0));
        let refocused_clone = refocused.clone();
        picker.focus_requested.connect(move |_| {
            refocused_clone.fetch_add(1, Ordering::SeqCst);
        });

        picker.down();
        assert!(picker.opened());
        assert!(picker.handle_key(Key::Escape).await);
        assert!(!picker.opened());
        assert_eq!(refocused.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_select_first_if_empty_on_close() {
        let picker = Autocomplete::new(
            AutocompleteOptions::default().with_select_first_if_empty(true),
            ItemAccessors::<String>::display(),
        )
        .with_items(vec!["aa".to_string(), "ab".to_string()]);
        picker.on_input("").await;

        picker.close();
        assert!(picker.has_selection());
        assert_eq!(picker.text(), "aa");
    }

    #[tokio::test]
    async fn test_value_fn_projection() {
        let picker = Autocomplete::new(
            AutocompleteOptions::default(),
            ItemAccessors::<String>::display(),
        )
        .with_value_fn(|item: &String| item.len())
        .with_items(vec!["aaa".to_string()]);
        picker.on_input("").await;

        picker.select_list_item(Some(entry_at_len(&picker, 0))).await;
        assert_eq!(picker.value(), Selection::One(3));
        assert_eq!(picker.value_of(&"four".to_string()), 4);
    }

    fn entry_at_len(picker: &Autocomplete<String, usize>, index: usize) -> FilteredItem<String> {
        picker.coordinator().filtered_at(index).unwrap()
    }

    #[tokio::test]
    async fn test_create_flow_sync() {
        let picker = Autocomplete::new(
            AutocompleteOptions::default().with_create(true),
            ItemAccessors::<String>::display(),
        )
        .with_on_create(|text| CreateResult::Ready(format!("new:{text}")));

        picker.set_text("thing");
        assert!(picker.select_list_item(None).await);
        let selected = picker.selected();
        assert_eq!(**selected.as_single().unwrap(), "new:thing");
    }

    #[tokio::test]
    async fn test_create_flow_rejected() {
        let picker = Autocomplete::new(
            AutocompleteOptions::default().with_create(true),
            ItemAccessors::<String>::display(),
        )
        .with_on_create(|_| CreateResult::<String>::Rejected);

        picker.set_text("thing");
        assert!(!picker.select_list_item(None).await);
        assert!(!picker.has_selection());
    }

    #[tokio::test]
    async fn test_select_without_create_fails() {
        let picker = picker(AutocompleteOptions::default());
        assert!(!picker.select_list_item(None).await);
    }
}
