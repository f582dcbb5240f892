//! A framework-agnostic autocomplete/selection widget core.
//!
//! Horizon Picker is the search/selection/rendering-reconciliation core of a
//! searchable dropdown input, packaged as pure state and logic. It binds to
//! no UI framework: a presentation layer (reactive or plain event-driven)
//! renders the read surface and forwards input commands.
//!
//! What lives here:
//!
//! - **Text normalization** ([`text`]): case folding, punctuation and
//!   accent stripping for accent-/case-insensitive matching
//! - **List item projection** ([`item`], [`accessor`]): arbitrary
//!   candidates become searchable entries through caller-supplied accessors
//! - **Match engine** ([`matching`]): token filtering, stable match-count
//!   ordering, `<b>…</b>` highlight annotation
//! - **Search coordination** ([`coordinator`], [`source`]): local filtering
//!   or remote (optionally streamed) lookup, with monotonic request/response
//!   id fencing against out-of-order responses
//! - **Selection state machine** ([`autocomplete`]): single/multi
//!   selection, create flow, keyboard/pointer/drag commands, derived state
//!   recomputed after every command
//!
//! # Quick Start
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
//!
//! let filtered = picker.filtered_items();
//! assert_eq!(filtered.len(), 1);
//! assert_eq!(filtered[0].highlighted, "Ar<b>gen</b>tina");
//! # }
//! ```
//!
//! # Remote Search
//!
//! ```no_run
//! use horizon_picker::accessor::ItemAccessors;
//! use horizon_picker::source::source_fn;
//! use horizon_picker::{Autocomplete, AutocompleteOptions};
//!
//! # async fn lookup(_query: String, _max: usize) -> Vec<String> { Vec::new() }
//! # fn demo() {
//! let picker = Autocomplete::new(
//!     AutocompleteOptions::default(),
//!     ItemAccessors::<String>::display(),
//! )
//! .with_source(source_fn(|query: String, max_items| async move {
//!     Ok(lookup(query, max_items).await)
//! }));
//! # let _ = picker;
//! # }
//! ```
//!
//! Overlapping remote searches resolve by request fencing: a response whose
//! request id is behind the highest already-accepted id is dropped,
//! regardless of arrival order, so a slow response can never overwrite a
//! fast typist's newer results.

pub mod accessor;
pub mod autocomplete;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod item;
pub mod matching;
pub mod source;
pub mod text;

pub use autocomplete::{
    Autocomplete, CreateResult, SelectedItems, Selection,
};
pub use config::AutocompleteOptions;
pub use coordinator::{SearchCoordinator, SearchOutcome};
pub use events::Key;
pub use item::{FilteredItem, ListItem};
pub use matching::MatchPolicy;
pub use source::{SearchSource, SourceError, SourceReply, chunked_source_fn, source_fn};

// Re-export the reactive primitives the public surface exposes.
pub use horizon_picker_core::{Signal, StateCell};
