//! Core systems for Horizon Picker.
//!
//! This crate provides the foundational primitives the picker widget core is
//! built from:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Observable State**: Value cells with change detection
//! - **Debouncing**: Last-write-wins scheduling for rapid input
//!
//! The picker runs on a single logical thread of control (an event loop or a
//! cooperative async task), so signals dispatch directly to their connected
//! slots; there is no queued cross-thread delivery here.
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_picker_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let text_changed = Signal::<String>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! // Emit the signal
//! text_changed.emit("hello".to_string());
//!
//! // Disconnect when done
//! text_changed.disconnect(conn_id);
//! ```
//!
//! # State Example
//!
//! ```
//! use horizon_picker_core::{Signal, StateCell};
//!
//! // An observable flag with change notification
//! struct Dropdown {
//!     opened: StateCell<bool>,
//!     opened_changed: Signal<bool>,
//! }
//!
//! impl Dropdown {
//!     fn set_opened(&self, opened: bool) {
//!         if self.opened.set(opened) {
//!             self.opened_changed.emit(opened);
//!         }
//!     }
//! }
//! ```

pub mod debounce;
pub mod logging;
pub mod signal;
pub mod state;

pub use debounce::Debouncer;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use state::{ReadOnlyState, StateCell};
