//! Logging facilities for Horizon Picker.
//!
//! Horizon Picker uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! The constants below can be combined with `tracing` directives to filter
//! logs by subsystem, e.g. `RUST_LOG=horizon_picker::search=debug`.

/// Target names for log filtering.
pub mod targets {
    /// Core primitives target.
    pub const CORE: &str = "horizon_picker_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_picker_core::signal";
    /// Debouncer target.
    pub const DEBOUNCE: &str = "horizon_picker_core::debounce";
    /// Item projection target.
    pub const ITEMS: &str = "horizon_picker::items";
    /// Match engine target.
    pub const MATCHING: &str = "horizon_picker::matching";
    /// Search coordinator target.
    pub const SEARCH: &str = "horizon_picker::search";
    /// Selection state machine target.
    pub const SELECTION: &str = "horizon_picker::selection";
}
