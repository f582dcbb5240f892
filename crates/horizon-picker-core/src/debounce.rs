//! Debounced scheduling for rapid input.
//!
//! [`Debouncer`] implements last-write-wins scheduling: every call to
//! [`debounce`](Debouncer::debounce) supersedes all earlier pending calls.
//! After the configured delay elapses, only the newest call observes `true`;
//! superseded calls resolve `false` and their work should be skipped.
//!
//! This replaces the timer-handle dance (cancel pending timer, start a new
//! one) with an epoch counter: scheduling is cancelled by comparison, not by
//! cancelling a timer.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use horizon_picker_core::Debouncer;
//!
//! # async fn example() {
//! let debouncer = Debouncer::new(Duration::from_millis(200));
//!
//! // Two rapid keystrokes; only the second one's search should run.
//! let (first, second) = tokio::join!(debouncer.debounce(), debouncer.debounce());
//! assert!(!first);
//! assert!(second);
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::trace;

/// Last-write-wins scheduler for debounced work.
///
/// With a zero delay, [`debounce`](Debouncer::debounce) resolves immediately
/// (still claiming the newest epoch, so any older pending call is
/// superseded).
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    epoch: AtomicU64,
}

impl Debouncer {
    /// Create a debouncer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            epoch: AtomicU64::new(0),
        }
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a debounced run, superseding any pending earlier run.
    ///
    /// Resolves `true` if this call is still the newest when the delay
    /// elapses, `false` if a later call superseded it.
    pub async fn debounce(&self) -> bool {
        let token = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if token != self.epoch.load(Ordering::Acquire) {
            trace!(
                target: "horizon_picker_core::debounce",
                token,
                "debounced run superseded"
            );
            return false;
        }
        true
    }

    /// Invalidate every pending run without scheduling a new one.
    pub fn cancel_pending(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }
}
