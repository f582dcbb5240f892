//! Observable state cells for Horizon Picker.
//!
//! [`StateCell<T>`] wraps a value and provides change detection: `set()`
//! compares the new value with the current one and reports whether anything
//! actually changed, so the caller can emit the matching notification signal
//! only when needed. This is the data backbone of the picker's
//! "recompute derived state after every command" discipline: each command
//! handler mutates its cells, then recomputes the derived cells, with no lazy
//! window observable from outside.
//!
//! # Example
//!
//! ```
//! use horizon_picker_core::StateCell;
//!
//! let opened = StateCell::new(false);
//! assert!(!opened.get());
//!
//! // Setting the same value reports no change
//! assert!(!opened.set(false));
//!
//! // Setting a different value reports a change
//! assert!(opened.set(true));
//! assert!(opened.get());
//! ```

use std::fmt;

use parking_lot::RwLock;

/// An observable value cell with change detection.
///
/// # Thread Safety
///
/// `StateCell<T>` uses interior mutability with `RwLock` so widget commands
/// can take `&self`; the picker still mutates state on a single logical
/// thread of control.
pub struct StateCell<T> {
    value: RwLock<T>,
}

impl<T: Clone> StateCell<T> {
    /// Create a new cell with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()`
    /// instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without change detection.
    ///
    /// Useful during initialization, and for values (such as rebuilt lists)
    /// where the caller always notifies regardless of equality.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }

    /// Mutate the value in place through a closure.
    ///
    /// Returns whatever the closure returns. Change notification is the
    /// caller's responsibility.
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.value.write())
    }
}

impl<T: Clone + PartialEq> StateCell<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// The caller should emit the associated notification signal when this
    /// returns `true`.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &self.get())
            .finish()
    }
}

/// A read-only view of a state cell.
///
/// Exposes read access while keeping the setter private to the owning
/// component, the shape of the picker's public reactive state.
pub struct ReadOnlyState<'a, T> {
    inner: &'a StateCell<T>,
}

impl<'a, T: Clone> ReadOnlyState<'a, T> {
    /// Create a read-only view of a cell.
    pub fn new(cell: &'a StateCell<T>) -> Self {
        Self { inner: cell }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.inner.get()
    }

    /// Access the value through a closure.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.with(f)
    }
}
