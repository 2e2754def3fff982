//! Change-detecting state cells.
//!
//! Component flags (enabled, visible, displayed) are stored in a
//! [`Property`]. A write reports whether it changed the stored value, and
//! only then does the owner fire its `"enabled"`/`"visible"` event.
//!
//! ```
//! use arbor_core::Property;
//!
//! let visible = Property::new(true);
//! assert!(!visible.set(true));
//! assert!(visible.set(false));
//! assert!(!visible.get());
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A lock-protected value whose writes report whether anything changed.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone + PartialEq> Property<T> {
    /// Create a cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// A copy of the stored value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Store `value`; returns `true` if it differs from the previous one.
    ///
    /// The comparison and the write happen under one lock.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current == value {
            return false;
        }
        *current = value;
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&*self.value.read()).finish()
    }
}
