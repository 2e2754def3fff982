//! Shared enabled state.

use std::fmt;

use arbor_core::{Object, ObjectBase, ObjectId, Property, Signal};

use crate::event::{PropertyChangeEvent, property};

/// An enabled flag that one or more components can defer to.
///
/// Installing the same `Enableable` on several components with
/// [`ComponentBase::set_enableable`](super::ComponentBase::set_enableable)
/// enables and disables them together.
pub struct Enableable {
    base: ObjectBase,
    enabled: Property<bool>,
    /// Fired with an `"enabled"` change.
    pub property_changed: Signal<PropertyChangeEvent>,
}

impl Enableable {
    /// Create a delegate with the given initial state.
    pub fn new(enabled: bool) -> Self {
        Self {
            base: ObjectBase::new::<Self>(),
            enabled: Property::new(enabled),
            property_changed: Signal::new(),
        }
    }

    /// Whether the delegate is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Enable or disable the delegate.
    pub fn set_enabled(&self, enabled: bool) {
        if self.enabled.set(enabled) {
            self.property_changed.emit(PropertyChangeEvent::with_values(
                self.base.id(),
                property::ENABLED,
                !enabled,
                enabled,
            ));
        }
    }
}

impl Object for Enableable {
    fn object_id(&self) -> ObjectId {
        self.base.id()
    }
}

impl fmt::Debug for Enableable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enableable")
            .field("id", &self.base.id())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
