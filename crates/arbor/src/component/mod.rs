//! The component tree.
//!
//! A component is a node of a server-side UI tree. It keeps a cached
//! validity flag, an optional user-facing [`Notification`] and the
//! enabled/visible/displayed flags, and it repeats the events of the models
//! it displays to its own listeners. Composite components additionally own
//! ordered children, aggregate their validity and repeat their notifications
//! and structural events.
//!
//! # Capabilities
//!
//! Rather than testing a component's concrete type, the framework asks it
//! for capabilities:
//!
//! - [`Component::composite`]: the component holds children
//! - [`Component::value_source`]: the component displays a value model
//! - [`Component::focus_group`]: the component scopes keyboard focus
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arbor::component::{Component, Panel, ValueControl};
//! use arbor::model::ValueModel;
//! use arbor::validator::RequiredValidator;
//!
//! let name = ValueModel::<String>::new(None).with_validator(Arc::new(RequiredValidator));
//! let field = ValueControl::new(Arc::new(name));
//!
//! let form = Panel::new();
//! form.add_child(field.clone()).unwrap();
//! assert!(!form.is_valid());
//!
//! field.set_value(Some("Ada".to_string())).unwrap();
//! assert!(form.is_valid());
//! ```

mod base;
mod composite;
mod controls;
mod debug;
mod dispatch;
mod enableable;
mod focus;
mod notification;
mod value;

use std::collections::BTreeMap;
use std::sync::Arc;

use arbor_core::logging::{span_names, targets};
use arbor_core::{Object, ObjectId};

pub use base::ComponentBase;
pub use composite::{ChildList, CompositeBase};
pub use controls::{BooleanSelectPanel, ListControl, Panel, ValueControl};
pub use debug::{ComponentTreeDebug, TreeFormatOptions, TreeStyle};
pub use enableable::Enableable;
pub use focus::FocusGroup;
pub use notification::{Notification, Severity};
pub use value::{ValidatedValue, ValueSource};

use crate::error::StructuralResult;
use crate::event::{InputEvent, PropertyChangeEvent, property};
use crate::preferences::{self, PreferenceValue};

/// What sort of node a component is, for diagnostics and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A leaf displaying a single value.
    Control,
    /// A leaf displaying a list with a selection.
    ListControl,
    /// A composite holding children.
    Container,
    /// A composite whose children mirror a list selection.
    SelectPanel,
}

/// A node of the component tree.
///
/// Implementors supply [`base`](Component::base) and whichever capability
/// accessors apply; everything else has a default implementation built on
/// those. Components live behind `Arc` and must be constructed with
/// [`install`].
pub trait Component: Object + Send + Sync + 'static {
    // =========================================================================
    // Required Methods
    // =========================================================================

    /// Get a reference to the component's base.
    fn base(&self) -> &ComponentBase;

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// What sort of node this is.
    fn kind(&self) -> ComponentKind {
        ComponentKind::Control
    }

    /// Child management, if this component holds children.
    fn composite(&self) -> Option<&CompositeBase> {
        None
    }

    /// The value this component displays, if any.
    fn value_source(&self) -> Option<&dyn ValueSource> {
        None
    }

    /// The focus scope this component defines, if any.
    fn focus_group(&self) -> Option<&FocusGroup> {
        None
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// The parent component, if attached.
    fn parent(&self) -> Option<Arc<dyn Component>> {
        self.base().parent()
    }

    /// A snapshot of the children.
    fn children(&self) -> ChildList {
        self.composite().map(CompositeBase::children).unwrap_or_default()
    }

    /// Append a child.
    fn add_child(&self, child: Arc<dyn Component>) -> StructuralResult<()> {
        composite::attach(self, child, None)
    }

    /// Insert a child at `index`.
    fn insert_child(&self, index: usize, child: Arc<dyn Component>) -> StructuralResult<()> {
        composite::attach(self, child, Some(index))
    }

    /// Detach a child, returning it.
    fn remove_child(&self, child: ObjectId) -> StructuralResult<Arc<dyn Component>> {
        composite::detach(self, child)
    }

    // =========================================================================
    // Validity
    // =========================================================================

    /// Compute validity from scratch.
    ///
    /// The default combines the value source's validity with the cached
    /// validity of every shown child.
    fn determine_valid(&self) -> bool {
        let value_valid = self
            .value_source()
            .is_none_or(|source| source.is_valid_value());
        value_valid && self.composite().is_none_or(CompositeBase::children_valid)
    }

    /// Whether the component holds acceptable input.
    ///
    /// Computed on first query and cached afterwards.
    fn is_valid(&self) -> bool {
        match self.base().cached_valid() {
            Some(valid) => valid,
            None => self.update_valid(),
        }
    }

    /// Recompute and cache validity, firing a `"valid"` change if it changed.
    fn update_valid(&self) -> bool {
        let valid = self.determine_valid();
        if let Some(old) = self.base().store_valid(valid) {
            tracing::trace!(
                target: targets::COMPONENT,
                component = %self.object_id(),
                valid,
                "validity changed"
            );
            self.fire_property_change(PropertyChangeEvent::with_values(
                self.object_id(),
                property::VALID,
                old,
                valid,
            ));
        }
        valid
    }

    /// Commit pending input and validate it, shown children first.
    ///
    /// Failures are attached as error notifications rather than returned.
    /// Returns the resulting validity.
    fn validate(&self) -> bool {
        validate_tree(self)
    }

    /// Restore every value below and including this component to its
    /// default and clear notifications.
    fn reset(&self) {
        reset_tree(self)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Deliver a property change to this component's listeners.
    ///
    /// Value and validator changes update validity first, so listeners
    /// observe the new validity.
    fn fire_property_change(&self, event: PropertyChangeEvent) {
        if event.is(property::VALUE) || event.is(property::VALIDATOR) {
            self.update_valid();
        }
        self.base().property_changed.emit(event);
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Handle input delivered to this component. Does nothing by default.
    fn handle_input(&self, _event: &mut InputEvent) {}

    /// Route input through this component's subtree.
    ///
    /// Focus-scoped input goes to the focused descendant of the nearest
    /// focus group, targeted input to its target, and anything else to each
    /// child in turn until one consumes it. Input nobody consumed reaches
    /// this component's [`handle_input`](Component::handle_input).
    fn dispatch_input(&self, event: &mut InputEvent) {
        dispatch::dispatch_input(self, event)
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// Values this component wants remembered between sessions.
    fn export_preferences(&self) -> BTreeMap<String, PreferenceValue> {
        BTreeMap::new()
    }

    /// Apply remembered values.
    fn import_preferences(&self, _values: &BTreeMap<String, PreferenceValue>) {}

    /// Load preferences for this component and its descendants.
    fn load_preferences(&self) {
        if let (Some(this), Some(store)) = (self.base().this(), self.base().preference_store()) {
            preferences::load_subtree(store.as_ref(), this.as_ref());
        }
    }

    /// Save preferences for this component and its descendants.
    fn save_preferences(&self) {
        if let (Some(this), Some(store)) = (self.base().this(), self.base().preference_store()) {
            preferences::save_subtree(store.as_ref(), this.as_ref());
        }
    }
}

/// Wrap a component in an `Arc` and wire it to its base.
///
/// This records the component as the owner of its base and installs the
/// repeaters on its value source. Every component must be created this way.
pub fn install<C: Component>(component: C) -> Arc<C> {
    let component = Arc::new(component);
    let this: Arc<dyn Component> = component.clone();
    let weak = Arc::downgrade(&this);
    component.base().bind(weak.clone());
    if let Some(source) = component.value_source() {
        component.base().set_repeaters(source.repeat_into(weak));
    }
    tracing::trace!(
        target: targets::COMPONENT,
        component = %component.object_id(),
        kind = ?component.kind(),
        "installed component"
    );
    component
}

fn validate_tree<C: Component + ?Sized>(component: &C) -> bool {
    let _span = tracing::trace_span!(
        target: targets::COMPONENT,
        span_names::VALIDITY,
        component = %component.object_id()
    )
    .entered();

    if let Some(composite) = component.composite() {
        for child in composite.children().iter() {
            if child.base().is_shown() {
                child.validate();
            }
        }
    }

    if let Some(source) = component.value_source() {
        match source.commit() {
            Ok(()) => {
                let has_error = component
                    .base()
                    .notification()
                    .is_some_and(|notification| notification.is_error());
                if has_error {
                    component.base().set_notification(None);
                }
            }
            Err(err) => {
                tracing::debug!(
                    target: targets::COMPONENT,
                    component = %component.object_id(),
                    error = %err,
                    "validation failed"
                );
                component
                    .base()
                    .set_notification(Some(Notification::from_error(err)));
            }
        }
    }

    component.update_valid()
}

fn reset_tree<C: Component + ?Sized>(component: &C) {
    if let Some(composite) = component.composite() {
        for child in composite.children().iter() {
            child.reset();
        }
    }
    if let Some(source) = component.value_source() {
        source.reset_value();
    }
    component.base().set_notification(None);
    component.update_valid();
}

static_assertions::assert_obj_safe!(Component);

#[cfg(test)]
mod tests;
