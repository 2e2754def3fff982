//! Component base implementation.
//!
//! This module provides [`ComponentBase`], the state every component shares:
//! identity, the parent back-reference, the cached validity flag, the
//! attached notification, the enabled/visible/displayed flags and the
//! component's signals.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use arbor_core::logging::targets;
use arbor_core::{ObjectBase, ObjectId, Property, Signal, Subscription, VetoSignal};
use parking_lot::{Mutex, RwLock};

use super::{Component, Enableable, Notification};
use crate::error::ValidationError;
use crate::event::{NotificationEvent, PropertyChangeEvent, StructureEvent, property};
use crate::preferences::PreferenceStore;

/// The base implementation for all components.
///
/// Component implementations include this as a field and return it from
/// [`Component::base`]. Construct the component with
/// [`install`](super::install) so the base knows its owner.
///
/// # Example
///
/// ```
/// use arbor::component::{install, Component, ComponentBase};
/// use arbor_core::{Object, ObjectId};
///
/// struct Label {
///     base: ComponentBase,
/// }
///
/// impl Object for Label {
///     fn object_id(&self) -> ObjectId {
///         self.base.id()
///     }
/// }
///
/// impl Component for Label {
///     fn base(&self) -> &ComponentBase {
///         &self.base
///     }
/// }
///
/// let label = install(Label { base: ComponentBase::new::<Label>() });
/// label.base().set_name("greeting");
/// assert!(label.is_valid());
/// ```
pub struct ComponentBase {
    object: ObjectBase,
    this: OnceLock<Weak<dyn Component>>,
    parent: RwLock<Option<Weak<dyn Component>>>,

    /// Cached validity; `None` until first queried.
    valid: RwLock<Option<bool>>,
    notification: RwLock<Option<Notification>>,

    enabled: Property<bool>,
    visible: Property<bool>,
    displayed: Property<bool>,
    enableable: Mutex<Option<(Arc<Enableable>, Subscription)>>,

    /// Repeaters installed on the component's own value source.
    repeaters: Mutex<Vec<Subscription>>,
    preference_store: RwLock<Option<Arc<dyn PreferenceStore>>>,

    /// Fired after a bound property of the component, or a repeated property
    /// of one of its sources, changed.
    pub property_changed: Signal<PropertyChangeEvent>,
    /// Consulted before a repeated value change is committed.
    pub vetoable_change: VetoSignal<PropertyChangeEvent, ValidationError>,
    /// Fired when a notification is attached to this component or, repeated,
    /// to any descendant.
    pub notified: Signal<NotificationEvent>,
    /// Fired when children are added to or removed from this component or,
    /// repeated, from any descendant.
    pub structure_changed: Signal<StructureEvent>,
}

impl ComponentBase {
    /// Create a base for a component of type `T`.
    pub fn new<T: Component>() -> Self {
        Self {
            object: ObjectBase::new::<T>(),
            this: OnceLock::new(),
            parent: RwLock::new(None),
            valid: RwLock::new(None),
            notification: RwLock::new(None),
            enabled: Property::new(true),
            visible: Property::new(true),
            displayed: Property::new(true),
            enableable: Mutex::new(None),
            repeaters: Mutex::new(Vec::new()),
            preference_store: RwLock::new(None),
            property_changed: Signal::new(),
            vetoable_change: VetoSignal::new(),
            notified: Signal::new(),
            structure_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// The component's ID.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.object.id()
    }

    /// The component's name, used for debugging and preference keys.
    pub fn name(&self) -> String {
        self.object.name()
    }

    /// Set the component's name.
    pub fn set_name(&self, name: impl Into<String>) {
        self.object.set_name(name);
    }

    /// The component's type name without its module path.
    pub fn short_type_name(&self) -> &'static str {
        self.object.short_type_name()
    }

    pub(crate) fn bind(&self, this: Weak<dyn Component>) {
        if self.this.set(this).is_err() {
            tracing::warn!(target: targets::COMPONENT, component = %self.id(), "component installed twice");
        }
    }

    /// The component owning this base, if it was installed.
    pub fn this(&self) -> Option<Arc<dyn Component>> {
        self.this.get().and_then(Weak::upgrade)
    }

    pub(crate) fn this_weak(&self) -> Option<Weak<dyn Component>> {
        self.this.get().cloned()
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// The parent component, if attached.
    pub fn parent(&self) -> Option<Arc<dyn Component>> {
        self.parent.read().as_ref().and_then(Weak::upgrade)
    }

    /// The parent's ID, if attached.
    pub fn parent_id(&self) -> Option<ObjectId> {
        self.parent().map(|parent| parent.object_id())
    }

    pub(crate) fn set_parent(&self, parent: Option<Weak<dyn Component>>) {
        *self.parent.write() = parent;
    }

    /// Take the parent slot if it is free.
    ///
    /// The check and the write happen under one lock, so of two owners
    /// claiming the same child only one succeeds. The loser gets the ID of
    /// the current parent.
    pub(crate) fn claim_parent(&self, parent: Weak<dyn Component>) -> Result<(), ObjectId> {
        let mut slot = self.parent.write();
        if let Some(current) = slot.as_ref().and_then(Weak::upgrade) {
            return Err(current.object_id());
        }
        *slot = Some(parent);
        Ok(())
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> Vec<Arc<dyn Component>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.base().parent();
            ancestors.push(node);
        }
        ancestors
    }

    /// Whether `id` is this component's parent or a more distant ancestor.
    pub fn has_ancestor(&self, id: ObjectId) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.object_id() == id {
                return true;
            }
            current = node.base().parent();
        }
        false
    }

    // =========================================================================
    // Validity
    // =========================================================================

    /// The cached validity, or `None` if it has not been computed yet.
    pub fn cached_valid(&self) -> Option<bool> {
        *self.valid.read()
    }

    /// Store a newly computed validity.
    ///
    /// Returns the previous value if a previously known validity changed.
    pub(crate) fn store_valid(&self, valid: bool) -> Option<bool> {
        let previous = self.valid.write().replace(valid);
        previous.filter(|&old| old != valid)
    }

    // =========================================================================
    // Notification
    // =========================================================================

    /// The attached notification.
    pub fn notification(&self) -> Option<Notification> {
        self.notification.read().clone()
    }

    /// Attach or clear a notification.
    ///
    /// Fires a `"notification"` change and, when a notification is attached,
    /// a [`NotificationEvent`] that ancestors repeat.
    pub fn set_notification(&self, notification: Option<Notification>) {
        let old = {
            let mut current = self.notification.write();
            if *current == notification {
                return;
            }
            std::mem::replace(&mut *current, notification.clone())
        };
        self.fire(PropertyChangeEvent::with_values(
            self.id(),
            property::NOTIFICATION,
            old,
            notification.clone(),
        ));
        if let Some(notification) = notification {
            tracing::debug!(
                target: targets::COMPONENT,
                component = %self.id(),
                severity = %notification.severity(),
                message = notification.message(),
                "notification attached"
            );
            self.notified
                .emit(NotificationEvent::new(self.id(), notification));
        }
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Whether the component accepts input.
    ///
    /// With an [`Enableable`] delegate installed, the delegate decides.
    pub fn is_enabled(&self) -> bool {
        match self.enableable() {
            Some(delegate) => delegate.is_enabled(),
            None => self.enabled.get(),
        }
    }

    /// Enable or disable the component (or its delegate).
    pub fn set_enabled(&self, enabled: bool) {
        if let Some(delegate) = self.enableable() {
            delegate.set_enabled(enabled);
            return;
        }
        if self.enabled.set(enabled) {
            self.fire(PropertyChangeEvent::with_values(
                self.id(),
                property::ENABLED,
                !enabled,
                enabled,
            ));
        }
    }

    /// The enabled-state delegate.
    pub fn enableable(&self) -> Option<Arc<Enableable>> {
        self.enableable.lock().as_ref().map(|(delegate, _)| delegate.clone())
    }

    /// Install or remove an enabled-state delegate.
    ///
    /// The delegate's `"enabled"` changes are repeated by this component.
    pub fn set_enableable(&self, delegate: Option<Arc<Enableable>>) {
        let was_enabled = self.is_enabled();
        let owner = self.this_weak();
        let entry = delegate.map(|delegate| {
            let subscription = delegate.property_changed.subscribe(move |event| {
                if let Some(owner) = owner.as_ref().and_then(Weak::upgrade) {
                    owner.fire_property_change(event.repeat(owner.object_id()));
                }
            });
            (delegate, subscription)
        });
        let previous = std::mem::replace(&mut *self.enableable.lock(), entry);
        drop(previous);

        let enabled = self.is_enabled();
        if enabled != was_enabled {
            self.fire(PropertyChangeEvent::with_values(
                self.id(),
                property::ENABLED,
                was_enabled,
                enabled,
            ));
        }
    }

    /// Whether the component is shown.
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Show or hide the component.
    pub fn set_visible(&self, visible: bool) {
        if self.visible.set(visible) {
            self.fire(PropertyChangeEvent::with_values(
                self.id(),
                property::VISIBLE,
                !visible,
                visible,
            ));
        }
    }

    /// Whether the component takes part in layout.
    pub fn is_displayed(&self) -> bool {
        self.displayed.get()
    }

    /// Include or exclude the component from layout.
    pub fn set_displayed(&self, displayed: bool) {
        if self.displayed.set(displayed) {
            self.fire(PropertyChangeEvent::with_values(
                self.id(),
                property::DISPLAYED,
                !displayed,
                displayed,
            ));
        }
    }

    /// Whether the component is both displayed and visible.
    ///
    /// Only shown children count towards their composite's validity.
    pub fn is_shown(&self) -> bool {
        self.is_displayed() && self.is_visible()
    }

    // =========================================================================
    // Sources and preferences
    // =========================================================================

    pub(crate) fn set_repeaters(&self, repeaters: Vec<Subscription>) {
        let previous = std::mem::replace(&mut *self.repeaters.lock(), repeaters);
        drop(previous);
    }

    /// The number of repeaters installed on the component's value source.
    pub fn repeater_count(&self) -> usize {
        self.repeaters.lock().len()
    }

    /// The preference store of this component or its nearest ancestor.
    pub fn preference_store(&self) -> Option<Arc<dyn PreferenceStore>> {
        if let Some(store) = self.preference_store.read().clone() {
            return Some(store);
        }
        self.ancestors()
            .into_iter()
            .find_map(|ancestor| ancestor.base().preference_store.read().clone())
    }

    /// Give this component (and its descendants) a preference store.
    pub fn set_preference_store(&self, store: Option<Arc<dyn PreferenceStore>>) {
        *self.preference_store.write() = store;
    }

    /// Fire a property change through the owning component.
    ///
    /// The owner's [`Component::fire_property_change`] sees the event first,
    /// so validity is updated before listeners run. Before installation the
    /// event goes straight to the listeners.
    pub fn fire(&self, event: PropertyChangeEvent) {
        match self.this() {
            Some(owner) => owner.fire_property_change(event),
            None => self.property_changed.emit(event),
        }
    }
}

impl fmt::Debug for ComponentBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentBase")
            .field("object", &self.object)
            .field("parent", &self.parent_id())
            .field("valid", &self.cached_valid())
            .field("notification", &self.notification())
            .field("enabled", &self.is_enabled())
            .field("visible", &self.is_visible())
            .field("displayed", &self.is_displayed())
            .finish()
    }
}

static_assertions::assert_impl_all!(ComponentBase: Send, Sync);
