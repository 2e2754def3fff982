//! Event types for Arbor.
//!
//! Every event records two identities: the `source` that fired this copy of
//! the event and the `target` the event is originally about. When a component
//! repeats an event from one of its models or children it fires a copy whose
//! source is the component itself; the target never changes. A listener on
//! the root of a tree can therefore tell exactly which node an event concerns.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use arbor_core::ObjectId;

use crate::component::Notification;

/// Well-known property names.
pub mod property {
    /// The value of a value model or the selected value of a list model.
    pub const VALUE: &str = "value";
    /// The validator installed on a model.
    pub const VALIDATOR: &str = "validator";
    /// A component's cached validity.
    pub const VALID: &str = "valid";
    /// Whether a component takes part in layout.
    pub const DISPLAYED: &str = "displayed";
    /// Whether a component is shown.
    pub const VISIBLE: &str = "visible";
    /// Whether a component accepts input.
    pub const ENABLED: &str = "enabled";
    /// A component's attached notification.
    pub const NOTIFICATION: &str = "notification";
}

/// A type-erased property value carried by a [`PropertyChangeEvent`].
pub type PropertyValue = Arc<dyn Any + Send + Sync>;

/// A bound property changed, or is about to change.
///
/// The same event type is handed to veto listeners before a change and to
/// change listeners after it.
///
/// ```
/// use arbor::event::{property, PropertyChangeEvent};
/// use arbor_core::ObjectId;
///
/// let model = ObjectId::next();
/// let event = PropertyChangeEvent::with_values(model, property::VALUE, Some(1), Some(2));
/// assert_eq!(event.new_value::<Option<i32>>(), Some(&Some(2)));
///
/// let panel = ObjectId::next();
/// let repeated = event.repeat(panel);
/// assert_eq!(repeated.source(), panel);
/// assert_eq!(repeated.target(), model);
/// ```
#[derive(Clone)]
pub struct PropertyChangeEvent {
    source: ObjectId,
    target: ObjectId,
    property: &'static str,
    old_value: Option<PropertyValue>,
    new_value: Option<PropertyValue>,
}

impl PropertyChangeEvent {
    /// Create an event that carries no values.
    pub fn new(source: ObjectId, property: &'static str) -> Self {
        Self {
            source,
            target: source,
            property,
            old_value: None,
            new_value: None,
        }
    }

    /// Create an event carrying the old and new values.
    pub fn with_values<T: Any + Send + Sync>(
        source: ObjectId,
        property: &'static str,
        old_value: T,
        new_value: T,
    ) -> Self {
        Self {
            source,
            target: source,
            property,
            old_value: Some(Arc::new(old_value)),
            new_value: Some(Arc::new(new_value)),
        }
    }

    /// A copy of this event fired by `source`, keeping the original target.
    pub fn repeat(&self, source: ObjectId) -> Self {
        Self {
            source,
            ..self.clone()
        }
    }

    /// The object that fired this copy of the event.
    pub fn source(&self) -> ObjectId {
        self.source
    }

    /// The object whose property changed.
    pub fn target(&self) -> ObjectId {
        self.target
    }

    /// The name of the property that changed.
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// Whether this event concerns the named property.
    pub fn is(&self, property: &str) -> bool {
        self.property == property
    }

    /// Whether this copy was repeated by an object other than the target.
    pub fn is_repeated(&self) -> bool {
        self.source != self.target
    }

    /// The value before the change, if it has type `T`.
    pub fn old_value<T: Any>(&self) -> Option<&T> {
        self.old_value.as_deref()?.downcast_ref()
    }

    /// The value after the change, if it has type `T`.
    pub fn new_value<T: Any>(&self) -> Option<&T> {
        self.new_value.as_deref()?.downcast_ref()
    }
}

impl fmt::Debug for PropertyChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChangeEvent")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("property", &self.property)
            .field("has_values", &self.new_value.is_some())
            .finish()
    }
}

/// A notification was attached to a component.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    source: ObjectId,
    target: ObjectId,
    notification: Notification,
}

impl NotificationEvent {
    /// Create an event for a notification attached to `target`.
    pub fn new(target: ObjectId, notification: Notification) -> Self {
        Self {
            source: target,
            target,
            notification,
        }
    }

    /// A copy of this event fired by `source`, keeping the original target.
    pub fn repeat(&self, source: ObjectId) -> Self {
        Self {
            source,
            ..self.clone()
        }
    }

    /// The component that fired this copy of the event.
    pub fn source(&self) -> ObjectId {
        self.source
    }

    /// The component the notification was attached to.
    pub fn target(&self) -> ObjectId {
        self.target
    }

    /// The notification itself.
    pub fn notification(&self) -> &Notification {
        &self.notification
    }
}

/// The kind of structural change a [`StructureEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureChange {
    /// A child was attached.
    ChildAdded,
    /// A child was detached.
    ChildRemoved,
}

/// A child was added to or removed from a composite.
///
/// The target is the child that moved; `composite` is the composite whose
/// child list changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureEvent {
    source: ObjectId,
    target: ObjectId,
    composite: ObjectId,
    change: StructureChange,
}

impl StructureEvent {
    /// A child was attached to `composite`.
    pub fn child_added(composite: ObjectId, child: ObjectId) -> Self {
        Self {
            source: composite,
            target: child,
            composite,
            change: StructureChange::ChildAdded,
        }
    }

    /// A child was detached from `composite`.
    pub fn child_removed(composite: ObjectId, child: ObjectId) -> Self {
        Self {
            source: composite,
            target: child,
            composite,
            change: StructureChange::ChildRemoved,
        }
    }

    /// A copy of this event fired by `source`, keeping the original target.
    pub fn repeat(&self, source: ObjectId) -> Self {
        Self { source, ..*self }
    }

    /// The component that fired this copy of the event.
    pub fn source(&self) -> ObjectId {
        self.source
    }

    /// The child that was added or removed.
    pub fn target(&self) -> ObjectId {
        self.target
    }

    /// The composite whose child list changed.
    pub fn composite(&self) -> ObjectId {
        self.composite
    }

    /// What happened.
    pub fn change(&self) -> StructureChange {
        self.change
    }
}

/// Keyboard modifier state attached to key input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyboardModifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse buttons reported by pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// What kind of input an [`InputEvent`] carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// A key press, delivered to the focused component.
    Key {
        key: String,
        modifiers: KeyboardModifiers,
    },
    /// A pointer click on a component.
    Click { button: MouseButton },
    /// A named command posted by the client.
    Command(String),
}

/// Client input travelling down the component tree.
///
/// Key input is focus scoped by default; everything else is delivered either
/// to an explicit target or broadcast to children until consumed.
#[derive(Debug, Clone)]
pub struct InputEvent {
    kind: InputKind,
    target: Option<ObjectId>,
    focus_scoped: bool,
    consumed: bool,
}

impl InputEvent {
    /// Create an input event of the given kind.
    pub fn new(kind: InputKind) -> Self {
        let focus_scoped = matches!(kind, InputKind::Key { .. });
        Self {
            kind,
            target: None,
            focus_scoped,
            consumed: false,
        }
    }

    /// A key press without modifiers.
    pub fn key(key: impl Into<String>) -> Self {
        Self::new(InputKind::Key {
            key: key.into(),
            modifiers: KeyboardModifiers::default(),
        })
    }

    /// A left click.
    pub fn click() -> Self {
        Self::new(InputKind::Click {
            button: MouseButton::Left,
        })
    }

    /// A named command.
    pub fn command(name: impl Into<String>) -> Self {
        Self::new(InputKind::Command(name.into()))
    }

    /// Address the event to a specific component.
    pub fn with_target(mut self, target: ObjectId) -> Self {
        self.target = Some(target);
        self
    }

    /// Override whether the event is routed through focus.
    pub fn with_focus_scope(mut self, focus_scoped: bool) -> Self {
        self.focus_scoped = focus_scoped;
        self
    }

    /// What the input is.
    pub fn kind(&self) -> &InputKind {
        &self.kind
    }

    /// The component the event is addressed to, if any.
    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    /// Whether the event is delivered to the focused component.
    pub fn is_focus_scoped(&self) -> bool {
        self.focus_scoped
    }

    /// Mark the event as handled; dispatch stops here.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Whether a component has handled the event.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

static_assertions::assert_impl_all!(PropertyChangeEvent: Send, Sync);
static_assertions::assert_impl_all!(NotificationEvent: Send, Sync);
