//! Focus scopes.
//!
//! A [`FocusGroup`] belongs to a composite component and tracks which of its
//! descendants has keyboard focus. Focus-scoped input dispatched anywhere in
//! the scope is delivered to that descendant.
//!
//! Focus order is a depth-first pre-order walk of the scope, the same order
//! children are rendered in. Only enabled, shown leaf components take focus.

use std::fmt;
use std::sync::{Arc, Weak};

use arbor_core::logging::targets;
use arbor_core::{ObjectId, Signal};
use parking_lot::RwLock;

use super::Component;

/// Tracks the focused component within one scope.
pub struct FocusGroup {
    focused: RwLock<Option<Weak<dyn Component>>>,
    /// Emitted with the newly focused component, or `None` when focus is
    /// cleared.
    pub focus_changed: Signal<Option<ObjectId>>,
}

impl FocusGroup {
    /// Create a scope with nothing focused.
    pub fn new() -> Self {
        Self {
            focused: RwLock::new(None),
            focus_changed: Signal::new(),
        }
    }

    /// The focused component, if it is still alive.
    pub fn focused(&self) -> Option<Arc<dyn Component>> {
        self.focused.read().as_ref().and_then(Weak::upgrade)
    }

    /// The focused component's ID.
    pub fn focused_id(&self) -> Option<ObjectId> {
        self.focused().map(|component| component.object_id())
    }

    /// Whether the given component has focus.
    pub fn has_focus(&self, id: ObjectId) -> bool {
        self.focused_id() == Some(id)
    }

    /// Give focus to `component`.
    ///
    /// Returns `false` without changing focus if the component is disabled
    /// or not shown.
    pub fn set_focus(&self, component: &Arc<dyn Component>) -> bool {
        if !can_focus(component.as_ref()) {
            tracing::debug!(
                target: targets::COMPONENT,
                component = %component.object_id(),
                "refused focus for disabled or hidden component"
            );
            return false;
        }
        let id = component.object_id();
        if self.has_focus(id) {
            return true;
        }
        *self.focused.write() = Some(Arc::downgrade(component));
        self.focus_changed.emit(Some(id));
        true
    }

    /// Remove focus from whatever has it.
    pub fn clear_focus(&self) {
        let previous = self.focused.write().take();
        if previous.is_some() {
            self.focus_changed.emit(None);
        }
    }

    /// Move focus to the next focusable component in `scope`, wrapping
    /// around at the end.
    ///
    /// Returns `false` if nothing in the scope can take focus.
    pub fn focus_next(&self, scope: &dyn Component) -> bool {
        self.step(scope, false)
    }

    /// Move focus to the previous focusable component in `scope`, wrapping
    /// around at the start.
    pub fn focus_previous(&self, scope: &dyn Component) -> bool {
        self.step(scope, true)
    }

    fn step(&self, scope: &dyn Component, backwards: bool) -> bool {
        let mut order = Vec::new();
        collect_focusable(scope, &mut order);
        if order.is_empty() {
            return false;
        }
        if backwards {
            order.reverse();
        }

        let next = match self
            .focused_id()
            .and_then(|id| order.iter().position(|c| c.object_id() == id))
        {
            Some(position) => (position + 1) % order.len(),
            None => 0,
        };
        self.set_focus(&order[next])
    }

    /// The focused component, provided it lies below `scope`.
    pub(crate) fn focused_within(&self, scope: ObjectId) -> Option<Arc<dyn Component>> {
        self.focused()
            .filter(|focused| focused.base().has_ancestor(scope))
    }
}

impl Default for FocusGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FocusGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusGroup")
            .field("focused", &self.focused_id())
            .finish()
    }
}

fn can_focus(component: &dyn Component) -> bool {
    component.base().is_enabled() && component.base().is_shown()
}

fn collect_focusable(node: &dyn Component, order: &mut Vec<Arc<dyn Component>>) {
    let Some(composite) = node.composite() else {
        return;
    };
    for child in composite.children().iter() {
        if !child.base().is_shown() {
            continue;
        }
        if child.composite().is_some() {
            collect_focusable(child.as_ref(), order);
        } else if can_focus(child.as_ref()) {
            order.push(child.clone());
        }
    }
}
