//! Input dispatch through the component tree.
//!
//! Input arriving at a component is routed by the first strategy that
//! applies:
//!
//! 1. **Focus**: focus-scoped input goes to the focused descendant of the
//!    nearest focus group at or above the component.
//! 2. **Target**: input addressed to a descendant is delivered to it.
//! 3. **Broadcast**: anything else is dispatched to each child in order,
//!    stopping at the first child that consumes it.
//!
//! Input that is still unconsumed afterwards reaches the component's own
//! [`handle_input`](super::Component::handle_input).

use std::sync::Arc;

use arbor_core::logging::targets;

use super::Component;
use crate::event::InputEvent;

pub(crate) fn dispatch_input<C: Component + ?Sized>(component: &C, event: &mut InputEvent) {
    let id = component.object_id();

    if let Some(composite) = component.composite() {
        if event.is_focus_scoped() {
            if let Some(focused) = focused_component(component).filter(|f| f.object_id() != id) {
                tracing::trace!(target: targets::COMPONENT, to = %focused.object_id(), "focus dispatch");
                focused.handle_input(event);
            }
        } else if let Some(target) = event.target() {
            if target != id
                && let Some(found) = composite.find_descendant(target)
            {
                tracing::trace!(target: targets::COMPONENT, to = %target, "targeted dispatch");
                found.handle_input(event);
            }
        } else {
            for child in composite.children().iter() {
                child.dispatch_input(event);
                if event.is_consumed() {
                    break;
                }
            }
        }
    }

    if !event.is_consumed() {
        component.handle_input(event);
    }
}

/// The focused component of the nearest focus group at or above `component`.
fn focused_component<C: Component + ?Sized>(component: &C) -> Option<Arc<dyn Component>> {
    if let Some(group) = component.focus_group() {
        return group.focused_within(component.object_id());
    }
    component
        .base()
        .ancestors()
        .into_iter()
        .find_map(|ancestor| {
            ancestor
                .focus_group()
                .map(|group| group.focused_within(ancestor.object_id()))
        })
        .flatten()
}
