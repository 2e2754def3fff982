//! Child management for composite components.
//!
//! A composite keeps its children in a copy-on-write list: readers take an
//! `Arc` snapshot and iterate it without holding a lock, while structural
//! changes swap in a new list. Changes to one composite are serialized by a
//! re-entrant mutex, so a listener reacting to a structural event may change
//! the same composite again on the same thread.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use arbor_core::logging::{span_names, targets};
use arbor_core::{ObjectId, Subscription};
use parking_lot::{Mutex, ReentrantMutex, RwLock};

use super::Component;
use crate::error::{StructuralError, StructuralResult};
use crate::event::{StructureEvent, property};
use crate::preferences;

/// A snapshot of a composite's children.
pub type ChildList = Arc<Vec<Arc<dyn Component>>>;

/// The listeners a composite keeps on one child.
///
/// Dropping the entry disconnects every listener.
struct ChildSubscriptions {
    _valid: Subscription,
    _displayed: Subscription,
    _visible: Subscription,
    _notification: Subscription,
    _structure: Subscription,
}

impl ChildSubscriptions {
    fn install(owner: &Weak<dyn Component>, child: &Arc<dyn Component>) -> Self {
        let child_base = child.base();
        Self {
            _valid: revalidate_on(owner, child, property::VALID),
            _displayed: revalidate_on(owner, child, property::DISPLAYED),
            _visible: revalidate_on(owner, child, property::VISIBLE),
            _notification: {
                let owner = owner.clone();
                child_base.notified.subscribe(move |event| {
                    if let Some(owner) = owner.upgrade() {
                        owner.base().notified.emit(event.repeat(owner.object_id()));
                    }
                })
            },
            _structure: {
                let owner = owner.clone();
                child_base.structure_changed.subscribe(move |event| {
                    if let Some(owner) = owner.upgrade() {
                        owner
                            .base()
                            .structure_changed
                            .emit(event.repeat(owner.object_id()));
                    }
                })
            },
        }
    }
}

fn revalidate_on(
    owner: &Weak<dyn Component>,
    child: &Arc<dyn Component>,
    name: &'static str,
) -> Subscription {
    let owner = owner.clone();
    child.base().property_changed.subscribe(move |event| {
        if event.is(name)
            && let Some(owner) = owner.upgrade()
        {
            owner.update_valid();
        }
    })
}

/// Child storage for composite components.
///
/// Composites include this as a field and return it from
/// [`Component::composite`]; the tree operations on [`Component`] do the
/// rest.
pub struct CompositeBase {
    children: RwLock<ChildList>,
    subscriptions: Mutex<HashMap<ObjectId, ChildSubscriptions>>,
    mutation: ReentrantMutex<()>,
}

impl CompositeBase {
    /// Create empty child storage.
    pub fn new() -> Self {
        Self {
            children: RwLock::new(Arc::new(Vec::new())),
            subscriptions: Mutex::new(HashMap::new()),
            mutation: ReentrantMutex::new(()),
        }
    }

    /// A snapshot of the children in order.
    ///
    /// The snapshot is unaffected by later structural changes.
    pub fn children(&self) -> ChildList {
        self.children.read().clone()
    }

    /// The number of children.
    pub fn child_count(&self) -> usize {
        self.children.read().len()
    }

    /// The child at `index`.
    pub fn child(&self, index: usize) -> Option<Arc<dyn Component>> {
        self.children.read().get(index).cloned()
    }

    /// The position of the child with the given ID.
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.children
            .read()
            .iter()
            .position(|child| child.object_id() == id)
    }

    /// Whether a component with the given ID is a direct child.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    /// Find a descendant at any depth by ID.
    pub fn find_descendant(&self, id: ObjectId) -> Option<Arc<dyn Component>> {
        for child in self.children().iter() {
            if child.object_id() == id {
                return Some(child.clone());
            }
            if let Some(found) = child.composite().and_then(|c| c.find_descendant(id)) {
                return Some(found);
            }
        }
        None
    }

    /// Whether every shown child is valid.
    ///
    /// Children that are hidden or not displayed do not count.
    pub fn children_valid(&self) -> bool {
        self.children()
            .iter()
            .filter(|child| child.base().is_shown())
            .all(|child| child.is_valid())
    }

    /// Whether listeners are installed on the child with the given ID.
    pub fn is_listening_to(&self, id: ObjectId) -> bool {
        self.subscriptions.lock().contains_key(&id)
    }

    fn replace_children(&self, f: impl FnOnce(&mut Vec<Arc<dyn Component>>)) {
        let mut children = self.children.write();
        let mut list = (**children).clone();
        f(&mut list);
        *children = Arc::new(list);
    }
}

impl Default for CompositeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompositeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<ObjectId> = self.children().iter().map(|c| c.object_id()).collect();
        f.debug_struct("CompositeBase").field("children", &ids).finish()
    }
}

/// Attach `child` to `owner`, appending or inserting at `index`.
pub(crate) fn attach<C: Component + ?Sized>(
    owner: &C,
    child: Arc<dyn Component>,
    index: Option<usize>,
) -> StructuralResult<()> {
    let owner_id = owner.object_id();
    let child_id = child.object_id();
    let composite = owner
        .composite()
        .ok_or(StructuralError::NotComposite { component: owner_id })?;
    let owner_weak = owner
        .base()
        .this_weak()
        .ok_or(StructuralError::NotInstalled { component: owner_id })?;

    let _guard = composite.mutation.lock();
    let _span = tracing::debug_span!(
        target: targets::COMPONENT,
        span_names::STRUCTURE,
        op = "attach",
        parent = %owner_id,
        child = %child_id
    )
    .entered();

    if child_id == owner_id || owner.base().has_ancestor(child_id) {
        return Err(StructuralError::CircularParentage {
            parent: owner_id,
            child: child_id,
        });
    }
    let len = composite.child_count();
    let index = index.unwrap_or(len);
    if index > len {
        return Err(StructuralError::IndexOutOfBounds { index, len });
    }
    // The owner's lock does not cover the child; the claim on the child
    // decides between owners attaching it at the same time.
    child
        .base()
        .claim_parent(owner_weak.clone())
        .map_err(|parent| StructuralError::AlreadyParented {
            child: child_id,
            parent,
        })?;

    composite.replace_children(|children| children.insert(index, child.clone()));
    let subscriptions = ChildSubscriptions::install(&owner_weak, &child);
    composite.subscriptions.lock().insert(child_id, subscriptions);

    if let Some(store) = child.base().preference_store() {
        preferences::load_subtree(store.as_ref(), child.as_ref());
    }

    owner.update_valid();
    tracing::debug!(target: targets::COMPONENT, parent = %owner_id, child = %child_id, index, "child added");
    owner
        .base()
        .structure_changed
        .emit(StructureEvent::child_added(owner_id, child_id));
    Ok(())
}

/// Detach the child with the given ID from `owner`.
pub(crate) fn detach<C: Component + ?Sized>(
    owner: &C,
    child_id: ObjectId,
) -> StructuralResult<Arc<dyn Component>> {
    let owner_id = owner.object_id();
    let composite = owner
        .composite()
        .ok_or(StructuralError::NotComposite { component: owner_id })?;

    let _guard = composite.mutation.lock();
    let _span = tracing::debug_span!(
        target: targets::COMPONENT,
        span_names::STRUCTURE,
        op = "detach",
        parent = %owner_id,
        child = %child_id
    )
    .entered();

    let child = composite
        .children()
        .iter()
        .find(|child| child.object_id() == child_id)
        .cloned()
        .ok_or(StructuralError::NotChild {
            parent: owner_id,
            child: child_id,
        })?;

    if let Some(store) = child.base().preference_store() {
        preferences::save_subtree(store.as_ref(), child.as_ref());
    }

    let subscriptions = composite.subscriptions.lock().remove(&child_id);
    drop(subscriptions);
    child.base().set_parent(None);
    composite.replace_children(|children| children.retain(|c| c.object_id() != child_id));

    owner.update_valid();
    tracing::debug!(target: targets::COMPONENT, parent = %owner_id, child = %child_id, "child removed");
    owner
        .base()
        .structure_changed
        .emit(StructureEvent::child_removed(owner_id, child_id));
    Ok(child)
}
