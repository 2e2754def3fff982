//! Mutual exclusion across boolean value models.
//!
//! A [`MutualExclusionGroup`] is a non-visual collection of boolean
//! [`ValueModel`]s. Whenever a member is set to `true`, every other member is
//! set to `false`. Setting a member to `false` never affects the others, so
//! the group allows "nothing selected" but never "two selected".
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arbor::model::{MutualExclusionGroup, ValueModel};
//!
//! let small = Arc::new(ValueModel::new(Some(true)));
//! let large = Arc::new(ValueModel::new(Some(false)));
//!
//! let group = MutualExclusionGroup::new();
//! group.add(small.clone());
//! group.add(large.clone());
//!
//! large.set_value(Some(true)).unwrap();
//! assert_eq!(small.value(), Some(false));
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use arbor_core::logging::targets;
use arbor_core::{Object, ObjectId, Signal, Subscription};
use parking_lot::RwLock;

use super::ValueModel;
use crate::event::property;

struct Member {
    model: Arc<ValueModel<bool>>,
    _subscription: Subscription,
}

struct GroupInner {
    members: RwLock<Vec<Member>>,
    /// Emitted with the member that was set to `true`, after the others
    /// have been reset.
    selected: Signal<ObjectId>,
}

impl GroupInner {
    fn exclude_others(&self, winner: ObjectId) {
        let others: Vec<Arc<ValueModel<bool>>> = self
            .members
            .read()
            .iter()
            .filter(|member| member.model.object_id() != winner)
            .map(|member| member.model.clone())
            .collect();

        for model in others {
            if let Err(err) = model.set_value(Some(false)) {
                tracing::error!(
                    target: targets::MODEL,
                    member = %model.object_id(),
                    %winner,
                    error = %err,
                    "group member rejected forced reset"
                );
                panic!(
                    "mutual exclusion member {} rejected forced reset: {err}",
                    model.object_id()
                );
            }
        }
        self.selected.emit(winner);
    }
}

/// Keeps at most one of its boolean models `true`.
///
/// The group holds its members strongly; a member stays in the group until
/// it is removed or the group is dropped. A member that rejects being reset
/// to `false` is a programming error and panics.
#[derive(Clone)]
pub struct MutualExclusionGroup {
    inner: Arc<GroupInner>,
}

impl MutualExclusionGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GroupInner {
                members: RwLock::new(Vec::new()),
                selected: Signal::new(),
            }),
        }
    }

    /// Signal emitted with the member that was set to `true`.
    pub fn selected(&self) -> &Signal<ObjectId> {
        &self.inner.selected
    }

    /// Add a model to the group.
    ///
    /// Returns `false` if it was already a member. Adding a model does not
    /// change any member's value.
    pub fn add(&self, model: Arc<ValueModel<bool>>) -> bool {
        if self.contains(model.object_id()) {
            return false;
        }

        let group: Weak<GroupInner> = Arc::downgrade(&self.inner);
        let subscription = model.property_changed.subscribe(move |event| {
            if !event.is(property::VALUE) || event.new_value::<Option<bool>>() != Some(&Some(true)) {
                return;
            }
            if let Some(group) = group.upgrade() {
                group.exclude_others(event.target());
            }
        });

        tracing::trace!(target: targets::MODEL, member = %model.object_id(), "joined exclusion group");
        self.inner.members.write().push(Member {
            model,
            _subscription: subscription,
        });
        true
    }

    /// Remove a model from the group, returning it if it was a member.
    pub fn remove(&self, id: ObjectId) -> Option<Arc<ValueModel<bool>>> {
        let mut members = self.inner.members.write();
        let position = members.iter().position(|member| member.model.object_id() == id)?;
        Some(members.remove(position).model)
    }

    /// Whether a model is a member.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.inner
            .members
            .read()
            .iter()
            .any(|member| member.model.object_id() == id)
    }

    /// The members in the order they were added.
    pub fn members(&self) -> Vec<Arc<ValueModel<bool>>> {
        self.inner
            .members
            .read()
            .iter()
            .map(|member| member.model.clone())
            .collect()
    }

    /// The member currently set to `true`, if any.
    pub fn selected_member(&self) -> Option<Arc<ValueModel<bool>>> {
        self.inner
            .members
            .read()
            .iter()
            .find(|member| member.model.value() == Some(true))
            .map(|member| member.model.clone())
    }

    /// The number of members.
    pub fn len(&self) -> usize {
        self.inner.members.read().len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.inner.members.read().is_empty()
    }
}

impl Default for MutualExclusionGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MutualExclusionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<ObjectId> = self
            .inner
            .members
            .read()
            .iter()
            .map(|member| member.model.object_id())
            .collect();
        f.debug_struct("MutualExclusionGroup")
            .field("members", &ids)
            .finish()
    }
}

static_assertions::assert_impl_all!(MutualExclusionGroup: Send, Sync);
