//! List model with an index-based selection.
//!
//! [`ListSelectModel`] holds an ordered list of values (duplicates allowed)
//! and the set of selected indices. Which indices a request actually selects
//! is decided by the installed [`SelectionPolicy`]; the model then checks the
//! indices against the list and, if a validator is installed, validates the
//! resulting selected value.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arbor::model::{ListSelectModel, SingleSelect};
//!
//! let model = ListSelectModel::with_values(vec!["a", "b", "c"])
//!     .with_policy(Arc::new(SingleSelect));
//!
//! model.set_selected_indices(&[1]).unwrap();
//! // A single-select model refuses to add a second index.
//! assert_eq!(model.add_selected_indices(&[2]).unwrap(), false);
//! assert_eq!(model.selected_indices(), vec![1]);
//! assert_eq!(model.selected_value(), Some("b"));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use arbor_core::logging::targets;
use arbor_core::{Object, ObjectBase, ObjectId, Signal};
use parking_lot::RwLock;

use super::selection_policy::{SelectionMode, SelectionPolicy};
use super::value_model::SharedValidator;
use crate::error::{SelectionError, SelectionResult, ValidationError};
use crate::event::{PropertyChangeEvent, property};

/// A shared selection policy handle.
pub type SharedPolicy<V> = Arc<dyn SelectionPolicy<V>>;

/// How the list of values changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// A value was inserted at `index`.
    Inserted { index: usize },
    /// The value at `index` was removed.
    Removed { index: usize },
    /// The value at `index` was replaced.
    Replaced { index: usize },
    /// The whole list was cleared or replaced.
    Reset,
    /// An index was enabled or disabled for selection.
    EnabledChanged { index: usize, enabled: bool },
}

/// The list of a [`ListSelectModel`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListChangeEvent {
    pub source: ObjectId,
    pub change: ListChange,
}

/// The selected indices of a [`ListSelectModel`] changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChangeEvent {
    pub source: ObjectId,
    /// Indices that became selected.
    pub selected: Vec<usize>,
    /// Indices that are no longer selected.
    pub deselected: Vec<usize>,
}

/// An ordered list of values with a policy-controlled selection.
pub struct ListSelectModel<V> {
    base: ObjectBase,
    values: RwLock<Arc<Vec<V>>>,
    selection: RwLock<Arc<BTreeSet<usize>>>,
    disabled: RwLock<Arc<BTreeSet<usize>>>,
    policy: RwLock<SharedPolicy<V>>,
    validator: RwLock<Option<SharedValidator<V>>>,
    /// Fired after values are inserted, removed or replaced.
    pub list_changed: Signal<ListChangeEvent>,
    /// Fired after the selected indices change, with the difference.
    pub selection_changed: Signal<SelectionChangeEvent>,
    /// Fired after the selected value or the validator changes.
    pub property_changed: Signal<PropertyChangeEvent>,
}

impl<V> ListSelectModel<V> {
    /// The number of values.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// The selected indices in ascending order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selection.read().iter().copied().collect()
    }

    /// Whether `index` is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.read().contains(&index)
    }

    /// Whether any index is selected.
    pub fn has_selection(&self) -> bool {
        !self.selection.read().is_empty()
    }

    /// The lowest selected index.
    pub fn selected_index(&self) -> Option<usize> {
        self.selection.read().first().copied()
    }

    /// Whether `index` may be selected.
    pub fn is_index_enabled(&self, index: usize) -> bool {
        !self.disabled.read().contains(&index)
    }
}

impl<V> ListSelectModel<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create an empty model with the default single-select policy.
    pub fn new() -> Self {
        Self::with_values(Vec::new())
    }

    /// Create a model over `values` with the default single-select policy.
    pub fn with_values(values: Vec<V>) -> Self {
        Self {
            base: ObjectBase::new::<Self>(),
            values: RwLock::new(Arc::new(values)),
            selection: RwLock::new(Arc::new(BTreeSet::new())),
            disabled: RwLock::new(Arc::new(BTreeSet::new())),
            policy: RwLock::new(SelectionMode::default().policy()),
            validator: RwLock::new(None),
            list_changed: Signal::new(),
            selection_changed: Signal::new(),
            property_changed: Signal::new(),
        }
    }

    /// Install a selection policy at construction time.
    pub fn with_policy(self, policy: SharedPolicy<V>) -> Self {
        *self.policy.write() = policy;
        self
    }

    /// Install a validator for the selected value at construction time.
    pub fn with_validator(self, validator: SharedValidator<V>) -> Self {
        *self.validator.write() = Some(validator);
        self
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// The value at `index`.
    pub fn get(&self, index: usize) -> Option<V> {
        self.values.read().get(index).cloned()
    }

    /// A snapshot of the values.
    ///
    /// The snapshot is unaffected by later mutations of the model.
    pub fn values(&self) -> Arc<Vec<V>> {
        self.values.read().clone()
    }

    /// Append a value.
    pub fn push(&self, value: V) {
        let result = self.mutate_list(|values| {
            let index = values.len();
            values.push(value);
            Ok((ListChange::Inserted { index }, None::<fn(usize) -> Option<usize>>))
        });
        debug_assert!(result.is_ok());
    }

    /// Insert a value, shifting later selected indices up by one.
    pub fn insert(&self, index: usize, value: V) -> SelectionResult<()> {
        self.mutate_list(|values| {
            if index > values.len() {
                return Err(SelectionError::IndexOutOfBounds {
                    index,
                    len: values.len(),
                });
            }
            values.insert(index, value);
            let remap = move |i: usize| Some(if i >= index { i + 1 } else { i });
            Ok((ListChange::Inserted { index }, Some(remap)))
        })
    }

    /// Remove and return the value at `index`, dropping it from the selection.
    pub fn remove(&self, index: usize) -> SelectionResult<V> {
        let mut removed = None;
        self.mutate_list(|values| {
            if index >= values.len() {
                return Err(SelectionError::IndexOutOfBounds {
                    index,
                    len: values.len(),
                });
            }
            removed = Some(values.remove(index));
            let remap = move |i: usize| match i {
                i if i == index => None,
                i if i > index => Some(i - 1),
                i => Some(i),
            };
            Ok((ListChange::Removed { index }, Some(remap)))
        })?;
        removed.ok_or(SelectionError::IndexOutOfBounds { index, len: 0 })
    }

    /// Replace the value at `index`, keeping the selection.
    pub fn set(&self, index: usize, value: V) -> SelectionResult<V> {
        let mut replaced = None;
        self.mutate_list(|values| {
            let len = values.len();
            let slot = values
                .get_mut(index)
                .ok_or(SelectionError::IndexOutOfBounds { index, len })?;
            replaced = Some(std::mem::replace(slot, value));
            Ok((ListChange::Replaced { index }, None::<fn(usize) -> Option<usize>>))
        })?;
        replaced.ok_or(SelectionError::IndexOutOfBounds { index, len: 0 })
    }

    /// Remove every value and the selection.
    pub fn clear(&self) {
        self.replace_all(Vec::new());
    }

    /// Replace every value, clearing the selection.
    pub fn replace_all(&self, values: Vec<V>) {
        let result = self.mutate_list(|current| {
            *current = values;
            Ok((ListChange::Reset, Some(|_: usize| -> Option<usize> { None })))
        });
        debug_assert!(result.is_ok());
    }

    /// Apply a list mutation, remapping selected and disabled indices.
    ///
    /// `mutate` runs under the write lock and returns the change it made
    /// plus the index remapping to apply, or `None` if indices are
    /// unaffected.
    fn mutate_list<F, M>(&self, mutate: F) -> SelectionResult<()>
    where
        F: FnOnce(&mut Vec<V>) -> SelectionResult<(ListChange, Option<M>)>,
        M: Fn(usize) -> Option<usize>,
    {
        let old_value = self.selected_value();
        let (change, old_selection, new_selection) = {
            let mut values = self.values.write();
            let mut list = (**values).clone();
            let (change, remap) = mutate(&mut list)?;
            *values = Arc::new(list);

            let mut selection = self.selection.write();
            let old_selection = selection.clone();
            if let Some(remap) = remap {
                *selection = Arc::new(old_selection.iter().filter_map(|&i| remap(i)).collect());
                let mut disabled = self.disabled.write();
                let remapped: BTreeSet<usize> = disabled.iter().filter_map(|&i| remap(i)).collect();
                *disabled = Arc::new(remapped);
            }
            (change, old_selection, selection.clone())
        };

        tracing::trace!(target: targets::MODEL, model = %self.base.id(), ?change, "list changed");
        self.list_changed.emit(ListChangeEvent {
            source: self.base.id(),
            change,
        });
        self.announce_selection(&old_selection, &new_selection, old_value);
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The installed selection policy.
    pub fn policy(&self) -> SharedPolicy<V> {
        self.policy.read().clone()
    }

    /// Replace the selection policy.
    ///
    /// The current selection is kept; the new policy applies to later
    /// requests.
    pub fn set_policy(&self, policy: SharedPolicy<V>) {
        *self.policy.write() = policy;
    }

    /// The value at the lowest selected index.
    pub fn selected_value(&self) -> Option<V> {
        let index = self.selected_index()?;
        self.get(index)
    }

    /// The values at every selected index, in index order.
    pub fn selected_values(&self) -> Vec<V> {
        let values = self.values();
        self.selection
            .read()
            .iter()
            .filter_map(|&i| values.get(i).cloned())
            .collect()
    }

    /// Replace the selection with the indices the policy allows.
    ///
    /// Returns whether the selection changed.
    #[tracing::instrument(skip_all, target = "arbor::model", level = "trace")]
    pub fn set_selected_indices(&self, indices: &[usize]) -> SelectionResult<bool> {
        let requested = self.enabled_only(indices);
        let allowed = self.policy().filter_for_set(self, &requested);
        self.check_range(&allowed)?;
        self.commit_selection(allowed.into_iter().collect())
    }

    /// Add the indices the policy allows to the selection.
    ///
    /// Returns whether the selection changed.
    #[tracing::instrument(skip_all, target = "arbor::model", level = "trace")]
    pub fn add_selected_indices(&self, indices: &[usize]) -> SelectionResult<bool> {
        let requested = self.enabled_only(indices);
        let allowed = self.policy().filter_for_add(self, &requested);
        self.check_range(&allowed)?;
        let mut selection = (**self.selection.read()).clone();
        selection.extend(allowed);
        self.commit_selection(selection)
    }

    /// Remove the indices the policy allows from the selection.
    ///
    /// Returns whether the selection changed.
    #[tracing::instrument(skip_all, target = "arbor::model", level = "trace")]
    pub fn remove_selected_indices(&self, indices: &[usize]) -> SelectionResult<bool> {
        let allowed = self.policy().filter_for_remove(self, indices);
        self.check_range(&allowed)?;
        let mut selection = (**self.selection.read()).clone();
        for index in allowed {
            selection.remove(&index);
        }
        self.commit_selection(selection)
    }

    /// Deselect everything, subject to the validator.
    pub fn clear_selection(&self) -> SelectionResult<bool> {
        self.commit_selection(BTreeSet::new())
    }

    /// Deselect everything without validation.
    pub fn reset_selection(&self) {
        let old_value = self.selected_value();
        let old = std::mem::take(&mut *self.selection.write());
        self.announce_selection(&old, &BTreeSet::new(), old_value);
    }

    /// Allow or forbid selecting `index`.
    ///
    /// Disabling an index does not deselect it.
    pub fn set_index_enabled(&self, index: usize, enabled: bool) -> SelectionResult<()> {
        let len = self.len();
        if index >= len {
            return Err(SelectionError::IndexOutOfBounds { index, len });
        }
        let changed = {
            let mut disabled = self.disabled.write();
            let mut set = (**disabled).clone();
            let changed = if enabled {
                set.remove(&index)
            } else {
                set.insert(index)
            };
            *disabled = Arc::new(set);
            changed
        };
        if changed {
            self.list_changed.emit(ListChangeEvent {
                source: self.base.id(),
                change: ListChange::EnabledChanged { index, enabled },
            });
        }
        Ok(())
    }

    fn enabled_only(&self, indices: &[usize]) -> Vec<usize> {
        let disabled = self.disabled.read().clone();
        indices
            .iter()
            .copied()
            .filter(|index| !disabled.contains(index))
            .collect()
    }

    fn check_range(&self, indices: &[usize]) -> SelectionResult<()> {
        let len = self.len();
        match indices.iter().find(|&&index| index >= len) {
            Some(&index) => Err(SelectionError::IndexOutOfBounds { index, len }),
            None => Ok(()),
        }
    }

    fn commit_selection(&self, selection: BTreeSet<usize>) -> SelectionResult<bool> {
        let old_value = self.selected_value();
        if let Some(validator) = self.validator() {
            let new_value = selection.first().and_then(|&i| self.get(i));
            validator.validate(&new_value)?;
        }

        let old = {
            let mut current = self.selection.write();
            if **current == selection {
                return Ok(false);
            }
            std::mem::replace(&mut *current, Arc::new(selection.clone()))
        };
        self.announce_selection(&old, &selection, old_value);
        Ok(true)
    }

    fn announce_selection(&self, old: &BTreeSet<usize>, new: &BTreeSet<usize>, old_value: Option<V>) {
        let selected: Vec<usize> = new.difference(old).copied().collect();
        let deselected: Vec<usize> = old.difference(new).copied().collect();
        if !selected.is_empty() || !deselected.is_empty() {
            tracing::trace!(
                target: targets::MODEL,
                model = %self.base.id(),
                ?selected,
                ?deselected,
                "selection changed"
            );
            self.selection_changed.emit(SelectionChangeEvent {
                source: self.base.id(),
                selected,
                deselected,
            });
        }

        let new_value = self.selected_value();
        if new_value != old_value {
            self.property_changed.emit(PropertyChangeEvent::with_values(
                self.base.id(),
                property::VALUE,
                old_value,
                new_value,
            ));
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// The validator applied to the selected value.
    pub fn validator(&self) -> Option<SharedValidator<V>> {
        self.validator.read().clone()
    }

    /// Replace the validator, firing a `"validator"` change.
    pub fn set_validator(&self, validator: Option<SharedValidator<V>>) {
        *self.validator.write() = validator;
        self.property_changed
            .emit(PropertyChangeEvent::new(self.base.id(), property::VALIDATOR));
    }

    /// Whether the selected value passes the validator.
    pub fn is_valid_value(&self) -> bool {
        self.validate_value().is_ok()
    }

    /// Check the selected value against the validator.
    pub fn validate_value(&self) -> Result<(), ValidationError> {
        match self.validator() {
            Some(validator) => validator.validate(&self.selected_value()),
            None => Ok(()),
        }
    }
}

impl<V> Default for ListSelectModel<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Send + Sync> Object for ListSelectModel<V> {
    fn object_id(&self) -> ObjectId {
        self.base.id()
    }
}

impl<V: fmt::Debug> fmt::Debug for ListSelectModel<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListSelectModel")
            .field("id", &self.base.id())
            .field("values", &**self.values.read())
            .field("selection", &**self.selection.read())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(ListSelectModel<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SingleSelect, Unrestricted};
    use crate::validator::RequiredValidator;
    use parking_lot::Mutex;

    fn multi(values: Vec<&'static str>) -> ListSelectModel<&'static str> {
        ListSelectModel::with_values(values).with_policy(Arc::new(Unrestricted))
    }

    #[test]
    fn test_single_select_add_is_refused() {
        let model = ListSelectModel::with_values(vec!["a", "b", "c"]).with_policy(Arc::new(SingleSelect));
        assert!(model.set_selected_indices(&[1]).unwrap());
        assert!(!model.add_selected_indices(&[2]).unwrap());
        assert_eq!(model.selected_indices(), vec![1]);
    }

    #[test]
    fn test_out_of_range_leaves_selection() {
        let model = multi(vec!["a", "b"]);
        model.set_selected_indices(&[0]).unwrap();

        let err = model.set_selected_indices(&[1, 5]).unwrap_err();
        assert_eq!(err, SelectionError::IndexOutOfBounds { index: 5, len: 2 });
        assert_eq!(model.selected_indices(), vec![0]);
    }

    #[test]
    fn test_single_select_filters_before_range_check() {
        let model = ListSelectModel::with_values(vec!["a", "b"]).with_policy(Arc::new(SingleSelect));
        assert!(model.set_selected_indices(&[1, 99]).unwrap());
        assert_eq!(model.selected_indices(), vec![1]);
    }

    #[test]
    fn test_duplicates_select_by_index() {
        let model = multi(vec!["x", "x", "y"]);
        model.set_selected_indices(&[1]).unwrap();
        assert!(!model.is_selected(0));
        assert!(model.is_selected(1));
        assert_eq!(model.selected_value(), Some("x"));
    }

    #[test]
    fn test_selection_changed_reports_difference() {
        let model = multi(vec!["a", "b", "c"]);
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        model.selection_changed.connect(move |event| {
            events_clone.lock().push((event.selected.clone(), event.deselected.clone()));
        });

        model.set_selected_indices(&[0, 1]).unwrap();
        model.set_selected_indices(&[1, 2]).unwrap();
        model.remove_selected_indices(&[1]).unwrap();

        assert_eq!(
            *events.lock(),
            vec![
                (vec![0, 1], vec![]),
                (vec![2], vec![0]),
                (vec![], vec![1]),
            ]
        );
    }

    #[test]
    fn test_value_change_follows_lead_index() {
        let model = multi(vec!["a", "b", "c"]);
        let values = Arc::new(Mutex::new(Vec::new()));
        let values_clone = values.clone();
        model.property_changed.connect(move |event| {
            if let Some(value) = event.new_value::<Option<&'static str>>() {
                values_clone.lock().push(*value);
            }
        });

        model.set_selected_indices(&[2]).unwrap();
        model.add_selected_indices(&[1]).unwrap();
        // The lead stays at index 1.
        model.add_selected_indices(&[2]).unwrap();
        model.clear_selection().unwrap();

        assert_eq!(*values.lock(), vec![Some("c"), Some("b"), None]);
    }

    #[test]
    fn test_disabled_indices_are_not_selected() {
        let model = multi(vec!["a", "b", "c"]);
        model.set_index_enabled(1, false).unwrap();

        model.set_selected_indices(&[0, 1, 2]).unwrap();
        assert_eq!(model.selected_indices(), vec![0, 2]);
        assert!(!model.is_index_enabled(1));
        assert!(model.set_index_enabled(9, false).is_err());
    }

    #[test]
    fn test_validator_rejects_empty_selection() {
        let model = multi(vec!["a", "b"]).with_validator(Arc::new(RequiredValidator));
        assert!(!model.is_valid_value());

        model.set_selected_indices(&[0]).unwrap();
        assert!(model.is_valid_value());

        let err = model.clear_selection().unwrap_err();
        assert!(matches!(err, SelectionError::Validation(_)));
        assert_eq!(model.selected_indices(), vec![0]);

        model.reset_selection();
        assert!(!model.has_selection());
    }

    #[test]
    fn test_insert_and_remove_shift_selection() {
        let model = multi(vec!["a", "b", "c"]);
        model.set_selected_indices(&[1, 2]).unwrap();

        model.insert(0, "z").unwrap();
        assert_eq!(model.selected_indices(), vec![2, 3]);
        assert_eq!(model.selected_value(), Some("b"));

        assert_eq!(model.remove(2).unwrap(), "b");
        assert_eq!(model.selected_indices(), vec![2]);
        assert_eq!(model.selected_value(), Some("c"));

        assert!(model.insert(10, "q").is_err());
        assert!(model.remove(10).is_err());
    }

    #[test]
    fn test_push_appends_and_keeps_selection() {
        let model = multi(vec!["a", "b"]);
        model.set_selected_indices(&[1]).unwrap();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        model.list_changed.connect(move |event| changes_clone.lock().push(event.change));

        model.push("c");
        model.push("d");
        assert_eq!(*model.values(), vec!["a", "b", "c", "d"]);
        assert_eq!(model.selected_indices(), vec![1]);
        assert_eq!(
            *changes.lock(),
            vec![
                ListChange::Inserted { index: 2 },
                ListChange::Inserted { index: 3 },
            ]
        );
    }

    #[test]
    fn test_set_replaces_value_and_fires() {
        let model = multi(vec!["a", "b"]);
        model.set_selected_indices(&[0]).unwrap();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        model.list_changed.connect(move |event| changes_clone.lock().push(event.change));

        assert_eq!(model.set(0, "A").unwrap(), "a");
        assert_eq!(model.selected_value(), Some("A"));
        assert_eq!(*changes.lock(), vec![ListChange::Replaced { index: 0 }]);
    }

    #[test]
    fn test_replace_all_clears_selection() {
        let model = multi(vec!["a", "b"]);
        model.set_selected_indices(&[0, 1]).unwrap();
        let snapshot = model.values();

        model.replace_all(vec!["c"]);
        assert!(!model.has_selection());
        assert_eq!(model.len(), 1);
        assert_eq!(*snapshot, vec!["a", "b"]);

        model.clear();
        assert!(model.is_empty());
    }
}
