//! Selection policies.
//!
//! A policy decides which of the requested indices a
//! [`ListSelectModel`](super::ListSelectModel) actually selects. Policies are
//! pure: they inspect the model but never change it. Range checking happens
//! in the model after the policy has filtered the request.

use std::fmt;

use super::ListSelectModel;

/// Strategy deciding which requested indices may be selected.
pub trait SelectionPolicy<V>: Send + Sync {
    /// Filter indices that are to replace the current selection.
    fn filter_for_set(&self, model: &ListSelectModel<V>, requested: &[usize]) -> Vec<usize>;

    /// Filter indices that are to be added to the current selection.
    fn filter_for_add(&self, model: &ListSelectModel<V>, requested: &[usize]) -> Vec<usize>;

    /// Filter indices that are to be removed from the current selection.
    fn filter_for_remove(&self, model: &ListSelectModel<V>, requested: &[usize]) -> Vec<usize>;
}

/// Allows any combination of indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl<V> SelectionPolicy<V> for Unrestricted {
    fn filter_for_set(&self, _model: &ListSelectModel<V>, requested: &[usize]) -> Vec<usize> {
        requested.to_vec()
    }

    fn filter_for_add(&self, _model: &ListSelectModel<V>, requested: &[usize]) -> Vec<usize> {
        requested.to_vec()
    }

    fn filter_for_remove(&self, _model: &ListSelectModel<V>, requested: &[usize]) -> Vec<usize> {
        requested.to_vec()
    }
}

/// Allows at most one selected index.
///
/// Setting several indices keeps the first one requested. Adding to a model
/// that already has a selection does nothing; to move the selection, set it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleSelect;

impl<V> SelectionPolicy<V> for SingleSelect {
    fn filter_for_set(&self, _model: &ListSelectModel<V>, requested: &[usize]) -> Vec<usize> {
        requested.first().copied().into_iter().collect()
    }

    fn filter_for_add(&self, model: &ListSelectModel<V>, requested: &[usize]) -> Vec<usize> {
        if model.has_selection() {
            Vec::new()
        } else {
            requested.first().copied().into_iter().collect()
        }
    }

    fn filter_for_remove(&self, _model: &ListSelectModel<V>, requested: &[usize]) -> Vec<usize> {
        requested.to_vec()
    }
}

/// Allows no selection at all. Existing selections may still be removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelection;

impl<V> SelectionPolicy<V> for NoSelection {
    fn filter_for_set(&self, _model: &ListSelectModel<V>, _requested: &[usize]) -> Vec<usize> {
        Vec::new()
    }

    fn filter_for_add(&self, _model: &ListSelectModel<V>, _requested: &[usize]) -> Vec<usize> {
        Vec::new()
    }

    fn filter_for_remove(&self, _model: &ListSelectModel<V>, requested: &[usize]) -> Vec<usize> {
        requested.to_vec()
    }
}

/// The built-in policies, for configuration and debug output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionMode {
    /// [`NoSelection`].
    None,
    /// [`SingleSelect`].
    #[default]
    Single,
    /// [`Unrestricted`].
    Multi,
}

impl SelectionMode {
    /// The policy implementing this mode.
    pub fn policy<V>(self) -> std::sync::Arc<dyn SelectionPolicy<V>> {
        match self {
            Self::None => std::sync::Arc::new(NoSelection),
            Self::Single => std::sync::Arc::new(SingleSelect),
            Self::Multi => std::sync::Arc::new(Unrestricted),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Single => f.write_str("single"),
            Self::Multi => f.write_str("multi"),
        }
    }
}
