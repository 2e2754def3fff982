//! List control with a selection.

use std::collections::BTreeMap;
use std::sync::Arc;

use arbor_core::logging::targets;
use arbor_core::{Object, ObjectId};

use super::SELECTION_KEY;
use crate::component::{Component, ComponentBase, ComponentKind, ValueSource, install};
use crate::error::SelectionResult;
use crate::model::ListSelectModel;
use crate::preferences::PreferenceValue;

/// A leaf component displaying a [`ListSelectModel`].
///
/// The control is valid when the model's selected value passes the model's
/// validator. Changes of the selected value are repeated by the control.
pub struct ListControl<V> {
    base: ComponentBase,
    model: Arc<ListSelectModel<V>>,
}

impl<V> ListControl<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a control over `model`.
    pub fn new(model: Arc<ListSelectModel<V>>) -> Arc<Self> {
        install(Self {
            base: ComponentBase::new::<Self>(),
            model,
        })
    }

    /// The displayed model.
    pub fn model(&self) -> &Arc<ListSelectModel<V>> {
        &self.model
    }

    /// The selected indices.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.model.selected_indices()
    }

    /// Replace the selection, subject to the model's policy.
    pub fn set_selected_indices(&self, indices: &[usize]) -> SelectionResult<bool> {
        self.model.set_selected_indices(indices)
    }
}

impl<V: Send + Sync> Object for ListControl<V> {
    fn object_id(&self) -> ObjectId {
        self.base.id()
    }
}

impl<V> Component for ListControl<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::ListControl
    }

    fn value_source(&self) -> Option<&dyn ValueSource> {
        Some(self.model.as_ref())
    }

    fn export_preferences(&self) -> BTreeMap<String, PreferenceValue> {
        selection_preferences(&self.model)
    }

    fn import_preferences(&self, values: &BTreeMap<String, PreferenceValue>) {
        import_selection(self.base.id(), &self.model, values);
    }
}

pub(super) fn selection_preferences<V>(model: &ListSelectModel<V>) -> BTreeMap<String, PreferenceValue>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    let selected = model
        .selected_indices()
        .into_iter()
        .map(|index| PreferenceValue::Integer(index as i64))
        .collect();
    BTreeMap::from([(SELECTION_KEY.to_string(), PreferenceValue::Array(selected))])
}

pub(super) fn import_selection<V>(
    component: ObjectId,
    model: &ListSelectModel<V>,
    values: &BTreeMap<String, PreferenceValue>,
) where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    let Some(PreferenceValue::Array(stored)) = values.get(SELECTION_KEY) else {
        return;
    };
    let indices: Vec<usize> = stored
        .iter()
        .filter_map(PreferenceValue::as_i64)
        .filter_map(|index| usize::try_from(index).ok())
        .collect();
    if let Err(err) = model.set_selected_indices(&indices) {
        tracing::warn!(
            target: targets::PREFERENCES,
            %component,
            error = %err,
            "ignoring stored selection"
        );
    }
}
