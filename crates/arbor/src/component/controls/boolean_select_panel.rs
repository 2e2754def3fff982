//! Checkbox panel mirroring a list selection.

use std::collections::BTreeMap;
use std::sync::Arc;

use arbor_core::logging::targets;
use arbor_core::{Object, ObjectId, Subscription, SyncGuard};
use parking_lot::{Mutex, RwLock};

use super::ValueControl;
use super::list_control::{import_selection, selection_preferences};
use crate::component::{
    Component, ComponentBase, ComponentKind, CompositeBase, ValueSource, install,
};
use crate::event::property;
use crate::model::{ListChange, ListChangeEvent, ListSelectModel, ValueModel};
use crate::preferences::PreferenceValue;

/// A composite with one boolean [`ValueControl`] per list value.
///
/// Each child is `true` exactly when its index is selected. Selecting in the
/// model updates the children; setting a child `true` adds its index to the
/// selection (or, if the policy refuses the addition, replaces the
/// selection with it), and setting it `false` removes the index. Both
/// directions go through one [`SyncGuard`], so the echo of an update never
/// feeds back into the side it came from. When the model rejects a child's
/// change, the children are restored from the model.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arbor::component::BooleanSelectPanel;
/// use arbor::model::{ListSelectModel, SingleSelect};
///
/// let model = Arc::new(
///     ListSelectModel::with_values(vec!["red", "green", "blue"]).with_policy(Arc::new(SingleSelect)),
/// );
/// let panel = BooleanSelectPanel::new(model.clone());
///
/// panel.control(2).unwrap().set_value(Some(true)).unwrap();
/// assert_eq!(model.selected_indices(), vec![2]);
///
/// model.set_selected_indices(&[0]).unwrap();
/// assert_eq!(panel.control(0).unwrap().value(), Some(true));
/// assert_eq!(panel.control(2).unwrap().value(), Some(false));
/// ```
pub struct BooleanSelectPanel<V> {
    base: ComponentBase,
    composite: CompositeBase,
    model: Arc<ListSelectModel<V>>,
    controls: RwLock<Vec<(Arc<ValueControl<bool>>, Subscription)>>,
    model_subscriptions: Mutex<Vec<Subscription>>,
    sync: SyncGuard,
}

impl<V> BooleanSelectPanel<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a panel over `model` with one child per value.
    pub fn new(model: Arc<ListSelectModel<V>>) -> Arc<Self> {
        let panel = install(Self {
            base: ComponentBase::new::<Self>(),
            composite: CompositeBase::new(),
            model,
            controls: RwLock::new(Vec::new()),
            model_subscriptions: Mutex::new(Vec::new()),
            sync: SyncGuard::new(),
        });

        let weak = Arc::downgrade(&panel);
        let selection = panel.model.selection_changed.subscribe({
            let weak = weak.clone();
            move |_| {
                if let Some(panel) = weak.upgrade() {
                    panel.sync_from_model();
                }
            }
        });
        let list = panel.model.list_changed.subscribe(move |event: &ListChangeEvent| {
            let Some(panel) = weak.upgrade() else {
                return;
            };
            match event.change {
                ListChange::EnabledChanged { index, enabled } => {
                    if let Some(control) = panel.control(index) {
                        control.base().set_enabled(enabled);
                    }
                }
                _ => panel.rebuild_controls(),
            }
        });
        *panel.model_subscriptions.lock() = vec![selection, list];

        panel.rebuild_controls();
        panel
    }

    /// The mirrored model.
    pub fn model(&self) -> &Arc<ListSelectModel<V>> {
        &self.model
    }

    /// The child control for `index`.
    pub fn control(&self, index: usize) -> Option<Arc<ValueControl<bool>>> {
        self.controls
            .read()
            .get(index)
            .map(|(control, _)| control.clone())
    }

    /// The number of child controls.
    pub fn control_count(&self) -> usize {
        self.controls.read().len()
    }

    fn controls_snapshot(&self) -> Vec<Arc<ValueControl<bool>>> {
        self.controls
            .read()
            .iter()
            .map(|(control, _)| control.clone())
            .collect()
    }

    /// Replace every child control with fresh ones for the current values.
    fn rebuild_controls(self: &Arc<Self>) {
        let previous = std::mem::take(&mut *self.controls.write());
        for (control, subscription) in previous {
            drop(subscription);
            if let Err(err) = self.remove_child(control.object_id()) {
                tracing::warn!(target: targets::COMPONENT, panel = %self.base.id(), error = %err, "failed to detach option");
            }
        }

        let mut controls = Vec::with_capacity(self.model.len());
        for index in 0..self.model.len() {
            let model = ValueModel::new(Some(false));
            // A fresh model has no validator or veto listeners.
            let _ = model.set_value(Some(self.model.is_selected(index)));
            let control = ValueControl::new(Arc::new(model));
            control.base().set_name(format!("option{index}"));
            control.base().set_enabled(self.model.is_index_enabled(index));

            let weak = Arc::downgrade(self);
            let subscription = control.model().property_changed.subscribe(move |event| {
                if !event.is(property::VALUE) {
                    return;
                }
                let Some(&Some(checked)) = event.new_value::<Option<bool>>() else {
                    return;
                };
                if let Some(panel) = weak.upgrade() {
                    panel.on_control_changed(index, checked);
                }
            });

            if let Err(err) = self.add_child(control.clone()) {
                tracing::warn!(target: targets::COMPONENT, panel = %self.base.id(), error = %err, "failed to attach option");
            }
            controls.push((control, subscription));
        }
        *self.controls.write() = controls;
        tracing::debug!(target: targets::COMPONENT, panel = %self.base.id(), options = self.model.len(), "rebuilt options");
    }

    fn on_control_changed(&self, index: usize, checked: bool) {
        let Some(_token) = self.sync.try_enter() else {
            return;
        };

        let result = if checked {
            self.model.add_selected_indices(&[index]).and_then(|changed| {
                if self.model.is_selected(index) {
                    Ok(changed)
                } else {
                    self.model.set_selected_indices(&[index])
                }
            })
        } else {
            self.model.remove_selected_indices(&[index])
        };
        if let Err(err) = result {
            tracing::debug!(
                target: targets::COMPONENT,
                panel = %self.base.id(),
                index,
                error = %err,
                "selection rejected option change"
            );
        }
        self.write_controls();
    }

    fn sync_from_model(&self) {
        let Some(_token) = self.sync.try_enter() else {
            return;
        };
        self.write_controls();
    }

    /// Set every child from the model. Must run inside a sync pass.
    fn write_controls(&self) {
        for (index, control) in self.controls_snapshot().into_iter().enumerate() {
            let selected = Some(self.model.is_selected(index));
            if control.value() == selected {
                continue;
            }
            if let Err(err) = control.set_value(selected) {
                tracing::warn!(
                    target: targets::COMPONENT,
                    panel = %self.base.id(),
                    index,
                    error = %err,
                    "option rejected selection state"
                );
            }
        }
    }
}

impl<V: Send + Sync> Object for BooleanSelectPanel<V> {
    fn object_id(&self) -> ObjectId {
        self.base.id()
    }
}

impl<V> Component for BooleanSelectPanel<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::SelectPanel
    }

    fn composite(&self) -> Option<&CompositeBase> {
        Some(&self.composite)
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
