//! Single-value control.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use arbor_core::logging::targets;
use arbor_core::{Object, ObjectId};

use super::VALUE_KEY;
use crate::component::{Component, ComponentBase, ValidatedValue, ValueSource, install};
use crate::converter::Converter;
use crate::error::ValidationError;
use crate::model::ValueModel;
use crate::preferences::PreferenceValue;

/// A leaf component displaying one [`ValueModel`].
///
/// Value and validator changes of the model are repeated by the control, so
/// listeners on the control see them with the control as source and the
/// model as target. With a converter, the control accepts literal input
/// that is committed on [`validate`](Component::validate).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arbor::component::{Component, ValueControl};
/// use arbor::converter::ParseConverter;
/// use arbor::model::ValueModel;
///
/// let port = ValueControl::with_converter(
///     Arc::new(ValueModel::new(Some(80_u16))),
///     Arc::new(ParseConverter::new()),
/// );
///
/// port.set_literal(Some("8080".into()));
/// assert!(port.validate());
/// assert_eq!(port.value(), Some(8080));
///
/// port.set_literal(Some("http".into()));
/// assert!(!port.validate());
/// assert!(port.base().notification().is_some());
/// ```
pub struct ValueControl<V> {
    base: ComponentBase,
    value: ValidatedValue<V>,
}

impl<V> ValueControl<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a control over `model`.
    pub fn new(model: Arc<ValueModel<V>>) -> Arc<Self> {
        install(Self {
            base: ComponentBase::new::<Self>(),
            value: ValidatedValue::new(model),
        })
    }

    /// Create a control over `model` that accepts literal input.
    pub fn with_converter(model: Arc<ValueModel<V>>, converter: Arc<dyn Converter<V>>) -> Arc<Self> {
        install(Self {
            base: ComponentBase::new::<Self>(),
            value: ValidatedValue::with_converter(model, converter),
        })
    }

    /// The displayed model.
    pub fn model(&self) -> &Arc<ValueModel<V>> {
        self.value.model()
    }

    /// The committed value.
    pub fn value(&self) -> Option<V> {
        self.value.value()
    }

    /// Set the model's value.
    ///
    /// Validation and veto failures are returned; use
    /// [`validate`](Component::validate) to turn them into notifications.
    pub fn set_value(&self, value: Option<V>) -> Result<(), ValidationError> {
        if self.value.set_value(value)? {
            self.update_valid();
        }
        Ok(())
    }

    /// The pending literal or the rendered value.
    pub fn literal(&self) -> Option<String> {
        self.value.literal()
    }

    /// Record literal input from the client.
    ///
    /// The literal is committed to the model on the next `validate()`; until
    /// then it already decides the control's validity.
    pub fn set_literal(&self, literal: Option<String>) {
        self.value.set_literal(literal);
        self.update_valid();
    }
}

impl<V> Object for ValueControl<V>
where
    V: Send + Sync,
{
    fn object_id(&self) -> ObjectId {
        self.base.id()
    }
}

impl<V> Component for ValueControl<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn value_source(&self) -> Option<&dyn ValueSource> {
        Some(&self.value)
    }

    fn export_preferences(&self) -> BTreeMap<String, PreferenceValue> {
        let mut values = BTreeMap::new();
        if self.value.converter().is_some()
            && let Some(literal) = self.value.literal()
        {
            values.insert(VALUE_KEY.to_string(), PreferenceValue::String(literal));
        }
        values
    }

    fn import_preferences(&self, values: &BTreeMap<String, PreferenceValue>) {
        let Some(literal) = values.get(VALUE_KEY).and_then(PreferenceValue::as_str) else {
            return;
        };
        self.value.set_literal(Some(literal.to_string()));
        if let Err(err) = self.value.commit() {
            tracing::warn!(
                target: targets::PREFERENCES,
                component = %self.base.id(),
                error = %err,
                "ignoring stored value"
            );
            self.value.set_literal(None);
        }
        self.update_valid();
    }
}

impl<V: fmt::Debug> fmt::Debug for ValueControl<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueControl")
            .field("base", &self.base)
            .field("value", &self.value)
            .finish()
    }
}
