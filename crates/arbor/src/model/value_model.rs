//! Single-value model.

use std::fmt;
use std::sync::Arc;

use arbor_core::logging::targets;
use arbor_core::{Object, ObjectBase, ObjectId, Signal, VetoSignal};
use parking_lot::RwLock;

use crate::error::ValidationError;
use crate::event::{PropertyChangeEvent, property};
use crate::validator::Validator;

/// A shared validator handle.
pub type SharedValidator<V> = Arc<dyn Validator<V>>;

/// Holds one optional value, its default and an optional validator.
///
/// `set_value` runs the validator first, then asks veto listeners, and fires
/// a `"value"` change only if the value actually changed. The change event
/// carries the old and new values as `Option<V>`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arbor::model::ValueModel;
/// use arbor::validator::RangeValidator;
///
/// let age = ValueModel::new(Some(18)).with_validator(Arc::new(RangeValidator::<i32>::new(0, 150)));
/// assert!(age.set_value(Some(200)).is_err());
/// assert_eq!(age.value(), Some(18));
///
/// age.set_value(Some(42)).unwrap();
/// age.reset_value();
/// assert_eq!(age.value(), Some(18));
/// ```
pub struct ValueModel<V> {
    base: ObjectBase,
    value: RwLock<Option<V>>,
    default_value: RwLock<Option<V>>,
    validator: RwLock<Option<SharedValidator<V>>>,
    /// Fired after a bound property changed.
    pub property_changed: Signal<PropertyChangeEvent>,
    /// Consulted before the value changes; any listener may reject it.
    pub vetoable_change: VetoSignal<PropertyChangeEvent, ValidationError>,
}

impl<V> ValueModel<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a model whose value starts at `default_value`.
    pub fn new(default_value: Option<V>) -> Self {
        Self {
            base: ObjectBase::new::<Self>(),
            value: RwLock::new(default_value.clone()),
            default_value: RwLock::new(default_value),
            validator: RwLock::new(None),
            property_changed: Signal::new(),
            vetoable_change: VetoSignal::new(),
        }
    }

    /// Install a validator at construction time.
    pub fn with_validator(self, validator: SharedValidator<V>) -> Self {
        *self.validator.write() = Some(validator);
        self
    }

    /// The current value.
    pub fn value(&self) -> Option<V> {
        self.value.read().clone()
    }

    /// The value `reset_value` restores.
    pub fn default_value(&self) -> Option<V> {
        self.default_value.read().clone()
    }

    /// Change the value `reset_value` restores.
    pub fn set_default_value(&self, default_value: Option<V>) {
        *self.default_value.write() = default_value;
    }

    /// The installed validator.
    pub fn validator(&self) -> Option<SharedValidator<V>> {
        self.validator.read().clone()
    }

    /// Replace the validator, firing a `"validator"` change.
    pub fn set_validator(&self, validator: Option<SharedValidator<V>>) {
        let changed = {
            let mut current = self.validator.write();
            let same = match (current.as_ref(), validator.as_ref()) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            *current = validator;
            !same
        };
        if changed {
            tracing::debug!(target: targets::MODEL, model = %self.base.id(), "validator replaced");
            self.property_changed
                .emit(PropertyChangeEvent::new(self.base.id(), property::VALIDATOR));
        }
    }

    /// Whether the current value passes the validator.
    pub fn is_valid_value(&self) -> bool {
        self.validate_value().is_ok()
    }

    /// Check the current value against the validator.
    pub fn validate_value(&self) -> Result<(), ValidationError> {
        match self.validator() {
            Some(validator) => validator.validate(&self.value()),
            None => Ok(()),
        }
    }

    /// Set the value after validation and veto checks.
    ///
    /// The validator runs even when `value` equals the current value. On
    /// failure the model is left unchanged.
    #[tracing::instrument(skip_all, target = "arbor::model", level = "trace")]
    pub fn set_value(&self, value: Option<V>) -> Result<(), ValidationError> {
        if let Some(validator) = self.validator() {
            validator.validate(&value)?;
        }

        let old_value = self.value();
        if old_value == value {
            return Ok(());
        }

        let pending =
            PropertyChangeEvent::with_values(self.base.id(), property::VALUE, old_value, value.clone());
        self.vetoable_change.check(&pending)?;

        self.store(value);
        Ok(())
    }

    /// Set the value to `None` without validation.
    pub fn clear_value(&self) {
        self.store(None);
    }

    /// Restore the default value without validation.
    pub fn reset_value(&self) {
        let default_value = self.default_value();
        self.store(default_value);
    }

    fn store(&self, value: Option<V>) {
        let old_value = {
            let mut current = self.value.write();
            if *current == value {
                return;
            }
            std::mem::replace(&mut *current, value.clone())
        };
        tracing::trace!(target: targets::MODEL, model = %self.base.id(), "value changed");
        self.property_changed.emit(PropertyChangeEvent::with_values(
            self.base.id(),
            property::VALUE,
            old_value,
            value,
        ));
    }
}

impl<V> Object for ValueModel<V>
where
    V: Send + Sync,
{
    fn object_id(&self) -> ObjectId {
        self.base.id()
    }
}

impl<V: fmt::Debug> fmt::Debug for ValueModel<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueModel")
            .field("id", &self.base.id())
            .field("value", &*self.value.read())
            .field("default_value", &*self.default_value.read())
            .field("has_validator", &self.validator.read().is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(ValueModel<String>: Send, Sync);
