//! Value capability for components.
//!
//! A component that displays a value exposes it through
//! [`Component::value_source`](super::Component::value_source). The
//! framework uses the [`ValueSource`] to aggregate validity, to commit input
//! on `validate()`, to restore defaults on `reset()` and to repeat the
//! source's events to the component's listeners.

use std::fmt;
use std::sync::{Arc, Weak};

use arbor_core::Subscription;
use parking_lot::RwLock;

use super::Component;
use crate::converter::Converter;
use crate::error::{CommitError, ConversionError, ValidationError};
use crate::model::{ListSelectModel, ValueModel};

/// What a component needs from the value it displays.
pub trait ValueSource: Send + Sync {
    /// Whether the current (or pending) value is acceptable.
    fn is_valid_value(&self) -> bool;

    /// Commit pending input and validate the result.
    fn commit(&self) -> Result<(), CommitError>;

    /// Restore the default value and drop pending input.
    fn reset_value(&self);

    /// Install listeners that repeat this source's events to `owner`.
    ///
    /// Each repeated event names `owner` as its source and keeps the
    /// original target.
    fn repeat_into(&self, owner: Weak<dyn Component>) -> Vec<Subscription>;
}

/// A value model plus the literal a client is editing.
///
/// Text typed by a client is held as a pending literal until the component
/// is validated; only then is it converted and written to the model. While a
/// literal is pending the value counts as valid only if the literal converts
/// and the converted value passes the model's validator.
pub struct ValidatedValue<V> {
    model: Arc<ValueModel<V>>,
    converter: Option<Arc<dyn Converter<V>>>,
    literal: RwLock<Option<String>>,
}

impl<V> ValidatedValue<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Wrap a model without a converter.
    pub fn new(model: Arc<ValueModel<V>>) -> Self {
        Self {
            model,
            converter: None,
            literal: RwLock::new(None),
        }
    }

    /// Wrap a model with a converter for literal input.
    pub fn with_converter(model: Arc<ValueModel<V>>, converter: Arc<dyn Converter<V>>) -> Self {
        Self {
            model,
            converter: Some(converter),
            literal: RwLock::new(None),
        }
    }

    /// The underlying model.
    pub fn model(&self) -> &Arc<ValueModel<V>> {
        &self.model
    }

    /// The converter, if any.
    pub fn converter(&self) -> Option<&Arc<dyn Converter<V>>> {
        self.converter.as_ref()
    }

    /// The committed value.
    pub fn value(&self) -> Option<V> {
        self.model.value()
    }

    /// Set the value directly, discarding any pending literal.
    ///
    /// The literal is dropped before the model fires, so listeners observe
    /// validity for the new value. On failure the literal is restored.
    /// Returns whether a literal was dropped.
    pub fn set_value(&self, value: Option<V>) -> Result<bool, ValidationError> {
        let pending = self.literal.write().take();
        if let Err(err) = self.model.set_value(value) {
            *self.literal.write() = pending;
            return Err(err);
        }
        Ok(pending.is_some())
    }

    /// Record literal input without committing it.
    pub fn set_literal(&self, literal: Option<String>) {
        *self.literal.write() = literal;
    }

    /// Whether literal input is waiting to be committed.
    pub fn has_pending_literal(&self) -> bool {
        self.literal.read().is_some()
    }

    /// The pending literal, or the committed value rendered by the converter.
    pub fn literal(&self) -> Option<String> {
        if let Some(literal) = self.literal.read().clone() {
            return Some(literal);
        }
        self.converter
            .as_ref()
            .and_then(|converter| converter.convert_value(&self.model.value()))
    }

    fn convert_pending(&self) -> Option<Result<Option<V>, ConversionError>> {
        let literal = self.literal.read().clone()?;
        Some(match &self.converter {
            Some(converter) => converter.convert_literal(Some(&literal)),
            None => Err(ConversionError::new(literal, "no converter installed")),
        })
    }
}

impl<V> ValueSource for ValidatedValue<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn is_valid_value(&self) -> bool {
        match self.convert_pending() {
            None => self.model.is_valid_value(),
            Some(Err(_)) => false,
            Some(Ok(value)) => self
                .model
                .validator()
                .is_none_or(|validator| validator.is_valid(&value)),
        }
    }

    fn commit(&self) -> Result<(), CommitError> {
        if let Some(converted) = self.convert_pending() {
            let pending = self.literal.write().take();
            let stored = match converted {
                Ok(value) => self.model.set_value(value).map_err(CommitError::from),
                Err(err) => Err(CommitError::from(err)),
            };
            if let Err(err) = stored {
                *self.literal.write() = pending;
                return Err(err);
            }
        }
        self.model.validate_value()?;
        Ok(())
    }

    fn reset_value(&self) {
        self.literal.write().take();
        self.model.reset_value();
    }

    fn repeat_into(&self, owner: Weak<dyn Component>) -> Vec<Subscription> {
        let changes = {
            let owner = owner.clone();
            self.model.property_changed.subscribe(move |event| {
                if let Some(owner) = owner.upgrade() {
                    owner.fire_property_change(event.repeat(owner.object_id()));
                }
            })
        };
        let vetoes = self.model.vetoable_change.subscribe(move |event| {
            match owner.upgrade() {
                Some(owner) => owner
                    .base()
                    .vetoable_change
                    .check(&event.repeat(owner.object_id())),
                None => Ok(()),
            }
        });
        vec![changes, vetoes]
    }
}

impl<V: fmt::Debug> fmt::Debug for ValidatedValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedValue")
            .field("model", &self.model)
            .field("literal", &*self.literal.read())
            .field("has_converter", &self.converter.is_some())
            .finish()
    }
}

impl<V> ValueSource for ListSelectModel<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn is_valid_value(&self) -> bool {
        ListSelectModel::is_valid_value(self)
    }

    fn commit(&self) -> Result<(), CommitError> {
        Ok(self.validate_value()?)
    }

    fn reset_value(&self) {
        self.reset_selection();
    }

    fn repeat_into(&self, owner: Weak<dyn Component>) -> Vec<Subscription> {
        let changes = self.property_changed.subscribe(move |event| {
            if let Some(owner) = owner.upgrade() {
                owner.fire_property_change(event.repeat(owner.object_id()));
            }
        });
        vec![changes]
    }
}
