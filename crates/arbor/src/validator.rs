//! Value validators.
//!
//! A [`Validator`] decides whether a model may hold a value. Validators see
//! the optional value exactly as the model stores it, so "no value" can be
//! rejected (see [`RequiredValidator`]) or accepted like any other.
//!
//! # Example
//!
//! ```
//! use arbor::validator::{RangeValidator, Validator};
//!
//! let percent = RangeValidator::new(0, 100);
//! assert!(percent.is_valid(&Some(42)));
//! assert!(!percent.is_valid(&Some(150)));
//! assert!(percent.is_valid(&None));
//! assert!(!percent.required().is_valid(&None));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use regex::Regex;

use crate::error::ValidationError;

/// Decides whether a value is acceptable.
pub trait Validator<V>: Send + Sync {
    /// Check a value, describing why it is rejected.
    fn validate(&self, value: &Option<V>) -> Result<(), ValidationError>;

    /// Check a value without describing failures.
    fn is_valid(&self, value: &Option<V>) -> bool {
        self.validate(value).is_ok()
    }
}

impl<V, T: Validator<V> + ?Sized> Validator<V> for Arc<T> {
    fn validate(&self, value: &Option<V>) -> Result<(), ValidationError> {
        (**self).validate(value)
    }
}

impl<V, T: Validator<V> + ?Sized> Validator<V> for Box<T> {
    fn validate(&self, value: &Option<V>) -> Result<(), ValidationError> {
        (**self).validate(value)
    }
}

/// Rejects a missing value and accepts any present one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredValidator;

impl RequiredValidator {
    /// Create a required validator.
    pub fn new() -> Self {
        Self
    }
}

impl<V> Validator<V> for RequiredValidator {
    fn validate(&self, value: &Option<V>) -> Result<(), ValidationError> {
        match value {
            Some(_) => Ok(()),
            None => Err(ValidationError::new("a value is required")),
        }
    }
}

/// Accepts values within inclusive bounds.
///
/// Either bound may be left open. If both bounds are given in the wrong order
/// they are swapped.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeValidator<V> {
    minimum: Option<V>,
    maximum: Option<V>,
    required: bool,
}

impl<V: PartialOrd> RangeValidator<V> {
    /// Create a validator accepting `minimum..=maximum`.
    pub fn new(minimum: V, maximum: V) -> Self {
        let (minimum, maximum) = if minimum > maximum {
            (maximum, minimum)
        } else {
            (minimum, maximum)
        };
        Self {
            minimum: Some(minimum),
            maximum: Some(maximum),
            required: false,
        }
    }

    /// Create a validator with only a lower bound.
    pub fn at_least(minimum: V) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: None,
            required: false,
        }
    }

    /// Create a validator with only an upper bound.
    pub fn at_most(maximum: V) -> Self {
        Self {
            minimum: None,
            maximum: Some(maximum),
            required: false,
        }
    }

    /// Also reject a missing value.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The lower bound.
    pub fn minimum(&self) -> Option<&V> {
        self.minimum.as_ref()
    }

    /// The upper bound.
    pub fn maximum(&self) -> Option<&V> {
        self.maximum.as_ref()
    }
}

impl<V> Validator<V> for RangeValidator<V>
where
    V: PartialOrd + fmt::Debug + Send + Sync,
{
    fn validate(&self, value: &Option<V>) -> Result<(), ValidationError> {
        let Some(value) = value else {
            return if self.required {
                Err(ValidationError::new("a value is required"))
            } else {
                Ok(())
            };
        };

        if let Some(minimum) = &self.minimum
            && value < minimum
        {
            return Err(
                ValidationError::new(format!("value must be at least {minimum:?}"))
                    .with_value(format!("{value:?}")),
            );
        }
        if let Some(maximum) = &self.maximum
            && value > maximum
        {
            return Err(
                ValidationError::new(format!("value must be at most {maximum:?}"))
                    .with_value(format!("{value:?}")),
            );
        }
        Ok(())
    }
}

/// Accepts strings that match a regular expression in full.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: String,
    anchored: Regex,
    required: bool,
}

impl RegexValidator {
    /// Create a validator from a pattern.
    ///
    /// The pattern must match the whole string, not just a part of it.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            anchored: Regex::new(&format!("^(?:{pattern})$"))?,
            pattern: pattern.to_string(),
            required: false,
        })
    }

    /// Also reject a missing value.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn matches_fully(&self, input: &str) -> bool {
        self.anchored.is_match(input)
    }
}

impl Validator<String> for RegexValidator {
    fn validate(&self, value: &Option<String>) -> Result<(), ValidationError> {
        match value {
            None if self.required => Err(ValidationError::new("a value is required")),
            None => Ok(()),
            Some(text) if self.matches_fully(text) => Ok(()),
            Some(text) => Err(ValidationError::new(format!(
                "value does not match pattern {}",
                self.pattern
            ))
            .with_value(text.clone())),
        }
    }
}

/// Accepts present values for which a closure returns `true`.
///
/// A missing value is accepted.
pub struct PredicateValidator<V, F> {
    predicate: F,
    message: String,
    _value: PhantomData<fn(&V)>,
}

impl<V, F> PredicateValidator<V, F>
where
    F: Fn(&V) -> bool + Send + Sync,
{
    /// Create a validator that reports `message` when `predicate` fails.
    pub fn new(message: impl Into<String>, predicate: F) -> Self {
        Self {
            predicate,
            message: message.into(),
            _value: PhantomData,
        }
    }
}

impl<V, F> Validator<V> for PredicateValidator<V, F>
where
    F: Fn(&V) -> bool + Send + Sync,
{
    fn validate(&self, value: &Option<V>) -> Result<(), ValidationError> {
        match value {
            Some(value) if !(self.predicate)(value) => {
                Err(ValidationError::new(self.message.clone()))
            }
            _ => Ok(()),
        }
    }
}

impl<V, F> fmt::Debug for PredicateValidator<V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateValidator")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
