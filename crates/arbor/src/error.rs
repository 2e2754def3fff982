//! Error types for Arbor.
//!
//! Model operations return their failures directly. Components catch the
//! failures of their own value models during [`validate`] and surface them as
//! notifications instead.
//!
//! [`validate`]: crate::component::Component::validate

use std::path::PathBuf;

use arbor_core::ObjectId;
use thiserror::Error;

/// A value was rejected by a validator or a veto listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    value: Option<String>,
}

impl ValidationError {
    /// Create a validation error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            value: None,
        }
    }

    /// Attach a rendering of the rejected value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// The human readable reason for the rejection.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The rejected value, if one was recorded.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// A literal could not be converted into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {literal:?}: {message}")]
pub struct ConversionError {
    literal: String,
    message: String,
}

impl ConversionError {
    /// Create a conversion error for the given literal.
    pub fn new(literal: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            message: message.into(),
        }
    }

    /// The literal that failed to convert.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// The reason the conversion failed.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A structural change to the component tree was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// The child is already attached to another composite.
    #[error("component {child} already has parent {parent}")]
    AlreadyParented { child: ObjectId, parent: ObjectId },
    /// The component is not a child of the composite.
    #[error("component {child} is not a child of {parent}")]
    NotChild { parent: ObjectId, child: ObjectId },
    /// The component cannot hold children.
    #[error("component {component} is not a composite")]
    NotComposite { component: ObjectId },
    /// Attaching would make a component its own ancestor.
    #[error("component {child} is {parent} or one of its ancestors")]
    CircularParentage { parent: ObjectId, child: ObjectId },
    /// The insertion index is past the end of the child list.
    #[error("insertion index {index} is out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
    /// The component was constructed without [`install`](crate::component::install).
    #[error("component {component} was not installed")]
    NotInstalled { component: ObjectId },
}

/// A selection or list operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// An index does not refer to an element of the list.
    #[error("index {index} is out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    /// The resulting selected value was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Committing a component's pending input failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The pending literal could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// The value was rejected by a validator or veto listener.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Preferences could not be loaded or saved.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Reading or writing the preference file failed.
    #[error("preference file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The preference file is not valid JSON.
    #[error("JSON preference error: {0}")]
    Json(#[from] serde_json::Error),
    /// The preference file is not valid TOML.
    #[error("TOML preference error: {0}")]
    TomlDe(#[from] toml::de::Error),
    /// Preferences could not be written as TOML.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    /// Preferences are keyed by name; the component has none.
    #[error("component {0} has no name to key preferences by")]
    UnnamedComponent(ObjectId),
}

impl PreferenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for structural tree operations.
pub type StructuralResult<T> = Result<T, StructuralError>;

/// Result type for selection operations.
pub type SelectionResult<T> = Result<T, SelectionError>;

/// Result type for preference operations.
pub type PreferenceResult<T> = Result<T, PreferenceError>;

static_assertions::assert_impl_all!(PreferenceError: Send, Sync);
static_assertions::assert_impl_all!(StructuralError: Send, Sync, Clone);
