//! Remembering component state between sessions.
//!
//! Components export the values they want remembered as a small map of
//! [`PreferenceValue`]s and import them again later. A [`PreferenceStore`]
//! decides where the maps live. Composites load preferences for a child
//! subtree when it is attached and save them when it is detached; failures
//! are logged and never block the structural change.
//!
//! Preferences are keyed by component name. A component's key is the path
//! of names from its outermost named ancestor down to itself, joined with
//! `/`; unnamed components are skipped.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arbor::component::{Component, Panel, ValueControl};
//! use arbor::converter::ParseConverter;
//! use arbor::model::ValueModel;
//! use arbor::preferences::{PreferenceValue, SettingsPreferenceStore};
//!
//! let store = Arc::new(SettingsPreferenceStore::in_memory());
//! store.set("form/age", "value", PreferenceValue::from("42"));
//!
//! let form = Panel::named("form");
//! form.base().set_preference_store(Some(store.clone()));
//!
//! let age = ValueControl::with_converter(
//!     Arc::new(ValueModel::<i32>::new(None)),
//!     Arc::new(ParseConverter::new()),
//! );
//! age.base().set_name("age");
//! form.add_child(age.clone()).unwrap();
//! assert_eq!(age.value(), Some(42));
//! ```

mod config;
mod store;

use std::fmt;

use arbor_core::PerfSpan;
use arbor_core::logging::{span_names, targets};
use serde::{Deserialize, Serialize};

pub use config::{PreferenceFormat, PreferenceStoreConfig};
pub use store::SettingsPreferenceStore;

use crate::component::Component;
use crate::error::{PreferenceError, PreferenceResult};

/// A value that can be stored in preferences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    String(String),
    /// A list of values.
    Array(Vec<PreferenceValue>),
}

impl PreferenceValue {
    /// Whether this is [`PreferenceValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as a float. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as a list.
    pub fn as_array(&self) -> Option<&[PreferenceValue]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PreferenceValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for PreferenceValue {
    fn from(value: i32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for PreferenceValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for PreferenceValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl<T: Into<PreferenceValue>> From<Vec<T>> for PreferenceValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PreferenceValue>> From<Option<T>> for PreferenceValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Where component preferences are kept.
pub trait PreferenceStore: Send + Sync {
    /// Apply stored preferences to a single component.
    fn load_preferences(&self, component: &dyn Component) -> PreferenceResult<()>;

    /// Record a single component's preferences.
    fn save_preferences(&self, component: &dyn Component) -> PreferenceResult<()>;
}

/// The key a component's preferences are stored under.
///
/// Fails with [`PreferenceError::UnnamedComponent`] if the component has no
/// name. Unnamed ancestors do not contribute to the key.
pub fn preference_key(component: &dyn Component) -> PreferenceResult<String> {
    let base = component.base();
    let name = base.name();
    if name.is_empty() {
        return Err(PreferenceError::UnnamedComponent(base.id()));
    }
    let mut segments: Vec<String> = base
        .ancestors()
        .iter()
        .map(|ancestor| ancestor.base().name())
        .filter(|name| !name.is_empty())
        .collect();
    segments.reverse();
    segments.push(name);
    Ok(segments.join("/"))
}

/// Load preferences for `root` and every named descendant, parents first.
pub(crate) fn load_subtree(store: &dyn PreferenceStore, root: &dyn Component) {
    let _span = PerfSpan::new(span_names::PREFERENCES);
    walk_named(root, &mut |component| {
        if let Err(err) = store.load_preferences(component) {
            tracing::warn!(
                target: targets::PREFERENCES,
                component = %component.base().id(),
                error = %err,
                "failed to load preferences"
            );
        }
    });
}

/// Save preferences for `root` and every named descendant, parents first.
pub(crate) fn save_subtree(store: &dyn PreferenceStore, root: &dyn Component) {
    let _span = PerfSpan::new(span_names::PREFERENCES);
    walk_named(root, &mut |component| {
        if let Err(err) = store.save_preferences(component) {
            tracing::warn!(
                target: targets::PREFERENCES,
                component = %component.base().id(),
                error = %err,
                "failed to save preferences"
            );
        }
    });
}

fn walk_named(component: &dyn Component, visit: &mut dyn FnMut(&dyn Component)) {
    if !component.base().name().is_empty() {
        visit(component);
    }
    for child in component.children().iter() {
        walk_named(child.as_ref(), visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Panel;

    #[test]
    fn test_value_accessors() {
        assert_eq!(PreferenceValue::from("x").as_str(), Some("x"));
        assert_eq!(PreferenceValue::from(3).as_i64(), Some(3));
        assert_eq!(PreferenceValue::from(3).as_f64(), Some(3.0));
        assert_eq!(PreferenceValue::from(true).as_bool(), Some(true));
        assert_eq!(PreferenceValue::from(true).as_str(), None);
        assert!(PreferenceValue::from(None::<i64>).is_null());
        assert_eq!(
            PreferenceValue::from(vec![1, 2]).as_array().map(<[_]>::len),
            Some(2)
        );
    }

    #[test]
    fn test_untagged_json_shape() {
        let value = PreferenceValue::from(vec![0i64, 2]);
        assert_eq!(serde_json::to_string(&value).unwrap(), "[0,2]");

        let parsed: PreferenceValue = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(parsed, PreferenceValue::from("hello"));
        let parsed: PreferenceValue = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, PreferenceValue::Integer(7));
        let parsed: PreferenceValue = serde_json::from_str("null").unwrap();
        assert!(parsed.is_null());
    }

    #[test]
    fn test_display() {
        let value = PreferenceValue::Array(vec!["a".into(), 1.into(), PreferenceValue::Null]);
        assert_eq!(value.to_string(), "[\"a\", 1, null]");
    }

    #[test]
    fn test_key_skips_unnamed_ancestors() {
        let root = Panel::named("settings");
        let middle = Panel::new();
        let leaf = Panel::named("colors");
        root.add_child(middle.clone()).unwrap();
        middle.add_child(leaf.clone()).unwrap();

        assert_eq!(preference_key(leaf.as_ref()).unwrap(), "settings/colors");
        assert_eq!(preference_key(root.as_ref()).unwrap(), "settings");
        assert!(matches!(
            preference_key(middle.as_ref()),
            Err(PreferenceError::UnnamedComponent(id)) if id == middle.base().id()
        ));
    }
}
