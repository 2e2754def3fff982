//! Arbor - the core of a server-rendered component framework.
//!
//! Arbor keeps the state of a UI on the server as a tree of components bound
//! to value models. Models validate their values and let listeners veto
//! changes; components cache their validity, aggregate it up the tree and
//! repeat model events so listeners can observe a whole form from its root.
//!
//! This crate re-exports the primitives of `arbor-core` (signals, properties,
//! object identity and sync guards) next to its own modules:
//!
//! - [`model`]: value models, list selection models and exclusion groups
//! - [`component`]: the component tree, controls and input dispatch
//! - [`validator`] and [`converter`]: checking and parsing user input
//! - [`preferences`]: remembering component state between sessions
//! - [`event`] and [`error`]: the events and errors the above produce
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arbor::component::{Component, Panel, ValueControl};
//! use arbor::converter::ParseConverter;
//! use arbor::model::ValueModel;
//! use arbor::validator::RangeValidator;
//!
//! let age = ValueModel::<u8>::new(None)
//!     .with_validator(Arc::new(RangeValidator::<u8>::new(0, 130).required()));
//! let field = ValueControl::with_converter(Arc::new(age), Arc::new(ParseConverter::new()));
//!
//! let form = Panel::named("signup");
//! form.add_child(field.clone()).unwrap();
//!
//! field.set_literal(Some("200".into()));
//! assert!(!form.validate());
//! assert!(field.base().notification().is_some());
//!
//! field.set_literal(Some("36".into()));
//! assert!(form.validate());
//! assert_eq!(field.value(), Some(36));
//! ```

pub use arbor_core::*;

pub mod component;
pub mod converter;
pub mod error;
pub mod event;
pub mod model;
pub mod preferences;
pub mod validator;

pub use component::{Component, ComponentBase, Notification, Severity, install};
pub use error::{
    CommitError, ConversionError, PreferenceError, SelectionError, StructuralError,
    ValidationError,
};
pub use event::{InputEvent, PropertyChangeEvent, StructureEvent};
pub use model::{ListSelectModel, MutualExclusionGroup, ValueModel};
