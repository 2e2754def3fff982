//! Concrete components.
//!
//! - [`Panel`]: a plain container, optionally scoping focus
//! - [`ValueControl`]: a leaf displaying one [`ValueModel`](crate::model::ValueModel)
//! - [`ListControl`]: a leaf displaying a [`ListSelectModel`](crate::model::ListSelectModel)
//! - [`BooleanSelectPanel`]: a container of checkboxes mirroring a list selection

mod boolean_select_panel;
mod list_control;
mod panel;
mod value_control;

pub use boolean_select_panel::BooleanSelectPanel;
pub use list_control::ListControl;
pub use panel::Panel;
pub use value_control::ValueControl;

/// Preference key under which controls store their value.
pub(crate) const VALUE_KEY: &str = "value";
/// Preference key under which list controls store their selection.
pub(crate) const SELECTION_KEY: &str = "selected";
