//! Value and selection models.
//!
//! Models hold application state independently of any component. A
//! component that displays a model repeats the model's events to its own
//! listeners, so application code usually observes components rather than
//! models.

mod list_select_model;
mod model_group;
mod selection_policy;
mod value_model;

pub use list_select_model::{
    ListChange, ListChangeEvent, ListSelectModel, SelectionChangeEvent, SharedPolicy,
};
pub use model_group::MutualExclusionGroup;
pub use selection_policy::{NoSelection, SelectionMode, SelectionPolicy, SingleSelect, Unrestricted};
pub use value_model::{SharedValidator, ValueModel};
