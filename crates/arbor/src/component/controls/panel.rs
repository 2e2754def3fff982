//! Plain container component.

use std::sync::Arc;

use arbor_core::{Object, ObjectId};

use crate::component::{Component, ComponentBase, ComponentKind, CompositeBase, FocusGroup, install};

/// A container holding other components.
///
/// A panel created with [`Panel::focus_scope`] also owns a [`FocusGroup`],
/// so focus-scoped input anywhere inside it goes to the component focused
/// within the panel.
///
/// # Example
///
/// ```
/// use arbor::component::{Component, Panel};
///
/// let outer = Panel::new();
/// let inner = Panel::new();
/// outer.add_child(inner.clone()).unwrap();
///
/// assert_eq!(outer.children().len(), 1);
/// assert!(inner.add_child(outer.clone()).is_err());
/// ```
#[derive(Debug)]
pub struct Panel {
    base: ComponentBase,
    composite: CompositeBase,
    focus: Option<FocusGroup>,
}

impl Panel {
    /// Create an empty panel.
    pub fn new() -> Arc<Self> {
        install(Self {
            base: ComponentBase::new::<Self>(),
            composite: CompositeBase::new(),
            focus: None,
        })
    }

    /// Create an empty panel that scopes focus.
    pub fn focus_scope() -> Arc<Self> {
        install(Self {
            base: ComponentBase::new::<Self>(),
            composite: CompositeBase::new(),
            focus: Some(FocusGroup::new()),
        })
    }

    /// Create an empty panel with a name.
    pub fn named(name: impl Into<String>) -> Arc<Self> {
        let panel = Self::new();
        panel.base.set_name(name);
        panel
    }
}

impl Object for Panel {
    fn object_id(&self) -> ObjectId {
        self.base.id()
    }
}

impl Component for Panel {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Container
    }

    fn composite(&self) -> Option<&CompositeBase> {
        Some(&self.composite)
    }

    fn focus_group(&self) -> Option<&FocusGroup> {
        self.focus.as_ref()
    }
}
