//! Debug output for component trees.

use std::fmt::{self, Write};

use super::Component;

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show component IDs.
    pub show_ids: bool,
    /// Whether to show type names.
    pub show_types: bool,
    /// Whether to show validity, visibility and notifications.
    pub show_state: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_types: true,
            show_state: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_types: false,
            show_state: false,
            ..Default::default()
        }
    }
}

/// Renders a component tree as indented text.
///
/// ```
/// use arbor::component::{Component, ComponentTreeDebug, Panel, TreeFormatOptions, TreeStyle};
///
/// let root = Panel::named("form");
/// root.add_child(Panel::named("address")).unwrap();
///
/// let options = TreeFormatOptions { style: TreeStyle::Ascii, ..TreeFormatOptions::minimal() };
/// let text = ComponentTreeDebug::with_options(options).format(root.as_ref());
/// assert_eq!(text, "form\n`-- address\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ComponentTreeDebug {
    options: TreeFormatOptions,
}

impl ComponentTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the subtree rooted at `root`.
    pub fn format(&self, root: &dyn Component) -> String {
        let mut output = String::new();
        // Writing to a String cannot fail.
        let _ = self.format_node(root, 0, "", true, &mut output);
        output
    }

    fn format_node(
        &self,
        node: &dyn Component,
        depth: usize,
        indent: &str,
        is_last: bool,
        output: &mut String,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let (connector, last_connector, branch) = match self.options.style {
            TreeStyle::Ascii => ("|-- ", "`-- ", "|"),
            TreeStyle::Unicode => ("\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "\u{2502}"),
            TreeStyle::Compact => ("- ", "- ", ""),
        };

        output.push_str(indent);
        if depth > 0 {
            output.push_str(if is_last { last_connector } else { connector });
        }

        let base = node.base();
        let name = base.name();
        output.push_str(if name.is_empty() { "(unnamed)" } else { &name });
        if self.options.show_ids {
            write!(output, " [{}]", base.id())?;
        }
        if self.options.show_types {
            write!(output, " ({})", base.short_type_name())?;
        }
        if self.options.show_state {
            if !node.is_valid() {
                output.push_str(" invalid");
            }
            if !base.is_displayed() {
                output.push_str(" undisplayed");
            } else if !base.is_visible() {
                output.push_str(" hidden");
            }
            if !base.is_enabled() {
                output.push_str(" disabled");
            }
            if let Some(notification) = base.notification() {
                write!(output, " !{notification}")?;
            }
        }
        output.push('\n');

        let children = node.children();
        let child_indent = if depth == 0 {
            String::new()
        } else {
            let mut child_indent = indent.to_string();
            if is_last || branch.is_empty() {
                child_indent.push(' ');
            } else {
                child_indent.push_str(branch);
            }
            child_indent.push_str(&" ".repeat(self.options.indent_size + 1));
            child_indent
        };
        let count = children.len();
        for (i, child) in children.iter().enumerate() {
            self.format_node(child.as_ref(), depth + 1, &child_indent, i + 1 == count, output)?;
        }
        Ok(())
    }
}
