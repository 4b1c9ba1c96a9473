use std::collections::BTreeSet;
use std::fmt;
use std::iter::Copied;
use std::slice;

use sable_css::{SelectorList, select};
use sable_dom::{DomTree, NodeId};
use sable_html::serializer::render_start_tag;
use sable_html::{RenderOptions, render};

use crate::error::SableError;

/// The elements matched by a query, in document order without duplicates.
///
/// A selection borrows the tree it was taken from, so the tree cannot be
/// mutated while the selection is alive.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    tree: &'a DomTree,
    nodes: Vec<NodeId>,
}

impl<'a> Selection<'a> {
    pub(crate) const fn new(tree: &'a DomTree, nodes: Vec<NodeId>) -> Self {
        Self { tree, nodes }
    }

    /// Number of selected elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The selected elements in document order.
    pub fn iter(&self) -> Copied<slice::Iter<'_, NodeId>> {
        self.nodes.iter().copied()
    }

    /// The selected elements as a slice.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The first selected element.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// The tree the selection was taken from.
    #[must_use]
    pub const fn tree(&self) -> &'a DomTree {
        self.tree
    }

    /// Run `selector` within each selected element and merge the results.
    ///
    /// Each element acts as the query context, so `> li` finds direct
    /// children. The union is returned in document order, each element once.
    ///
    /// # Errors
    ///
    /// Returns [`SableError::Selector`] if `selector` does not compile.
    pub fn find(&self, selector: &str) -> Result<Self, SableError> {
        let selectors: SelectorList = selector.parse()?;
        let mut seen = BTreeSet::new();
        let mut found: Vec<NodeId> = self
            .nodes
            .iter()
            .flat_map(|&context| select(self.tree, &selectors, Some(context)))
            .filter(|&id| seen.insert(id))
            .collect();
        found.sort_by_cached_key(|&id| self.tree.tree_position(id));
        Ok(Self::new(self.tree, found))
    }

    /// Keep only the selected elements that match `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`SableError::Selector`] if `selector` does not compile.
    pub fn filter(&self, selector: &str) -> Result<Self, SableError> {
        let selectors: SelectorList = selector.parse()?;
        let kept = self
            .nodes
            .iter()
            .copied()
            .filter(|&id| selectors.matches(self.tree, id))
            .collect();
        Ok(Self::new(self.tree, kept))
    }

    /// Value of `name` on the first selected element.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        let tree = self.tree;
        self.first().and_then(|id| tree.get_attribute(id, name))
    }

    /// Text content of every selected element, concatenated.
    #[must_use]
    pub fn text(&self) -> String {
        self.iter().map(|id| self.tree.text_content(id)).collect()
    }

    /// Outer HTML of every selected element, concatenated.
    #[must_use]
    pub fn render_selection(&self) -> String {
        self.render_selection_with(&RenderOptions::default())
    }

    /// Outer HTML of every selected element with custom options.
    #[must_use]
    pub fn render_selection_with(&self, options: &RenderOptions) -> String {
        self.iter().map(|id| render(self.tree, id, options)).collect()
    }

    /// A comma-separated summary of the selection.
    ///
    /// Each element is shown by its start tag, or by its full outer HTML
    /// when `include_inner` is set.
    #[must_use]
    pub fn selection_html(&self, include_inner: bool) -> String {
        let options = RenderOptions::default();
        self.iter()
            .map(|id| match self.tree.as_element(id) {
                Some(data) if !include_inner => render_start_tag(data, &options),
                _ => render(self.tree, id, &options),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<'s> IntoIterator for &'s Selection<'_> {
    type Item = NodeId;
    type IntoIter = Copied<slice::Iter<'s, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Selection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selection_html(false))
    }
}
