use sable_css::{SelectorList, select};
use sable_dom::{DomError, DomTree, NodeId};
use sable_html::{ParseIssue, ParserRules, RenderOptions, parse_html_with_rules, render};

use crate::error::SableError;
use crate::selection::Selection;

/// A parsed HTML document.
///
/// Owns the indexed [`DomTree`] and the [`ParseIssue`]s recovered while
/// building it. Queries borrow the document; mutation goes through
/// [`Document::tree_mut`], which keeps the indices current.
#[derive(Debug, Clone, Default)]
pub struct Document {
    tree: DomTree,
    issues: Vec<ParseIssue>,
}

impl Document {
    /// Parse `html` with the default [`ParserRules`].
    ///
    /// Malformed markup is recovered, never rejected.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self::parse_with(html, ParserRules::default())
    }

    /// Parse `html` with custom rule tables.
    #[must_use]
    pub fn parse_with(html: &str, rules: ParserRules) -> Self {
        let (tree, issues) = parse_html_with_rules(html, rules);
        tracing::debug!(
            bytes = html.len(),
            nodes = tree.len(),
            issues = issues.len(),
            "loaded document"
        );
        Self { tree, issues }
    }

    /// Wrap an existing tree, for documents built through the mutation API.
    #[must_use]
    pub const fn from_tree(tree: DomTree) -> Self {
        Self {
            tree,
            issues: Vec::new(),
        }
    }

    /// The underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Mutable access to the tree. Its mutation methods keep the indices in
    /// step with every change.
    pub const fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Consume the document, returning its tree.
    #[must_use]
    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    /// Markup problems recovered while parsing.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Run a selector against the whole document.
    ///
    /// # Errors
    ///
    /// Returns [`SableError::Selector`] if `selector` does not compile. An
    /// empty result is not an error.
    pub fn select(&self, selector: &str) -> Result<Selection<'_>, SableError> {
        let list: SelectorList = selector.parse()?;
        Ok(self.select_compiled(&list, None))
    }

    /// Run a selector scoped to `context`.
    ///
    /// Matches are descendants of `context`; a selector opening with a
    /// combinator (`> li`, `+ p`) relates its first clause to `context`.
    ///
    /// # Errors
    ///
    /// Returns [`SableError::Dom`] if `context` is not a node of this
    /// document, and [`SableError::Selector`] if `selector` does not compile.
    pub fn select_within(&self, selector: &str, context: NodeId) -> Result<Selection<'_>, SableError> {
        if self.tree.get(context).is_none() {
            return Err(DomError::UnknownNode(context).into());
        }
        let list: SelectorList = selector.parse()?;
        Ok(self.select_compiled(&list, Some(context)))
    }

    /// Run an already compiled selector list. Matching never fails.
    #[must_use]
    pub fn select_compiled(&self, selectors: &SelectorList, context: Option<NodeId>) -> Selection<'_> {
        Selection::new(&self.tree, select(&self.tree, selectors, context))
    }

    /// Render the whole document with default options.
    #[must_use]
    pub fn render(&self) -> String {
        self.render_with(&RenderOptions::default())
    }

    /// Render the whole document.
    #[must_use]
    pub fn render_with(&self, options: &RenderOptions) -> String {
        render(&self.tree, NodeId::ROOT, options)
    }

    /// Render one node and its subtree (outer HTML).
    #[must_use]
    pub fn render_node(&self, id: NodeId, options: &RenderOptions) -> String {
        render(&self.tree, id, options)
    }

    /// Raw value of an element's attribute, if present.
    ///
    /// Values are returned as parsed; interpreting them (numbers, URLs) is
    /// left to the caller.
    #[must_use]
    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.tree.get_attribute(element, name)
    }
}

impl From<DomTree> for Document {
    fn from(tree: DomTree) -> Self {
        Self::from_tree(tree)
    }
}
