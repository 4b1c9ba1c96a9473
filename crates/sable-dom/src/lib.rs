//! Indexed DOM tree for the Sable document engine.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), plus the lookup
//! indices that make selector queries fast.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues.
//!
//! Every change to parentage, tag names or attributes goes through the
//! mutation methods in this crate, which update the [`DomIndex`] in the same
//! call. Only nodes reachable from [`NodeId::ROOT`] are indexed.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;

mod error;
mod index;
mod mutation;

pub use error::DomError;
pub use index::DomIndex;

/// Map of attribute names to values for an element, in source order.
pub type AttributesMap = IndexMap<String, String>;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// Arena slots are never reused, so a `NodeId` stays valid for the lifetime
/// of its tree even after the node is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// Fields are public for reading; a `&mut Node` is never handed out, so the
/// links below can only change through [`DomTree`]'s mutation methods.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    /// "An object A's next sibling is the object immediately following A
    /// in the children of A's parent."
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    /// "An object A's previous sibling is the object immediately preceding A
    /// in the children of A's parent."
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    const fn detached(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
    /// [§ 4.11 Interface CDATASection](https://dom.spec.whatwg.org/#interface-cdatasection)
    CData(String),
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    ///
    /// Holds the declaration body after the `DOCTYPE` keyword, e.g. `html`.
    Doctype(String),
}

impl NodeType {
    /// Whether a node of this type may have children.
    #[must_use]
    pub const fn can_have_children(&self) -> bool {
        matches!(self, Self::Document | Self::Element(_))
    }
}

/// Element-specific data.
///
/// Tag names and attribute names are stored ASCII-lowercased; values are
/// opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
    /// The element was written as `<tag/>` in the source.
    pub self_closing: bool,
}

impl ElementData {
    /// Create element data, normalizing the tag and attribute names.
    /// The first occurrence of a repeated attribute name wins.
    #[must_use]
    pub fn new<I, K, V>(tag_name: &str, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = AttributesMap::new();
        for (name, value) in attrs {
            let _ = map
                .entry(name.as_ref().to_ascii_lowercase())
                .or_insert_with(|| value.into());
        }
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: map,
            self_closing: false,
        }
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id").map(String::as_str)
    }

    /// Returns the class names from the class attribute, in order.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .into_iter()
            .flat_map(|list| list.split_ascii_whitespace())
    }

    /// Whether `class` is one of the element's class tokens.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Attribute lookup; `name` is matched case-insensitively.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        match self.attrs.get(name) {
            Some(value) => Some(value.as_str()),
            None if name.bytes().any(|b| b.is_ascii_uppercase()) => self
                .attrs
                .get(&name.to_ascii_lowercase())
                .map(String::as_str),
            None => None,
        }
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// All nodes live in one vector; detached nodes stay allocated and can be
/// re-attached later.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
    index: DomIndex,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::detached(NodeType::Document)],
            index: DomIndex::default(),
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the number of allocated nodes, connected or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every allocated node id, in allocation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// The lookup indices.
    #[must_use]
    pub const fn index(&self) -> &DomIndex {
        &self.index
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the element children of a node.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// [§ 4.2.1 Connected](https://dom.spec.whatwg.org/#connected)
    ///
    /// Whether the node is the Document or has it as an ancestor.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.tree_root(id) == NodeId::ROOT
    }

    /// Whether the node is an element currently present in the indices.
    #[must_use]
    pub fn is_indexed(&self, id: NodeId) -> bool {
        self.is_element(id) && self.is_connected(id)
    }

    /// The topmost ancestor of `id` (the node itself when it has no parent).
    #[must_use]
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Iterate over following siblings (from immediately after to last child).
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> FollowingSiblingIterator<'_> {
        FollowingSiblingIterator {
            tree: self,
            current: self.next_sibling(id),
        }
    }

    /// Iterate over the descendants of a node in tree order (pre-order),
    /// excluding the node itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Whether this node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.as_element(id).is_some()
    }

    /// Get the tag name if this node is an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|data| data.tag_name.as_str())
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Read an attribute of an element. Names are case-insensitive.
    #[must_use]
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id).and_then(|data| data.get_attribute(name))
    }

    /// Whether the element carries attribute `name`.
    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// The concatenated data of all text and CDATA descendants (or the
    /// node's own data for character nodes).
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let own = |node: NodeId| match self.get(node).map(|n| &n.node_type) {
            Some(NodeType::Text(data) | NodeType::CData(data)) => Some(data.as_str()),
            _ => None,
        };
        if let Some(data) = own(id) {
            return data.to_string();
        }
        self.descendants(id).filter_map(own).collect()
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }

    /// Elements with tag name `tag`, from the index.
    #[must_use]
    pub fn elements_by_tag(&self, tag: &str) -> Option<&BTreeSet<NodeId>> {
        self.index.by_tag(tag)
    }

    /// [§ 4.2.4 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// When several connected elements share the id, the one attached most
    /// recently is returned.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.index.by_id(id)
    }

    /// Every connected element holding `id`, in attach order.
    #[must_use]
    pub fn elements_with_id(&self, id: &str) -> &[NodeId] {
        self.index.all_with_id(id)
    }

    /// Elements whose class list contains `class`, from the index.
    #[must_use]
    pub fn elements_by_class(&self, class: &str) -> Option<&BTreeSet<NodeId>> {
        self.index.by_class(class)
    }

    /// Elements carrying attribute `name`, from the index.
    #[must_use]
    pub fn elements_with_attribute(
        &self,
        name: &str,
    ) -> Option<&BTreeSet<NodeId>> {
        self.index.by_attribute(name)
    }

    /// Position of a node as child indices from its tree root.
    ///
    /// Comparing two positions lexicographically gives tree order for
    /// nodes sharing a root.
    #[must_use]
    pub fn tree_position(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            path.push(self.preceding_siblings(current).count());
            current = parent;
        }
        path.reverse();
        path
    }

    /// [§ 4.4 compareDocumentPosition](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition)
    ///
    /// Orders two nodes by tree order. An ancestor precedes its descendants.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnknownNode`] for ids outside the arena, and
    /// [`DomError::Disconnected`] when the nodes do not share a root.
    pub fn compare_document_position(&self, a: NodeId, b: NodeId) -> Result<Ordering, DomError> {
        let _ = self.node(a)?;
        let _ = self.node(b)?;
        if self.tree_root(a) != self.tree_root(b) {
            return Err(DomError::Disconnected(a, b));
        }
        Ok(self.tree_position(a).cmp(&self.tree_position(b)))
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::UnknownNode(id))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Iterator over following siblings of a node.
pub struct FollowingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for FollowingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.next_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.first_child(current).or_else(|| {
            let mut node = current;
            loop {
                if node == self.root {
                    return None;
                }
                if let Some(sibling) = self.tree.next_sibling(node) {
                    return Some(sibling);
                }
                node = self.tree.parent(node)?;
            }
        });
        Some(current)
    }
}
