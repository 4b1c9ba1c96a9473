//! Tree mutation.
//!
//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//!
//! These methods are the only way to change parentage, tag names, attributes
//! or character data. Each one keeps the child list, the parent link, the
//! sibling links and the [`DomIndex`](crate::DomIndex) consistent before it
//! returns.

use crate::{DomError, DomTree, ElementData, Node, NodeId, NodeType};

impl DomTree {
    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let node_type = match node_type {
            NodeType::Element(data) => NodeType::Element(normalize(data)),
            other => other,
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::detached(node_type));
        id
    }

    /// Allocate a detached element.
    pub fn create_element<I, K, V>(&mut self, tag_name: &str, attrs: I) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.alloc(NodeType::Element(ElementData::new(tag_name, attrs)))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeType::Text(data.into()))
    }

    /// Allocate a detached comment node.
    pub fn create_comment(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeType::Comment(data.into()))
    }

    /// [§ 4.2.3 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`. A child that already has
    /// a parent is detached from it first.
    ///
    /// # Errors
    ///
    /// Fails without changing anything if either id is unknown, `parent`
    /// cannot have children, or `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.ensure_pre_insertion_validity(parent, child)?;
        self.detach(child)?;

        // Get the current last child of parent (if any) to set up sibling links
        let prev_last_child = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }

        self.index_subtree_if_connected(child);
        Ok(())
    }

    /// [§ 4.2.3 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Inserts `child` into `parent` immediately before `reference`.
    ///
    /// # Errors
    ///
    /// As [`append_child`](Self::append_child), plus [`DomError::NotAChild`]
    /// when `reference` is not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.ensure_pre_insertion_validity(parent, child)?;
        if self.node(reference)?.parent != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        if child == reference {
            return Ok(());
        }
        self.detach(child)?;

        // Position is looked up after detaching, which may have shifted it.
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&id| id == reference)
            .ok_or(DomError::NotAChild {
                parent,
                child: reference,
            })?;
        let prev = self.nodes[reference.0].prev_sibling;

        self.nodes[parent.0].children.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = prev;
        self.nodes[child.0].next_sibling = Some(reference);
        self.nodes[reference.0].prev_sibling = Some(child);
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = Some(child);
        }

        self.index_subtree_if_connected(child);
        Ok(())
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Removes `child` from `parent`. The child and its subtree stay
    /// allocated but become disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAChild`] when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let _ = self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child)
    }

    /// Detach a node from its parent, if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnknownNode`] for ids outside the arena.
    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };

        if self.is_connected(id) {
            self.unindex_subtree(id);
        }

        let prev = self.nodes[id.0].prev_sibling.take();
        let next = self.nodes[id.0].next_sibling.take();
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = next;
        }
        if let Some(next_id) = next {
            self.nodes[next_id.0].prev_sibling = prev;
        }
        self.nodes[parent.0].children.retain(|&child| child != id);
        self.nodes[id.0].parent = None;
        Ok(())
    }

    /// Set (or replace) an attribute. A replaced attribute keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAnElement`] if `id` is not an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let connected = self.is_connected(id);
        let data = self.element_mut(id)?;
        let old = data.attrs.insert(name.clone(), value.to_string());
        if connected {
            self.index
                .update_attribute(id, &name, old.as_deref(), Some(value));
        }
        Ok(())
    }

    /// Remove an attribute, returning its old value.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAnElement`] if `id` is not an element.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let name = name.to_ascii_lowercase();
        let connected = self.is_connected(id);
        let data = self.element_mut(id)?;
        let old = data.attrs.shift_remove(&name);
        if connected && old.is_some() {
            self.index.update_attribute(id, &name, old.as_deref(), None);
        }
        Ok(old)
    }

    /// Add `class` to the element's class list if it is not already there.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAnElement`] if `id` is not an element.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let data = self.as_element(id).ok_or(DomError::NotAnElement(id))?;
        if class.is_empty() || data.has_class(class) {
            return Ok(());
        }
        let value = match data.attrs.get("class") {
            Some(list) if !list.trim().is_empty() => format!("{} {class}", list.trim_end()),
            _ => class.to_string(),
        };
        self.set_attribute(id, "class", &value)
    }

    /// Remove every occurrence of `class` from the element's class list.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAnElement`] if `id` is not an element.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let data = self.as_element(id).ok_or(DomError::NotAnElement(id))?;
        if !data.has_class(class) {
            return Ok(());
        }
        let value = data
            .classes()
            .filter(|&c| c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(id, "class", &value)
    }

    /// Change an element's tag name.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAnElement`] if `id` is not an element.
    pub fn rename_element(&mut self, id: NodeId, tag_name: &str) -> Result<(), DomError> {
        let tag_name = tag_name.to_ascii_lowercase();
        let connected = self.is_connected(id);
        let data = self.element_mut(id)?;
        let old = std::mem::replace(&mut data.tag_name, tag_name.clone());
        if connected {
            self.index.rename_element(id, &old, &tag_name);
        }
        Ok(())
    }

    /// Replace the data of a text, comment or CDATA node.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidParent`] for nodes without character data.
    pub fn set_text(&mut self, id: NodeId, data: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.node_type {
            NodeType::Text(text) | NodeType::Comment(text) | NodeType::CData(text) => {
                data.clone_into(text);
                Ok(())
            }
            _ => Err(DomError::InvalidParent(id)),
        }
    }

    /// Deep-copy a node and its subtree. The copy is returned disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnknownNode`] for ids outside the arena.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId, DomError> {
        let node_type = self.node(id)?.node_type.clone();
        let copy = self.alloc(node_type);
        let mut pending = vec![(id, copy)];
        while let Some((source, target)) = pending.pop() {
            for child in self.nodes[source.0].children.clone() {
                let child_copy = self.alloc(self.nodes[child.0].node_type.clone());
                self.append_child(target, child_copy)?;
                pending.push((child, child_copy));
            }
        }
        Ok(copy)
    }

    fn ensure_pre_insertion_validity(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        // STEP 1: "If parent is not a Document, DocumentFragment, or Element
        //          node, then throw a HierarchyRequestError."
        if !self.node(parent)?.node_type.can_have_children() {
            return Err(DomError::InvalidParent(parent));
        }
        // STEP 2: "If node is a host-including inclusive ancestor of parent,
        //          then throw a HierarchyRequestError."
        let child_node = self.node(child)?;
        if child == parent
            || matches!(child_node.node_type, NodeType::Document)
            || self.is_descendant_of(parent, child)
        {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    fn index_subtree_if_connected(&mut self, id: NodeId) {
        if !self.is_connected(id) {
            return;
        }
        let mut indexed = 0_usize;
        for node in std::iter::once(id).chain(self.descendants(id)).collect::<Vec<_>>() {
            if let NodeType::Element(data) = &self.nodes[node.0].node_type {
                self.index.insert_element(node, data);
                indexed += 1;
            }
        }
        tracing::trace!(%id, indexed, "indexed attached subtree");
    }

    fn unindex_subtree(&mut self, id: NodeId) {
        for node in std::iter::once(id).chain(self.descendants(id)).collect::<Vec<_>>() {
            if let NodeType::Element(data) = &self.nodes[node.0].node_type {
                self.index.remove_element(node, data);
            }
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.node_mut(id)?.node_type {
            NodeType::Element(data) => Ok(data),
            _ => Err(DomError::NotAnElement(id)),
        }
    }
}

fn normalize(data: ElementData) -> ElementData {
    let self_closing = data.self_closing;
    ElementData {
        self_closing,
        ..ElementData::new(&data.tag_name, data.attrs)
    }
}
