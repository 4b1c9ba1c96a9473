//! Lookup indices over the connected elements of a [`DomTree`](crate::DomTree).
//!
//! The tree owns exactly one [`DomIndex`]. Entries are added when an element
//! becomes connected to the document and removed when it is detached, and
//! attribute edits on connected elements update only the affected keys.
//! Nothing here ever rebuilds from scratch.

use std::collections::{BTreeSet, HashMap};

use crate::{ElementData, NodeId};

/// Tag, id, class and attribute indices for connected elements.
#[derive(Debug, Clone, Default)]
pub struct DomIndex {
    tags: HashMap<String, BTreeSet<NodeId>>,
    /// Holders of each id value in attach order. The last entry wins.
    ids: HashMap<String, Vec<NodeId>>,
    classes: HashMap<String, BTreeSet<NodeId>>,
    attributes: HashMap<String, BTreeSet<NodeId>>,
}

impl DomIndex {
    /// Elements whose tag name is `tag`.
    #[must_use]
    pub fn by_tag(&self, tag: &str) -> Option<&BTreeSet<NodeId>> {
        self.tags.get(tag)
    }

    /// The element holding `id`. With duplicates, the most recently
    /// attached holder.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).and_then(|holders| holders.last().copied())
    }

    /// Every element holding `id`, in attach order.
    #[must_use]
    pub fn all_with_id(&self, id: &str) -> &[NodeId] {
        self.ids.get(id).map_or(&[], Vec::as_slice)
    }

    /// Elements whose class list contains `class`.
    #[must_use]
    pub fn by_class(&self, class: &str) -> Option<&BTreeSet<NodeId>> {
        self.classes.get(class)
    }

    /// Elements carrying an attribute called `name`.
    #[must_use]
    pub fn by_attribute(&self, name: &str) -> Option<&BTreeSet<NodeId>> {
        self.attributes.get(name)
    }

    /// Number of distinct keys across all four maps.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.tags.len() + self.ids.len() + self.classes.len() + self.attributes.len()
    }

    pub(crate) fn insert_element(&mut self, id: NodeId, data: &ElementData) {
        let _ = self.tags.entry(data.tag_name.clone()).or_default().insert(id);
        for (name, value) in &data.attrs {
            self.update_attribute(id, name, None, Some(value));
        }
    }

    pub(crate) fn remove_element(&mut self, id: NodeId, data: &ElementData) {
        remove_from_set(&mut self.tags, &data.tag_name, id);
        for (name, value) in &data.attrs {
            self.update_attribute(id, name, Some(value), None);
        }
    }

    pub(crate) fn rename_element(&mut self, id: NodeId, old_tag: &str, new_tag: &str) {
        remove_from_set(&mut self.tags, old_tag, id);
        let _ = self.tags.entry(new_tag.to_string()).or_default().insert(id);
    }

    /// Record that attribute `name` on `id` changed from `old` to `new`
    /// (`None` meaning absent).
    pub(crate) fn update_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) {
        match (old.is_some(), new.is_some()) {
            (false, true) => {
                let _ = self.attributes.entry(name.to_string()).or_default().insert(id);
            }
            (true, false) => remove_from_set(&mut self.attributes, name, id),
            _ => {}
        }

        match name {
            "id" => {
                if let Some(old_id) = old {
                    self.remove_id(old_id, id);
                }
                if let Some(new_id) = new {
                    self.ids.entry(new_id.to_string()).or_default().push(id);
                }
            }
            "class" => {
                for class in old.into_iter().flat_map(str::split_ascii_whitespace) {
                    remove_from_set(&mut self.classes, class, id);
                }
                for class in new.into_iter().flat_map(str::split_ascii_whitespace) {
                    let _ = self.classes.entry(class.to_string()).or_default().insert(id);
                }
            }
            _ => {}
        }
    }

    fn remove_id(&mut self, value: &str, id: NodeId) {
        if let Some(holders) = self.ids.get_mut(value) {
            holders.retain(|&holder| holder != id);
            if holders.is_empty() {
                let _ = self.ids.remove(value);
            }
        }
    }
}

fn remove_from_set(map: &mut HashMap<String, BTreeSet<NodeId>>, key: &str, id: NodeId) {
    if let Some(set) = map.get_mut(key) {
        let _ = set.remove(&id);
        if set.is_empty() {
            let _ = map.remove(key);
        }
    }
}
