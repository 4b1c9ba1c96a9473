//! Tests that the tag/id/class/attribute indices track every mutation.

use sable_dom::{DomTree, NodeId};

fn append(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let id = tree.create_element(tag, attrs.iter().copied());
    tree.append_child(parent, id).unwrap();
    id
}

fn tagged(tree: &DomTree, tag: &str) -> Vec<NodeId> {
    tree.elements_by_tag(tag)
        .map(|set| set.iter().copied().collect())
        .unwrap_or_default()
}

fn classed(tree: &DomTree, class: &str) -> Vec<NodeId> {
    tree.elements_by_class(class)
        .map(|set| set.iter().copied().collect())
        .unwrap_or_default()
}

#[test]
fn test_attach_indexes_element() {
    let mut tree = DomTree::new();
    let div = append(&mut tree, NodeId::ROOT, "div", &[("id", "main"), ("class", "a b")]);

    assert_eq!(tagged(&tree, "div"), vec![div]);
    assert_eq!(tree.element_by_id("main"), Some(div));
    assert_eq!(classed(&tree, "a"), vec![div]);
    assert_eq!(classed(&tree, "b"), vec![div]);
    assert!(tree.elements_with_attribute("class").unwrap().contains(&div));
    assert!(tree.is_indexed(div));
}

#[test]
fn test_disconnected_nodes_are_not_indexed() {
    let mut tree = DomTree::new();
    let loose = tree.create_element("div", [("id", "x")]);
    let child = tree.create_element("span", [("class", "c")]);
    tree.append_child(loose, child).unwrap();

    assert!(tree.elements_by_tag("div").is_none());
    assert!(tree.elements_by_tag("span").is_none());
    assert_eq!(tree.element_by_id("x"), None);
    assert!(!tree.is_indexed(child));
}

#[test]
fn test_attaching_subtree_indexes_every_descendant() {
    let mut tree = DomTree::new();
    let loose = tree.create_element("div", [("id", "x")]);
    let child = tree.create_element("span", [("class", "c")]);
    tree.append_child(loose, child).unwrap();

    tree.append_child(NodeId::ROOT, loose).unwrap();

    assert_eq!(tree.element_by_id("x"), Some(loose));
    assert_eq!(classed(&tree, "c"), vec![child]);
}

#[test]
fn test_detach_removes_subtree_from_index() {
    let mut tree = DomTree::new();
    let div = append(&mut tree, NodeId::ROOT, "div", &[("id", "outer")]);
    let span = append(&mut tree, div, "span", &[("class", "inner"), ("title", "t")]);

    tree.detach(div).unwrap();

    assert!(tree.elements_by_tag("div").is_none());
    assert!(tree.elements_by_tag("span").is_none());
    assert_eq!(tree.element_by_id("outer"), None);
    assert!(tree.elements_by_class("inner").is_none());
    assert!(tree.elements_with_attribute("title").is_none());
    assert!(!tree.is_connected(span));
    assert_eq!(tree.index().key_count(), 0);
}

#[test]
fn test_move_within_document_keeps_single_entry() {
    let mut tree = DomTree::new();
    let a = append(&mut tree, NodeId::ROOT, "section", &[]);
    let b = append(&mut tree, NodeId::ROOT, "section", &[]);
    let p = append(&mut tree, a, "p", &[("id", "para")]);

    tree.append_child(b, p).unwrap();

    assert_eq!(tagged(&tree, "p"), vec![p]);
    assert_eq!(tree.elements_with_id("para"), &[p]);
}

#[test]
fn test_attribute_edits_update_index() {
    let mut tree = DomTree::new();
    let div = append(&mut tree, NodeId::ROOT, "div", &[("class", "old")]);

    tree.set_attribute(div, "class", "new other").unwrap();
    assert!(classed(&tree, "old").is_empty());
    assert_eq!(classed(&tree, "new"), vec![div]);
    assert_eq!(classed(&tree, "other"), vec![div]);

    tree.set_attribute(div, "id", "first").unwrap();
    tree.set_attribute(div, "id", "second").unwrap();
    assert_eq!(tree.element_by_id("first"), None);
    assert_eq!(tree.element_by_id("second"), Some(div));

    let old = tree.remove_attribute(div, "class").unwrap();
    assert_eq!(old.as_deref(), Some("new other"));
    assert!(classed(&tree, "new").is_empty());
    assert!(tree.elements_with_attribute("class").is_none());
}

#[test]
fn test_rename_updates_tag_index() {
    let mut tree = DomTree::new();
    let el = append(&mut tree, NodeId::ROOT, "b", &[]);

    tree.rename_element(el, "STRONG").unwrap();

    assert!(tree.elements_by_tag("b").is_none());
    assert_eq!(tagged(&tree, "strong"), vec![el]);
    assert_eq!(tree.tag_name(el), Some("strong"));
}

#[test]
fn test_duplicate_id_last_attached_wins() {
    let mut tree = DomTree::new();
    let first = append(&mut tree, NodeId::ROOT, "div", &[("id", "x")]);
    let second = append(&mut tree, NodeId::ROOT, "span", &[("id", "x")]);

    assert_eq!(tree.element_by_id("x"), Some(second));
    assert_eq!(tree.elements_with_id("x"), &[first, second]);

    tree.detach(second).unwrap();
    assert_eq!(tree.element_by_id("x"), Some(first));
}

#[test]
fn test_edits_on_detached_element_are_indexed_on_attach() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div", Vec::<(&str, &str)>::new());
    tree.set_attribute(div, "id", "late").unwrap();
    tree.add_class(div, "k").unwrap();
    assert_eq!(tree.element_by_id("late"), None);

    tree.append_child(NodeId::ROOT, div).unwrap();

    assert_eq!(tree.element_by_id("late"), Some(div));
    assert_eq!(classed(&tree, "k"), vec![div]);
}
