//! Property tests over generated documents and selectors.
//!
//! Documents are generated as well-formed fragments that the default rule
//! tables leave untouched, so rendering and re-parsing must reproduce them.

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use sable_core::css::{select, select_by_scan};
use sable_core::dom::{DomTree, NodeId, NodeType};
use sable_core::{Document, ParserRules, RenderOptions, SelectorList};

const TAGS: &[&str] = &["div", "span", "section", "ul", "li", "p", "em", "a", "br"];
const CLASSES: &[&str] = &["c1", "c2", "c3"];
const IDS: &[&str] = &["i1", "i2"];
const TEXT_CHARS: &[char] = &['a', 'b', ' ', '&', '<', '>', '"', 'é'];
const MAX_DEPTH: usize = 4;

// ========== Generated documents ==========

#[derive(Debug, Clone, PartialEq, Eq)]
enum Markup {
    Element {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
        children: Vec<Self>,
    },
    Text(String),
}

/// A list of top-level nodes.
#[derive(Debug, Clone)]
struct Fragment(Vec<Markup>);

fn pick<T: Copy>(g: &mut Gen, items: &[T]) -> T {
    *g.choose(items).unwrap()
}

fn below(g: &mut Gen, bound: usize) -> usize {
    usize::arbitrary(g) % bound
}

fn text(g: &mut Gen) -> String {
    let len = 1 + below(g, 6);
    (0..len).map(|_| pick(g, TEXT_CHARS)).collect()
}

fn attributes(g: &mut Gen) -> Vec<(&'static str, String)> {
    let mut attrs = Vec::new();
    if bool::arbitrary(g) {
        let count = 1 + below(g, CLASSES.len());
        let classes: Vec<&str> = (0..count).map(|_| pick(g, CLASSES)).collect();
        attrs.push(("class", classes.join(" ")));
    }
    if below(g, 3) == 0 {
        attrs.push(("id", pick(g, IDS).to_string()));
    }
    if below(g, 3) == 0 {
        attrs.push(("title", text(g)));
    }
    attrs
}

/// Children for an element with tag `parent`, never placing a tag the rules
/// would implicitly close `parent` for, and never two text nodes in a row.
fn children(g: &mut Gen, parent: &str, depth: usize, rules: &ParserRules) -> Vec<Markup> {
    let mut nodes: Vec<Markup> = Vec::new();
    if depth >= MAX_DEPTH {
        return nodes;
    }
    let count = below(g, 4);
    for _ in 0..count {
        let after_text = matches!(nodes.last(), Some(Markup::Text(_)));
        if !after_text && below(g, 3) == 0 {
            nodes.push(Markup::Text(text(g)));
            continue;
        }
        let tag = pick(g, TAGS);
        if rules.closes(parent, tag) {
            continue;
        }
        let children = if rules.is_void(tag) {
            Vec::new()
        } else {
            children(g, tag, depth + 1, rules)
        };
        nodes.push(Markup::Element {
            tag,
            attrs: attributes(g),
            children,
        });
    }
    nodes
}

impl Arbitrary for Fragment {
    fn arbitrary(g: &mut Gen) -> Self {
        Self(children(g, "", 0, &ParserRules::default()))
    }
}

impl Fragment {
    fn build(&self) -> DomTree {
        let mut tree = DomTree::new();
        for node in &self.0 {
            build_node(&mut tree, NodeId::ROOT, node);
        }
        tree
    }
}

fn build_node(tree: &mut DomTree, parent: NodeId, markup: &Markup) {
    let id = match markup {
        Markup::Element { tag, attrs, .. } => tree.create_element(tag, attrs.iter().map(|(k, v)| (*k, v.clone()))),
        Markup::Text(data) => tree.create_text(data.clone()),
    };
    tree.append_child(parent, id).unwrap();
    if let Markup::Element { children, .. } = markup {
        for child in children {
            build_node(tree, id, child);
        }
    }
}

/// Read a tree back into the generated shape, for structural comparison.
fn shape(tree: &DomTree, parent: NodeId) -> Vec<(String, Vec<(String, String)>, String, usize)> {
    let mut out = Vec::new();
    collect_shape(tree, parent, 0, &mut out);
    out
}

fn collect_shape(
    tree: &DomTree,
    id: NodeId,
    depth: usize,
    out: &mut Vec<(String, Vec<(String, String)>, String, usize)>,
) {
    for &child in tree.children(id) {
        match &tree.get(child).unwrap().node_type {
            NodeType::Element(data) => {
                let attrs = data.attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                out.push((data.tag_name.clone(), attrs, String::new(), depth));
                collect_shape(tree, child, depth + 1, out);
            }
            NodeType::Text(text) => out.push(("#text".to_string(), Vec::new(), text.clone(), depth)),
            other => out.push((format!("{other:?}"), Vec::new(), String::new(), depth)),
        }
    }
}

// ========== Generated selectors ==========

#[derive(Debug, Clone)]
struct Query(String);

fn compound(g: &mut Gen) -> String {
    let mut out = String::new();
    match below(g, 4) {
        0 => out.push('*'),
        1 | 2 => out.push_str(pick(g, TAGS)),
        _ => {}
    }
    if bool::arbitrary(g) {
        out.push('.');
        out.push_str(pick(g, CLASSES));
    }
    if below(g, 4) == 0 {
        out.push('#');
        out.push_str(pick(g, IDS));
    }
    if below(g, 4) == 0 {
        out.push_str(pick(g, &["[title]", "[class~=c2]", "[class^=c]", "[id|=i1]", "[title*=a]"]));
    }
    if below(g, 3) == 0 {
        out.push_str(pick(
            g,
            &[
                ":first-child",
                ":last-child",
                ":only-child",
                ":nth-child(2n+1)",
                ":nth-last-child(2)",
                ":first-of-type",
                ":nth-of-type(-n+2)",
                ":empty",
                ":root",
                ":not(.c1)",
                ":not(span, em)",
                ":contains(a)",
            ],
        ));
    }
    if out.is_empty() {
        out.push('*');
    }
    out
}

impl Arbitrary for Query {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut selector = String::new();
        let chains = 1 + below(g, 2);
        for chain in 0..chains {
            if chain > 0 {
                selector.push_str(", ");
            }
            if below(g, 5) == 0 {
                selector.push_str(pick(g, &["> ", "+ ", "~ "]));
            }
            selector.push_str(&compound(g));
            for _ in 0..below(g, 3) {
                selector.push_str(pick(g, &[" ", " > ", " + ", " ~ "]));
                selector.push_str(&compound(g));
            }
        }
        Self(selector)
    }
}

// ========== Generated mutations ==========

/// One DOM edit. Node operands are picks, resolved modulo the node count
/// when the edit is applied.
#[derive(Debug, Clone)]
enum Edit {
    Detach(usize),
    Append { parent: usize, child: usize },
    InsertBefore { parent: usize, child: usize, reference: usize },
    SetAttribute(usize, &'static str, String),
    RemoveAttribute(usize, &'static str),
    Rename(usize, &'static str),
    AddClass(usize, &'static str),
    RemoveClass(usize, &'static str),
    CloneInto { source: usize, parent: usize },
}

#[derive(Debug, Clone)]
struct EditScript(Vec<Edit>);

const EDITED_ATTRIBUTES: &[&str] = &["class", "id", "title"];

fn attribute_value(g: &mut Gen, name: &str) -> String {
    match name {
        "class" => format!("{} {}", pick(g, CLASSES), pick(g, CLASSES)),
        "id" => pick(g, IDS).to_string(),
        _ => text(g),
    }
}

impl Arbitrary for Edit {
    fn arbitrary(g: &mut Gen) -> Self {
        let node = usize::arbitrary(g);
        match below(g, 9) {
            0 => Self::Detach(node),
            1 => Self::Append {
                parent: node,
                child: usize::arbitrary(g),
            },
            2 => Self::InsertBefore {
                parent: node,
                child: usize::arbitrary(g),
                reference: usize::arbitrary(g),
            },
            3 => {
                let name = pick(g, EDITED_ATTRIBUTES);
                Self::SetAttribute(node, name, attribute_value(g, name))
            }
            4 => Self::RemoveAttribute(node, pick(g, EDITED_ATTRIBUTES)),
            5 => Self::Rename(node, pick(g, TAGS)),
            6 => Self::AddClass(node, pick(g, CLASSES)),
            7 => Self::RemoveClass(node, pick(g, CLASSES)),
            _ => Self::CloneInto {
                source: node,
                parent: usize::arbitrary(g),
            },
        }
    }
}

impl Arbitrary for EditScript {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = below(g, 12);
        Self((0..len).map(|_| Edit::arbitrary(g)).collect())
    }
}

impl EditScript {
    /// Apply every edit in order. Edits the tree rejects (cycles, non-element
    /// targets, the Document as a child) are skipped.
    fn apply(&self, tree: &mut DomTree) {
        for edit in &self.0 {
            let nodes: Vec<NodeId> = tree.node_ids().collect();
            let at = |pick: usize| nodes[pick % nodes.len()];
            match edit {
                Edit::Detach(node) => {
                    let _ = tree.detach(at(*node));
                }
                Edit::Append { parent, child } => {
                    let _ = tree.append_child(at(*parent), at(*child));
                }
                Edit::InsertBefore {
                    parent,
                    child,
                    reference,
                } => {
                    let parent = at(*parent);
                    let siblings = tree.children(parent).to_vec();
                    if siblings.is_empty() {
                        let _ = tree.append_child(parent, at(*child));
                    } else {
                        let reference = siblings[reference % siblings.len()];
                        let _ = tree.insert_before(parent, at(*child), reference);
                    }
                }
                Edit::SetAttribute(node, name, value) => {
                    let _ = tree.set_attribute(at(*node), name, value);
                }
                Edit::RemoveAttribute(node, name) => {
                    let _ = tree.remove_attribute(at(*node), name);
                }
                Edit::Rename(node, tag) => {
                    let _ = tree.rename_element(at(*node), tag);
                }
                Edit::AddClass(node, class) => {
                    let _ = tree.add_class(at(*node), class);
                }
                Edit::RemoveClass(node, class) => {
                    let _ = tree.remove_class(at(*node), class);
                }
                Edit::CloneInto { source, parent } => {
                    if let Ok(copy) = tree.clone_subtree(at(*source)) {
                        let _ = tree.append_child(at(*parent), copy);
                    }
                }
            }
        }
    }
}

// ========== Properties ==========

#[quickcheck]
fn prop_render_then_parse_preserves_structure(fragment: Fragment) -> bool {
    let tree = fragment.build();
    let html = Document::from_tree(tree.clone()).render();
    let reparsed = Document::parse(&html);
    shape(&tree, NodeId::ROOT) == shape(reparsed.tree(), NodeId::ROOT)
}

#[quickcheck]
fn prop_unquoted_render_preserves_structure(fragment: Fragment) -> bool {
    let tree = fragment.build();
    let options = RenderOptions {
        quote_all_attributes: false,
        ..RenderOptions::default()
    };
    let html = Document::from_tree(tree.clone()).render_with(&options);
    shape(&tree, NodeId::ROOT) == shape(Document::parse(&html).tree(), NodeId::ROOT)
}

#[quickcheck]
fn prop_index_matches_linear_scan(fragment: Fragment, query: Query) -> bool {
    let tree = fragment.build();
    let selectors: SelectorList = query.0.parse().unwrap();
    select(&tree, &selectors, None) == select_by_scan(&tree, &selectors, None)
}

#[quickcheck]
fn prop_scoped_index_matches_linear_scan(fragment: Fragment, query: Query, pick_context: usize) -> bool {
    let tree = fragment.build();
    let selectors: SelectorList = query.0.parse().unwrap();
    let elements: Vec<NodeId> = tree.node_ids().filter(|&id| tree.is_element(id)).collect();
    if elements.is_empty() {
        return true;
    }
    let context = elements[pick_context % elements.len()];
    select(&tree, &selectors, Some(context)) == select_by_scan(&tree, &selectors, Some(context))
}

#[quickcheck]
fn prop_results_are_ordered_and_unique(fragment: Fragment, query: Query) -> bool {
    let tree = fragment.build();
    let selectors: SelectorList = query.0.parse().unwrap();
    let found = select(&tree, &selectors, None);
    found
        .windows(2)
        .all(|pair| tree.compare_document_position(pair[0], pair[1]) == Ok(std::cmp::Ordering::Less))
}

#[quickcheck]
fn prop_selector_display_reparses(query: Query) -> bool {
    let selectors: SelectorList = query.0.parse().unwrap();
    selectors.to_string().parse::<SelectorList>() == Ok(selectors)
}

#[quickcheck]
fn prop_index_matches_linear_scan_after_edits(fragment: Fragment, script: EditScript, query: Query) -> bool {
    let mut tree = fragment.build();
    script.apply(&mut tree);
    let selectors: SelectorList = query.0.parse().unwrap();
    select(&tree, &selectors, None) == select_by_scan(&tree, &selectors, None)
}

#[quickcheck]
fn prop_scoped_index_matches_linear_scan_after_edits(
    fragment: Fragment,
    script: EditScript,
    query: Query,
    pick_context: usize,
) -> bool {
    let mut tree = fragment.build();
    script.apply(&mut tree);
    let selectors: SelectorList = query.0.parse().unwrap();
    // Detached subtrees are valid contexts too.
    let elements: Vec<NodeId> = tree.node_ids().filter(|&id| tree.is_element(id)).collect();
    if elements.is_empty() {
        return true;
    }
    let context = elements[pick_context % elements.len()];
    select(&tree, &selectors, Some(context)) == select_by_scan(&tree, &selectors, Some(context))
}
