//! [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
//!
//! Chains are matched right to left. The subject clause picks its candidates
//! from the tree's indices; each candidate is then verified in full and the
//! remaining clauses are checked by walking ancestors or preceding siblings,
//! backtracking over every qualifying relative. Failed `(clause, element)`
//! pairs are remembered for the rest of the chain's evaluation, so each pair
//! is walked at most once however deep the tree or long the chain.
//!
//! A query runs against a context node (the Document when none is given).
//! Results are the context's descendants; relative walks never climb past
//! it, and the context itself is only ever related to a chain's leading
//! combinator.

use std::collections::{BTreeSet, HashSet};

use sable_dom::{DomTree, ElementData, NodeId, NodeType};

use super::ast::{Combinator, PseudoClass, SelectorChain, SelectorClause, SelectorList, SimpleSelector};

/// Form controls that `:enabled` and `:disabled` apply to.
const FORM_CONTROLS: [&str; 7] = [
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

/// Select every element matching `selectors` under `context` (the Document
/// when `None`), in document order and without duplicates.
///
/// The context node itself is never part of the result.
#[must_use]
pub fn select(tree: &DomTree, selectors: &SelectorList, context: Option<NodeId>) -> Vec<NodeId> {
    let context = context.unwrap_or(NodeId::ROOT);
    let mut results = Vec::new();

    for chain in selectors.chains() {
        let (Some(scope), Some(subject)) = (scope_root(tree, chain, context), chain.subject()) else {
            continue;
        };
        let candidates = candidates(tree, subject, scope);
        tracing::trace!(
            selector = %chain,
            candidates = candidates.len(),
            "matching selector chain"
        );
        let mut matcher = ChainMatcher::new(tree, chain, context, scope);
        results.extend(candidates.into_iter().filter(|&element| matcher.matches(element)));
    }

    into_document_order(tree, results, context)
}

/// Reference implementation of [`select`] that ignores the indices and
/// tests every element of the tree.
#[must_use]
pub fn select_by_scan(tree: &DomTree, selectors: &SelectorList, context: Option<NodeId>) -> Vec<NodeId> {
    let context = context.unwrap_or(NodeId::ROOT);
    let mut results = Vec::new();

    for chain in selectors.chains() {
        let Some(scope) = scope_root(tree, chain, context) else {
            continue;
        };
        let mut matcher = ChainMatcher::new(tree, chain, context, scope);
        results.extend(tree.node_ids().filter(|&id| {
            tree.is_element(id) && tree.is_descendant_of(id, scope) && matcher.matches(id)
        }));
    }

    into_document_order(tree, results, context)
}

impl SelectorList {
    /// Whether `element` matches any chain of the list, using the root of
    /// its tree as the context.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        let root = tree.tree_root(element);
        self.chains()
            .iter()
            .any(|chain| ChainMatcher::new(tree, chain, root, root).matches(element))
    }
}

/// The node whose descendants can match `chain`: the context, or its parent
/// when the chain opens with a sibling combinator.
fn scope_root(tree: &DomTree, chain: &SelectorChain, context: NodeId) -> Option<NodeId> {
    match chain.leading_combinator() {
        Combinator::NextSibling | Combinator::SubsequentSibling => tree.parent(context),
        _ => Some(context),
    }
}

/// Shrink the search to the smallest index set.
///
/// Every id holder is a candidate, so duplicate ids never hide a match.
/// Without an indexable constraint, or when the scope is not connected to
/// the document, the scope's descendant elements are scanned.
fn candidates(tree: &DomTree, subject: &SimpleSelector, scope: NodeId) -> Vec<NodeId> {
    if !tree.is_connected(scope) {
        return descendant_elements(tree, scope);
    }
    let in_scope = |id: &NodeId| scope == NodeId::ROOT || tree.is_descendant_of(*id, scope);

    if let Some(id) = &subject.id {
        return tree.elements_with_id(id).iter().copied().filter(in_scope).collect();
    }

    let mut sets: Vec<Option<&BTreeSet<NodeId>>> = Vec::new();
    if let Some(tag) = &subject.tag {
        sets.push(tree.elements_by_tag(tag));
    }
    sets.extend(subject.classes.iter().map(|class| tree.elements_by_class(class)));
    sets.extend(
        subject
            .attributes
            .iter()
            .filter(|predicate| predicate.operator.requires_presence())
            .map(|predicate| tree.elements_with_attribute(&predicate.name)),
    );

    if sets.is_empty() {
        return descendant_elements(tree, scope);
    }
    // A missing index key means no element qualifies.
    let Some(mut sets) = sets.into_iter().collect::<Option<Vec<_>>>() else {
        return Vec::new();
    };
    sets.sort_by_key(|set| set.len());
    let Some((smallest, rest)) = sets.split_first() else {
        return Vec::new();
    };
    smallest
        .iter()
        .copied()
        .filter(|id| rest.iter().all(|set| set.contains(id)))
        .filter(in_scope)
        .collect()
}

fn descendant_elements(tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
    tree.descendants(scope)
        .filter(|&id| tree.is_element(id))
        .collect()
}

fn into_document_order(tree: &DomTree, mut results: Vec<NodeId>, context: NodeId) -> Vec<NodeId> {
    results.retain(|&id| id != context);
    results.sort_by_cached_key(|&id| tree.tree_position(id));
    results.dedup();
    results
}

/// Matches one chain against candidate subjects under a fixed context.
struct ChainMatcher<'a> {
    tree: &'a DomTree,
    chain: &'a SelectorChain,
    context: NodeId,
    /// The node relative walks stop at: the context, or the context's parent
    /// for chains opening with a sibling combinator.
    boundary: NodeId,
    /// `(clauses left, element)` pairs already known to fail.
    failed: HashSet<(usize, NodeId)>,
}

impl<'a> ChainMatcher<'a> {
    fn new(tree: &'a DomTree, chain: &'a SelectorChain, context: NodeId, boundary: NodeId) -> Self {
        Self {
            tree,
            chain,
            context,
            boundary,
            failed: HashSet::new(),
        }
    }

    /// Match `element` as the subject of the chain.
    fn matches(&mut self, element: NodeId) -> bool {
        let chain = self.chain;
        let Some((subject, rest)) = chain.clauses.split_last() else {
            return false;
        };
        simple_matches(self.tree, &subject.selector, element)
            && self.relatives_match(rest.len(), subject.combinator, element)
    }

    /// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
    ///
    /// `combinator` relates `element` to clause `left - 1`, the last of the
    /// `left` clauses still unmatched. Every qualifying relative is tried
    /// before giving up.
    fn relatives_match(&mut self, left: usize, combinator: Combinator, element: NodeId) -> bool {
        let tree = self.tree;
        let chain = self.chain;
        let Some(clause) = left.checked_sub(1).and_then(|index| chain.clauses.get(index)) else {
            return leading_relation_holds(tree, combinator, element, self.context);
        };
        if self.failed.contains(&(left, element)) {
            return false;
        }
        let boundary = self.boundary;

        let found = match combinator {
            // [§ 16.1 Descendant combinator]
            // "an element B that is an arbitrary descendant of some ancestor element A"
            Combinator::None | Combinator::Descendant => self.any_relative(
                clause,
                left,
                tree.ancestors(element).take_while(|&ancestor| ancestor != boundary),
            ),

            // [§ 16.2 Child combinator]
            // "an element B that is a direct child of element A"
            Combinator::Child => self.any_relative(
                clause,
                left,
                tree.parent(element).filter(|&parent| parent != boundary),
            ),

            // [§ 16.3 Next-sibling combinator]
            // "an element B that immediately follows element A"
            Combinator::NextSibling => {
                self.any_relative(clause, left, previous_element_sibling(tree, element))
            }

            // [§ 16.4 Subsequent-sibling combinator]
            // "an element B that follows element A (not necessarily immediately)"
            Combinator::SubsequentSibling => self.any_relative(
                clause,
                left,
                tree.preceding_siblings(element)
                    .filter(|&sibling| tree.is_element(sibling)),
            ),
        };

        if !found {
            let _ = self.failed.insert((left, element));
        }
        found
    }

    fn any_relative(
        &mut self,
        clause: &SelectorClause,
        left: usize,
        relatives: impl IntoIterator<Item = NodeId>,
    ) -> bool {
        let tree = self.tree;
        let context = self.context;
        relatives.into_iter().any(|relative| {
            relative != context
                && simple_matches(tree, &clause.selector, relative)
                && self.relatives_match(left - 1, clause.combinator, relative)
        })
    }
}

/// The leftmost clause's element against the context node.
fn leading_relation_holds(tree: &DomTree, combinator: Combinator, element: NodeId, context: NodeId) -> bool {
    match combinator {
        // Candidates are already restricted to the context's descendants.
        Combinator::None | Combinator::Descendant => true,
        Combinator::Child => tree.parent(element) == Some(context),
        Combinator::NextSibling => previous_element_sibling(tree, element) == Some(context),
        Combinator::SubsequentSibling => tree.preceding_siblings(element).any(|sibling| sibling == context),
    }
}

fn previous_element_sibling(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(id).find(|&sibling| tree.is_element(sibling))
}

/// Test every constraint of `selector` against one element.
fn simple_matches(tree: &DomTree, selector: &SimpleSelector, id: NodeId) -> bool {
    let Some(element) = tree.as_element(id) else {
        return false;
    };
    selector.tag.as_ref().is_none_or(|tag| element.tag_name == *tag)
        && selector.id.as_ref().is_none_or(|expected| element.id() == Some(expected.as_str()))
        && selector.classes.iter().all(|class| element.has_class(class))
        && selector.attributes.iter().all(|predicate| {
            predicate
                .operator
                .matches(element.get_attribute(&predicate.name), &predicate.value)
        })
        && selector
            .pseudo_classes
            .iter()
            .all(|pseudo| pseudo_class_matches(tree, pseudo, id, element))
}

/// [§ 3.5 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
///
/// Structural pseudo-classes count 1-based positions among element siblings
/// and never match an element without a parent.
fn pseudo_class_matches(tree: &DomTree, pseudo: &PseudoClass, id: NodeId, element: &ElementData) -> bool {
    let position = |of_type: bool, from_end: bool| sibling_position(tree, id, element, of_type, from_end);
    let only = |of_type: bool| position(of_type, false) == Some(1) && position(of_type, true) == Some(1);

    match pseudo {
        PseudoClass::FirstChild => position(false, false) == Some(1),
        PseudoClass::LastChild => position(false, true) == Some(1),
        PseudoClass::OnlyChild => only(false),
        PseudoClass::NthChild(nth) => position(false, false).is_some_and(|p| nth.matches(p)),
        PseudoClass::NthLastChild(nth) => position(false, true).is_some_and(|p| nth.matches(p)),
        PseudoClass::FirstOfType => position(true, false) == Some(1),
        PseudoClass::LastOfType => position(true, true) == Some(1),
        PseudoClass::OnlyOfType => only(true),
        PseudoClass::NthOfType(nth) => position(true, false).is_some_and(|p| nth.matches(p)),
        PseudoClass::NthLastOfType(nth) => position(true, true).is_some_and(|p| nth.matches(p)),

        // [§ 14.2 :empty]
        // "Represents an element that has no children except, optionally,
        // document white space characters."
        // Comments and zero-length text are ignored here; any other text counts.
        PseudoClass::Empty => tree.children(id).iter().all(|&child| {
            match tree.get(child).map(|node| &node.node_type) {
                Some(NodeType::Comment(_)) => true,
                Some(NodeType::Text(text)) => text.is_empty(),
                _ => false,
            }
        }),

        PseudoClass::Root => tree.document_element() == Some(id),
        PseudoClass::Not(list) => !list.matches(tree, id),
        PseudoClass::Contains(text) => tree.text_content(id).contains(text.as_str()),

        // [§ 13.3.1 :checked]
        // Checkboxes and radio buttons carry `checked`; options carry `selected`.
        PseudoClass::Checked => {
            element.get_attribute("checked").is_some()
                || (element.tag_name == "option" && element.get_attribute("selected").is_some())
        }

        PseudoClass::Disabled => is_form_control(element) && element.get_attribute("disabled").is_some(),
        PseudoClass::Enabled => is_form_control(element) && element.get_attribute("disabled").is_none(),
    }
}

fn is_form_control(element: &ElementData) -> bool {
    FORM_CONTROLS.contains(&element.tag_name.as_str())
}

/// 1-based position of `id` among its parent's element children, optionally
/// only those sharing its tag, counted from the first or the last.
fn sibling_position(
    tree: &DomTree,
    id: NodeId,
    element: &ElementData,
    of_type: bool,
    from_end: bool,
) -> Option<usize> {
    let _ = tree.parent(id)?;
    let counts = |sibling: &NodeId| {
        tree.as_element(*sibling)
            .is_some_and(|other| !of_type || other.tag_name == element.tag_name)
    };
    let before = if from_end {
        tree.following_siblings(id).filter(counts).count()
    } else {
        tree.preceding_siblings(id).filter(counts).count()
    };
    Some(before + 1)
}
