//! Integration tests for selector matching against parsed documents.

use std::time::{Duration, Instant};

use sable_css::selector::{SelectorList, parse_selector_list, select, select_by_scan};
use sable_dom::{DomTree, NodeId};
use sable_html::parse_html;

/// Helper to run a query and check it against the reference scan
fn query_in(tree: &DomTree, selector: &str, context: Option<NodeId>) -> Vec<NodeId> {
    let list = parse_selector_list(selector).unwrap();
    let found = select(tree, &list, context);
    assert_eq!(
        found,
        select_by_scan(tree, &list, context),
        "index and scan disagree for `{selector}`"
    );
    found
}

/// Helper to query a document and label the results by id (or tag name)
fn labels(tree: &DomTree, selector: &str) -> Vec<String> {
    label_nodes(tree, &query_in(tree, selector, None))
}

fn label_nodes(tree: &DomTree, nodes: &[NodeId]) -> Vec<String> {
    nodes
        .iter()
        .map(|&id| {
            tree.get_attribute(id, "id")
                .or_else(|| tree.tag_name(id))
                .unwrap_or("?")
                .to_string()
        })
        .collect()
}

fn by_id(tree: &DomTree, id: &str) -> NodeId {
    tree.element_by_id(id).unwrap()
}

#[test]
fn test_type_and_class_selectors() {
    let tree = parse_html(r#"<div id="d"><p id="a" class="x y"></p><p id="b" class="y"></p></div>"#);
    assert_eq!(labels(&tree, "p"), vec!["a", "b"]);
    assert_eq!(labels(&tree, ".y"), vec!["a", "b"]);
    assert_eq!(labels(&tree, ".y.x"), vec!["a"]);
    assert_eq!(labels(&tree, "div.y"), Vec::<String>::new());
    assert_eq!(labels(&tree, "*"), vec!["d", "a", "b"]);
}

#[test]
fn test_id_is_verified_against_other_constraints() {
    let tree = parse_html(r#"<p id="x" class="a"></p>"#);
    assert_eq!(labels(&tree, "#x"), vec!["x"]);
    assert_eq!(labels(&tree, "p#x.a"), vec!["x"]);
    assert!(labels(&tree, "div#x").is_empty());
    assert!(labels(&tree, "#x.b").is_empty());
}

#[test]
fn test_duplicate_ids() {
    let tree = parse_html(r#"<p id="x"></p><span id="x"></span>"#);
    assert_eq!(tree.tag_name(by_id(&tree, "x")), Some("span"));

    let all = query_in(&tree, "#x", None);
    let tags: Vec<_> = all.iter().map(|&id| tree.tag_name(id).unwrap()).collect();
    assert_eq!(tags, vec!["p", "span"]);

    let only_p = query_in(&tree, "p#x", None);
    assert_eq!(only_p.len(), 1);
    assert_eq!(tree.tag_name(only_p[0]), Some("p"));
}

#[test]
fn test_descendant_and_child() {
    let tree = parse_html(
        r#"<div id="d"><section id="s"><p id="p1"></p></section><p id="p2"></p></div>"#,
    );
    assert_eq!(labels(&tree, "div p"), vec!["p1", "p2"]);
    assert_eq!(labels(&tree, "div > p"), vec!["p2"]);
    assert_eq!(labels(&tree, "section > p"), vec!["p1"]);
    assert_eq!(labels(&tree, "div section p"), vec!["p1"]);
    assert!(labels(&tree, "section div").is_empty());
}

#[test]
fn test_descendant_walk_backtracks() {
    // The nearest div ancestor of the span is not a child of `.a`, but the
    // next one is.
    let tree = parse_html(
        r#"<div class="a"><div id="mid"><div id="near"><span id="t"></span></div></div></div>"#,
    );
    assert_eq!(labels(&tree, ".a > div span"), vec!["t"]);
    assert_eq!(labels(&tree, ".a > div"), vec!["mid"]);
}

#[test]
fn test_failed_descendant_chain_on_deep_tree_is_fast() {
    let depth = 60;
    let html = format!("{}<p></p>{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let tree = parse_html(&html);

    let start = Instant::now();
    assert!(labels(&tree, "section div div div div div div div div p").is_empty());
    assert!(labels(&tree, "div ~ div div div div div div div div p").is_empty());
    assert_eq!(labels(&tree, "div div div div div div div div p"), vec!["p"]);
    assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
}

#[test]
fn test_sibling_combinators() {
    let tree = parse_html(
        r#"<ul><li id="a"></li><li id="b" class="x"></li><li id="c"></li><li id="d"></li></ul>"#,
    );
    assert_eq!(labels(&tree, ".x + li"), vec!["c"]);
    assert_eq!(labels(&tree, ".x ~ li"), vec!["c", "d"]);
    assert_eq!(labels(&tree, "li + li"), vec!["b", "c", "d"]);
    assert_eq!(labels(&tree, "#a ~ .x + li"), vec!["c"]);
}

#[test]
fn test_sibling_walks_skip_text() {
    let tree = parse_html(r#"<div><p id="a"></p> text <p id="b"></p></div>"#);
    assert_eq!(labels(&tree, "#a + p"), vec!["b"]);
}

#[test]
fn test_nth_child() {
    let tree = parse_html(
        r#"<ul><li id="l1"></li><li id="l2"></li><li id="l3"></li><li id="l4"></li><li id="l5"></li></ul>"#,
    );
    assert_eq!(labels(&tree, "li:nth-child(2n+1)"), vec!["l1", "l3", "l5"]);
    assert_eq!(labels(&tree, "li:nth-child(odd)"), vec!["l1", "l3", "l5"]);
    assert_eq!(labels(&tree, "li:nth-child(even)"), vec!["l2", "l4"]);
    assert_eq!(labels(&tree, "li:nth-child(-n+3)"), vec!["l1", "l2", "l3"]);
    assert_eq!(labels(&tree, "li:nth-child(3)"), vec!["l3"]);
    assert_eq!(labels(&tree, "li:nth-last-child(1)"), vec!["l5"]);
    assert_eq!(labels(&tree, "li:nth-last-child(2n)"), vec!["l2", "l4"]);
}

#[test]
fn test_first_last_only_child() {
    let tree = parse_html(
        r#"<div><p id="a"></p></div><div> <p id="b"></p> <p id="c"></p> </div>"#,
    );
    assert_eq!(labels(&tree, "p:first-child"), vec!["a", "b"]);
    assert_eq!(labels(&tree, "p:last-child"), vec!["a", "c"]);
    assert_eq!(labels(&tree, "p:only-child"), vec!["a"]);
}

#[test]
fn test_of_type_pseudo_classes() {
    let tree = parse_html(
        r#"<div id="root"><p id="p1"></p><span id="s1"></span><p id="p2"></p><span id="s2"></span><em id="e"></em></div>"#,
    );
    assert_eq!(labels(&tree, "p:first-of-type"), vec!["p1"]);
    assert_eq!(labels(&tree, "span:last-of-type"), vec!["s2"]);
    assert_eq!(labels(&tree, "#root > :nth-of-type(2)"), vec!["p2", "s2"]);
    assert_eq!(labels(&tree, "#root > :nth-last-of-type(1)"), vec!["p2", "s2", "e"]);
    assert_eq!(labels(&tree, "#root > :only-of-type"), vec!["e"]);
}

#[test]
fn test_empty() {
    let tree = parse_html(
        r#"<div id="a"></div><div id="b"><!-- c --></div><div id="c"> </div><div id="d"><br></div>"#,
    );
    assert_eq!(labels(&tree, "div:empty"), vec!["a", "b"]);
}

#[test]
fn test_root() {
    let tree = parse_html("<html><body><p></p></body></html>");
    assert_eq!(labels(&tree, ":root"), vec!["html"]);

    let fragment = parse_html(r#"<p id="a"></p><p id="b"></p>"#);
    assert_eq!(labels(&fragment, ":root"), vec!["a"]);
}

#[test]
fn test_not() {
    let tree = parse_html(r#"<p id="a" class="x"></p><p id="b"></p><p id="c" class="y"></p>"#);
    assert_eq!(labels(&tree, "p:not(.x)"), vec!["b", "c"]);
    assert_eq!(labels(&tree, "p:not(.x, .y)"), vec!["b"]);
    assert_eq!(labels(&tree, ":not(p)"), Vec::<String>::new());
}

#[test]
fn test_contains() {
    let tree = parse_html(r#"<div id="d"><p id="a">hello <b>world</b></p><p id="b">bye</p></div>"#);
    assert_eq!(labels(&tree, "p:contains(world)"), vec!["a"]);
    assert_eq!(labels(&tree, r#"p:contains("hello w")"#), vec!["a"]);
    assert_eq!(labels(&tree, ":contains(bye)"), vec!["d", "b"]);
}

#[test]
fn test_form_states() {
    let tree = parse_html(
        r#"<input id="a" checked><input id="b" disabled><option id="c" selected></option><div id="d" disabled></div>"#,
    );
    assert_eq!(labels(&tree, ":checked"), vec!["a", "c"]);
    assert_eq!(labels(&tree, ":disabled"), vec!["b"]);
    assert_eq!(labels(&tree, "input:enabled"), vec!["a"]);
}

#[test]
fn test_attribute_operators() {
    let tree = parse_html(
        r#"<a id="a" href="https://x.org/doc.pdf" lang="en-US" rel="nofollow noopener"></a><a id="b" href="/local" lang="en"></a><a id="c"></a>"#,
    );
    assert_eq!(labels(&tree, "[href]"), vec!["a", "b"]);
    assert_eq!(labels(&tree, r#"[href^="https"]"#), vec!["a"]);
    assert_eq!(labels(&tree, r#"[href$=".pdf"]"#), vec!["a"]);
    assert_eq!(labels(&tree, "[href*=loc]"), vec!["b"]);
    assert_eq!(labels(&tree, "[lang|=en]"), vec!["a", "b"]);
    assert_eq!(labels(&tree, "[rel~=noopener]"), vec!["a"]);
    assert_eq!(labels(&tree, "[lang=en]"), vec!["b"]);
    assert_eq!(labels(&tree, "a[lang!=en]"), vec!["a", "c"]);
    assert!(labels(&tree, r#"[href^=""]"#).is_empty());
}

#[test]
fn test_attribute_names_are_case_insensitive() {
    let tree = parse_html(r#"<a id="a" DATA-X="1"></a>"#);
    assert_eq!(labels(&tree, "[data-x]"), vec!["a"]);
    assert_eq!(labels(&tree, "[DATA-X=\"1\"]"), vec!["a"]);
}

#[test]
fn test_disjunction_is_deduplicated() {
    let tree = parse_html(r#"<ul><li id="a" class="foo"></li></ul>"#);
    assert_eq!(labels(&tree, "li, li.foo"), vec!["a"]);
    assert_eq!(labels(&tree, "li.foo, ul"), vec!["ul", "a"]);
}

#[test]
fn test_context_restricts_results() {
    let tree = parse_html(
        r#"<div id="ctx"><span id="s1"><span id="s2"></span></span></div><span id="s3"></span>"#,
    );
    let ctx = Some(by_id(&tree, "ctx"));
    assert_eq!(label_nodes(&tree, &query_in(&tree, "span", ctx)), vec!["s1", "s2"]);
    assert_eq!(label_nodes(&tree, &query_in(&tree, ">span", ctx)), vec!["s1"]);
    assert_eq!(label_nodes(&tree, &query_in(&tree, "> span > span", ctx)), vec!["s2"]);
    assert_eq!(labels(&tree, "div > span"), vec!["s1"]);
}

#[test]
fn test_context_is_never_a_relative() {
    let tree = parse_html(r#"<div id="ctx"><span id="s"></span></div>"#);
    let ctx = Some(by_id(&tree, "ctx"));
    assert!(query_in(&tree, "div span", ctx).is_empty());
    assert!(query_in(&tree, "div", ctx).is_empty());
    assert!(query_in(&tree, "*", ctx).iter().all(|&id| Some(id) != ctx));
}

#[test]
fn test_leading_sibling_combinators() {
    let tree = parse_html(r#"<p id="a"></p><p id="b"></p><p id="c"></p>"#);
    let a = Some(by_id(&tree, "a"));
    assert_eq!(label_nodes(&tree, &query_in(&tree, "+ p", a)), vec!["b"]);
    assert_eq!(label_nodes(&tree, &query_in(&tree, "~ p", a)), vec!["b", "c"]);
    assert!(query_in(&tree, "+ p", None).is_empty());
}

#[test]
fn test_queries_follow_mutation() {
    let mut tree = parse_html(r#"<ul><li id="a"></li><li id="b"></li></ul>"#);
    let a = by_id(&tree, "a");
    let b = by_id(&tree, "b");

    tree.add_class(b, "on").unwrap();
    assert_eq!(labels(&tree, "li.on"), vec!["b"]);

    let ul = tree.parent(a).unwrap();
    tree.remove_child(ul, a).unwrap();
    assert_eq!(labels(&tree, "li"), vec!["b"]);
    assert_eq!(labels(&tree, "li:first-child"), vec!["b"]);

    tree.append_child(ul, a).unwrap();
    assert_eq!(labels(&tree, "li:last-child"), vec!["a"]);
}

#[test]
fn test_disconnected_context() {
    let mut tree = parse_html("<div></div>");
    let fragment = tree.create_element("section", [("id", "f")]);
    let child = tree.create_element("span", [("class", "k")]);
    tree.append_child(fragment, child).unwrap();

    assert_eq!(query_in(&tree, ".k", Some(fragment)), vec![child]);
    assert!(query_in(&tree, ".k", None).is_empty());
}

#[test]
fn test_list_matches_single_element() {
    let tree = parse_html(r#"<ul><li id="a"></li><li id="b" class="x"></li></ul>"#);
    let list: SelectorList = "ul > li.x, p".parse().unwrap();
    assert!(list.matches(&tree, by_id(&tree, "b")));
    assert!(!list.matches(&tree, by_id(&tree, "a")));
}
