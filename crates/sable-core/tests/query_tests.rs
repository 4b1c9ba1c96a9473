//! Integration tests for the document facade: parse, query, render.

use sable_core::{Document, DomError, NodeId, ParserRules, RenderOptions, SableError, SelfClosingStyle};

/// Helper to label selected elements by id, falling back to tag name
fn labels(doc: &Document, selector: &str) -> Vec<String> {
    let selection = doc.select(selector).unwrap();
    selection
        .iter()
        .map(|id| {
            doc.get_attribute(id, "id")
                .or_else(|| doc.tree().tag_name(id))
                .unwrap_or("?")
                .to_string()
        })
        .collect()
}

fn by_id(doc: &Document, id: &str) -> NodeId {
    doc.tree().element_by_id(id).unwrap()
}

// ========== Parsing scenarios ==========

#[test]
fn test_list_items_close_each_other() {
    let doc = Document::parse("<ul><li>a<li>b</ul>");
    let items = doc.select("li").unwrap();
    assert_eq!(items.len(), 2);

    let ul = doc.select("ul").unwrap().first().unwrap();
    for li in &items {
        assert_eq!(doc.tree().parent(li), Some(ul));
    }
    assert!(doc.select("li li").unwrap().is_empty());
    assert_eq!(doc.render(), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn test_table_gets_implied_tbody() {
    let doc = Document::parse("<table><tr><td>x</td></tr></table>");
    let table = doc.select("table").unwrap().first().unwrap();
    let children = doc.tree().children(table);
    assert_eq!(children.len(), 1);
    assert_eq!(doc.tree().tag_name(children[0]), Some("tbody"));
    assert_eq!(labels(&doc, "table > tbody > tr > td"), vec!["td"]);
    assert!(!doc.issues().is_empty());
}

#[test]
fn test_custom_rules_change_list_scope() {
    let rules = ParserRules::default().with_auto_close("li", ["ul"]);
    let doc = Document::parse_with("<ul><li>a<ul><li>b</ul></ul>", rules);
    assert!(doc.select("li ul").unwrap().is_empty());

    let default = Document::parse("<ul><li>a<ul><li>b</ul></ul>");
    assert_eq!(default.select("li ul").unwrap().len(), 1);
}

#[test]
fn test_malformed_input_never_fails() {
    for html in ["", "<", "</p>", "<div <span>", "<a href='x", "<!--", "&#xZZ;", "<![CDATA[x"] {
        let doc = Document::parse(html);
        let _ = doc.render();
    }
}

// ========== Query scenarios ==========

#[test]
fn test_disjunction_returns_each_element_once() {
    let doc = Document::parse(r#"<ul><li class="foo" id="a">x</li><li id="b">y</li></ul>"#);
    assert_eq!(labels(&doc, "li, li.foo"), vec!["a", "b"]);
    assert_eq!(labels(&doc, "li.foo, li"), vec!["a", "b"]);
}

#[test]
fn test_child_combinator_scoped_to_context() {
    let doc = Document::parse(
        r#"<div id="d"><span id="s1"><span id="s2"></span></span><p><span id="s3"></span></p></div>"#,
    );
    let div = by_id(&doc, "d");

    let direct = doc.select_within(">span", div).unwrap();
    assert_eq!(direct.nodes(), &[by_id(&doc, "s1")]);

    let all = doc.select_within("span", div).unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn test_select_within_unknown_context() {
    let doc = Document::parse("<p></p>");
    let err = doc.select_within("p", NodeId(999)).unwrap_err();
    assert_eq!(err, SableError::Dom(DomError::UnknownNode(NodeId(999))));
}

#[test]
fn test_selector_errors_carry_offsets() {
    let doc = Document::parse("<p></p>");
    let Err(SableError::Selector(err)) = doc.select("div >") else {
        panic!("expected a selector error");
    };
    assert_eq!(err.offset, 5);
    assert_eq!(err.input, "div >");
    assert!(err.to_string().contains("offset 5"));
}

#[test]
fn test_empty_result_is_not_an_error() {
    let doc = Document::parse("<p></p>");
    let found = doc.select("table").unwrap();
    assert!(found.is_empty());
    assert_eq!(found.first(), None);
    assert_eq!(found.attr("id"), None);
    assert_eq!(found.to_string(), "");
}

#[test]
fn test_unique_id_fast_path() {
    let doc = Document::parse(r#"<div><p id="x"></p><p id="y"></p></div>"#);
    assert_eq!(doc.select("#x").unwrap().nodes(), &[by_id(&doc, "x")]);
}

#[test]
fn test_duplicate_ids_do_not_over_match() {
    let doc = Document::parse(r#"<p id="x" class="a"></p><span id="x"></span>"#);
    assert_eq!(labels(&doc, "#x"), vec!["x", "x"]);
    assert_eq!(labels(&doc, "p#x"), vec!["x"]);
    assert_eq!(labels(&doc, "#x.a").len(), 1);
    assert_eq!(doc.tree().tag_name(by_id(&doc, "x")), Some("span"));
}

#[test]
fn test_odd_positions() {
    let doc = Document::parse(
        "<ol><li id=\"1\"></li><li id=\"2\"></li><li id=\"3\"></li><li id=\"4\"></li><li id=\"5\"></li></ol>",
    );
    assert_eq!(labels(&doc, "li:nth-child(2n+1)"), vec!["1", "3", "5"]);
    assert_eq!(labels(&doc, "li:first-child"), vec!["1"]);
    assert_eq!(labels(&doc, "li:last-child"), vec!["5"]);
    assert!(labels(&doc, "li:only-child").is_empty());
}

#[test]
fn test_compiled_selector_is_reusable() {
    let selectors = "p.note".parse().unwrap();
    let first = Document::parse(r#"<p class="note"></p>"#);
    let second = Document::parse(r#"<div><p class="note"></p><p class="note"></p></div>"#);
    assert_eq!(first.select_compiled(&selectors, None).len(), 1);
    assert_eq!(second.select_compiled(&selectors, None).len(), 2);
}

// ========== Selection object ==========

#[test]
fn test_find_unions_in_document_order() {
    let doc = Document::parse(
        r#"<div id="outer"><b id="b1"></b><div id="inner"><b id="b2"></b></div></div><div id="other"><b id="b3"></b></div>"#,
    );
    let divs = doc.select("div").unwrap();
    assert_eq!(divs.len(), 3);

    let bolds = divs.find("b").unwrap();
    let ids: Vec<_> = bolds.iter().filter_map(|id| doc.get_attribute(id, "id")).collect();
    assert_eq!(ids, vec!["b1", "b2", "b3"]);

    let children = divs.find("> b").unwrap();
    assert_eq!(children.len(), 3);
    assert!(divs.find("> >").is_err());
}

#[test]
fn test_filter_and_attr() {
    let doc = Document::parse(r#"<a href="/one" class="ext"></a><a href="/two"></a><a href="/three" class="ext"></a>"#);
    let links = doc.select("a").unwrap();
    let external = links.filter(".ext").unwrap();
    assert_eq!(external.len(), 2);
    assert_eq!(external.attr("href"), Some("/one"));
    assert_eq!(links.filter(":not(.ext)").unwrap().attr("href"), Some("/two"));
}

#[test]
fn test_selection_html() {
    let doc = Document::parse(r#"<p class="a">one</p><p>two</p>"#);
    let paragraphs = doc.select("p").unwrap();
    assert_eq!(paragraphs.selection_html(false), r#"<p class="a">, <p>"#);
    assert_eq!(paragraphs.selection_html(true), r#"<p class="a">one</p>, <p>two</p>"#);
    assert_eq!(paragraphs.to_string(), r#"<p class="a">, <p>"#);
    assert_eq!(paragraphs.render_selection(), r#"<p class="a">one</p><p>two</p>"#);
    assert_eq!(paragraphs.text(), "onetwo");
}

// ========== Rendering ==========

#[test]
fn test_render_options() {
    let doc = Document::parse("<p title=x>a<br><!-- note --></p>");
    assert_eq!(doc.render(), r#"<p title="x">a<br><!-- note --></p>"#);

    let options = RenderOptions {
        quote_all_attributes: false,
        self_closing_style: SelfClosingStyle::Xhtml,
        include_comments: false,
    };
    assert_eq!(doc.render_with(&options), "<p title=x>a<br /></p>");

    let p = doc.select("p").unwrap().first().unwrap();
    assert_eq!(doc.render_node(p, &options), "<p title=x>a<br /></p>");
}

#[test]
fn test_mutation_then_query() {
    let mut doc = Document::parse(r#"<ul id="list"><li>a</li></ul>"#);
    let list = by_id(&doc, "list");
    let tree = doc.tree_mut();
    let item = tree.create_element("li", [("class", "new")]);
    tree.append_child(list, item).unwrap();

    assert_eq!(doc.select("li.new").unwrap().nodes(), &[item]);
    assert_eq!(doc.select_within("> li", list).unwrap().len(), 2);

    doc.tree_mut().detach(item).unwrap();
    assert!(doc.select("li.new").unwrap().is_empty());
}
