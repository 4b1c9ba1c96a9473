use std::fmt::{self, Write as _};

use sable_common::warning::warn_once;
use sable_dom::{DomTree, ElementData, NodeId, NodeType};

use super::rules::ParserRules;
use crate::tokenizer::{Attribute, Token};

// Issue kinds. Tag names stay out of these so warning dedup stays bounded.
const IMPLIED_WRAPPER: &str = "implied wrapper element";
const IMPLICIT_CLOSE: &str = "end tag closed open elements";
/// Warning kind for an end tag that matches no open element.
pub const ORPHANED_END_TAG: &str = "ignored orphaned end tag";
/// Warning kind for an end tag naming a void element.
pub const VOID_END_TAG: &str = "ignored end tag for void element";
const TREE_ERROR: &str = "tree insertion failed";

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// A recovered problem in the token stream. Parsing never fails; issues are
/// collected for callers that want to report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What happened and how it was recovered.
    pub message: String,
    /// Index into the token stream where this issue was encountered.
    pub token_index: usize,
    /// `true` for malformed input (e.g. an orphaned end tag), `false` for
    /// silently corrected markup (e.g. an implied `tbody`).
    pub is_error: bool,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_error { "error" } else { "note" };
        write!(f, "{kind} at token {}: {}", self.token_index, self.message)
    }
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Builds a [`DomTree`] from a token stream with a stack of open elements and
/// the tables in [`ParserRules`]. There are no insertion modes: nothing is
/// synthesized except the wrappers the rules imply, so fragments parse as
/// fragments.
pub struct HTMLParser<I> {
    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    stack_of_open_elements: Vec<NodeId>,

    /// The tree being built. `NodeId::ROOT` is the Document node.
    tree: DomTree,

    /// Input tokens. Pulled lazily, so a tokenizer can be passed directly.
    tokens: I,

    /// Position of the token being processed.
    token_index: usize,

    rules: ParserRules,

    /// Parse issues (errors and warnings) encountered during parsing.
    issues: Vec<ParseIssue>,
}

impl<I> HTMLParser<I>
where
    I: Iterator<Item = Token>,
{
    /// Create a new parser over a token stream with the default rules.
    #[must_use]
    pub fn new<T>(tokens: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self::with_rules(tokens, ParserRules::default())
    }

    /// Create a new parser with custom rule tables.
    #[must_use]
    pub fn with_rules<T>(tokens: T, rules: ParserRules) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            stack_of_open_elements: Vec::new(),
            tree: DomTree::new(),
            tokens: tokens.into_iter(),
            token_index: 0,
            rules,
            issues: Vec::new(),
        }
    }

    /// Get all parse issues encountered so far.
    #[must_use]
    pub fn get_issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Run the parser and return the DOM tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Run the parser and return both the `DomTree` and any parse issues.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        while let Some(token) = self.next_token() {
            self.process_token(token);
            self.token_index += 1;
        }
        // "Stop parsing": every element still open is implicitly closed.
        self.stack_of_open_elements.clear();
        tracing::debug!(
            tokens = self.token_index,
            nodes = self.tree.len(),
            issues = self.issues.len(),
            "parsed document"
        );
        (self.tree, self.issues)
    }

    fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn process_token(&mut self, token: Token) {
        match token {
            Token::Doctype { data } => {
                let doctype = self.tree.alloc(NodeType::Doctype(data));
                self.insert_node(doctype);
            }
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => self.handle_start_tag(&name, self_closing, attributes),
            Token::EndTag { name } => self.handle_end_tag(&name),
            Token::Text { data } => self.insert_text(&data),
            Token::Comment { data } => {
                let comment = self.tree.create_comment(data);
                self.insert_node(comment);
            }
            Token::CData { data } => {
                let cdata = self.tree.alloc(NodeType::CData(data));
                self.insert_node(cdata);
            }
        }
    }

    /// A start tag runs the rule tables in three steps.
    fn handle_start_tag(&mut self, name: &str, self_closing: bool, attributes: Vec<Attribute>) {
        // STEP 1: Implicit close. Pop the current node while the rules say the
        //         new tag closes it.
        while let Some(current) = self.current_node()
            && let Some(current_tag) = self.get_tag_name(current)
            && self.rules.closes(current_tag, name)
        {
            let _ = self.stack_of_open_elements.pop();
        }

        // STEP 2: Auto-insert. Open any wrappers the new tag implies under the
        //         current node, outermost first.
        if let Some(parent_tag) = self.current_node().and_then(|id| self.get_tag_name(id)) {
            let chain = self.rules.wrapper_chain(name, parent_tag);
            for wrapper in chain {
                self.parse_warning(
                    IMPLIED_WRAPPER,
                    name,
                    format!("implied <{wrapper}> before <{name}>"),
                    false,
                );
                let element = self
                    .tree
                    .create_element(&wrapper, std::iter::empty::<(&str, &str)>());
                self.insert_node(element);
                self.stack_of_open_elements.push(element);
            }
        }

        // STEP 3: Insert the element. Void and self-closing elements never
        //         become the current node.
        let element = self.insert_html_element(name, self_closing, attributes);
        if !self_closing && !self.rules.is_void(name) {
            self.stack_of_open_elements.push(element);
        }
    }

    /// An end tag closes the nearest open element with its name and
    /// everything opened inside it.
    fn handle_end_tag(&mut self, name: &str) {
        if self.rules.is_void(name) {
            self.parse_warning(
                VOID_END_TAG,
                name,
                format!("ignored end tag </{name}> for void element"),
                true,
            );
            return;
        }
        let Some(position) = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.get_tag_name(id) == Some(name))
        else {
            self.parse_warning(
                ORPHANED_END_TAG,
                name,
                format!("ignored orphaned end tag </{name}>"),
                true,
            );
            return;
        };
        let unclosed = self.stack_of_open_elements.len() - position - 1;
        if unclosed > 0 {
            self.parse_warning(
                IMPLICIT_CLOSE,
                name,
                format!("</{name}> implicitly closed {unclosed} open element(s)"),
                false,
            );
        }
        self.pop_until_tag(name);
    }

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    fn insertion_parent(&self) -> NodeId {
        self.current_node().unwrap_or(NodeId::ROOT)
    }

    fn get_tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.tag_name(id)
    }

    /// Pop elements until one with the given tag name has been popped.
    fn pop_until_tag(&mut self, tag_name: &str) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self.get_tag_name(id) == Some(tag_name) {
                break;
            }
        }
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// Creates the element and appends it to the current node. Pushing it onto
    /// the stack is left to the caller.
    fn insert_html_element(
        &mut self,
        name: &str,
        self_closing: bool,
        attributes: Vec<Attribute>,
    ) -> NodeId {
        let data = ElementData {
            self_closing,
            ..ElementData::new(name, attributes.into_iter().map(|a| (a.name, a.value)))
        };
        let element = self.tree.alloc(NodeType::Element(data));
        self.insert_node(element);
        element
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "If there is a Text node immediately before the adjusted insertion
    /// location, then append data to that Text node's data."
    fn insert_text(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        let parent = self.insertion_parent();
        if let Some(last) = self.tree.last_child(parent)
            && let Some(existing) = self.tree.as_text(last)
        {
            let merged = format!("{existing}{data}");
            if let Err(err) = self.tree.set_text(last, &merged) {
                let message = format!("could not extend text node: {err}");
                self.parse_warning(TREE_ERROR, "#text", message, true);
            }
            return;
        }
        let text = self.tree.create_text(data);
        self.insert_node(text);
    }

    fn insert_node(&mut self, node: NodeId) {
        let parent = self.insertion_parent();
        if let Err(err) = self.tree.append_child(parent, node) {
            let message = format!("could not insert node: {err}");
            self.parse_warning(TREE_ERROR, "", message, true);
        }
    }

    /// Record a parse issue.
    ///
    /// Errors go through sable-common's warning system, deduplicated on
    /// `kind`; corrections are only logged at debug level. Either way the
    /// issue is stored for later retrieval.
    fn parse_warning(&mut self, kind: &'static str, tag: &str, message: String, is_error: bool) {
        if is_error {
            warn_once("HTML Parser", kind, tag);
        } else {
            tracing::debug!(kind, tag, token_index = self.token_index, "{message}");
        }
        self.issues.push(ParseIssue {
            message,
            token_index: self.token_index,
            is_error,
        });
    }
}

/// Format a DOM tree as an indented outline for debugging.
#[must_use]
pub fn format_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_tree(tree, id, 0, &mut out);
    out
}

fn write_tree(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let prefix = "  ".repeat(indent);
    let _ = match &node.node_type {
        NodeType::Document => writeln!(out, "{prefix}Document"),
        NodeType::Element(data) => {
            let _ = write!(out, "{prefix}<{}", data.tag_name);
            for (name, value) in &data.attrs {
                let _ = if value.is_empty() {
                    write!(out, " {name}")
                } else {
                    write!(out, " {name}=\"{value}\"")
                };
            }
            writeln!(out, ">")
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            writeln!(out, "{prefix}\"{display}\"")
        }
        NodeType::Comment(data) => writeln!(out, "{prefix}<!-- {data} -->"),
        NodeType::CData(data) => writeln!(out, "{prefix}<![CDATA[{data}]]>"),
        NodeType::Doctype(data) => writeln!(out, "{prefix}<!DOCTYPE {data}>"),
    };
    for &child in tree.children(id) {
        write_tree(tree, child, indent + 1, out);
    }
}
