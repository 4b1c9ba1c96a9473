//! Tag-soup tolerant HTML tokenizer, tree builder and renderer for Sable.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, tag, attribute, comment, DOCTYPE and CDATA states
//!   - Named and numeric character references
//!   - End-of-input recovery that never drops consumed text
//!
//! - **Tree Builder**
//!   - A stack of open elements driven by [`ParserRules`]: implicit closes,
//!     implied wrappers (`tbody`, `tr`, `colgroup`) and void elements
//!   - No `html`/`head`/`body` synthesis; fragments stay fragments
//!
//! - **Renderer** ([WHATWG § 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments))
//!   - Outer and inner HTML with [`RenderOptions`]
//!
//! # Not Implemented
//!
//! - Insertion modes, foster parenting and the adoption agency algorithm
//! - Script data escape states
//! - Encoding sniffing; input is already a `str`

/// HTML parser and tree construction.
pub mod parser;
/// Markup serialization.
pub mod serializer;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

use sable_dom::DomTree;

pub use parser::{AutoInsertRule, HTMLParser, ParseIssue, ParserRules, format_tree};
pub use serializer::{RenderOptions, SelfClosingStyle, render, render_children};
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

/// Parse `html` with the default rules.
#[must_use]
pub fn parse_html(html: &str) -> DomTree {
    HTMLParser::new(HTMLTokenizer::new(html)).run()
}

/// Parse `html` with custom rules, returning the tree and every recovered
/// issue.
#[must_use]
pub fn parse_html_with_rules(html: &str, rules: ParserRules) -> (DomTree, Vec<ParseIssue>) {
    HTMLParser::with_rules(HTMLTokenizer::new(html), rules).run_with_issues()
}
