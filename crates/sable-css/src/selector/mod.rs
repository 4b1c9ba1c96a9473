//! CSS Selector parsing and matching
//!
//! This module implements selector compilation and matching per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/), plus the jQuery
//! extensions `[att!=val]` and `:contains()`.
//!
//! Pipeline: [`chars`] classifies characters, [`tokenizer`] turns text into
//! offset-tagged tokens, the compiler builds a [`SelectorList`], and the
//! matcher evaluates it against a [`DomTree`](sable_dom::DomTree).

mod ast;
/// Character classes for selector tokenization.
pub mod chars;
mod error;
mod matcher;
mod nth;
mod parser;
/// Offset-driven selector tokenizer.
pub mod tokenizer;

pub use ast::{
    AttributeOperator, AttributePredicate, Combinator, PseudoClass, PseudoClassName, SelectorChain,
    SelectorClause, SelectorList, SimpleSelector,
};
pub use error::SelectorSyntaxError;
pub use matcher::{select, select_by_scan};
pub use nth::Nth;
pub use parser::parse_selector_list;
pub use tokenizer::{SelectorToken, SelectorTokenizer, tokenize_selector};
