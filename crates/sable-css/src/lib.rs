//! CSS selector engine for the Sable document engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - Type, universal, id, class, attribute and pseudo-class tokens
//!   - Whitespace, `>`, `+` and `~` combinators; comma-separated lists
//!   - Backslash escapes and quoted strings
//!
//! - **Selector Compiler** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Selector lists of combinator chains, including chains that open with
//!     a combinator (`> li`) and are scoped to a context node
//!   - Attribute operators `=`, `~=`, `^=`, `$=`, `*=`, `|=` and `!=`
//!   - Structural pseudo-classes with `an+b` arguments, `:not()`,
//!     `:contains()`, `:empty`, `:root` and form states
//!
//! - **Selector Matcher**
//!   - Index-assisted candidate selection (id, tag, class, attribute)
//!   - Right-to-left verification with backtracking
//!   - Results in document order without duplicates
//!
//! # Not Implemented
//!
//! - Pseudo-elements and namespace prefixes
//! - Specificity and the cascade
//! - Case-insensitive attribute matching (`[att=val i]`)

/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;

pub use selector::{
    Combinator, PseudoClass, SelectorChain, SelectorList, SelectorSyntaxError, SimpleSelector,
    parse_selector_list, select, select_by_scan,
};
