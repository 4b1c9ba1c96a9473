//! HTML parser module for tree construction.

/// Stack-of-open-elements tree builder.
mod core;
/// Implicit-close, auto-insert and void element tables.
pub mod rules;

pub use self::core::{HTMLParser, ORPHANED_END_TAG, ParseIssue, VOID_END_TAG, format_tree};
pub use rules::{AutoInsertRule, ParserRules, is_void_element};
