//! Offset-driven selector tokenizer.
//!
//! [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization),
//! restricted to what a selector can contain. Each call to
//! [`SelectorTokenizer::next_token`] reads one token starting at a byte
//! offset and reports the offset just past it, so the compiler can point at
//! the exact location of an error.

use std::fmt;

use super::ast::{AttributeOperator, Combinator};
use super::chars::{is_combinator, is_hex_digit, is_ident, is_ident_start, is_quote, is_whitespace};
use super::error::SelectorSyntaxError;

/// [§ 4.5.1 Escaping](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
/// "Consume as many hex digits as possible, but no more than 5."
/// Together with the first digit that is 6.
const MAX_HEX_ESCAPE_DIGITS: usize = 6;

/// A lexical unit of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorToken {
    /// A type selector, lowercased.
    Tag(String),
    /// `*`
    Universal,
    /// `#name`
    Id(String),
    /// `.name`
    Class(String),
    /// `[name]` or `[name op value]`.
    Attribute {
        /// Attribute name, lowercased.
        name: String,
        /// Comparison operator.
        operator: AttributeOperator,
        /// Unescaped value; empty for [`AttributeOperator::Exists`].
        value: String,
    },
    /// `:name` or `:name(argument)`.
    PseudoClass {
        /// Name, lowercased.
        name: String,
        /// Raw text between the parentheses, trimmed.
        argument: Option<String>,
    },
    /// Whitespace, `>`, `+` or `~` between two simple selectors.
    Combinator(Combinator),
    /// `,`
    Comma,
}

impl fmt::Display for SelectorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(name) => write!(f, "Tag({name})"),
            Self::Universal => f.write_str("Universal"),
            Self::Id(name) => write!(f, "Id({name})"),
            Self::Class(name) => write!(f, "Class({name})"),
            Self::Attribute {
                name,
                operator,
                value,
            } => write!(f, "Attribute({name}{}{value:?})", operator.symbol()),
            Self::PseudoClass { name, argument } => match argument {
                Some(argument) => write!(f, "PseudoClass({name}({argument}))"),
                None => write!(f, "PseudoClass({name})"),
            },
            Self::Combinator(combinator) => write!(f, "Combinator({combinator:?})"),
            Self::Comma => f.write_str("Comma"),
        }
    }
}

/// Tokenizer over one selector string.
#[derive(Debug, Clone, Copy)]
pub struct SelectorTokenizer<'a> {
    input: &'a str,
}

impl<'a> SelectorTokenizer<'a> {
    /// Create a tokenizer over `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// The text being tokenized.
    #[must_use]
    pub const fn input(&self) -> &'a str {
        self.input
    }

    /// Read the token starting at byte `offset`.
    ///
    /// Returns the token and the offset immediately after it, or `None` when
    /// only whitespace remains. Whitespace becomes a descendant combinator
    /// only when it separates two simple selectors; around `>`, `+`, `~` and
    /// `,` it is absorbed.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorSyntaxError`] pointing at the offending character.
    pub fn next_token(
        &self,
        offset: usize,
    ) -> Result<Option<(SelectorToken, usize)>, SelectorSyntaxError> {
        let start = self.skip_whitespace(offset);
        let Some(c) = self.char_at(start) else {
            return Ok(None);
        };

        // STEP 1: Explicit combinators and commas swallow surrounding whitespace.
        if is_combinator(c) || c == ',' {
            let next = self.skip_whitespace(start + 1);
            let token = Combinator::from_symbol(c).map_or(SelectorToken::Comma, SelectorToken::Combinator);
            return Ok(Some((token, next)));
        }

        // STEP 2: Whitespace between two simple selectors is itself a combinator.
        if start > offset && offset > 0 {
            return Ok(Some((SelectorToken::Combinator(Combinator::Descendant), start)));
        }

        // STEP 3: A simple selector component.
        let token = match c {
            '*' => (SelectorToken::Universal, start + 1),
            '#' => {
                let (name, next) = self.read_name(String::new(), start + 1)?;
                if name.is_empty() {
                    return Err(self.error(start, "expected a name after `#`"));
                }
                (SelectorToken::Id(name), next)
            }
            '.' => match self.read_ident(start + 1)? {
                Some((name, next)) => (SelectorToken::Class(name), next),
                None => return Err(self.error(start, "expected a class name after `.`")),
            },
            '[' => self.read_attribute(start)?,
            ':' => self.read_pseudo_class(start)?,
            _ => match self.read_ident(start)? {
                Some((name, next)) => (SelectorToken::Tag(name.to_ascii_lowercase()), next),
                None => return Err(self.error(start, format!("unexpected character `{c}`"))),
            },
        };
        Ok(Some(token))
    }

    /// Tokenize the whole input, pairing each token with the offset where it
    /// begins.
    ///
    /// # Errors
    ///
    /// Returns the first error [`next_token`](Self::next_token) reports.
    pub fn tokenize(&self) -> Result<Vec<(usize, SelectorToken)>, SelectorSyntaxError> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        while let Some((token, next)) = self.next_token(offset)? {
            let at = if token == SelectorToken::Combinator(Combinator::Descendant) {
                offset
            } else {
                self.skip_whitespace(offset)
            };
            tokens.push((at, token));
            offset = next;
        }
        Ok(tokens)
    }

    // =======================================================================
    // Component readers
    // =======================================================================

    /// `[` name `]` or `[` name operator value `]`, whitespace allowed inside.
    fn read_attribute(&self, offset: usize) -> Result<(SelectorToken, usize), SelectorSyntaxError> {
        let pos = self.skip_whitespace(offset + 1);
        let Some((name, next)) = self.read_ident(pos)? else {
            return Err(self.error(pos, "expected an attribute name"));
        };
        let name = name.to_ascii_lowercase();
        let pos = self.skip_whitespace(next);

        let Some(c) = self.char_at(pos) else {
            return Err(self.error(offset, "unclosed `[`"));
        };
        if c == ']' {
            let token = SelectorToken::Attribute {
                name,
                operator: AttributeOperator::Exists,
                value: String::new(),
            };
            return Ok((token, pos + 1));
        }

        let operator_end = if c == '=' { pos + 1 } else { pos + c.len_utf8() + 1 };
        let symbol = self.input.get(pos..operator_end).unwrap_or_default();
        let Some(operator) = AttributeOperator::from_symbol(symbol) else {
            return Err(self.error(pos, format!("unknown attribute operator starting with `{c}`")));
        };

        let pos = self.skip_whitespace(operator_end);
        let (value, next) = match self.char_at(pos) {
            Some(quote) if is_quote(quote) => self.read_string(pos)?,
            _ => self.read_name(String::new(), pos)?,
        };
        if next == pos {
            return Err(self.error(pos, "expected an attribute value"));
        }

        let pos = self.skip_whitespace(next);
        if self.char_at(pos) != Some(']') {
            return Err(self.error(pos, "expected `]`"));
        }
        Ok((SelectorToken::Attribute { name, operator, value }, pos + 1))
    }

    /// `:` name, optionally followed by a parenthesized argument.
    fn read_pseudo_class(&self, offset: usize) -> Result<(SelectorToken, usize), SelectorSyntaxError> {
        if self.char_at(offset + 1) == Some(':') {
            return Err(self.error(offset, "pseudo-elements are not supported"));
        }
        let Some((name, next)) = self.read_ident(offset + 1)? else {
            return Err(self.error(offset, "expected a pseudo-class name after `:`"));
        };
        let name = name.to_ascii_lowercase();
        if self.char_at(next) != Some('(') {
            return Ok((SelectorToken::PseudoClass { name, argument: None }, next));
        }
        let (argument, next) = self.read_argument(next)?;
        Ok((
            SelectorToken::PseudoClass {
                name,
                argument: Some(argument),
            },
            next,
        ))
    }

    /// Raw text up to the `)` balancing the `(` at `offset`. Parentheses
    /// inside quotes do not count.
    fn read_argument(&self, offset: usize) -> Result<(String, usize), SelectorSyntaxError> {
        let mut depth = 1;
        let mut quote = None;
        let mut pos = offset + 1;
        loop {
            let Some(c) = self.char_at(pos) else {
                return Err(self.error(offset, "unclosed `(`"));
            };
            pos += c.len_utf8();
            match (quote, c) {
                (_, '\\') => {
                    if let Some(escaped) = self.char_at(pos) {
                        pos += escaped.len_utf8();
                    }
                }
                (Some(open), _) => {
                    if c == open {
                        quote = None;
                    }
                }
                (None, '(') => depth += 1,
                (None, ')') => {
                    depth -= 1;
                    if depth == 0 {
                        let argument = self.input[offset + 1..pos - 1].trim().to_string();
                        return Ok((argument, pos));
                    }
                }
                (None, _) => {
                    if is_quote(c) {
                        quote = Some(c);
                    }
                }
            }
        }
    }

    /// A quoted string starting at the quote character at `offset`.
    fn read_string(&self, offset: usize) -> Result<(String, usize), SelectorSyntaxError> {
        let Some(quote) = self.char_at(offset) else {
            return Err(self.error(offset, "expected a string"));
        };
        let mut value = String::new();
        let mut pos = offset + 1;
        loop {
            match self.char_at(pos) {
                None => return Err(self.error(offset, "unterminated string")),
                Some('\\') => {
                    let (c, next) = self.read_escape(pos)?;
                    value.push(c);
                    pos = next;
                }
                Some(c) if c == quote => return Ok((value, pos + 1)),
                Some(c) => {
                    value.push(c);
                    pos += c.len_utf8();
                }
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// An identifier: an optional `-`, then an ident-start character, a
    /// second `-`, or an escape, then any ident characters. Returns `None`
    /// when no identifier starts at `offset`.
    fn read_ident(&self, offset: usize) -> Result<Option<(String, usize)>, SelectorSyntaxError> {
        let mut ident = String::new();
        let mut pos = offset;
        if self.char_at(pos) == Some('-') {
            ident.push('-');
            pos += 1;
        }
        let starts = match self.char_at(pos) {
            Some('-') => !ident.is_empty(),
            Some(c) => c == '\\' || is_ident_start(c),
            None => false,
        };
        if !starts {
            return Ok(None);
        }
        self.read_name(ident, pos).map(Some)
    }

    /// Append ident characters and escapes starting at `offset` to `name`.
    /// Reads nothing when none start there.
    fn read_name(&self, mut name: String, offset: usize) -> Result<(String, usize), SelectorSyntaxError> {
        let mut pos = offset;
        loop {
            match self.char_at(pos) {
                Some('\\') => {
                    let (c, next) = self.read_escape(pos)?;
                    name.push(c);
                    pos = next;
                }
                Some(c) if is_ident(c) => {
                    name.push(c);
                    pos += c.len_utf8();
                }
                _ => return Ok((name, pos)),
            }
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// `offset` points at the backslash. One to six hex digits (and one
    /// trailing whitespace character) name a code point; any other character
    /// stands for itself.
    fn read_escape(&self, offset: usize) -> Result<(char, usize), SelectorSyntaxError> {
        let pos = offset + 1;
        let Some(c) = self.char_at(pos) else {
            return Err(self.error(offset, "escape at end of input"));
        };
        if !is_hex_digit(c) {
            return Ok((c, pos + c.len_utf8()));
        }

        let digits = self.input[pos..]
            .chars()
            .take(MAX_HEX_ESCAPE_DIGITS)
            .take_while(|&d| is_hex_digit(d))
            .count();
        let end = pos + digits;
        let code = u32::from_str_radix(&self.input[pos..end], 16)
            .map_err(|_| self.error(offset, "invalid escape"))?;
        let decoded = char::from_u32(code)
            .filter(|&d| d != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        let next = if self.char_at(end).is_some_and(is_whitespace) {
            end + 1
        } else {
            end
        };
        Ok((decoded, next))
    }

    // =======================================================================
    // Input helpers
    // =======================================================================

    fn char_at(&self, offset: usize) -> Option<char> {
        self.input.get(offset..).and_then(|rest| rest.chars().next())
    }

    pub(crate) fn skip_whitespace(&self, offset: usize) -> usize {
        let mut pos = offset;
        while self.char_at(pos).is_some_and(is_whitespace) {
            pos += 1;
        }
        pos
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> SelectorSyntaxError {
        SelectorSyntaxError::new(self.input, offset, message)
    }
}

/// Tokenize `input` into a flat token list.
///
/// # Errors
///
/// Returns a [`SelectorSyntaxError`] for malformed input.
pub fn tokenize_selector(input: &str) -> Result<Vec<SelectorToken>, SelectorSyntaxError> {
    SelectorTokenizer::new(input)
        .tokenize()
        .map(|tokens| tokens.into_iter().map(|(_, token)| token).collect())
}
