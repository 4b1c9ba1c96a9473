//! Selector compiler: groups tokens into a [`SelectorList`].
//!
//! Every structural rule is checked here, so a compiled list is always
//! well-formed and the matcher never re-validates it.

use std::str::FromStr;

use super::ast::{
    AttributePredicate, Combinator, PseudoClass, PseudoClassName, SelectorChain, SelectorClause,
    SelectorList, SimpleSelector,
};
use super::error::SelectorSyntaxError;
use super::nth::Nth;
use super::tokenizer::{SelectorToken, SelectorTokenizer};

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
///
/// Compile a comma-separated selector list.
///
/// # Errors
///
/// Returns a [`SelectorSyntaxError`] for tokenizer failures, empty chains,
/// dangling combinators, misplaced type selectors, conflicting ids, unknown
/// pseudo-classes and malformed pseudo-class arguments.
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorSyntaxError> {
    let tokens = SelectorTokenizer::new(input).tokenize()?;
    let mut builder = ChainBuilder::new(input);
    let mut chains = Vec::new();

    for (offset, token) in tokens {
        match token {
            SelectorToken::Comma => chains.push(builder.finish(offset)?),
            SelectorToken::Combinator(combinator) => builder.push_combinator(combinator, offset)?,
            component => builder.push_component(component, offset)?,
        }
    }
    chains.push(builder.finish(input.len())?);

    tracing::trace!(selector = input, chains = chains.len(), "compiled selector");
    Ok(SelectorList(chains))
}

/// Accumulates the clauses of the chain currently being read.
struct ChainBuilder<'a> {
    input: &'a str,
    clauses: Vec<SelectorClause>,
    /// Combinator that precedes the clause being built.
    combinator: Combinator,
    current: Option<SimpleSelector>,
}

impl<'a> ChainBuilder<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            clauses: Vec::new(),
            combinator: Combinator::None,
            current: None,
        }
    }

    fn push_combinator(&mut self, combinator: Combinator, offset: usize) -> Result<(), SelectorSyntaxError> {
        if let Some(selector) = self.current.take() {
            self.clauses.push(SelectorClause {
                combinator: self.combinator,
                selector,
            });
            self.combinator = combinator;
            return Ok(());
        }
        // A chain may open with an explicit combinator, relating its first
        // clause to the query context.
        if self.clauses.is_empty() && self.combinator == Combinator::None {
            self.combinator = combinator;
            return Ok(());
        }
        Err(self.error(offset, "expected a selector between two combinators"))
    }

    fn push_component(&mut self, token: SelectorToken, offset: usize) -> Result<(), SelectorSyntaxError> {
        let is_first = self.current.is_none();
        let input = self.input;
        let selector = self.current.get_or_insert_with(SimpleSelector::default);

        match token {
            SelectorToken::Tag(_) | SelectorToken::Universal if !is_first => {
                return Err(SelectorSyntaxError::new(
                    input,
                    offset,
                    "a type selector must come first in a compound selector",
                ));
            }
            SelectorToken::Tag(name) => selector.tag = Some(name),
            SelectorToken::Id(id) => {
                if selector.id.as_ref().is_some_and(|existing| *existing != id) {
                    return Err(SelectorSyntaxError::new(input, offset, "conflicting ids in one compound selector"));
                }
                selector.id = Some(id);
            }
            SelectorToken::Class(class) => {
                if !selector.classes.contains(&class) {
                    selector.classes.push(class);
                }
            }
            SelectorToken::Attribute { name, operator, value } => {
                selector.attributes.push(AttributePredicate { name, operator, value });
            }
            SelectorToken::PseudoClass { name, argument } => {
                let pseudo = compile_pseudo_class(input, offset, &name, argument)?;
                selector.pseudo_classes.push(pseudo);
            }
            SelectorToken::Universal | SelectorToken::Combinator(_) | SelectorToken::Comma => {}
        }
        Ok(())
    }

    /// Close the current chain, leaving the builder ready for the next one.
    fn finish(&mut self, offset: usize) -> Result<SelectorChain, SelectorSyntaxError> {
        let Some(selector) = self.current.take() else {
            let message = if self.clauses.is_empty() && self.combinator == Combinator::None {
                "empty selector".to_string()
            } else {
                format!("expected a selector after `{}`", self.combinator.symbol())
            };
            return Err(self.error(offset, message));
        };
        self.clauses.push(SelectorClause {
            combinator: self.combinator,
            selector,
        });
        self.combinator = Combinator::None;
        Ok(SelectorChain {
            clauses: std::mem::take(&mut self.clauses),
        })
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> SelectorSyntaxError {
        SelectorSyntaxError::new(self.input, offset, message)
    }
}

/// Resolve a pseudo-class name and validate its argument.
fn compile_pseudo_class(
    input: &str,
    offset: usize,
    name: &str,
    argument: Option<String>,
) -> Result<PseudoClass, SelectorSyntaxError> {
    let error = |message: String| SelectorSyntaxError::new(input, offset, message);

    let kind = PseudoClassName::from_str(name).map_err(|_| error(format!("unknown pseudo-class `:{name}`")))?;
    let argument = match (kind.takes_argument(), argument) {
        (false, None) => None,
        (true, Some(argument)) => Some(argument),
        (false, Some(_)) => return Err(error(format!("`:{kind}` takes no argument"))),
        (true, None) => return Err(error(format!("`:{kind}` requires an argument"))),
    };
    let nth = |argument: &str| {
        Nth::parse(argument).ok_or_else(|| error(format!("invalid an+b expression `{argument}`")))
    };

    let pseudo = match (kind, argument) {
        (PseudoClassName::NthChild, Some(argument)) => PseudoClass::NthChild(nth(&argument)?),
        (PseudoClassName::NthLastChild, Some(argument)) => PseudoClass::NthLastChild(nth(&argument)?),
        (PseudoClassName::NthOfType, Some(argument)) => PseudoClass::NthOfType(nth(&argument)?),
        (PseudoClassName::NthLastOfType, Some(argument)) => PseudoClass::NthLastOfType(nth(&argument)?),
        (PseudoClassName::Not, Some(argument)) => {
            PseudoClass::Not(compile_negation(input, offset, &argument)?)
        }
        (PseudoClassName::Contains, Some(argument)) => PseudoClass::Contains(unquote(&argument)),
        (PseudoClassName::FirstChild, _) => PseudoClass::FirstChild,
        (PseudoClassName::LastChild, _) => PseudoClass::LastChild,
        (PseudoClassName::OnlyChild, _) => PseudoClass::OnlyChild,
        (PseudoClassName::FirstOfType, _) => PseudoClass::FirstOfType,
        (PseudoClassName::LastOfType, _) => PseudoClass::LastOfType,
        (PseudoClassName::OnlyOfType, _) => PseudoClass::OnlyOfType,
        (PseudoClassName::Empty, _) => PseudoClass::Empty,
        (PseudoClassName::Root, _) => PseudoClass::Root,
        (PseudoClassName::Checked, _) => PseudoClass::Checked,
        (PseudoClassName::Disabled, _) => PseudoClass::Disabled,
        (PseudoClassName::Enabled, _) => PseudoClass::Enabled,
        (kind, None) => return Err(error(format!("`:{kind}` requires an argument"))),
    };
    Ok(pseudo)
}

/// [§ 4.3 The Negation Pseudo-class](https://www.w3.org/TR/selectors-4/#negation)
///
/// The argument is a list of compound selectors. Errors inside it are
/// reported at their position in the full input.
fn compile_negation(input: &str, offset: usize, argument: &str) -> Result<SelectorList, SelectorSyntaxError> {
    let argument_offset = input[offset..]
        .find('(')
        .map_or(offset, |paren| {
            let raw = &input[offset + paren + 1..];
            offset + paren + 1 + (raw.len() - raw.trim_start().len())
        });

    let list = parse_selector_list(argument).map_err(|inner| {
        SelectorSyntaxError::new(input, argument_offset + inner.offset, inner.message)
    })?;

    let compound_only = list.chains().iter().all(|chain| {
        chain.clauses.len() == 1 && chain.leading_combinator() == Combinator::None
    });
    if !compound_only {
        return Err(SelectorSyntaxError::new(
            input,
            argument_offset,
            "`:not()` accepts only compound selectors",
        ));
    }
    Ok(list)
}

/// Strip one pair of matching quotes, resolving backslash escapes inside.
fn unquote(argument: &str) -> String {
    let mut chars = argument.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return argument.to_string();
    };
    if first != last || !matches!(first, '"' | '\'') {
        return argument.to_string();
    }

    let mut text = String::new();
    let mut escaped = false;
    for c in chars {
        if escaped || c != '\\' {
            text.push(c);
            escaped = false;
        } else {
            escaped = true;
        }
    }
    text
}
