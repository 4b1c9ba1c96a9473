//! Compiled selector representation.
//!
//! A [`SelectorList`] is a disjunction of [`SelectorChain`]s. Each chain is
//! read left to right as written and matched right to left.

use std::fmt::{self, Write};
use std::str::FromStr;

use strum_macros::{Display, EnumString};

use super::chars::{is_hex_digit, is_ident, is_ident_start};
use super::error::SelectorSyntaxError;
use super::nth::Nth;
use super::parser::parse_selector_list;

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
///
/// "A comma-separated list of selectors represents the union of all elements
/// selected by each of the individual selectors in the selector list."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList(pub Vec<SelectorChain>);

impl SelectorList {
    /// The chains of the list, in source order.
    #[must_use]
    pub fn chains(&self) -> &[SelectorChain] {
        &self.0
    }
}

impl FromStr for SelectorList {
    type Err = SelectorSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector_list(s)
    }
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// "A complex selector is a chain of one or more compound selectors separated
/// by combinators."
///
/// Example: `div.container > ul li` is stored as
/// ```text
/// [(None, div.container), (Child, ul), (Descendant, li)]
/// ```
/// The last clause is the subject. Every compiled chain has at least one
/// clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    /// Clauses in source order.
    pub clauses: Vec<SelectorClause>,
}

impl SelectorChain {
    /// The rightmost simple selector, whose matches are the chain's results.
    #[must_use]
    pub fn subject(&self) -> Option<&SimpleSelector> {
        self.clauses.last().map(|clause| &clause.selector)
    }

    /// The combinator written before the first clause, relating it to the
    /// query's context node. [`Combinator::None`] for ordinary selectors.
    #[must_use]
    pub fn leading_combinator(&self) -> Combinator {
        self.clauses
            .first()
            .map_or(Combinator::None, |clause| clause.combinator)
    }
}

/// One `(combinator, simple selector)` pair of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorClause {
    /// Relation between the previous clause's element and this one.
    pub combinator: Combinator,
    /// Constraints on this clause's element.
    pub selector: SimpleSelector,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Combinator {
    /// First clause of a chain with no leading combinator.
    #[default]
    None,

    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A selector of the form 'A B' represents an element B that is an
    /// arbitrary descendant of some ancestor element A."
    Descendant,

    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// "A selector of the form 'A > B' represents an element B that is a
    /// direct child of element A."
    Child,

    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// "A selector of the form 'A + B' represents an element B that
    /// immediately follows element A, where A and B share the same parent."
    NextSibling,

    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// "A selector of the form 'A ~ B' represents an element B that follows
    /// element A (not necessarily immediately), where A and B share the same
    /// parent."
    SubsequentSibling,
}

impl Combinator {
    /// The combinator written as `symbol`, if it is one.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '>' => Some(Self::Child),
            '+' => Some(Self::NextSibling),
            '~' => Some(Self::SubsequentSibling),
            _ => None,
        }
    }

    pub(crate) const fn symbol(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Descendant => " ",
            Self::Child => ">",
            Self::NextSibling => "+",
            Self::SubsequentSibling => "~",
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
///
/// An empty selector is the universal selector `*`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleSelector {
    /// Required tag name, lowercase. `None` matches any element.
    pub tag: Option<String>,
    /// Required id.
    pub id: Option<String>,
    /// Class tokens that must all be present.
    pub classes: Vec<String>,
    /// Attribute predicates, in source order.
    pub attributes: Vec<AttributePredicate>,
    /// Pseudo-class predicates, in source order.
    pub pseudo_classes: Vec<PseudoClass>,
}

impl SimpleSelector {
    /// Whether the selector places no constraint at all.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
    }
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePredicate {
    /// Attribute name, lowercase.
    pub name: String,
    /// Comparison to apply.
    pub operator: AttributeOperator,
    /// Expected value. Empty for [`AttributeOperator::Exists`].
    pub value: String,
}

/// The closed set of attribute comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeOperator {
    /// `[att]`: "Represents an element with the att attribute, whatever the
    /// value of the attribute."
    Exists,
    /// `[att=val]`: the value is exactly `val`.
    Equals,
    /// `[att~=val]`: one of the whitespace-separated words is exactly `val`.
    ContainsWord,
    /// `[att^=val]`: the value begins with `val`.
    Prefix,
    /// `[att$=val]`: the value ends with `val`.
    Suffix,
    /// `[att*=val]`: the value contains `val`.
    Substring,
    /// `[att|=val]`: the value is `val` or begins with `val-`.
    DashMatch,
    /// `[att!=val]`: the attribute is missing or its value differs.
    NotEquals,
}

impl AttributeOperator {
    /// The operator written as `symbol` (`=`, `~=`, `^=`, `$=`, `*=`, `|=`, `!=`).
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Equals),
            "~=" => Some(Self::ContainsWord),
            "^=" => Some(Self::Prefix),
            "$=" => Some(Self::Suffix),
            "*=" => Some(Self::Substring),
            "|=" => Some(Self::DashMatch),
            "!=" => Some(Self::NotEquals),
            _ => None,
        }
    }

    /// The source symbol; empty for [`AttributeOperator::Exists`].
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Exists => "",
            Self::Equals => "=",
            Self::ContainsWord => "~=",
            Self::Prefix => "^=",
            Self::Suffix => "$=",
            Self::Substring => "*=",
            Self::DashMatch => "|=",
            Self::NotEquals => "!=",
        }
    }

    /// Whether the index of elements carrying the attribute holds every
    /// element this operator can match.
    #[must_use]
    pub const fn requires_presence(self) -> bool {
        !matches!(self, Self::NotEquals)
    }

    /// Compare an element's attribute value (`None` when absent) against
    /// `expected`.
    ///
    /// The word, prefix, suffix and substring operators never match an empty
    /// `expected` value.
    #[must_use]
    pub fn matches(self, actual: Option<&str>, expected: &str) -> bool {
        let Some(actual) = actual else {
            return self == Self::NotEquals;
        };
        match self {
            Self::Exists => true,
            Self::Equals => actual == expected,
            Self::NotEquals => actual != expected,
            Self::ContainsWord => {
                !expected.is_empty() && actual.split_ascii_whitespace().any(|word| word == expected)
            }
            Self::Prefix => !expected.is_empty() && actual.starts_with(expected),
            Self::Suffix => !expected.is_empty() && actual.ends_with(expected),
            Self::Substring => !expected.is_empty() && actual.contains(expected),
            Self::DashMatch => actual
                .strip_prefix(expected)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-')),
        }
    }
}

/// The recognized pseudo-class names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum PseudoClassName {
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:nth-child(an+b)`
    NthChild,
    /// `:nth-last-child(an+b)`
    NthLastChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-of-type`
    LastOfType,
    /// `:only-of-type`
    OnlyOfType,
    /// `:nth-of-type(an+b)`
    NthOfType,
    /// `:nth-last-of-type(an+b)`
    NthLastOfType,
    /// `:empty`
    Empty,
    /// `:root`
    Root,
    /// `:not(list)`
    Not,
    /// `:contains(text)`
    Contains,
    /// `:checked`
    Checked,
    /// `:disabled`
    Disabled,
    /// `:enabled`
    Enabled,
}

impl PseudoClassName {
    /// Whether the pseudo-class is written with a parenthesized argument.
    #[must_use]
    pub const fn takes_argument(self) -> bool {
        matches!(
            self,
            Self::NthChild
                | Self::NthLastChild
                | Self::NthOfType
                | Self::NthLastOfType
                | Self::Not
                | Self::Contains
        )
    }
}

/// [§ 3.5 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.4.1 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    /// "Represents an element that is first among its inclusive siblings."
    FirstChild,
    /// [§ 14.4.2 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.4.3 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    /// "Represents an element that has no siblings."
    OnlyChild,
    /// [§ 14.4.4 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    NthChild(Nth),
    /// [§ 14.4.5 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    /// Positions are counted from the last sibling.
    NthLastChild(Nth),
    /// [§ 14.5.1 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,
    /// [§ 14.5.2 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
    /// [§ 14.5.3 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,
    /// [§ 14.5.4 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    NthOfType(Nth),
    /// [§ 14.5.5 :nth-last-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-last-of-type-pseudo)
    NthLastOfType(Nth),
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    /// Only comments and empty text may appear among the children.
    Empty,
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "Represents an element that is the root of the document."
    Root,
    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    /// Holds a list of single-clause chains.
    Not(SelectorList),
    /// `:contains(text)`: the element's text content includes `text`.
    Contains(String),
    /// [§ 13.3.1 :checked](https://www.w3.org/TR/selectors-4/#checked)
    Checked,
    /// [§ 13.1.3 :disabled](https://www.w3.org/TR/selectors-4/#disabled-pseudo)
    Disabled,
    /// [§ 13.1.3 :enabled](https://www.w3.org/TR/selectors-4/#enabled-pseudo)
    Enabled,
}

impl PseudoClass {
    /// The name this pseudo-class is written with.
    #[must_use]
    pub const fn name(&self) -> PseudoClassName {
        match self {
            Self::FirstChild => PseudoClassName::FirstChild,
            Self::LastChild => PseudoClassName::LastChild,
            Self::OnlyChild => PseudoClassName::OnlyChild,
            Self::NthChild(_) => PseudoClassName::NthChild,
            Self::NthLastChild(_) => PseudoClassName::NthLastChild,
            Self::FirstOfType => PseudoClassName::FirstOfType,
            Self::LastOfType => PseudoClassName::LastOfType,
            Self::OnlyOfType => PseudoClassName::OnlyOfType,
            Self::NthOfType(_) => PseudoClassName::NthOfType,
            Self::NthLastOfType(_) => PseudoClassName::NthLastOfType,
            Self::Empty => PseudoClassName::Empty,
            Self::Root => PseudoClassName::Root,
            Self::Not(_) => PseudoClassName::Not,
            Self::Contains(_) => PseudoClassName::Contains,
            Self::Checked => PseudoClassName::Checked,
            Self::Disabled => PseudoClassName::Disabled,
            Self::Enabled => PseudoClassName::Enabled,
        }
    }
}

// ===========================================================================
// Canonical serialization
// ===========================================================================

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{chain}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            match (i, clause.combinator) {
                (_, Combinator::None) => {}
                (0, combinator) => write!(f, "{} ", combinator.symbol())?,
                (_, Combinator::Descendant) => f.write_char(' ')?,
                (_, combinator) => write!(f, " {} ", combinator.symbol())?,
            }
            write!(f, "{}", clause.selector)?;
        }
        Ok(())
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write_ident(f, tag)?,
            None if self.is_universal() => f.write_char('*')?,
            None => {}
        }
        if let Some(id) = &self.id {
            f.write_char('#')?;
            write_ident(f, id)?;
        }
        for class in &self.classes {
            f.write_char('.')?;
            write_ident(f, class)?;
        }
        for attribute in &self.attributes {
            f.write_char('[')?;
            write_ident(f, &attribute.name)?;
            if attribute.operator != AttributeOperator::Exists {
                f.write_str(attribute.operator.symbol())?;
                write_string(f, &attribute.value)?;
            }
            f.write_char(']')?;
        }
        for pseudo in &self.pseudo_classes {
            write!(f, "{pseudo}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.name())?;
        match self {
            Self::NthChild(nth)
            | Self::NthLastChild(nth)
            | Self::NthOfType(nth)
            | Self::NthLastOfType(nth) => write!(f, "({nth})"),
            Self::Not(list) => write!(f, "({list})"),
            Self::Contains(text) => {
                f.write_char('(')?;
                write_string(f, text)?;
                f.write_char(')')
            }
            _ => Ok(()),
        }
    }
}

/// [§ 2.1 Serialize an identifier](https://www.w3.org/TR/cssom-1/#serialize-an-identifier)
fn write_ident(f: &mut fmt::Formatter<'_>, ident: &str) -> fmt::Result {
    let second = ident.chars().nth(1);
    for (i, c) in ident.chars().enumerate() {
        let plain = if i == 0 {
            is_ident_start(c)
                || (c == '-' && second.is_some_and(|next| next == '-' || is_ident_start(next)))
        } else {
            is_ident(c)
        };
        if plain {
            f.write_char(c)?;
        } else if is_hex_digit(c) || c.is_whitespace() || c.is_control() {
            write!(f, "\\{:x} ", u32::from(c))?;
        } else {
            write!(f, "\\{c}")?;
        }
    }
    Ok(())
}

fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}
