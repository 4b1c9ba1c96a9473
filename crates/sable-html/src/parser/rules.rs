//! Table-driven tag-soup rules.
//!
//! Every implicit-close, auto-insert and void decision the tree builder makes
//! comes from a [`ParserRules`] value. Anything the tables do not mention
//! closes nothing and is simply appended.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Opening `tag` while the current element is one of `within` first opens
/// `wrapper`, unless the current element is already one of
/// `allowed_parents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoInsertRule {
    /// The tag being opened.
    pub tag: String,
    /// Current elements that trigger the rule.
    pub within: BTreeSet<String>,
    /// Current elements under which `tag` needs no wrapper.
    #[serde(default)]
    pub allowed_parents: BTreeSet<String>,
    /// The element opened in between.
    pub wrapper: String,
}

/// The parser's rule tables.
///
/// Deserializes from JSON; missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserRules {
    /// Open element tag to the set of tags whose start closes it.
    pub auto_closes: BTreeMap<String, BTreeSet<String>>,
    /// Implied wrapper rules, tried in order.
    pub auto_inserts: Vec<AutoInsertRule>,
    /// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
    ///
    /// "Void elements only have a start tag; end tags must not be specified
    /// for void elements."
    pub void_elements: BTreeSet<String>,
}

/// Upper bound on the implied wrapper chain for one start tag.
const MAX_WRAPPER_DEPTH: usize = 8;

const P_CLOSERS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "dialog",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Whether `tag` is in the standard void element list, regardless of any
/// rule overrides.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().copied().map(String::from).collect()
}

impl Default for ParserRules {
    fn default() -> Self {
        let mut rules = Self {
            auto_closes: BTreeMap::new(),
            auto_inserts: Vec::new(),
            void_elements: set(VOID_ELEMENTS),
        };

        let closes: &[(&[&str], &[&str])] = &[
            (&["li"], &["li"]),
            (&["dt", "dd"], &["dt", "dd"]),
            (&["p"], P_CLOSERS),
            (&["option"], &["option", "optgroup"]),
            (&["optgroup"], &["optgroup"]),
            (&["tr"], &["tr", "tbody", "thead", "tfoot"]),
            (&["td", "th"], &["td", "th", "tr", "tbody", "thead", "tfoot"]),
            (&["thead", "tbody", "tfoot"], &["tbody", "thead", "tfoot"]),
            (&["colgroup"], &["colgroup", "tbody", "thead", "tfoot", "tr", "td", "th"]),
            (&["rt", "rp"], &["rt", "rp"]),
            (&["head"], &["body"]),
        ];
        for (open, closers) in closes {
            for tag in *open {
                rules = rules.with_auto_close(tag, closers.iter().copied());
            }
        }

        rules
            .with_auto_insert("tr", &["table"], &["tbody", "thead", "tfoot"], "tbody")
            .with_auto_insert("td", &["table", "tbody", "thead", "tfoot"], &["tr"], "tr")
            .with_auto_insert("th", &["table", "tbody", "thead", "tfoot"], &["tr"], "tr")
            .with_auto_insert("col", &["table"], &["colgroup"], "colgroup")
    }
}

impl ParserRules {
    /// Rules with empty tables: nothing closes implicitly, nothing is
    /// inserted and no element is void.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            auto_closes: BTreeMap::new(),
            auto_inserts: Vec::new(),
            void_elements: BTreeSet::new(),
        }
    }

    /// Add tags whose start closes an open `open_tag`.
    #[must_use]
    pub fn with_auto_close<'a>(
        mut self,
        open_tag: &str,
        closers: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.auto_closes
            .entry(open_tag.to_ascii_lowercase())
            .or_default()
            .extend(closers.into_iter().map(str::to_ascii_lowercase));
        self
    }

    /// Add an implied wrapper rule. It takes precedence over existing rules
    /// for the same tag.
    #[must_use]
    pub fn with_auto_insert(
        mut self,
        tag: &str,
        within: &[&str],
        allowed_parents: &[&str],
        wrapper: &str,
    ) -> Self {
        self.auto_inserts.insert(
            0,
            AutoInsertRule {
                tag: tag.to_ascii_lowercase(),
                within: within.iter().copied().map(str::to_ascii_lowercase).collect(),
                allowed_parents: allowed_parents
                    .iter()
                    .copied()
                    .map(str::to_ascii_lowercase)
                    .collect(),
                wrapper: wrapper.to_ascii_lowercase(),
            },
        );
        self
    }

    /// Mark an extra tag as void.
    #[must_use]
    pub fn with_void_element(mut self, tag: &str) -> Self {
        let _ = self.void_elements.insert(tag.to_ascii_lowercase());
        self
    }

    /// Whether opening `new_tag` closes an open `open_tag`.
    #[must_use]
    pub fn closes(&self, open_tag: &str, new_tag: &str) -> bool {
        self.auto_closes
            .get(open_tag)
            .is_some_and(|closers| closers.contains(new_tag))
    }

    /// The wrapper to open before `tag` when the current element is
    /// `parent_tag`, if any.
    #[must_use]
    pub fn implied_wrapper(&self, tag: &str, parent_tag: &str) -> Option<&str> {
        self.auto_inserts
            .iter()
            .find(|rule| {
                rule.tag == tag
                    && rule.within.contains(parent_tag)
                    && !rule.allowed_parents.contains(parent_tag)
            })
            .map(|rule| rule.wrapper.as_str())
    }

    /// The chain of wrappers to open, outermost first, before `tag` under
    /// `parent_tag`.
    ///
    /// Rules apply recursively: `td` under `table` implies `tr`, which in turn
    /// implies `tbody`, giving `["tbody", "tr"]`.
    #[must_use]
    pub fn wrapper_chain(&self, tag: &str, parent_tag: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut inner = tag.to_string();
        while chain.len() < MAX_WRAPPER_DEPTH {
            let Some(wrapper) = self.implied_wrapper(&inner, parent_tag) else {
                break;
            };
            // A rule wrapping a tag in itself would never terminate.
            if wrapper == inner || chain.iter().any(|w: &String| w == wrapper) {
                break;
            }
            inner = wrapper.to_string();
            chain.push(inner.clone());
        }
        chain.reverse();
        chain
    }

    /// Whether `tag` is a void element.
    #[must_use]
    pub fn is_void(&self, tag: &str) -> bool {
        self.void_elements.contains(tag)
    }
}
