use std::collections::HashSet;
use std::fmt;

/// An attribute on a start tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// A lexical event emitted by [`HTMLTokenizer`](super::HTMLTokenizer).
///
/// Adjacent characters are coalesced into a single [`Token::Text`]. The end
/// of input is the end of the iterator; there is no end-of-file token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<!DOCTYPE ...>`; `data` is the trimmed text after the keyword.
    Doctype {
        /// Declaration body, e.g. `html`.
        data: String,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// "a tag name", lowercased
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes", first occurrence of each name kept
        attributes: Vec<Attribute>,
    },

    /// End tag token.
    EndTag {
        /// "a tag name", lowercased
        name: String,
    },

    /// A run of character data with references already decoded.
    Text {
        /// The characters.
        data: String,
    },

    /// `<!-- ... -->`, or a bogus comment such as `<?xml ...>`.
    Comment {
        /// "data"
        data: String,
    },

    /// `<![CDATA[ ... ]]>`
    CData {
        /// Section contents, verbatim.
        data: String,
    },
}

impl Token {
    /// Create a start tag token with an empty name and no attributes.
    #[must_use]
    pub const fn new_start_tag() -> Self {
        Self::StartTag {
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// Create an end tag token with an empty name.
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag {
            name: String::new(),
        }
    }

    /// Create a text token.
    #[must_use]
    pub fn text(data: impl Into<String>) -> Self {
        Self::Text { data: data.into() }
    }

    /// Name of a start or end tag token.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            _ => None,
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    ///
    /// "Append the current input character to the current tag token's tag name."
    pub(crate) fn append_to_tag_name(&mut self, c: char) {
        if let Self::StartTag { name, .. } | Self::EndTag { name } = self {
            name.push(c.to_ascii_lowercase());
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    ///
    /// "Start a new attribute in the current tag token. Set that attribute
    /// name and value to the empty string."
    ///
    /// Attributes on end tags are parsed and dropped.
    pub(crate) fn start_new_attribute(&mut self) {
        if let Self::StartTag { attributes, .. } = self {
            attributes.push(Attribute::new(String::new(), String::new()));
        }
    }

    /// "Append the current input character to the current attribute's name."
    pub(crate) fn append_to_current_attribute_name(&mut self, c: char) {
        if let Some(attribute) = self.current_attribute_mut() {
            attribute.name.push(c.to_ascii_lowercase());
        }
    }

    /// "Append the current input character to the current attribute's value."
    pub(crate) fn append_to_current_attribute_value(&mut self, s: &str) {
        if let Some(attribute) = self.current_attribute_mut() {
            attribute.value.push_str(s);
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "If there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token."
    ///
    /// Applied once when the tag is emitted. Returns the number of attributes
    /// dropped.
    pub(crate) fn drop_duplicate_attributes(&mut self) -> usize {
        let Self::StartTag { attributes, .. } = self else {
            return 0;
        };
        let before = attributes.len();
        let mut seen = HashSet::new();
        attributes.retain(|attribute| seen.insert(attribute.name.clone()));
        before - attributes.len()
    }

    /// "Set the self-closing flag of the current tag token."
    pub(crate) const fn set_self_closing(&mut self) {
        if let Self::StartTag { self_closing, .. } = self {
            *self_closing = true;
        }
    }

    /// Append to the data of a comment, doctype or CDATA token.
    pub(crate) fn append_to_data(&mut self, c: char) {
        if let Self::Comment { data } | Self::Doctype { data } | Self::CData { data } = self {
            data.push(c);
        }
    }

    fn current_attribute_mut(&mut self) -> Option<&mut Attribute> {
        match self {
            Self::StartTag { attributes, .. } => attributes.last_mut(),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype { data } => write!(f, "DOCTYPE({data})"),
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "StartTag({name}")?;
                for attribute in attributes {
                    write!(f, " {}={:?}", attribute.name, attribute.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ")")
            }
            Self::EndTag { name } => write!(f, "EndTag({name})"),
            Self::Text { data } => write!(f, "Text({data:?})"),
            Self::Comment { data } => write!(f, "Comment({data:?})"),
            Self::CData { data } => write!(f, "CData({data:?})"),
        }
    }
}
