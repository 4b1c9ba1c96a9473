//! Sable document engine.
//!
//! Parses tag-soup HTML into an indexed tree, answers CSS selector queries
//! against it and renders it back to markup.
//!
//! # Scope
//!
//! This crate ties the engine crates together:
//! - [`Document`]: a parsed tree plus the issues recovered while parsing
//! - [`Selection`]: the ordered result of a query, with scoped `find`,
//!   `filter`, attribute access and rendering helpers
//! - [`SableError`]: the single error type of the query surface
//!
//! The engine crates are re-exported as [`css`], [`dom`] and [`html`] for
//! callers that need the lower-level APIs.
//!
//! # Not Yet Implemented
//!
//! - Fetching documents over the network
//! - Scripting, styling and layout
//!
//! # Example
//!
//! ```
//! use sable_core::Document;
//!
//! let doc = Document::parse("<ul><li>a<li class=\"on\">b</ul>");
//! let items = doc.select("li.on").unwrap();
//! assert_eq!(items.len(), 1);
//! assert_eq!(items.render_selection(), "<li class=\"on\">b</li>");
//! ```

mod document;
mod error;
mod selection;

pub use sable_css as css;
pub use sable_dom as dom;
pub use sable_html as html;

pub use document::Document;
pub use error::SableError;
pub use selection::Selection;

pub use sable_css::{SelectorList, SelectorSyntaxError};
pub use sable_dom::{DomError, DomTree, NodeId};
pub use sable_html::{ParseIssue, ParserRules, RenderOptions, SelfClosingStyle};
