use sable_css::SelectorSyntaxError;
use sable_dom::DomError;
use thiserror::Error;

/// Errors from querying a [`Document`](crate::Document).
///
/// Parsing and rendering never fail, so this only covers selector input and
/// node handles that do not belong to the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SableError {
    /// The selector text could not be compiled.
    #[error(transparent)]
    Selector(#[from] SelectorSyntaxError),

    /// A node handle violated the tree's contract.
    #[error(transparent)]
    Dom(#[from] DomError),
}
