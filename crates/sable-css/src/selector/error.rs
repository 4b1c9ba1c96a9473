use thiserror::Error;

/// A selector string could not be compiled.
///
/// `offset` is a byte offset into `input`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector `{input}` at offset {offset}: {message}")]
pub struct SelectorSyntaxError {
    /// The complete selector text.
    pub input: String,
    /// Byte offset of the offending token.
    pub offset: usize,
    /// Human-readable reason.
    pub message: String,
}

impl SelectorSyntaxError {
    pub(crate) fn new(input: &str, offset: usize, message: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            offset,
            message: message.into(),
        }
    }
}
