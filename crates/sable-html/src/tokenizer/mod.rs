//! HTML tokenizer module.
//!
//! Modeled on [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization),
//! reduced to the events the tree builder needs and extended with
//! end-of-input recovery for truncated markup.

/// Character reference decoding.
pub mod character_reference;
/// Helper methods for tokenizer state transitions.
mod helpers;
/// Token types produced by the tokenizer.
pub mod token;
/// HTML tokenizer state machine implementation.
#[allow(clippy::module_inception)]
mod tokenizer;

pub use token::{Attribute, Token};
pub use tokenizer::{HTMLTokenizer, RAWTEXT_ELEMENTS, RCDATA_ELEMENTS, TokenizerState};
