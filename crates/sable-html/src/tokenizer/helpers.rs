//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - Character references and raw text end tags

use super::character_reference;
use super::token::Token;
use super::tokenizer::{HTMLTokenizer, RAWTEXT_ELEMENTS, RCDATA_ELEMENTS, TokenizerState};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Consume the next input character"
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// Peek at the codepoint `offset` characters past the current position
    /// without consuming it.
    #[must_use]
    pub fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.input[self.current_pos..].chars().nth(offset)
    }

    /// "If the next few characters are..."
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target)
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input[self.current_pos..]
            .get(..target.len())
            .is_some_and(|next| next.eq_ignore_ascii_case(target))
    }

    /// Consume `target`, which the caller has already matched by lookahead.
    pub(super) const fn consume_string(&mut self, target: &str) {
        self.current_pos += target.len();
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// CR never reaches the state machine; it is normalized away in
    /// [`HTMLTokenizer::new`].
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Emit the current token"
    ///
    /// Start tags of raw text elements switch the tokenizer into the RCDATA
    /// or RAWTEXT state, which the tree construction stage would otherwise
    /// do for us.
    pub(super) fn emit_current_token(&mut self) {
        let Some(mut token) = self.current_token.take() else {
            return;
        };
        if token.drop_duplicate_attributes() > 0 {
            self.log_parse_error("duplicate-attribute");
        }
        if let Token::StartTag {
            ref name,
            self_closing,
            ..
        } = token
        {
            if !self_closing {
                if RCDATA_ELEMENTS.contains(&name.as_str()) {
                    self.switch_to(TokenizerState::RCDATA);
                } else if RAWTEXT_ELEMENTS.contains(&name.as_str()) {
                    self.switch_to(TokenizerState::RAWTEXT);
                }
            }
            self.last_start_tag_name = Some(name.clone());
        }
        self.flush_text();
        self.pending.push_back(token);
    }

    /// "Emit the current input character as a character token."
    ///
    /// Characters accumulate until the next non-text token so that each run
    /// of text becomes one [`Token::Text`].
    pub(super) fn emit_character(&mut self, c: char) {
        self.text_buffer.push(c);
    }

    /// Emit several characters as text.
    pub(super) fn emit_characters(&mut self, s: &str) {
        self.text_buffer.push_str(s);
    }

    /// "Emit an end-of-file token."
    pub(super) fn finish(&mut self) {
        self.flush_text();
        self.at_eof = true;
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    ///
    /// "EOF - This is an eof-in-tag parse error. Emit an end-of-file token."
    ///
    /// Rather than dropping the tag, emit it with whatever name and
    /// attributes were gathered.
    pub(super) fn recover_unterminated_tag(&mut self) {
        self.log_parse_error("eof-in-tag");
        self.emit_current_token();
        self.finish();
    }

    fn flush_text(&mut self) {
        if !self.text_buffer.is_empty() {
            let data = std::mem::take(&mut self.text_buffer);
            self.pending.push_back(Token::Text { data });
        }
    }
}

// =============================================================================
// Character Reference and Raw Text Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Entered with the `&` consumed. A reference that does not decode is
    /// flushed as a literal `&` and the following text is tokenized normally.
    pub(super) fn consume_character_reference(&mut self, in_attribute: bool) {
        let decoded = character_reference::decode(&self.input[self.current_pos..], in_attribute);
        let c = match decoded {
            Some((c, consumed)) => {
                self.current_pos += consumed;
                c
            }
            None => '&',
        };
        if in_attribute {
            self.append_to_attribute_value(c);
        } else {
            self.emit_character(c);
        }
    }

    /// "Append the current input character to the current attribute's value."
    pub(super) fn append_to_attribute_value(&mut self, c: char) {
        if let Some(ref mut token) = self.current_token {
            let mut buf = [0_u8; 4];
            token.append_to_current_attribute_value(c.encode_utf8(&mut buf));
        }
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    ///
    /// Called on a `<` in raw content; true when it begins such an end tag
    /// followed by whitespace, `/`, `>` or the end of input.
    pub(super) fn at_appropriate_end_tag(&self) -> bool {
        let Some(name) = self.last_start_tag_name.as_deref() else {
            return false;
        };
        let Some(rest) = self.input[self.current_pos..].strip_prefix('/') else {
            return false;
        };
        let matches_name = rest
            .get(..name.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name));
        matches_name
            && rest[name.len()..]
                .chars()
                .next()
                .is_none_or(|c| Self::is_whitespace_char(c) || c == '/' || c == '>')
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Parse errors are never fatal. Each one is counted and traced.
    pub(super) fn log_parse_error(&mut self, code: &str) {
        self.parse_errors += 1;
        tracing::trace!(code, position = self.current_pos, state = %self.state, "html parse error");
    }
}
