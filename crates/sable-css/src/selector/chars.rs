//! Character classes used by the selector tokenizer.
//!
//! [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#tokenizer-definitions)
//!
//! ASCII characters are classified through a static table; every non-ASCII
//! character is an identifier character.

const IDENT_START: u8 = 1;
const IDENT: u8 = 1 << 1;
const WHITESPACE: u8 = 1 << 2;
const COMBINATOR: u8 = 1 << 3;
const QUOTE: u8 = 1 << 4;
const HEX_DIGIT: u8 = 1 << 5;

static ASCII_CLASSES: [u8; 128] = build_table();

const fn build_table() -> [u8; 128] {
    let mut table = [0u8; 128];
    let mut c: u8 = 0;
    while c < 128 {
        let mut flags = 0;
        if c.is_ascii_alphabetic() || c == b'_' {
            flags |= IDENT_START | IDENT;
        }
        if c.is_ascii_digit() || c == b'-' {
            flags |= IDENT;
        }
        if c.is_ascii_hexdigit() {
            flags |= HEX_DIGIT;
        }
        if matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0C) {
            flags |= WHITESPACE;
        }
        if matches!(c, b'>' | b'+' | b'~') {
            flags |= COMBINATOR;
        }
        if matches!(c, b'"' | b'\'') {
            flags |= QUOTE;
        }
        table[c as usize] = flags;
        c += 1;
    }
    table
}

fn class_of(c: char) -> u8 {
    if c.is_ascii() {
        ASCII_CLASSES[c as usize]
    } else {
        IDENT_START | IDENT
    }
}

/// [§ 4.2 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
#[must_use]
pub fn is_ident_start(c: char) -> bool {
    class_of(c) & IDENT_START != 0
}

/// [§ 4.2 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
#[must_use]
pub fn is_ident(c: char) -> bool {
    class_of(c) & IDENT != 0
}

/// Selector whitespace: space, tab, line feed, carriage return, form feed.
#[must_use]
pub fn is_whitespace(c: char) -> bool {
    class_of(c) & WHITESPACE != 0
}

/// `>`, `+` or `~`.
#[must_use]
pub fn is_combinator(c: char) -> bool {
    class_of(c) & COMBINATOR != 0
}

/// `"` or `'`.
#[must_use]
pub fn is_quote(c: char) -> bool {
    class_of(c) & QUOTE != 0
}

/// An ASCII hex digit.
#[must_use]
pub fn is_hex_digit(c: char) -> bool {
    class_of(c) & HEX_DIGIT != 0
}
